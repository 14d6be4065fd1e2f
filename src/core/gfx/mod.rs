mod backends;
mod types;

pub use backends::Backend;
pub use types::{BlendMode, RenderList, RenderObject};

use std::{error::Error, sync::Arc};
use winit::window::Window;

/// Creates and initializes the OpenGL backend for `window`.
pub fn create_backend(window: Arc<Window>, vsync_enabled: bool) -> Result<Box<dyn Backend>, Box<dyn Error>> {
    Ok(Box::new(backends::opengl::init(window, vsync_enabled)?))
}
