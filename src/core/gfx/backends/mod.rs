use std::error::Error;

use crate::core::gfx::RenderList;

pub mod opengl;

/// The rendering backend, and any associated state for performing rendering operations with that backend.
pub trait Backend {
    /// Draws one frame and returns the number of objects submitted.
    fn draw(&mut self, render_list: &RenderList) -> Result<u32, Box<dyn Error>>;

    fn resize(&mut self, width: u32, height: u32);

    fn cleanup(&mut self);
}
