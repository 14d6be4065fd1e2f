use cgmath::Matrix4;

// -----------------------------------------------------------------------------
// Logical design space (origin top-left, y grows downward)
// -----------------------------------------------------------------------------
pub const LOGICAL_WIDTH: f32 = 800.0;
pub const LOGICAL_HEIGHT: f32 = 600.0;

/// Pixel rectangle the logical space is drawn into.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Viewport {
    pub x: i32,
    pub y: i32,
    pub width: i32,
    pub height: i32,
}

/// Largest 4:3 rectangle centred in the window; the rest is letterboxed.
pub fn viewport_for_window(px_w: u32, px_h: u32) -> Viewport {
    if px_w == 0 || px_h == 0 {
        return Viewport { x: 0, y: 0, width: 0, height: 0 };
    }
    let scale = (px_w as f32 / LOGICAL_WIDTH).min(px_h as f32 / LOGICAL_HEIGHT);
    let width = (LOGICAL_WIDTH * scale).round() as i32;
    let height = (LOGICAL_HEIGHT * scale).round() as i32;
    Viewport {
        x: (px_w as i32 - width) / 2,
        y: (px_h as i32 - height) / 2,
        width,
        height,
    }
}

#[inline(always)]
pub fn ortho_for_window() -> Matrix4<f32> {
    cgmath::ortho(0.0, LOGICAL_WIDTH, LOGICAL_HEIGHT, 0.0, -1.0, 1.0)
}

#[inline(always)]
pub const fn screen_center_x() -> f32 {
    0.5 * LOGICAL_WIDTH
}

#[cfg(test)]
mod tests {
    use super::*;
    use cgmath::{Vector4, vec4};

    #[test]
    fn exact_size_fills_window() {
        assert_eq!(viewport_for_window(800, 600), Viewport { x: 0, y: 0, width: 800, height: 600 });
    }

    #[test]
    fn wide_window_is_pillarboxed() {
        assert_eq!(viewport_for_window(1920, 1080), Viewport { x: 240, y: 0, width: 1440, height: 1080 });
    }

    #[test]
    fn tall_window_is_letterboxed() {
        assert_eq!(viewport_for_window(800, 800), Viewport { x: 0, y: 100, width: 800, height: 600 });
    }

    #[test]
    fn ortho_maps_top_left_to_clip_corner() {
        let p: Vector4<f32> = ortho_for_window() * vec4(0.0, 0.0, 0.0, 1.0);
        assert!((p.x + 1.0).abs() < 1e-6);
        assert!((p.y - 1.0).abs() < 1e-6);
        let q: Vector4<f32> = ortho_for_window() * vec4(LOGICAL_WIDTH, LOGICAL_HEIGHT, 0.0, 1.0);
        assert!((q.x - 1.0).abs() < 1e-6);
        assert!((q.y + 1.0).abs() < 1e-6);
    }
}
