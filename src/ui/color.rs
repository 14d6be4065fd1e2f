// src/ui/color.rs
use crate::core::input::{Lane, LANE_COUNT};

pub const WHITE: [f32; 4] = [1.0, 1.0, 1.0, 1.0];
pub const BLACK: [f32; 4] = [0.0, 0.0, 0.0, 1.0];
pub const GRAY: [f32; 4] = rgb8(128, 128, 128);
pub const DIM: [f32; 4] = rgb8(70, 70, 70);
pub const SELECTED: [f32; 4] = rgb8(255, 93, 71);
pub const HP_GOOD: [f32; 4] = rgb8(80, 220, 80);
pub const HP_LOW: [f32; 4] = rgb8(230, 60, 60);
pub const BOOST: [f32; 4] = rgb8(255, 210, 60);
pub const FEVER: [f32; 4] = rgb8(255, 90, 200);

const LANE_COLORS: [[f32; 4]; LANE_COUNT] = [
    rgb8(255, 100, 100),
    rgb8(100, 255, 100),
    rgb8(100, 100, 255),
    rgb8(255, 255, 100),
];

#[inline(always)]
pub const fn rgb8(r: u8, g: u8, b: u8) -> [f32; 4] {
    [r as f32 / 255.0, g as f32 / 255.0, b as f32 / 255.0, 1.0]
}

#[inline(always)]
pub const fn lane(lane: Lane) -> [f32; 4] {
    LANE_COLORS[lane.index()]
}

#[inline(always)]
pub fn with_alpha(mut c: [f32; 4], alpha: f32) -> [f32; 4] {
    c[3] *= alpha.clamp(0.0, 1.0);
    c
}

/// Blends `c` toward white by `t` in `[0, 1]`.
pub fn lighten(c: [f32; 4], t: f32) -> [f32; 4] {
    let t = t.clamp(0.0, 1.0);
    [c[0] + (1.0 - c[0]) * t, c[1] + (1.0 - c[1]) * t, c[2] + (1.0 - c[2]) * t, c[3]]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn lane_colors_follow_lane_order() {
        assert_eq!(lane(Lane::Left), [1.0, 100.0 / 255.0, 100.0 / 255.0, 1.0]);
        assert_eq!(lane(Lane::Right)[2], 100.0 / 255.0);
    }

    #[test]
    fn lighten_reaches_white() {
        assert_eq!(lighten(BLACK, 1.0), WHITE);
        assert_eq!(lighten(BLACK, 0.0), BLACK);
        assert_eq!(with_alpha(WHITE, 0.5)[3], 0.5);
    }
}
