// src/ui/font.rs
//! Built-in 5x7 bitmap font. Each lit run of pixels in a glyph row becomes one quad.

use crate::core::gfx::{RenderList, RenderObject};

pub const GLYPH_W: u32 = 5;
pub const GLYPH_H: u32 = 7;
/// Horizontal advance in font pixels, including one column of spacing.
const ADVANCE: u32 = GLYPH_W + 1;

#[derive(Clone, Copy, Debug, PartialEq)]
pub enum Align {
    Left,
    Center,
    Right,
}

/// Rows top to bottom; bit 4 is the leftmost column.
fn glyph(c: char) -> [u8; 7] {
    match c.to_ascii_uppercase() {
        'A' => [0x0E, 0x11, 0x11, 0x1F, 0x11, 0x11, 0x11],
        'B' => [0x1E, 0x11, 0x11, 0x1E, 0x11, 0x11, 0x1E],
        'C' => [0x0E, 0x11, 0x10, 0x10, 0x10, 0x11, 0x0E],
        'D' => [0x1C, 0x12, 0x11, 0x11, 0x11, 0x12, 0x1C],
        'E' => [0x1F, 0x10, 0x10, 0x1E, 0x10, 0x10, 0x1F],
        'F' => [0x1F, 0x10, 0x10, 0x1E, 0x10, 0x10, 0x10],
        'G' => [0x0E, 0x11, 0x10, 0x17, 0x11, 0x11, 0x0F],
        'H' => [0x11, 0x11, 0x11, 0x1F, 0x11, 0x11, 0x11],
        'I' => [0x0E, 0x04, 0x04, 0x04, 0x04, 0x04, 0x0E],
        'J' => [0x07, 0x02, 0x02, 0x02, 0x02, 0x12, 0x0C],
        'K' => [0x11, 0x12, 0x14, 0x18, 0x14, 0x12, 0x11],
        'L' => [0x10, 0x10, 0x10, 0x10, 0x10, 0x10, 0x1F],
        'M' => [0x11, 0x1B, 0x15, 0x15, 0x11, 0x11, 0x11],
        'N' => [0x11, 0x11, 0x19, 0x15, 0x13, 0x11, 0x11],
        'O' => [0x0E, 0x11, 0x11, 0x11, 0x11, 0x11, 0x0E],
        'P' => [0x1E, 0x11, 0x11, 0x1E, 0x10, 0x10, 0x10],
        'Q' => [0x0E, 0x11, 0x11, 0x11, 0x15, 0x12, 0x0D],
        'R' => [0x1E, 0x11, 0x11, 0x1E, 0x14, 0x12, 0x11],
        'S' => [0x0F, 0x10, 0x10, 0x0E, 0x01, 0x01, 0x1E],
        'T' => [0x1F, 0x04, 0x04, 0x04, 0x04, 0x04, 0x04],
        'U' => [0x11, 0x11, 0x11, 0x11, 0x11, 0x11, 0x0E],
        'V' => [0x11, 0x11, 0x11, 0x11, 0x11, 0x0A, 0x04],
        'W' => [0x11, 0x11, 0x11, 0x15, 0x15, 0x15, 0x0A],
        'X' => [0x11, 0x11, 0x0A, 0x04, 0x0A, 0x11, 0x11],
        'Y' => [0x11, 0x11, 0x0A, 0x04, 0x04, 0x04, 0x04],
        'Z' => [0x1F, 0x01, 0x02, 0x04, 0x08, 0x10, 0x1F],
        '0' => [0x0E, 0x11, 0x13, 0x15, 0x19, 0x11, 0x0E],
        '1' => [0x04, 0x0C, 0x04, 0x04, 0x04, 0x04, 0x0E],
        '2' => [0x0E, 0x11, 0x01, 0x02, 0x04, 0x08, 0x1F],
        '3' => [0x1F, 0x02, 0x04, 0x02, 0x01, 0x11, 0x0E],
        '4' => [0x02, 0x06, 0x0A, 0x12, 0x1F, 0x02, 0x02],
        '5' => [0x1F, 0x10, 0x1E, 0x01, 0x01, 0x11, 0x0E],
        '6' => [0x06, 0x08, 0x10, 0x1E, 0x11, 0x11, 0x0E],
        '7' => [0x1F, 0x01, 0x02, 0x04, 0x08, 0x08, 0x08],
        '8' => [0x0E, 0x11, 0x11, 0x0E, 0x11, 0x11, 0x0E],
        '9' => [0x0E, 0x11, 0x11, 0x0F, 0x01, 0x02, 0x0C],
        ' ' => [0x00; 7],
        '!' => [0x04, 0x04, 0x04, 0x04, 0x04, 0x00, 0x04],
        ':' => [0x00, 0x0C, 0x0C, 0x00, 0x0C, 0x0C, 0x00],
        '.' => [0x00, 0x00, 0x00, 0x00, 0x00, 0x0C, 0x0C],
        ',' => [0x00, 0x00, 0x00, 0x00, 0x0C, 0x04, 0x08],
        '%' => [0x18, 0x19, 0x02, 0x04, 0x08, 0x13, 0x03],
        '/' => [0x00, 0x01, 0x02, 0x04, 0x08, 0x10, 0x00],
        '-' => [0x00, 0x00, 0x00, 0x1F, 0x00, 0x00, 0x00],
        '_' => [0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x1F],
        '\'' => [0x04, 0x04, 0x08, 0x00, 0x00, 0x00, 0x00],
        '(' => [0x02, 0x04, 0x08, 0x08, 0x08, 0x04, 0x02],
        ')' => [0x08, 0x04, 0x02, 0x02, 0x02, 0x04, 0x08],
        '<' => [0x02, 0x04, 0x08, 0x10, 0x08, 0x04, 0x02],
        '>' => [0x08, 0x04, 0x02, 0x01, 0x02, 0x04, 0x08],
        _ => [0x0E, 0x11, 0x01, 0x02, 0x04, 0x00, 0x04], // '?'
    }
}

/// Width in logical pixels of `text` drawn at `scale`.
pub fn text_width(text: &str, scale: f32) -> f32 {
    let n = text.chars().count() as u32;
    if n == 0 {
        return 0.0;
    }
    (n * ADVANCE - 1) as f32 * scale
}

#[inline(always)]
pub fn text_height(scale: f32) -> f32 {
    GLYPH_H as f32 * scale
}

/// Calls `emit(x, y, w)` for each horizontal run of lit pixels, in font pixels.
fn for_each_run(text: &str, mut emit: impl FnMut(u32, u32, u32)) {
    for (i, c) in text.chars().enumerate() {
        let origin = i as u32 * ADVANCE;
        for (row, bits) in glyph(c).iter().enumerate() {
            let mut col = 0;
            while col < GLYPH_W {
                if bits & (0x10 >> col) == 0 {
                    col += 1;
                    continue;
                }
                let start = col;
                while col < GLYPH_W && bits & (0x10 >> col) != 0 {
                    col += 1;
                }
                emit(origin + start, row as u32, col - start);
            }
        }
    }
}

/// Draws `text` with its top edge at `y`; `x` is interpreted according to `align`.
pub fn draw_text(out: &mut RenderList, text: &str, x: f32, y: f32, scale: f32, align: Align, color: [f32; 4]) {
    let left = match align {
        Align::Left => x,
        Align::Center => x - 0.5 * text_width(text, scale),
        Align::Right => x - text_width(text, scale),
    };
    for_each_run(text, |px, py, w| {
        out.push(RenderObject::rect(
            left + px as f32 * scale,
            y + py as f32 * scale,
            w as f32 * scale,
            scale,
            color,
        ));
    });
}

/// Draws `text` centred on `(cx, cy)`.
pub fn draw_text_centered(out: &mut RenderList, text: &str, cx: f32, cy: f32, scale: f32, color: [f32; 4]) {
    draw_text(out, text, cx, cy - 0.5 * text_height(scale), scale, Align::Center, color);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn width_excludes_trailing_spacing() {
        assert_eq!(text_width("", 2.0), 0.0);
        assert_eq!(text_width("A", 1.0), 5.0);
        assert_eq!(text_width("AB", 3.0), 33.0);
    }

    #[test]
    fn runs_merge_adjacent_pixels() {
        let mut runs = Vec::new();
        for_each_run("-", |x, y, w| runs.push((x, y, w)));
        assert_eq!(runs, vec![(0, 3, 5)]);

        runs.clear();
        for_each_run(" H", |x, y, w| runs.push((x, y, w)));
        assert_eq!(runs.len(), 2 * 6 + 1);
        assert_eq!(runs[0], (6, 0, 1));
        assert!(runs.contains(&(6, 3, 5)));
    }

    #[test]
    fn lowercase_uses_uppercase_glyphs() {
        assert_eq!(glyph('k'), glyph('K'));
        assert_eq!(glyph('~'), glyph('?'));
    }

    #[test]
    fn centered_text_straddles_center() {
        let mut list = RenderList::new([0.0; 4]);
        draw_text(&mut list, "I", 100.0, 0.0, 2.0, Align::Center, [1.0; 4]);
        assert!(!list.objects.is_empty());
        // 'I' top row is three pixels wide starting at column 1.
        let top = &list.objects[0].transform;
        let center_x = top.w.x;
        assert!((center_x - 100.0).abs() < 1e-4);
    }
}
