use crate::core::gfx::{RenderList, RenderObject};

/// Rectangle outline drawn inside the `(x, y, w, h)` bounds.
pub fn rect_outline(out: &mut RenderList, x: f32, y: f32, w: f32, h: f32, thickness: f32, color: [f32; 4]) {
    let t = thickness.min(0.5 * w).min(0.5 * h);
    out.push(RenderObject::rect(x, y, w, t, color));
    out.push(RenderObject::rect(x, y + h - t, w, t, color));
    out.push(RenderObject::rect(x, y + t, t, h - 2.0 * t, color));
    out.push(RenderObject::rect(x + w - t, y + t, t, h - 2.0 * t, color));
}

/// Horizontal line of the given thickness centred on `y`.
pub fn hline(out: &mut RenderList, x0: f32, x1: f32, y: f32, thickness: f32, color: [f32; 4]) {
    out.push(RenderObject::rect(x0, y - 0.5 * thickness, x1 - x0, thickness, color));
}

/// Filled gauge: background over the full width, foreground over `fraction` of it.
pub fn gauge(out: &mut RenderList, x: f32, y: f32, w: f32, h: f32, fraction: f32, fg: [f32; 4], bg: [f32; 4]) {
    out.push(RenderObject::rect(x, y, w, h, bg));
    let f = fraction.clamp(0.0, 1.0);
    if f > 0.0 {
        out.push(RenderObject::rect(x, y, w * f, h, fg));
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_gauge_draws_only_background() {
        let mut list = RenderList::new([0.0; 4]);
        gauge(&mut list, 0.0, 0.0, 100.0, 10.0, 0.0, [1.0; 4], [0.5; 4]);
        assert_eq!(list.objects.len(), 1);
        gauge(&mut list, 0.0, 0.0, 100.0, 10.0, 1.5, [1.0; 4], [0.5; 4]);
        assert_eq!(list.objects.len(), 3);
    }

    #[test]
    fn outline_is_four_edges() {
        let mut list = RenderList::new([0.0; 4]);
        rect_outline(&mut list, 80.0, 0.0, 100.0, 600.0, 2.0, [1.0; 4]);
        assert_eq!(list.objects.len(), 4);
    }
}
