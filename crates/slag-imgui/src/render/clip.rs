use crate::coords::{Rect, Vec2};
use crate::gpu::{Extent2d, ScissorRect};

/// Converts a UI clip rect to a scissor rect in framebuffer pixels.
///
/// The rect is moved into viewport space (`- display_pos`), scaled by
/// `framebuffer_scale` and clamped to the framebuffer. Returns `None` when
/// nothing is left to draw.
pub fn project_clip_rect(
    clip: Rect,
    display_pos: Vec2,
    framebuffer_scale: Vec2,
    extent: Extent2d,
) -> Option<ScissorRect> {
    let projected = clip.project(display_pos, framebuffer_scale);
    // f32::max/min swallow NaN, so check before clamping. Infinities clamp fine.
    let corners = [projected.min.x, projected.min.y, projected.max.x, projected.max.y];
    if corners.iter().any(|v| v.is_nan()) {
        return None;
    }

    let r = projected.clamp_to(extent.width as f32, extent.height as f32);
    if r.is_empty() {
        return None;
    }

    Some(ScissorRect::new(
        r.min.x as i32,
        r.min.y as i32,
        r.width() as u32,
        r.height() as u32,
    ))
}

#[cfg(test)]
mod tests {
    use super::*;

    const FB: Extent2d = Extent2d::new(800, 600);

    fn clip(x1: f32, y1: f32, x2: f32, y2: f32) -> Option<ScissorRect> {
        project_clip_rect(Rect::new(x1, y1, x2, y2), Vec2::zero(), Vec2::splat(1.0), FB)
    }

    // ── pass-through ──────────────────────────────────────────────────────

    #[test]
    fn full_frame_clip() {
        assert_eq!(clip(0.0, 0.0, 800.0, 600.0), Some(ScissorRect::new(0, 0, 800, 600)));
    }

    #[test]
    fn fractional_corners_truncate() {
        assert_eq!(clip(10.7, 20.2, 30.9, 40.5), Some(ScissorRect::new(10, 20, 20, 20)));
    }

    // ── clamping ──────────────────────────────────────────────────────────

    #[test]
    fn clamps_to_framebuffer() {
        assert_eq!(clip(-50.0, -10.0, 900.0, 700.0), Some(ScissorRect::new(0, 0, 800, 600)));
    }

    #[test]
    fn outside_framebuffer_is_skipped() {
        assert_eq!(clip(810.0, 0.0, 900.0, 100.0), None);
        assert_eq!(clip(-100.0, 0.0, -10.0, 100.0), None);
    }

    #[test]
    fn zero_area_is_skipped() {
        assert_eq!(clip(10.0, 10.0, 10.0, 50.0), None);
        assert_eq!(clip(10.0, 50.0, 40.0, 50.0), None);
    }

    #[test]
    fn inverted_is_skipped() {
        assert_eq!(clip(40.0, 10.0, 10.0, 50.0), None);
    }

    #[test]
    fn infinite_clip_clamps() {
        assert_eq!(
            clip(f32::NEG_INFINITY, 0.0, f32::INFINITY, 600.0),
            Some(ScissorRect::new(0, 0, 800, 600))
        );
    }

    #[test]
    fn nan_is_skipped() {
        assert_eq!(clip(f32::NAN, 0.0, 10.0, 10.0), None);
    }

    // ── origin and scale ──────────────────────────────────────────────────

    #[test]
    fn honours_display_origin() {
        let s = project_clip_rect(
            Rect::new(1100.0, 250.0, 1200.0, 300.0),
            Vec2::new(1000.0, 200.0),
            Vec2::splat(1.0),
            FB,
        );
        assert_eq!(s, Some(ScissorRect::new(100, 50, 100, 50)));
    }

    #[test]
    fn honours_framebuffer_scale() {
        let s = project_clip_rect(
            Rect::new(10.0, 10.0, 110.0, 60.0),
            Vec2::zero(),
            Vec2::splat(2.0),
            FB,
        );
        assert_eq!(s, Some(ScissorRect::new(20, 20, 200, 100)));
    }

    #[test]
    fn origin_then_scale_then_clamp() {
        let s = project_clip_rect(
            Rect::new(100.0, 100.0, 600.0, 450.0),
            Vec2::new(100.0, 100.0),
            Vec2::splat(2.0),
            FB,
        );
        assert_eq!(s, Some(ScissorRect::new(0, 0, 800, 600)));
    }
}
