use super::Vec2;

/// Axis-aligned rectangle stored as min/max corners (top-left origin).
///
/// This is the layout UI clip rectangles arrive in: `(x1, y1, x2, y2)`.
#[derive(Debug, Copy, Clone, Default, PartialEq)]
pub struct Rect {
    pub min: Vec2,
    pub max: Vec2,
}

impl Rect {
    #[inline]
    pub const fn new(x1: f32, y1: f32, x2: f32, y2: f32) -> Self {
        Self {
            min: Vec2::new(x1, y1),
            max: Vec2::new(x2, y2),
        }
    }

    #[inline]
    pub const fn from_min_max(min: Vec2, max: Vec2) -> Self {
        Self { min, max }
    }

    /// Rectangle covering `[0, width] x [0, height]`.
    #[inline]
    pub const fn from_size(width: f32, height: f32) -> Self {
        Self::new(0.0, 0.0, width, height)
    }

    #[inline]
    pub fn width(self) -> f32 {
        self.max.x - self.min.x
    }

    #[inline]
    pub fn height(self) -> f32 {
        self.max.y - self.min.y
    }

    /// True when `max <= min` on either axis.
    #[inline]
    pub fn is_empty(self) -> bool {
        self.max.x <= self.min.x || self.max.y <= self.min.y
    }

    #[inline]
    pub fn is_finite(self) -> bool {
        self.min.is_finite() && self.max.is_finite()
    }

    /// Moves the rectangle by `-offset`, then scales both corners by `scale`.
    #[inline]
    pub fn project(self, offset: Vec2, scale: Vec2) -> Rect {
        Rect::from_min_max(
            (self.min - offset).scale(scale),
            (self.max - offset).scale(scale),
        )
    }

    /// Clamps the corners into `[0, width] x [0, height]`.
    ///
    /// Only the lower bound of `min` and the upper bound of `max` are touched, so
    /// a rectangle lying fully outside the bounds comes back empty.
    #[inline]
    pub fn clamp_to(self, width: f32, height: f32) -> Rect {
        Rect::new(
            self.min.x.max(0.0),
            self.min.y.max(0.0),
            self.max.x.min(width),
            self.max.y.min(height),
        )
    }
}

impl From<[f32; 4]> for Rect {
    #[inline]
    fn from(v: [f32; 4]) -> Self {
        Rect::new(v[0], v[1], v[2], v[3])
    }
}
