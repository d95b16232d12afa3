//! Coordinate and geometry types shared by the UI draw-data model and the renderer.
//!
//! Canonical CPU space:
//! - UI units (logical pixels), origin top-left
//! - +X right, +Y down
//!
//! The vertex shader maps UI units to NDC using the scale/translate push constants.

mod rect;
mod vec2;

pub use rect::Rect;
pub use vec2::Vec2;
