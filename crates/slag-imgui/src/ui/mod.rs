//! Draw-data model of the immediate-mode UI library.
//!
//! These are the shapes the UI library hands to a renderer backend each frame:
//! per-viewport draw data made of draw lists, the platform viewport objects the
//! lifecycle hooks receive, and the IO block holding the font atlas and backend
//! registration.

mod draw;
mod io;
mod viewport;

pub use draw::{DrawCallback, DrawCmd, DrawData, DrawIdx, DrawList, DrawVert, TextureId};
pub use io::{BackendFlags, FontAtlas, Io};
pub use viewport::{PlatformViewport, ViewportId};
