//! Immediate-mode UI renderer backend for the slag graphics API.
//!
//! This crate turns per-frame UI draw data into command-buffer submissions and
//! manages the swapchains of secondary UI windows.

pub mod gpu;
pub mod ui;
pub mod platform;
pub mod render;
pub mod viewport;
pub mod backend;
pub mod headless;

pub mod logging;
pub mod coords;
pub mod config;
pub mod error;

pub use backend::{Backend, BackendInit};
pub use config::BackendConfig;
pub use error::{BackendError, Result};
pub use viewport::RendererHooks;
