//! Logging utilities.
//!
//! The library itself only talks to the `log` facade. `init_logging` is offered to
//! hosts and demos that want a ready `env_logger` setup.

mod init;

pub use init::{init_logging, LoggingConfig};
