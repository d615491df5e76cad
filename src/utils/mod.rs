//! Shared utilities
//!
//! Timing and logging helpers.

mod logger;
mod timer;

pub use logger::{init_logger, LogLevel};
pub use timer::{monotonic_ms, Timer};
