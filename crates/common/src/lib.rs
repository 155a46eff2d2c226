//! Wildscan Common Utilities
//!
//! Shared infrastructure for all Wildscan crates:
//! - Error types and result aliases
//! - Scanner configuration loading (`.env` + CLI overrides)
//! - Tracing/logging initialization and per-video log context

pub mod config;
pub mod error;
pub mod logging;

pub use config::*;
pub use error::*;
pub use logging::ScanLog;
