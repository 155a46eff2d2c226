//! Wildscan Intake
//!
//! Finds new camera videos and hands them to workers once they are
//! completely written:
//!
//! - **Watcher:** polls the input directory for newly appearing videos
//! - **Stability:** waits until a file's size and mtime stop changing
//! - **Pending set:** ensures one path is processed by one worker at a time

pub mod pending;
pub mod stability;
pub mod watcher;

pub use pending::{PendingClaim, PendingSet};
pub use stability::{wait_until_stable, DEFAULT_STABILITY_TIMEOUT};
pub use watcher::{DirectoryWatcher, MIN_POLL_INTERVAL};
