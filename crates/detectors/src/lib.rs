//! Wildscan Detectors
//!
//! Implementations of [`wildscan_processing_core::Detector`]. Inference runs
//! in a sidecar process that speaks a line-delimited JSON protocol over
//! stdin/stdout; this crate owns the process and the class/score filtering.

pub mod factory;
pub mod filter;
pub mod kind;
pub mod sidecar;

pub use factory::{create_detector, DetectorSettings};
pub use filter::ClassFilter;
pub use kind::DetectorKind;
pub use sidecar::SidecarDetector;
