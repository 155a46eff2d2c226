//! Wildscan Processing Core
//!
//! Turns per-frame detections into editing decisions:
//! - **Segmenter:** merge activity timestamps into padded clip intervals
//! - **Aggregator:** union of detection boxes across a clip
//! - **Fitter:** expand/clamp/aspect-lock a crop rectangle inside the frame
//! - **Camera:** deadzone + clamp + easing filter for a tracking crop
//!
//! Geometry and segmentation are pure computation. Frames and detections
//! arrive through the [`FrameSource`] and [`Detector`] traits so callers
//! decide how video is decoded and how inference runs.

pub mod camera;
pub mod detector;
pub mod fit;
pub mod segmenter;
pub mod source;
pub mod union_box;

pub use camera::{CameraSmoother, CameraStep, TrackingConfig};
pub use detector::Detector;
pub use fit::{fit_rectangle, FitParams};
pub use segmenter::{compute_segments, SegmentPolicy};
pub use source::{FrameSink, FrameSource, MemoryFrameSource};
pub use union_box::{aggregate_union, UnionBox};
