//! Wildscan Clip Model
//!
//! Defines the data contracts shared by the scanning pipeline:
//! - **Detections:** boxes reported by the object detector, in pixels
//! - **Segments:** activity intervals and their clip file names
//! - **Rectangles:** integer crop windows inside a frame
//! - **Frames:** decoded BGR24 pixel buffers
//! - **Video:** probe results and recognised file extensions

pub mod detection;
pub mod frame;
pub mod rect;
pub mod segment;
pub mod video;

pub use detection::*;
pub use frame::*;
pub use rect::*;
pub use segment::*;
pub use video::*;
