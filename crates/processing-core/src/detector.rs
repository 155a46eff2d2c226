//! Object detector capability.

use wildscan_clip_model::{Detection, Frame};
use wildscan_common::WildscanResult;

/// Something that finds animals in a frame.
///
/// Implementations own their inference resources and release them on drop.
/// A detector is used by one worker at a time; it may move between threads
/// but is never shared.
pub trait Detector: Send {
    /// Detector name used in logs (e.g. `YOLO`).
    fn name(&self) -> &str;

    /// Prepare the model before the first real frame.
    fn warmup(&mut self) -> WildscanResult<()> {
        Ok(())
    }

    /// Detect objects in one frame. Coordinates are source-frame pixels.
    fn detect(&mut self, frame: &Frame) -> WildscanResult<Vec<Detection>>;

    /// Detect objects in several frames, one result list per frame.
    fn detect_many(&mut self, frames: &[Frame]) -> WildscanResult<Vec<Vec<Detection>>> {
        frames.iter().map(|frame| self.detect(frame)).collect()
    }
}

impl<D: Detector + ?Sized> Detector for Box<D> {
    fn name(&self) -> &str {
        (**self).name()
    }

    fn warmup(&mut self) -> WildscanResult<()> {
        (**self).warmup()
    }

    fn detect(&mut self, frame: &Frame) -> WildscanResult<Vec<Detection>> {
        (**self).detect(frame)
    }

    fn detect_many(&mut self, frames: &[Frame]) -> WildscanResult<Vec<Vec<Detection>>> {
        (**self).detect_many(frames)
    }
}
