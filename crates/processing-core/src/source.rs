//! Frame input and output streams.

use std::collections::VecDeque;

use wildscan_clip_model::Frame;
use wildscan_common::{WildscanError, WildscanResult};

/// Sequential, lazily decoded frames of one video.
pub trait FrameSource {
    fn width(&self) -> u32;
    fn height(&self) -> u32;

    /// Declared frame rate; `0.0` when unknown.
    fn fps(&self) -> f64;

    /// Declared frame count; `0` when unknown.
    fn frame_count(&self) -> u64;

    /// Next frame, or `None` once the source is exhausted.
    fn read(&mut self) -> WildscanResult<Option<Frame>>;
}

/// Consumer of encoded output frames.
pub trait FrameSink {
    fn write(&mut self, frame: &Frame) -> WildscanResult<()>;

    /// Flush and close the output. Must be called once after the last frame.
    fn finish(&mut self) -> WildscanResult<()>;
}

/// Frames already held in memory.
#[derive(Debug, Clone)]
pub struct MemoryFrameSource {
    width: u32,
    height: u32,
    fps: f64,
    declared: u64,
    frames: VecDeque<Frame>,
}

impl MemoryFrameSource {
    /// All frames must share the given dimensions.
    pub fn new(width: u32, height: u32, fps: f64, frames: Vec<Frame>) -> WildscanResult<Self> {
        if let Some(bad) = frames
            .iter()
            .find(|f| f.width != width || f.height != height)
        {
            return Err(WildscanError::unsupported(format!(
                "frame is {}x{}, source is {}x{}",
                bad.width, bad.height, width, height
            )));
        }
        Ok(Self {
            width,
            height,
            fps,
            declared: frames.len() as u64,
            frames: frames.into(),
        })
    }

    /// `count` black frames.
    pub fn blank(width: u32, height: u32, fps: f64, count: usize) -> Self {
        Self {
            width,
            height,
            fps,
            declared: count as u64,
            frames: (0..count).map(|_| Frame::black(width, height)).collect(),
        }
    }

    pub fn remaining(&self) -> usize {
        self.frames.len()
    }
}

impl FrameSource for MemoryFrameSource {
    fn width(&self) -> u32 {
        self.width
    }

    fn height(&self) -> u32 {
        self.height
    }

    fn fps(&self) -> f64 {
        self.fps
    }

    fn frame_count(&self) -> u64 {
        self.declared
    }

    fn read(&mut self) -> WildscanResult<Option<Frame>> {
        Ok(self.frames.pop_front())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_memory_source_drains_in_order() {
        let mut first = Frame::black(2, 2);
        first.data[0] = 7;
        let mut source =
            MemoryFrameSource::new(2, 2, 10.0, vec![first, Frame::black(2, 2)]).unwrap();
        assert_eq!(source.frame_count(), 2);
        assert_eq!(source.read().unwrap().unwrap().data[0], 7);
        assert!(source.read().unwrap().is_some());
        assert!(source.read().unwrap().is_none());
        assert_eq!(source.frame_count(), 2);
    }

    #[test]
    fn test_memory_source_rejects_mismatched_frames() {
        let result = MemoryFrameSource::new(2, 2, 10.0, vec![Frame::black(3, 2)]);
        assert!(result.is_err());
    }
}
