//! Activity segments and clip naming.

use serde::{Deserialize, Serialize};

/// Extension used when a source video has none.
pub const DEFAULT_CLIP_EXTENSION: &str = ".mp4";

/// A closed time interval of activity, in seconds.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct VideoSegment {
    pub start: f64,
    pub end: f64,
}

impl VideoSegment {
    /// Create a segment. An `end` before `start` collapses to `start`.
    pub fn new(start: f64, end: f64) -> Self {
        Self {
            start,
            end: end.max(start),
        }
    }

    pub fn duration(&self) -> f64 {
        (self.end - self.start).max(0.0)
    }

    /// Start time rounded to whole milliseconds.
    pub fn start_ms(&self) -> i64 {
        (self.start * 1000.0).round() as i64
    }

    /// End time rounded to whole milliseconds.
    pub fn end_ms(&self) -> i64 {
        (self.end * 1000.0).round() as i64
    }
}

/// Clip file name for the `index`-th (1-based) segment of a video.
///
/// `{base}_seg{index:03}_{start_ms}ms_{end_ms}ms{ext}`; `ext` includes the
/// leading dot and defaults to `.mp4` when empty.
pub fn segment_file_name(base: &str, index: usize, segment: &VideoSegment, ext: &str) -> String {
    let ext = if ext.is_empty() {
        DEFAULT_CLIP_EXTENSION
    } else {
        ext
    };
    format!(
        "{base}_seg{index:03}_{}ms_{}ms{ext}",
        segment.start_ms(),
        segment.end_ms()
    )
}
