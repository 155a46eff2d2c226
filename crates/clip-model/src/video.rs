//! Video file metadata.

use serde::{Deserialize, Serialize};
use std::path::Path;

/// Extensions (lower-case, without dot) treated as video input.
pub const VIDEO_EXTENSIONS: &[&str] = &["mp4", "mov", "avi", "mkv", "m4v"];

/// Frame rate assumed when a container does not declare a usable one.
pub const FALLBACK_FPS: f64 = 25.0;

/// Whether `path` names a video file, by extension (case-insensitive).
pub fn is_video_file(path: &Path) -> bool {
    path.extension()
        .and_then(|e| e.to_str())
        .map(|ext| {
            VIDEO_EXTENSIONS
                .iter()
                .any(|known| known.eq_ignore_ascii_case(ext))
        })
        .unwrap_or(false)
}

/// Stream properties reported by the probe tool.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VideoProbe {
    pub width: u32,
    pub height: u32,
    /// Declared frame rate; `0.0` when unknown.
    pub fps: f64,
    /// Declared frame count; `0` when unknown.
    pub frame_count: u64,
    pub duration_secs: f64,
}

impl VideoProbe {
    /// Declared fps, or [`FALLBACK_FPS`] when missing or invalid.
    pub fn effective_fps(&self) -> f64 {
        if self.fps.is_finite() && self.fps > 0.0 {
            self.fps
        } else {
            FALLBACK_FPS
        }
    }
}
