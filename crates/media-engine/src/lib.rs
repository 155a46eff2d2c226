//! Wildscan Media Engine
//!
//! Everything that touches video files:
//! - **ffmpeg:** command builder and the [`CodecRunner`] seam
//! - **Probe:** stream metadata via `ffprobe` JSON
//! - **Decode/Encode:** BGR24 rawvideo pipes in and out of `ffmpeg`
//! - **Extract:** cut activity segments (stream copy, re-encode fallback)
//! - **Reframe:** static zoom crop and per-frame tracking crop
//! - **Post-process:** temp file, replace/keep policy per clip
//! - **Pipeline:** scan a video for activity and produce clips

pub mod backend;
pub mod decode;
pub mod encode;
pub mod extract;
pub mod ffmpeg;
pub mod pipeline;
pub mod postprocess;
pub mod probe;
pub mod reframe;

pub use backend::{FfmpegBackend, MediaBackend};
pub use extract::extract_segments;
pub use ffmpeg::{command_exists, CodecRunner, EncodeSettings, FfmpegCli, FfmpegCommand};
pub use pipeline::{analyze_and_extract, scan_activity, ActivityScan};
pub use postprocess::{postprocess_clip, postprocess_clips, PostProcessOutcome, ReframeMode};
pub use probe::probe_video;
