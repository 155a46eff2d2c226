//! Media backends: the seam between the pipeline and the codec tool.

use std::path::Path;

use wildscan_clip_model::VideoProbe;
use wildscan_common::WildscanResult;
use wildscan_processing_core::{FrameSink, FrameSource};

use crate::decode::FfmpegFrameSource;
use crate::encode::FfmpegFrameWriter;
use crate::ffmpeg::{command_exists, CodecRunner, EncodeSettings, FfmpegCli, FFMPEG, FFPROBE};
use crate::probe::probe_video;

/// Trait for media backends (ffmpeg, in-memory test doubles, ...).
pub trait MediaBackend: Send + Sync {
    /// Backend name.
    fn name(&self) -> &str;

    /// Check if this backend's tools are available on the system.
    fn is_available(&self) -> bool;

    fn probe(&self, path: &Path) -> WildscanResult<VideoProbe>;

    /// Open a video for sequential frame reads.
    fn open_source(&self, path: &Path) -> WildscanResult<Box<dyn FrameSource>>;

    /// Create an encoder writing `width`×`height` frames at `fps`.
    fn create_sink(
        &self,
        path: &Path,
        width: u32,
        height: u32,
        fps: f64,
    ) -> WildscanResult<Box<dyn FrameSink>>;

    /// Runner for one-shot codec invocations (cuts, static zoom).
    fn codec(&self) -> &dyn CodecRunner;

    /// Re-encode quality used by cuts and re-framing.
    fn encode_settings(&self) -> &EncodeSettings;
}

/// Backend driving the `ffmpeg`/`ffprobe` binaries.
#[derive(Debug, Clone, Default)]
pub struct FfmpegBackend {
    cli: FfmpegCli,
    encode: EncodeSettings,
}

impl FfmpegBackend {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_encode_settings(mut self, encode: EncodeSettings) -> Self {
        self.encode = encode;
        self
    }
}

impl MediaBackend for FfmpegBackend {
    fn name(&self) -> &str {
        "ffmpeg"
    }

    fn is_available(&self) -> bool {
        command_exists(FFMPEG) && command_exists(FFPROBE)
    }

    fn probe(&self, path: &Path) -> WildscanResult<VideoProbe> {
        probe_video(path)
    }

    fn open_source(&self, path: &Path) -> WildscanResult<Box<dyn FrameSource>> {
        Ok(Box::new(FfmpegFrameSource::open(path)?))
    }

    fn create_sink(
        &self,
        path: &Path,
        width: u32,
        height: u32,
        fps: f64,
    ) -> WildscanResult<Box<dyn FrameSink>> {
        Ok(Box::new(FfmpegFrameWriter::create(
            path,
            width,
            height,
            fps,
            &self.encode,
        )?))
    }

    fn codec(&self) -> &dyn CodecRunner {
        &self.cli
    }

    fn encode_settings(&self) -> &EncodeSettings {
        &self.encode
    }
}
