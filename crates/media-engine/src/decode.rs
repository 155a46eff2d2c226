//! Frame decoding through an ffmpeg rawvideo pipe.

use std::io::{BufReader, ErrorKind, Read};
use std::path::Path;
use std::process::{Child, ChildStdout, Command, Stdio};

use wildscan_clip_model::{Frame, VideoProbe};
use wildscan_common::{WildscanError, WildscanResult};
use wildscan_processing_core::FrameSource;

use crate::ffmpeg::FFMPEG;
use crate::probe::probe_video;

/// Decodes a video file to BGR24 frames, one at a time.
///
/// The ffmpeg child is killed and reaped when the source is dropped.
pub struct FfmpegFrameSource {
    probe: VideoProbe,
    child: Child,
    stdout: BufReader<ChildStdout>,
    frame_bytes: usize,
    exhausted: bool,
}

impl FfmpegFrameSource {
    pub fn open(path: &Path) -> WildscanResult<Self> {
        let probe = probe_video(path)
            .map_err(|e| WildscanError::open(format!("{}: {e}", path.display())))?;
        if probe.width == 0 || probe.height == 0 {
            return Err(WildscanError::open(format!(
                "{}: video stream has no dimensions",
                path.display()
            )));
        }

        let mut child = Command::new(FFMPEG)
            .args(["-v", "error", "-noautorotate", "-i"])
            .arg(path)
            .args([
                "-map", "0:v:0", "-f", "rawvideo", "-pix_fmt", "bgr24", "-an", "-sn", "pipe:1",
            ])
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::null())
            .spawn()
            .map_err(|e| WildscanError::open(format!("Failed to start {FFMPEG}: {e}")))?;

        let Some(stdout) = child.stdout.take() else {
            let _ = child.kill();
            let _ = child.wait();
            return Err(WildscanError::open("Failed to capture decoder output"));
        };

        tracing::debug!(
            path = %path.display(),
            width = probe.width,
            height = probe.height,
            fps = probe.fps,
            "Opened frame source"
        );

        Ok(Self {
            frame_bytes: Frame::byte_len(probe.width, probe.height),
            probe,
            child,
            stdout: BufReader::new(stdout),
            exhausted: false,
        })
    }

    pub fn probe(&self) -> &VideoProbe {
        &self.probe
    }
}

impl FrameSource for FfmpegFrameSource {
    fn width(&self) -> u32 {
        self.probe.width
    }

    fn height(&self) -> u32 {
        self.probe.height
    }

    fn fps(&self) -> f64 {
        self.probe.fps
    }

    fn frame_count(&self) -> u64 {
        self.probe.frame_count
    }

    fn read(&mut self) -> WildscanResult<Option<Frame>> {
        if self.exhausted {
            return Ok(None);
        }
        let mut data = vec![0u8; self.frame_bytes];
        match self.stdout.read_exact(&mut data) {
            Ok(()) => Ok(Frame::from_bgr(self.probe.width, self.probe.height, data)),
            Err(e) if e.kind() == ErrorKind::UnexpectedEof => {
                // a trailing partial frame is dropped
                self.exhausted = true;
                let _ = self.child.wait();
                Ok(None)
            }
            Err(e) => Err(e.into()),
        }
    }
}

impl Drop for FfmpegFrameSource {
    fn drop(&mut self) {
        let _ = self.child.kill();
        let _ = self.child.wait();
    }
}
