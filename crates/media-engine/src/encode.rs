//! Frame encoding through an ffmpeg rawvideo pipe.

use std::io::{BufWriter, Read, Write};
use std::path::Path;
use std::process::{Child, ChildStdin, Command, Stdio};
use std::thread::JoinHandle;

use wildscan_clip_model::Frame;
use wildscan_common::{WildscanError, WildscanResult};
use wildscan_processing_core::FrameSink;

use crate::ffmpeg::{stderr_tail, EncodeSettings, FFMPEG};

/// Encodes BGR24 frames of a fixed size into a video file.
///
/// Call [`FrameSink::finish`] to close the file; a writer dropped without
/// finishing kills the encoder and leaves a partial file behind.
pub struct FfmpegFrameWriter {
    width: u32,
    height: u32,
    child: Child,
    stdin: Option<BufWriter<ChildStdin>>,
    stderr_task: Option<JoinHandle<String>>,
}

impl FfmpegFrameWriter {
    pub fn create(
        path: &Path,
        width: u32,
        height: u32,
        fps: f64,
        settings: &EncodeSettings,
    ) -> WildscanResult<Self> {
        let size = format!("{width}x{height}");
        let rate = format!("{fps:.3}");

        let mut child = Command::new(FFMPEG)
            .args(["-v", "error", "-f", "rawvideo", "-pix_fmt", "bgr24"])
            .args(["-s", size.as_str(), "-r", rate.as_str(), "-i", "pipe:0"])
            .args(["-an", "-vf", "pad=ceil(iw/2)*2:ceil(ih/2)*2"])
            .args(["-vcodec", settings.video_codec.as_str()])
            .args(["-preset", settings.preset.as_str()])
            .args(["-crf", settings.crf.to_string().as_str()])
            .args(["-pix_fmt", "yuv420p", "-movflags", "faststart", "-y"])
            .arg(path)
            .stdin(Stdio::piped())
            .stdout(Stdio::null())
            .stderr(Stdio::piped())
            .spawn()
            .map_err(|e| WildscanError::codec(format!("Failed to start {FFMPEG}: {e}")))?;

        let (Some(stdin), Some(mut stderr)) = (child.stdin.take(), child.stderr.take()) else {
            let _ = child.kill();
            let _ = child.wait();
            return Err(WildscanError::codec("Failed to capture encoder pipes"));
        };

        // Drain stderr so a chatty encoder never blocks on a full pipe.
        let stderr_task = std::thread::spawn(move || {
            let mut output = String::new();
            match stderr.read_to_string(&mut output) {
                Ok(_) => output,
                Err(err) => format!("<failed to read ffmpeg stderr: {err}>"),
            }
        });

        tracing::debug!(
            path = %path.display(),
            width,
            height,
            fps,
            pid = child.id(),
            "Started frame encoder"
        );

        Ok(Self {
            width,
            height,
            child,
            stdin: Some(BufWriter::new(stdin)),
            stderr_task: Some(stderr_task),
        })
    }
}

impl FrameSink for FfmpegFrameWriter {
    fn write(&mut self, frame: &Frame) -> WildscanResult<()> {
        if frame.width != self.width || frame.height != self.height {
            return Err(WildscanError::codec(format!(
                "frame is {}x{}, encoder expects {}x{}",
                frame.width, frame.height, self.width, self.height
            )));
        }
        let stdin = self
            .stdin
            .as_mut()
            .ok_or_else(|| WildscanError::codec("Encoder already finished"))?;
        stdin
            .write_all(&frame.data)
            .map_err(|e| WildscanError::codec(format!("Failed to write frame: {e}")))
    }

    fn finish(&mut self) -> WildscanResult<()> {
        if let Some(mut stdin) = self.stdin.take() {
            stdin
                .flush()
                .map_err(|e| WildscanError::codec(format!("Failed to flush encoder: {e}")))?;
        }

        let status = self.child.wait()?;
        let stderr = self
            .stderr_task
            .take()
            .and_then(|task| task.join().ok())
            .unwrap_or_default();

        if !status.success() {
            return Err(WildscanError::codec(format!(
                "{FFMPEG} encoder exited with {status}: {}",
                stderr_tail(&stderr)
            )));
        }
        Ok(())
    }
}

impl Drop for FfmpegFrameWriter {
    fn drop(&mut self) {
        self.stdin.take();
        let _ = self.child.kill();
        let _ = self.child.wait();
    }
}
