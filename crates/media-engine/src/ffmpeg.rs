//! ffmpeg command construction and execution.

use std::path::{Path, PathBuf};
use std::process::{Command, Stdio};

use wildscan_common::{WildscanError, WildscanResult};

pub const FFMPEG: &str = "ffmpeg";
pub const FFPROBE: &str = "ffprobe";

/// Lines of ffmpeg stderr kept in error messages.
const STDERR_TAIL_LINES: usize = 8;

/// Re-encode quality parameters.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EncodeSettings {
    pub video_codec: String,
    pub audio_codec: String,
    pub preset: String,
    pub crf: u8,
}

impl Default for EncodeSettings {
    fn default() -> Self {
        Self {
            video_codec: "libx264".to_string(),
            audio_codec: "aac".to_string(),
            preset: "veryfast".to_string(),
            crf: 22,
        }
    }
}

/// Builder for one ffmpeg invocation with a single input and output.
///
/// Arguments are laid out as
/// `<input args> -i <input> <output args> -y <output>`.
#[derive(Debug, Clone)]
pub struct FfmpegCommand {
    input: PathBuf,
    output: PathBuf,
    input_args: Vec<String>,
    output_args: Vec<String>,
}

impl FfmpegCommand {
    pub fn new(input: impl AsRef<Path>, output: impl AsRef<Path>) -> Self {
        Self {
            input: input.as_ref().to_path_buf(),
            output: output.as_ref().to_path_buf(),
            input_args: Vec::new(),
            output_args: Vec::new(),
        }
    }

    /// Add an argument placed before `-i`.
    pub fn input_arg(mut self, arg: impl Into<String>) -> Self {
        self.input_args.push(arg.into());
        self
    }

    /// Add an argument placed after `-i <input>`.
    pub fn output_arg(mut self, arg: impl Into<String>) -> Self {
        self.output_args.push(arg.into());
        self
    }

    /// Input seek (`-ss` before `-i`).
    pub fn seek(self, seconds: f64) -> Self {
        self.input_arg("-ss").input_arg(format_seconds(seconds))
    }

    /// Output duration (`-t`).
    pub fn duration(self, seconds: f64) -> Self {
        self.output_arg("-t").output_arg(format_seconds(seconds))
    }

    /// Copy all streams without re-encoding.
    pub fn stream_copy(self) -> Self {
        self.output_arg("-c").output_arg("copy")
    }

    pub fn video_filter(self, filter: impl Into<String>) -> Self {
        self.output_arg("-vf").output_arg(filter)
    }

    pub fn encode(self, settings: &EncodeSettings) -> Self {
        self.output_arg("-vcodec")
            .output_arg(settings.video_codec.clone())
            .output_arg("-acodec")
            .output_arg(settings.audio_codec.clone())
            .output_arg("-preset")
            .output_arg(settings.preset.clone())
            .output_arg("-crf")
            .output_arg(settings.crf.to_string())
    }

    /// Move the index to the front of the file.
    pub fn faststart(self) -> Self {
        self.output_arg("-movflags").output_arg("faststart")
    }

    pub fn output(&self) -> &Path {
        &self.output
    }

    pub fn build_args(&self) -> Vec<String> {
        let mut args = Vec::with_capacity(self.input_args.len() + self.output_args.len() + 4);
        args.extend(self.input_args.iter().cloned());
        args.push("-i".to_string());
        args.push(self.input.to_string_lossy().into_owned());
        args.extend(self.output_args.iter().cloned());
        args.push("-y".to_string());
        args.push(self.output.to_string_lossy().into_owned());
        args
    }
}

/// Seconds with millisecond precision, as passed to `-ss`/`-t`.
pub fn format_seconds(seconds: f64) -> String {
    format!("{:.3}", seconds.max(0.0))
}

/// Runs the codec tool. Blocking, no timeout.
pub trait CodecRunner: Send + Sync {
    /// Run ffmpeg with `args`; non-zero exit is an error.
    fn run(&self, args: &[String]) -> WildscanResult<()>;
}

/// Runs the `ffmpeg` binary.
#[derive(Debug, Clone)]
pub struct FfmpegCli {
    program: String,
}

impl Default for FfmpegCli {
    fn default() -> Self {
        Self::new(FFMPEG)
    }
}

impl FfmpegCli {
    pub fn new(program: impl Into<String>) -> Self {
        Self {
            program: program.into(),
        }
    }

    pub fn program(&self) -> &str {
        &self.program
    }
}

impl CodecRunner for FfmpegCli {
    fn run(&self, args: &[String]) -> WildscanResult<()> {
        tracing::debug!(program = %self.program, args = ?args, "Running ffmpeg");

        let output = Command::new(&self.program)
            .args(args)
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::piped())
            .output()
            .map_err(|e| WildscanError::codec(format!("Failed to start {}: {e}", self.program)))?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(WildscanError::codec(format!(
                "{} exited with {}: {}",
                self.program,
                output.status,
                stderr_tail(&stderr)
            )));
        }
        Ok(())
    }
}

/// Last few non-empty lines of a tool's stderr.
pub fn stderr_tail(stderr: &str) -> String {
    let lines: Vec<&str> = stderr.lines().filter(|l| !l.trim().is_empty()).collect();
    let start = lines.len().saturating_sub(STDERR_TAIL_LINES);
    lines[start..].join(" | ")
}

/// Whether a binary is on `PATH`.
pub fn command_exists(binary: &str) -> bool {
    which::which(binary).is_ok()
}
