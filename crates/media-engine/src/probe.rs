//! Stream metadata via ffprobe.

use std::path::Path;
use std::process::{Command, Stdio};

use serde::Deserialize;
use wildscan_clip_model::VideoProbe;
use wildscan_common::{WildscanError, WildscanResult};

use crate::ffmpeg::{stderr_tail, FFPROBE};

#[derive(Debug, Deserialize)]
struct FfprobeOutput {
    #[serde(default)]
    format: Option<FfprobeFormat>,
    #[serde(default)]
    streams: Vec<FfprobeStream>,
}

#[derive(Debug, Deserialize)]
struct FfprobeFormat {
    duration: Option<String>,
}

#[derive(Debug, Deserialize)]
struct FfprobeStream {
    codec_type: Option<String>,
    width: Option<u32>,
    height: Option<u32>,
    avg_frame_rate: Option<String>,
    r_frame_rate: Option<String>,
    nb_frames: Option<String>,
    duration: Option<String>,
}

/// Probe a video file.
pub fn probe_video(path: &Path) -> WildscanResult<VideoProbe> {
    if !path.exists() {
        return Err(WildscanError::file_not_found(path));
    }

    let output = Command::new(FFPROBE)
        .args(["-v", "error", "-print_format", "json", "-show_streams", "-show_format"])
        .arg(path)
        .stdin(Stdio::null())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .output()
        .map_err(|e| WildscanError::probe(format!("Failed to start {FFPROBE}: {e}")))?;

    if !output.status.success() {
        return Err(WildscanError::probe(format!(
            "{FFPROBE} failed for {}: {}",
            path.display(),
            stderr_tail(&String::from_utf8_lossy(&output.stderr))
        )));
    }

    parse_probe_output(&output.stdout)
}

/// Interpret ffprobe's JSON output.
///
/// Duration is `frame_count / fps` when both are declared, else the video
/// stream's duration, else the container's, else 0.
pub fn parse_probe_output(json: &[u8]) -> WildscanResult<VideoProbe> {
    let probe: FfprobeOutput = serde_json::from_slice(json)?;

    let stream = probe
        .streams
        .iter()
        .find(|s| s.codec_type.as_deref() == Some("video"))
        .ok_or_else(|| WildscanError::probe("No video stream found"))?;

    let fps = stream
        .avg_frame_rate
        .as_deref()
        .and_then(parse_frame_rate)
        .or_else(|| stream.r_frame_rate.as_deref().and_then(parse_frame_rate))
        .unwrap_or(0.0);
    let frame_count = stream
        .nb_frames
        .as_deref()
        .and_then(|n| n.trim().parse::<u64>().ok())
        .unwrap_or(0);

    let duration_secs = if frame_count > 0 && fps > 0.0 {
        frame_count as f64 / fps
    } else {
        stream
            .duration
            .as_deref()
            .and_then(parse_seconds)
            .or_else(|| {
                probe
                    .format
                    .as_ref()
                    .and_then(|f| f.duration.as_deref())
                    .and_then(parse_seconds)
            })
            .unwrap_or(0.0)
    };

    Ok(VideoProbe {
        width: stream.width.unwrap_or(0),
        height: stream.height.unwrap_or(0),
        fps,
        frame_count,
        duration_secs,
    })
}

/// Parse `"30000/1001"` or `"25"`. Zero or invalid rates yield `None`.
pub fn parse_frame_rate(rate: &str) -> Option<f64> {
    let value = match rate.split_once('/') {
        Some((num, den)) => {
            let num: f64 = num.trim().parse().ok()?;
            let den: f64 = den.trim().parse().ok()?;
            if den == 0.0 {
                return None;
            }
            num / den
        }
        None => rate.trim().parse().ok()?,
    };
    (value.is_finite() && value > 0.0).then_some(value)
}

fn parse_seconds(raw: &str) -> Option<f64> {
    raw.trim()
        .parse::<f64>()
        .ok()
        .filter(|d| d.is_finite() && *d >= 0.0)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_frame_rate() {
        assert_eq!(parse_frame_rate("25/1"), Some(25.0));
        assert!((parse_frame_rate("30000/1001").unwrap() - 29.97).abs() < 0.01);
        assert_eq!(parse_frame_rate("24"), Some(24.0));
        assert_eq!(parse_frame_rate("0/0"), None);
        assert_eq!(parse_frame_rate("abc"), None);
    }

    #[test]
    fn test_duration_from_frame_count() {
        let json = br#"{
            "streams": [
                {"codec_type": "audio", "duration": "99.0"},
                {"codec_type": "video", "width": 1920, "height": 1080,
                 "avg_frame_rate": "25/1", "r_frame_rate": "25/1",
                 "nb_frames": "250", "duration": "10.04"}
            ],
            "format": {"duration": "10.1"}
        }"#;
        let probe = parse_probe_output(json).unwrap();
        assert_eq!((probe.width, probe.height), (1920, 1080));
        assert_eq!(probe.frame_count, 250);
        assert!((probe.duration_secs - 10.0).abs() < 1e-9);
    }

    #[test]
    fn test_duration_falls_back_to_stream_then_format() {
        let json = br#"{
            "streams": [{"codec_type": "video", "width": 640, "height": 480,
                         "avg_frame_rate": "0/0", "r_frame_rate": "30/1",
                         "duration": "4.5"}],
            "format": {"duration": "5.0"}
        }"#;
        let probe = parse_probe_output(json).unwrap();
        assert_eq!(probe.fps, 30.0);
        assert!((probe.duration_secs - 4.5).abs() < 1e-9);

        let json = br#"{
            "streams": [{"codec_type": "video", "width": 640, "height": 480}],
            "format": {"duration": "5.0"}
        }"#;
        let probe = parse_probe_output(json).unwrap();
        assert_eq!(probe.fps, 0.0);
        assert!((probe.duration_secs - 5.0).abs() < 1e-9);
    }

    #[test]
    fn test_no_video_stream_is_probe_error() {
        let json = br#"{"streams": [{"codec_type": "audio"}], "format": {}}"#;
        let err = parse_probe_output(json).unwrap_err();
        assert!(matches!(err, WildscanError::Probe { .. }));
    }

    #[test]
    fn test_missing_file() {
        let err = probe_video(Path::new("/definitely/not/here.mp4")).unwrap_err();
        assert!(matches!(err, WildscanError::FileNotFound { .. }));
    }
}
