//! Cut activity segments out of a video.

use std::path::{Path, PathBuf};

use wildscan_clip_model::{segment_file_name, VideoSegment, DEFAULT_CLIP_EXTENSION};
use wildscan_common::{ScanLog, WildscanError, WildscanResult};

use crate::ffmpeg::{CodecRunner, EncodeSettings, FfmpegCommand};

/// Start and length of the cut in seconds, taken from the millisecond
/// endpoints used in the clip name so the cut ends where the name says.
pub fn cut_window(segment: &VideoSegment) -> (f64, f64) {
    let start_ms = segment.start_ms();
    let length_ms = (segment.end_ms() - start_ms).max(0);
    (start_ms as f64 / 1000.0, length_ms as f64 / 1000.0)
}

/// Stream-copy cut of `segment`.
pub fn stream_copy_command(input: &Path, output: &Path, segment: &VideoSegment) -> FfmpegCommand {
    let (start, length) = cut_window(segment);
    FfmpegCommand::new(input, output)
        .seek(start)
        .duration(length)
        .stream_copy()
        .faststart()
}

/// Re-encoding cut of `segment`.
pub fn reencode_command(
    input: &Path,
    output: &Path,
    segment: &VideoSegment,
    settings: &EncodeSettings,
) -> FfmpegCommand {
    let (start, length) = cut_window(segment);
    FfmpegCommand::new(input, output)
        .seek(start)
        .duration(length)
        .encode(settings)
        .faststart()
}

/// Clip path for the `index`-th (1-based) segment of `input`.
pub fn clip_path(input: &Path, output_dir: &Path, index: usize, segment: &VideoSegment) -> PathBuf {
    let base = input
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_else(|| "video".to_string());
    let ext = input
        .extension()
        .map(|e| format!(".{}", e.to_string_lossy()))
        .unwrap_or_else(|| DEFAULT_CLIP_EXTENSION.to_string());
    output_dir.join(segment_file_name(&base, index, segment, &ext))
}

/// Write one clip per segment into `output_dir`, in order.
///
/// Each cut tries a stream copy first and falls back to a re-encode when
/// the copy fails. A failed re-encode aborts the remaining cuts.
pub fn extract_segments(
    input: &Path,
    output_dir: &Path,
    segments: &[VideoSegment],
    codec: &dyn CodecRunner,
    settings: &EncodeSettings,
    log: &ScanLog,
) -> WildscanResult<Vec<PathBuf>> {
    std::fs::create_dir_all(output_dir)?;

    let mut clips = Vec::with_capacity(segments.len());
    for (i, segment) in segments.iter().enumerate() {
        let output = clip_path(input, output_dir, i + 1, segment);

        let copy = stream_copy_command(input, &output, segment);
        if let Err(copy_err) = codec.run(&copy.build_args()) {
            tracing::warn!(
                video = log.video(),
                detector = log.detector(),
                clip = %output.display(),
                error = %copy_err,
                "Stream copy failed, re-encoding"
            );
            let reencode = reencode_command(input, &output, segment, settings);
            codec.run(&reencode.build_args()).map_err(|e| {
                WildscanError::cut(format!("Re-encode failed for {}: {e}", output.display()))
            })?;
        }

        tracing::info!(
            video = log.video(),
            detector = log.detector(),
            clip = %output.display(),
            start = segment.start,
            end = segment.end,
            "Saved clip"
        );
        clips.push(output);
    }

    Ok(clips)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_clip_path_keeps_extension() {
        let seg = VideoSegment::new(1.0, 3.5);
        let path = clip_path(Path::new("/in/cam01.MOV"), Path::new("/out"), 2, &seg);
        assert_eq!(path, PathBuf::from("/out/cam01_seg002_1000ms_3500ms.MOV"));
    }

    #[test]
    fn test_clip_path_defaults_extension() {
        let seg = VideoSegment::new(0.0, 1.0);
        let path = clip_path(Path::new("/in/cam01"), Path::new("/out"), 1, &seg);
        assert_eq!(path, PathBuf::from("/out/cam01_seg001_0ms_1000ms.mp4"));
    }

    #[test]
    fn test_reencode_command_timing() {
        let seg = VideoSegment::new(1.0, 3.5);
        let args = reencode_command(
            Path::new("a.mp4"),
            Path::new("b.mp4"),
            &seg,
            &EncodeSettings::default(),
        )
        .build_args();
        assert_eq!(args[0..2], ["-ss", "1.000"]);
        assert_eq!(args[4..6], ["-t", "2.500"]);
        assert!(args.contains(&"libx264".to_string()));
        assert!(!args.contains(&"copy".to_string()));
    }

    #[test]
    fn test_cut_ends_on_named_millisecond() {
        // start rounds down, end rounds up
        let seg = VideoSegment::new(1.0004, 3.5006);
        assert_eq!((seg.start_ms(), seg.end_ms()), (1000, 3501));
        assert_eq!(cut_window(&seg), (1.0, 2.501));

        let args = stream_copy_command(Path::new("a.mp4"), Path::new("b.mp4"), &seg).build_args();
        assert_eq!(args[0..2], ["-ss", "1.000"]);
        assert_eq!(args[4..6], ["-t", "2.501"]);
    }
}
