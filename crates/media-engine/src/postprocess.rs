//! Post-processing of extracted clips: static zoom or tracking re-frame.

use std::path::{Path, PathBuf};

use wildscan_clip_model::FALLBACK_FPS;
use wildscan_common::{ScanLog, ScannerConfig, WildscanError, WildscanResult};
use wildscan_processing_core::{
    aggregate_union, fit_rectangle, Detector, FitParams, TrackingConfig,
};

use crate::backend::MediaBackend;
use crate::reframe::{static_zoom_command, track_clip};

/// Margin added around the aggregated subject box for a static zoom.
pub const ZOOM_MARGIN_RATIO: f64 = 0.1;

/// Re-framing pass applied to each clip.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReframeMode {
    /// Smoothed per-frame crop following the subject.
    Track,
    /// One crop around every detection in the clip.
    Zoom,
}

impl ReframeMode {
    /// Tracking takes precedence over zoom; `None` when both are off.
    pub fn from_config(config: &ScannerConfig) -> Option<Self> {
        if config.tracking_enabled {
            Some(Self::Track)
        } else if config.zoom_enabled {
            Some(Self::Zoom)
        } else {
            None
        }
    }

    pub fn suffix(&self) -> &'static str {
        match self {
            Self::Track => "_track",
            Self::Zoom => "_zoom",
        }
    }
}

/// What happened to one clip.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PostProcessOutcome {
    /// Re-framing is disabled.
    Skipped,
    /// Zoom found nothing to frame; the clip is unchanged.
    NoDetections,
    /// The clip was overwritten with the re-framed version.
    Replaced,
    /// The re-framed version was written next to the clip.
    Kept(PathBuf),
    /// Re-framing failed; the clip is unchanged.
    Failed(String),
}

/// `{stem}{suffix}{ext}` next to `clip`.
pub fn temp_path_for(clip: &Path, mode: ReframeMode) -> PathBuf {
    let stem = clip
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_default();
    let ext = clip
        .extension()
        .map(|e| format!(".{}", e.to_string_lossy()))
        .unwrap_or_default();
    clip.with_file_name(format!("{stem}{}{ext}", mode.suffix()))
}

/// Re-frame one clip according to `config`.
///
/// Never fails: errors are logged and reported as
/// [`PostProcessOutcome::Failed`] with the original clip left in place.
pub fn postprocess_clip(
    clip: &Path,
    config: &ScannerConfig,
    detector: &mut dyn Detector,
    backend: &dyn MediaBackend,
    log: &ScanLog,
) -> PostProcessOutcome {
    let Some(mode) = ReframeMode::from_config(config) else {
        return PostProcessOutcome::Skipped;
    };
    let tmp = temp_path_for(clip, mode);

    let result = match mode {
        ReframeMode::Track => render_tracking(clip, &tmp, config, detector, backend),
        ReframeMode::Zoom => render_zoom(clip, &tmp, config, detector, backend),
    };

    let outcome = match result {
        Ok(false) => {
            tracing::info!(
                video = log.video(),
                detector = log.detector(),
                clip = %clip.display(),
                "No detections, leaving clip as is"
            );
            PostProcessOutcome::NoDetections
        }
        Ok(true) if config.keep_postprocessed => {
            tracing::info!(
                video = log.video(),
                detector = log.detector(),
                clip = %tmp.display(),
                mode = mode.suffix(),
                "Kept re-framed clip"
            );
            PostProcessOutcome::Kept(tmp.clone())
        }
        Ok(true) => match std::fs::rename(&tmp, clip) {
            Ok(()) => {
                tracing::info!(
                    video = log.video(),
                    detector = log.detector(),
                    clip = %clip.display(),
                    mode = mode.suffix(),
                    "Re-framed clip"
                );
                PostProcessOutcome::Replaced
            }
            Err(err) => {
                tracing::error!(
                    video = log.video(),
                    detector = log.detector(),
                    clip = %clip.display(),
                    error = %err,
                    "Failed to replace clip"
                );
                PostProcessOutcome::Failed(err.to_string())
            }
        },
        Err(err) => {
            tracing::error!(
                video = log.video(),
                detector = log.detector(),
                clip = %clip.display(),
                error = %err,
                "Post-processing failed"
            );
            PostProcessOutcome::Failed(err.to_string())
        }
    };

    if !matches!(outcome, PostProcessOutcome::Kept(_)) && tmp.exists() {
        if let Err(err) = std::fs::remove_file(&tmp) {
            tracing::warn!(
                video = log.video(),
                detector = log.detector(),
                path = %tmp.display(),
                error = %err,
                "Failed to remove temporary clip"
            );
        }
    }

    outcome
}

/// Re-frame every clip in order. The returned paths are the original clip
/// paths; kept re-framed copies are not included.
pub fn postprocess_clips(
    clips: &[PathBuf],
    config: &ScannerConfig,
    detector: &mut dyn Detector,
    backend: &dyn MediaBackend,
    log: &ScanLog,
) -> Vec<PathBuf> {
    for clip in clips {
        postprocess_clip(clip, config, detector, backend, log);
    }
    clips.to_vec()
}

/// Returns whether `tmp` was written.
fn render_zoom(
    clip: &Path,
    tmp: &Path,
    config: &ScannerConfig,
    detector: &mut dyn Detector,
    backend: &dyn MediaBackend,
) -> WildscanResult<bool> {
    let mut source = backend
        .open_source(clip)
        .map_err(|e| WildscanError::postprocess(format!("Cannot open clip: {e}")))?;
    let (frame_w, frame_h) = (source.width(), source.height());

    let Some(union) = aggregate_union(source.as_mut(), detector, config.frame_stride)? else {
        return Ok(false);
    };
    drop(source);

    let mut params = FitParams::new(
        frame_w,
        frame_h,
        config.min_output_width,
        config.min_output_height,
    )
    .with_margin(ZOOM_MARGIN_RATIO);
    if config.min_output_height > 0 {
        params = params.with_aspect(
            f64::from(config.min_output_width) / f64::from(config.min_output_height),
        );
    }
    let crop = fit_rectangle(union, &params);
    let (out_w, out_h) = TrackingConfig::from_config(config).output_size();

    tracing::debug!(?union, ?crop, out_w, out_h, "Static zoom crop");
    let command = static_zoom_command(
        clip,
        tmp,
        crop,
        out_w,
        out_h,
        backend.encode_settings(),
    );
    backend.codec().run(&command.build_args())?;
    Ok(true)
}

fn render_tracking(
    clip: &Path,
    tmp: &Path,
    config: &ScannerConfig,
    detector: &mut dyn Detector,
    backend: &dyn MediaBackend,
) -> WildscanResult<bool> {
    let tracking = TrackingConfig::from_config(config);
    let mut source = backend
        .open_source(clip)
        .map_err(|e| WildscanError::postprocess(format!("Cannot open clip: {e}")))?;
    let fps = match source.fps() {
        fps if fps.is_finite() && fps > 0.0 => fps,
        _ => FALLBACK_FPS,
    };
    let (out_w, out_h) = tracking.output_size();
    let mut sink = backend.create_sink(tmp, out_w, out_h, fps)?;

    let frames = track_clip(source.as_mut(), sink.as_mut(), detector, &tracking)?;
    tracing::debug!(frames, clip = %clip.display(), "Tracking render complete");
    Ok(true)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mode_precedence() {
        let mut config = ScannerConfig::default();
        assert_eq!(ReframeMode::from_config(&config), None);
        config.zoom_enabled = true;
        assert_eq!(ReframeMode::from_config(&config), Some(ReframeMode::Zoom));
        config.tracking_enabled = true;
        assert_eq!(ReframeMode::from_config(&config), Some(ReframeMode::Track));
    }

    #[test]
    fn test_temp_path_for() {
        let clip = Path::new("/out/cam_seg001_0ms_1000ms.mp4");
        assert_eq!(
            temp_path_for(clip, ReframeMode::Zoom),
            PathBuf::from("/out/cam_seg001_0ms_1000ms_zoom.mp4")
        );
        assert_eq!(
            temp_path_for(clip, ReframeMode::Track),
            PathBuf::from("/out/cam_seg001_0ms_1000ms_track.mp4")
        );
    }
}
