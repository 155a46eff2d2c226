//! Per-video scanning pipeline.

use std::path::{Path, PathBuf};

use wildscan_common::{ScanLog, ScannerConfig, WildscanResult};
use wildscan_processing_core::{compute_segments, Detector, FrameSource, SegmentPolicy};

use crate::backend::MediaBackend;
use crate::extract::extract_segments;
use crate::postprocess::{postprocess_clips, ReframeMode};

/// Result of sampling a video for detections.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ActivityScan {
    /// Timestamps (seconds) of sampled frames with at least one detection.
    pub times: Vec<f64>,
    /// Frames decoded, sampled or not.
    pub frames_read: u64,
}

/// Run `detector` on every `stride`-th frame and record the timestamp
/// `index / fps` of each frame with detections.
pub fn scan_activity(
    source: &mut dyn FrameSource,
    detector: &mut dyn Detector,
    stride: u32,
    fps: f64,
) -> WildscanResult<ActivityScan> {
    let stride = u64::from(stride.max(1));
    let mut scan = ActivityScan::default();

    while let Some(frame) = source.read()? {
        let index = scan.frames_read;
        scan.frames_read += 1;
        if index % stride != 0 {
            continue;
        }
        if !detector.detect(&frame)?.is_empty() {
            scan.times.push(index as f64 / fps);
        }
    }

    Ok(scan)
}

/// Scan `video` for activity, cut one clip per activity segment into the
/// configured output directory and re-frame the clips if enabled.
///
/// Returns the clip paths in segment order; empty when nothing was seen.
pub fn analyze_and_extract(
    video: &Path,
    config: &ScannerConfig,
    detector: &mut dyn Detector,
    backend: &dyn MediaBackend,
    log: &ScanLog,
) -> WildscanResult<Vec<PathBuf>> {
    let probe = backend.probe(video)?;
    let fps = probe.effective_fps();

    let scan = {
        let mut source = backend.open_source(video)?;
        scan_activity(source.as_mut(), detector, config.frame_stride, fps)?
    };

    let duration = if probe.duration_secs > 0.0 {
        probe.duration_secs
    } else {
        scan.frames_read as f64 / fps
    };
    tracing::debug!(
        video = log.video(),
        detector = log.detector(),
        frames = scan.frames_read,
        hits = scan.times.len(),
        duration,
        "Scan complete"
    );

    let segments = compute_segments(&scan.times, duration, &SegmentPolicy::from_config(config));
    if segments.is_empty() {
        log.info("No activity detected");
        return Ok(Vec::new());
    }
    tracing::info!(
        video = log.video(),
        detector = log.detector(),
        segments = segments.len(),
        "Found activity"
    );

    let clips = extract_segments(
        video,
        &config.output_dir,
        &segments,
        backend.codec(),
        backend.encode_settings(),
        log,
    )?;

    if ReframeMode::from_config(config).is_none() {
        return Ok(clips);
    }
    Ok(postprocess_clips(&clips, config, detector, backend, log))
}

#[cfg(test)]
mod tests {
    use super::*;
    use wildscan_clip_model::{Detection, Frame};
    use wildscan_processing_core::MemoryFrameSource;

    /// Reports a detection on the listed call numbers.
    struct OnCalls {
        hits: Vec<usize>,
        calls: usize,
    }

    impl Detector for OnCalls {
        fn name(&self) -> &str {
            "ONCALLS"
        }

        fn detect(&mut self, _frame: &Frame) -> WildscanResult<Vec<Detection>> {
            let call = self.calls;
            self.calls += 1;
            if self.hits.contains(&call) {
                Ok(vec![Detection::new(1.0, 1.0, 4.0, 4.0, 0.9, "deer")])
            } else {
                Ok(Vec::new())
            }
        }
    }

    #[test]
    fn test_scan_activity_samples_by_stride() {
        let mut source = MemoryFrameSource::blank(8, 8, 10.0, 23);
        let mut detector = OnCalls {
            hits: vec![1, 3],
            calls: 0,
        };
        let scan = scan_activity(&mut source, &mut detector, 5, 10.0).unwrap();
        assert_eq!(scan.frames_read, 23);
        // sampled frames 0, 5, 10, 15, 20
        assert_eq!(detector.calls, 5);
        assert_eq!(scan.times, vec![0.5, 1.5]);
    }

    #[test]
    fn test_scan_activity_zero_stride_samples_every_frame() {
        let mut source = MemoryFrameSource::blank(8, 8, 4.0, 4);
        let mut detector = OnCalls {
            hits: vec![2],
            calls: 0,
        };
        let scan = scan_activity(&mut source, &mut detector, 0, 4.0).unwrap();
        assert_eq!(detector.calls, 4);
        assert_eq!(scan.times, vec![0.5]);
    }
}
