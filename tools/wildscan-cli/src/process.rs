//! Per-video driver shared by `watch` and `scan`.

use std::path::{Path, PathBuf};

use wildscan_common::{ScanLog, ScannerConfig, WildscanResult};
use wildscan_detectors::{create_detector, DetectorKind, DetectorSettings};
use wildscan_media_engine::{analyze_and_extract, MediaBackend};
use wildscan_processing_core::Detector;

/// Output directory of one A/B run.
pub fn ab_output_dir(base: &Path, kind: DetectorKind) -> PathBuf {
    base.join(format!("ab-{}", kind.as_str()))
}

/// Detector names to run on each video: the A/B list when A/B mode is on
/// and non-empty, else the configured detector.
pub fn detector_names(config: &ScannerConfig) -> Vec<String> {
    if config.ab_test && !config.ab_detectors.is_empty() {
        config.ab_detectors.clone()
    } else {
        vec![config.detector.clone()]
    }
}

/// Process one video with every configured detector. Failures are logged
/// per detector and do not stop the remaining runs.
///
/// Returns every clip produced.
pub fn process_video(video: &Path, config: &ScannerConfig, backend: &dyn MediaBackend) -> Vec<PathBuf> {
    let ab = config.ab_test && !config.ab_detectors.is_empty();
    let mut clips = Vec::new();

    for name in detector_names(config) {
        let log = ScanLog::for_video(video, name.as_str());
        log.info("Processing video");
        match run_detector(video, config, &name, ab, backend, &log) {
            Ok(mut produced) => {
                tracing::info!(
                    video = log.video(),
                    detector = log.detector(),
                    clips = produced.len(),
                    "Produced clips"
                );
                clips.append(&mut produced);
            }
            Err(e) => tracing::error!(
                video = log.video(),
                detector = log.detector(),
                error = %e,
                "Processing failed"
            ),
        }
    }

    clips
}

fn run_detector(
    video: &Path,
    config: &ScannerConfig,
    name: &str,
    ab: bool,
    backend: &dyn MediaBackend,
    log: &ScanLog,
) -> WildscanResult<Vec<PathBuf>> {
    let kind: DetectorKind = name.parse()?;

    let mut run_config = config.clone();
    run_config.detector = kind.as_str().to_string();
    if ab {
        run_config.output_dir = ab_output_dir(&config.output_dir, kind);
    }

    let settings = DetectorSettings::from_config(&run_config, kind);
    let mut detector = create_detector(kind, &settings)?;
    detector.warmup()?;
    log.debug("Detector ready");

    analyze_and_extract(video, &run_config, detector.as_mut(), backend, log)
}
