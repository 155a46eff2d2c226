//! Watch the input directory.

use std::sync::atomic::Ordering;
use std::sync::Arc;

use anyhow::Context;
use wildscan_common::{ConfigOverrides, ScannerConfig};
use wildscan_intake::DirectoryWatcher;
use wildscan_media_engine::{FfmpegBackend, MediaBackend};

use crate::process::process_video;

pub async fn run(overrides: ConfigOverrides, verbose: bool) -> anyhow::Result<()> {
    let config = ScannerConfig::load(&overrides);
    super::init_logging(&config, verbose);

    std::fs::create_dir_all(&config.input_dir).with_context(|| {
        format!("Failed to create input directory {}", config.input_dir.display())
    })?;

    let backend = Arc::new(FfmpegBackend::new());
    if !backend.is_available() {
        tracing::warn!("ffmpeg/ffprobe not found on PATH; videos will fail to process");
    }

    tracing::info!(
        input = %config.input_dir.display(),
        output = %config.output_dir.display(),
        detector = %config.detector,
        ab_test = config.ab_test,
        zoom = config.zoom_enabled,
        tracking = config.tracking_enabled,
        "Wildscan starting"
    );

    let watcher = DirectoryWatcher::from_config(&config);
    let stop = watcher.stop_flag();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            tracing::info!("Interrupt received, stopping after running videos finish");
            stop.store(true, Ordering::SeqCst);
        }
    });

    let config = Arc::new(config);
    watcher
        .run(move |path| {
            process_video(&path, &config, backend.as_ref());
        })
        .await?;

    Ok(())
}
