//! Process a single video.

use std::path::PathBuf;

use wildscan_clip_model::is_video_file;
use wildscan_common::{ConfigOverrides, ScannerConfig};
use wildscan_media_engine::FfmpegBackend;

use crate::process::process_video;

pub fn run(
    file: PathBuf,
    output: Option<PathBuf>,
    detector: Option<String>,
    verbose: bool,
) -> anyhow::Result<()> {
    if !file.is_file() {
        anyhow::bail!("Video not found: {}", file.display());
    }
    if !is_video_file(&file) {
        anyhow::bail!("Not a recognised video file: {}", file.display());
    }

    let overrides = ConfigOverrides {
        input_dir: file.parent().map(|p| p.to_path_buf()),
        output_dir: output,
        detector,
        ..ConfigOverrides::default()
    };
    let config = ScannerConfig::load(&overrides);
    super::init_logging(&config, verbose);

    let backend = FfmpegBackend::new();
    let clips = process_video(&file, &config, &backend);

    if clips.is_empty() {
        println!("No clips produced for {}", file.display());
    } else {
        println!("Clips:");
        for clip in &clips {
            println!("  {}", clip.display());
        }
    }
    Ok(())
}
