//! Check external tools.

use std::path::PathBuf;

use wildscan_common::{ConfigOverrides, ScannerConfig};
use wildscan_detectors::{DetectorKind, DetectorSettings};
use wildscan_media_engine::ffmpeg::{FFMPEG, FFPROBE};
use wildscan_media_engine::command_exists;

pub fn run(input: Option<PathBuf>, verbose: bool) -> anyhow::Result<()> {
    let config = ScannerConfig::load(&ConfigOverrides {
        input_dir: input,
        ..ConfigOverrides::default()
    });
    if verbose {
        wildscan_common::logging::init_logging(&wildscan_common::LoggingConfig {
            level: "debug".to_string(),
            ..Default::default()
        });
    }

    println!("Wildscan System Check");
    println!("{}", "=".repeat(50));

    let mut ok = true;
    for tool in [FFMPEG, FFPROBE] {
        if command_exists(tool) {
            println!("[OK] {tool} found");
        } else {
            println!("[MISSING] {tool} not found on PATH");
            ok = false;
        }
    }

    let kind = config.detector.parse::<DetectorKind>();
    match &kind {
        Ok(kind) => println!("[OK] Detector: {kind}"),
        Err(e) => {
            println!("[ERROR] {e}");
            ok = false;
        }
    }

    let settings = DetectorSettings::from_config(&config, kind.unwrap_or(DetectorKind::Yolo));
    match settings.program() {
        Some(program) if settings.program_available() => {
            println!("[OK] Detector sidecar: {program}");
        }
        Some(program) => {
            println!("[MISSING] Detector sidecar not found: {program}");
            ok = false;
        }
        None => {
            println!("[MISSING] DETECTOR_COMMAND is empty");
            ok = false;
        }
    }
    println!("     model: {}", settings.model);

    println!();
    if ok {
        println!("All required tools are available. Wildscan is ready.");
    } else {
        println!("Some required tools are missing. See above.");
    }

    Ok(())
}
