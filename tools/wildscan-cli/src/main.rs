//! Wildscan CLI: watch camera folders and cut wildlife activity clips.
//!
//! Usage:
//!   wildscan watch [OPTIONS]     Process new videos as they arrive
//!   wildscan scan <FILE>         Process a single video
//!   wildscan check               Check external tools
//!   wildscan config              Print the effective configuration

use std::path::PathBuf;

use clap::{Parser, Subcommand};
use wildscan_common::ConfigOverrides;

mod commands;
mod process;

#[derive(Parser)]
#[command(
    name = "wildscan",
    about = "Find animal activity in camera-trap videos and cut it into clips",
    version,
    author
)]
struct Cli {
    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Watch the input directory and process new videos
    Watch {
        /// Input directory (default: INPUT_DIR or the current directory)
        #[arg(short, long)]
        input: Option<PathBuf>,

        /// Output directory for clips
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Detector to use: YOLO or MEGADETECTOR
        #[arg(short, long)]
        detector: Option<String>,

        /// Run every detector in --ab-detectors on each video
        #[arg(long)]
        ab_test: bool,

        /// Comma-separated detectors for A/B runs
        #[arg(long, value_delimiter = ',')]
        ab_detectors: Option<Vec<String>>,
    },

    /// Process one video file
    Scan {
        /// Path to the video
        file: PathBuf,

        /// Output directory for clips
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Detector to use: YOLO or MEGADETECTOR
        #[arg(short, long)]
        detector: Option<String>,
    },

    /// Check that ffmpeg, ffprobe and the detector sidecar are available
    Check {
        /// Input directory whose .env is consulted
        #[arg(short, long)]
        input: Option<PathBuf>,
    },

    /// Print the effective configuration as JSON
    Config {
        /// Input directory whose .env is consulted
        #[arg(short, long)]
        input: Option<PathBuf>,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    match cli.command {
        Commands::Watch {
            input,
            output,
            detector,
            ab_test,
            ab_detectors,
        } => {
            let overrides = ConfigOverrides {
                input_dir: input,
                output_dir: output,
                detector,
                ab_test: ab_test.then_some(true),
                ab_detectors,
            };
            commands::watch::run(overrides, cli.verbose).await
        }
        Commands::Scan {
            file,
            output,
            detector,
        } => commands::scan::run(file, output, detector, cli.verbose),
        Commands::Check { input } => commands::check::run(input, cli.verbose),
        Commands::Config { input } => commands::config::run(input),
    }
}
