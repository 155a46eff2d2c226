//! Print the effective configuration.

use std::path::PathBuf;

use wildscan_common::{ConfigOverrides, ScannerConfig};

pub fn run(input: Option<PathBuf>) -> anyhow::Result<()> {
    let config = ScannerConfig::load(&ConfigOverrides {
        input_dir: input,
        ..ConfigOverrides::default()
    });
    println!("{}", serde_json::to_string_pretty(&config)?);
    Ok(())
}
