pub mod check;
pub mod config;
pub mod scan;
pub mod watch;

use wildscan_common::ScannerConfig;

/// Install the tracing subscriber for a loaded configuration.
pub fn init_logging(config: &ScannerConfig, verbose: bool) {
    let mut logging = config.logging();
    if verbose {
        logging.level = "debug".to_string();
    }
    wildscan_common::logging::init_logging(&logging);
}
