//! Scanner configuration.
//!
//! Values are resolved with the priority: CLI overrides > `.env` file in the
//! input directory > built-in defaults. Malformed values fall back to the
//! default for that key and empty values are ignored.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::{Path, PathBuf};

/// Name of the log file written into the output directory.
pub const LOG_FILE_NAME: &str = "wildscan.log";

const DEFAULT_ANIMAL_CLASSES: &[&str] = &[
    "bird", "cat", "dog", "horse", "sheep", "cow", "elephant", "bear", "zebra", "giraffe",
];

/// Effective configuration for one scanner process.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScannerConfig {
    /// Directory watched for new videos.
    pub input_dir: PathBuf,

    /// Directory receiving extracted clips and the log file.
    pub output_dir: PathBuf,

    /// Detector name (`YOLO` or `MEGADETECTOR`).
    pub detector: String,

    /// YOLO model weights passed to the inference sidecar.
    pub yolo_model: String,

    /// MegaDetector weights; empty falls back to `yolo_model`.
    pub megadetector_model: String,

    /// Inference sidecar command line (program followed by arguments).
    pub detector_command: String,

    /// Class names accepted as animal activity.
    pub animal_classes: Vec<String>,

    pub confidence_threshold: f64,
    pub nms_iou: f64,

    /// Run detection on every Nth decoded frame.
    pub frame_stride: u32,

    pub preroll_sec: f64,
    pub postroll_sec: f64,
    pub min_activity_sec: f64,
    pub merge_gap_sec: f64,

    /// Seconds a new file must stay unchanged before it is processed.
    pub file_stability_seconds: f64,
    pub poll_interval_seconds: f64,

    /// Log level filter (e.g., "INFO", "debug").
    pub log_level: String,

    /// Emit structured JSON logs.
    pub log_json: bool,

    /// Static crop around the union of all detections.
    pub zoom_enabled: bool,

    /// Per-frame smoothed tracking crop. Takes precedence over zoom.
    pub tracking_enabled: bool,

    /// Output resolution of re-framed clips.
    pub min_output_width: u32,
    pub min_output_height: u32,

    /// Keep re-framed clips next to the originals instead of replacing them.
    pub keep_postprocessed: bool,

    /// Process every video once per detector in `ab_detectors`.
    pub ab_test: bool,
    pub ab_detectors: Vec<String>,

    pub tracking_center_alpha: f64,
    pub tracking_size_alpha: f64,
    pub tracking_max_move_frac: f64,
    pub tracking_max_zoom_frac: f64,
    pub tracking_center_deadzone_frac: f64,
    pub tracking_zoom_deadzone_frac: f64,
    pub tracking_margin: f64,
}

/// Values supplied on the command line. `None` leaves the key to the
/// `.env` file or the default.
#[derive(Debug, Clone, Default)]
pub struct ConfigOverrides {
    pub input_dir: Option<PathBuf>,
    pub output_dir: Option<PathBuf>,
    pub detector: Option<String>,
    pub ab_test: Option<bool>,
    pub ab_detectors: Option<Vec<String>>,
}

/// Logging configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Log level filter (e.g., "info", "debug", "wildscan=debug,warn").
    pub level: String,

    /// Whether to output structured JSON logs.
    pub json: bool,

    /// Optional log file path, written in addition to stderr.
    pub file: Option<PathBuf>,
}

impl Default for ScannerConfig {
    fn default() -> Self {
        Self {
            input_dir: PathBuf::from("."),
            output_dir: PathBuf::from("output"),
            detector: "YOLO".to_string(),
            yolo_model: "yolov8n.pt".to_string(),
            megadetector_model: String::new(),
            detector_command: "python3 -m wildscan_sidecar".to_string(),
            animal_classes: DEFAULT_ANIMAL_CLASSES
                .iter()
                .map(|s| s.to_string())
                .collect(),
            confidence_threshold: 0.25,
            nms_iou: 0.45,
            frame_stride: 5,
            preroll_sec: 1.0,
            postroll_sec: 2.0,
            min_activity_sec: 0.5,
            merge_gap_sec: 1.0,
            file_stability_seconds: 3.0,
            poll_interval_seconds: 1.0,
            log_level: "INFO".to_string(),
            log_json: false,
            zoom_enabled: false,
            tracking_enabled: false,
            min_output_width: 640,
            min_output_height: 360,
            keep_postprocessed: false,
            ab_test: false,
            ab_detectors: Vec::new(),
            tracking_center_alpha: 0.05,
            tracking_size_alpha: 0.04,
            tracking_max_move_frac: 0.05,
            tracking_max_zoom_frac: 0.06,
            tracking_center_deadzone_frac: 0.10,
            tracking_zoom_deadzone_frac: 0.12,
            tracking_margin: 0.20,
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            json: false,
            file: None,
        }
    }
}

impl ScannerConfig {
    /// Resolve the configuration from CLI overrides, the input directory's
    /// `.env` file and the process environment. Creates the output directory.
    pub fn load(overrides: &ConfigOverrides) -> Self {
        let input_dir = overrides.input_dir.as_deref().map(resolve).unwrap_or_else(|| {
            let dir = std::env::var("INPUT_DIR").unwrap_or_else(|_| ".".to_string());
            resolve(Path::new(&dir))
        });
        let values = read_env_file(&input_dir.join(".env"));
        let process_output = std::env::var("OUTPUT_DIR").ok();

        let config = Self::from_values(input_dir, &values, overrides, process_output);
        if let Err(e) = std::fs::create_dir_all(&config.output_dir) {
            tracing::warn!(
                "Failed to create output directory {:?}: {}",
                config.output_dir,
                e
            );
        }
        config
    }

    /// Build a configuration from already-read `.env` values.
    ///
    /// `process_output_dir` is the `OUTPUT_DIR` process variable, consulted
    /// only when neither the CLI nor the `.env` file names an output directory.
    pub fn from_values(
        input_dir: PathBuf,
        values: &HashMap<String, String>,
        overrides: &ConfigOverrides,
        process_output_dir: Option<String>,
    ) -> Self {
        let defaults = Self::default();
        let get = |key: &str| values.get(key).map(String::as_str);

        let output_dir = match (&overrides.output_dir, get("OUTPUT_DIR")) {
            (Some(dir), _) => dir.clone(),
            (None, Some(dir)) => PathBuf::from(dir),
            (None, None) => {
                let fallback = input_dir
                    .parent()
                    .map(|p| p.join("output"))
                    .unwrap_or_else(|| PathBuf::from("output"));
                process_output_dir
                    .map(|dir| resolve(Path::new(&dir)))
                    .unwrap_or(fallback)
            }
        };

        let detector = overrides
            .detector
            .clone()
            .or_else(|| get("DETECTOR").map(str::to_string))
            .unwrap_or(defaults.detector)
            .to_uppercase();

        let animal_classes = split_list(get("ANIMAL_CLASSES").unwrap_or(""), false);
        let animal_classes = if animal_classes.is_empty() {
            defaults.animal_classes
        } else {
            animal_classes
        };

        let ab_detectors = overrides
            .ab_detectors
            .clone()
            .map(|list| {
                list.into_iter()
                    .map(|s| s.trim().to_uppercase())
                    .filter(|s| !s.is_empty())
                    .collect()
            })
            .unwrap_or_else(|| split_list(get("AB_DETECTORS").unwrap_or(""), true));

        Self {
            input_dir,
            output_dir,
            detector,
            yolo_model: get("YOLO_MODEL")
                .map(str::to_string)
                .unwrap_or(defaults.yolo_model),
            megadetector_model: get("MEGADETECTOR_MODEL")
                .map(str::to_string)
                .unwrap_or(defaults.megadetector_model),
            detector_command: get("DETECTOR_COMMAND")
                .map(str::to_string)
                .unwrap_or(defaults.detector_command),
            animal_classes,
            confidence_threshold: coerce_float(
                get("CONFIDENCE_THRESHOLD"),
                defaults.confidence_threshold,
            ),
            nms_iou: coerce_float(get("NMS_IOU"), defaults.nms_iou),
            frame_stride: coerce_int(get("FRAME_STRIDE"), defaults.frame_stride),
            preroll_sec: coerce_float(get("PREROLL_SEC"), defaults.preroll_sec),
            postroll_sec: coerce_float(get("POSTROLL_SEC"), defaults.postroll_sec),
            min_activity_sec: coerce_float(get("MIN_ACTIVITY_SEC"), defaults.min_activity_sec),
            merge_gap_sec: coerce_float(get("MERGE_GAP_SEC"), defaults.merge_gap_sec),
            file_stability_seconds: coerce_float(
                get("FILE_STABILITY_SECONDS"),
                defaults.file_stability_seconds,
            ),
            poll_interval_seconds: coerce_float(
                get("POLL_INTERVAL_SECONDS"),
                defaults.poll_interval_seconds,
            ),
            log_level: get("LOG_LEVEL")
                .map(str::to_string)
                .unwrap_or(defaults.log_level)
                .to_uppercase(),
            log_json: coerce_bool(get("LOG_JSON"), defaults.log_json),
            zoom_enabled: coerce_bool(get("ZOOM_ENABLED"), defaults.zoom_enabled),
            tracking_enabled: coerce_bool(get("TRACKING_ENABLED"), defaults.tracking_enabled),
            min_output_width: coerce_int(get("MIN_OUTPUT_WIDTH"), defaults.min_output_width),
            min_output_height: coerce_int(get("MIN_OUTPUT_HEIGHT"), defaults.min_output_height),
            keep_postprocessed: coerce_bool(
                get("KEEP_POSTPROCESSED"),
                defaults.keep_postprocessed,
            ),
            ab_test: overrides
                .ab_test
                .unwrap_or_else(|| coerce_bool(get("AB_TEST"), defaults.ab_test)),
            ab_detectors,
            tracking_center_alpha: coerce_float(
                get("TRACKING_CENTER_ALPHA"),
                defaults.tracking_center_alpha,
            ),
            tracking_size_alpha: coerce_float(
                get("TRACKING_SIZE_ALPHA"),
                defaults.tracking_size_alpha,
            ),
            tracking_max_move_frac: coerce_float(
                get("TRACKING_MAX_MOVE_FRAC"),
                defaults.tracking_max_move_frac,
            ),
            tracking_max_zoom_frac: coerce_float(
                get("TRACKING_MAX_ZOOM_FRAC"),
                defaults.tracking_max_zoom_frac,
            ),
            tracking_center_deadzone_frac: coerce_float(
                get("TRACKING_CENTER_DEADZONE_FRAC"),
                defaults.tracking_center_deadzone_frac,
            ),
            tracking_zoom_deadzone_frac: coerce_float(
                get("TRACKING_ZOOM_DEADZONE_FRAC"),
                defaults.tracking_zoom_deadzone_frac,
            ),
            tracking_margin: coerce_float(get("TRACKING_MARGIN"), defaults.tracking_margin),
        }
    }

    /// Logging settings derived from this configuration. The log file lives
    /// in the output directory.
    pub fn logging(&self) -> LoggingConfig {
        LoggingConfig {
            level: self.log_level.to_lowercase(),
            json: self.log_json,
            file: Some(self.output_dir.join(LOG_FILE_NAME)),
        }
    }

    /// Model weights for the named detector.
    pub fn model_for(&self, detector: &str) -> &str {
        if detector.eq_ignore_ascii_case("MEGADETECTOR") && !self.megadetector_model.is_empty() {
            &self.megadetector_model
        } else {
            &self.yolo_model
        }
    }
}

/// Read `KEY=VALUE` pairs from a `.env` file, skipping empty keys/values.
/// A missing file yields an empty map.
pub fn read_env_file(path: &Path) -> HashMap<String, String> {
    let mut values = HashMap::new();
    if !path.exists() {
        return values;
    }
    match dotenvy::from_path_iter(path) {
        Ok(iter) => {
            for item in iter {
                match item {
                    Ok((key, value)) if !key.is_empty() && !value.is_empty() => {
                        values.insert(key, value);
                    }
                    Ok(_) => {}
                    Err(e) => {
                        tracing::warn!("Skipping malformed line in {:?}: {}", path, e);
                    }
                }
            }
        }
        Err(e) => {
            tracing::warn!("Failed to read env file at {:?}: {}", path, e);
        }
    }
    values
}

fn resolve(path: &Path) -> PathBuf {
    std::fs::canonicalize(path).unwrap_or_else(|_| path.to_path_buf())
}

fn split_list(raw: &str, upper: bool) -> Vec<String> {
    raw.split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(|s| {
            if upper {
                s.to_uppercase()
            } else {
                s.to_string()
            }
        })
        .collect()
}

fn coerce_float(value: Option<&str>, default: f64) -> f64 {
    value
        .and_then(|v| v.trim().parse::<f64>().ok())
        .unwrap_or(default)
}

fn coerce_int<T: std::str::FromStr>(value: Option<&str>, default: T) -> T {
    value
        .and_then(|v| v.trim().parse::<T>().ok())
        .unwrap_or(default)
}

fn coerce_bool(value: Option<&str>, default: bool) -> bool {
    let Some(value) = value else {
        return default;
    };
    match value.trim().to_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => true,
        "0" | "false" | "no" | "off" => false,
        _ => default,
    }
}
