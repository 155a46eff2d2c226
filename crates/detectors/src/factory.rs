//! Detector construction.

use wildscan_common::{ScannerConfig, WildscanResult};
use wildscan_processing_core::Detector;

use crate::kind::DetectorKind;
use crate::sidecar::SidecarDetector;

/// Everything needed to start a detector.
#[derive(Debug, Clone, PartialEq)]
pub struct DetectorSettings {
    /// Sidecar program followed by its fixed arguments.
    pub command: Vec<String>,
    /// Model weights path.
    pub model: String,
    pub confidence: f64,
    pub iou: f64,
    /// Accepted class names; empty accepts every class.
    pub allowed_classes: Vec<String>,
}

impl Default for DetectorSettings {
    fn default() -> Self {
        Self::from_config(&ScannerConfig::default(), DetectorKind::Yolo)
    }
}

impl DetectorSettings {
    /// Settings for `kind` from the scanner configuration. MegaDetector uses
    /// its own weights when configured and the YOLO weights otherwise.
    pub fn from_config(config: &ScannerConfig, kind: DetectorKind) -> Self {
        Self {
            command: config
                .detector_command
                .split_whitespace()
                .map(str::to_string)
                .collect(),
            model: config.model_for(kind.as_str()).to_string(),
            confidence: config.confidence_threshold,
            iou: config.nms_iou,
            allowed_classes: config.animal_classes.clone(),
        }
    }

    /// Sidecar program name, if any.
    pub fn program(&self) -> Option<&str> {
        self.command.first().map(String::as_str)
    }

    /// Whether the sidecar program can be found on `PATH` (or as a path).
    pub fn program_available(&self) -> bool {
        self.program()
            .map(|program| which::which(program).is_ok())
            .unwrap_or(false)
    }
}

/// Create and start a detector of the given kind.
pub fn create_detector(
    kind: DetectorKind,
    settings: &DetectorSettings,
) -> WildscanResult<Box<dyn Detector>> {
    let detector = SidecarDetector::spawn(kind, settings)?;
    Ok(Box::new(detector))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_settings_from_config() {
        let config = ScannerConfig {
            detector_command: "python3  -m wildscan_sidecar".to_string(),
            megadetector_model: "md_v5a.pt".to_string(),
            confidence_threshold: 0.4,
            ..Default::default()
        };

        let yolo = DetectorSettings::from_config(&config, DetectorKind::Yolo);
        assert_eq!(yolo.command, vec!["python3", "-m", "wildscan_sidecar"]);
        assert_eq!(yolo.model, "yolov8n.pt");
        assert_eq!(yolo.confidence, 0.4);
        assert_eq!(yolo.allowed_classes.len(), 10);

        let md = DetectorSettings::from_config(&config, DetectorKind::MegaDetector);
        assert_eq!(md.model, "md_v5a.pt");
    }

    #[test]
    fn test_megadetector_falls_back_to_yolo_model() {
        let config = ScannerConfig::default();
        let md = DetectorSettings::from_config(&config, DetectorKind::MegaDetector);
        assert_eq!(md.model, config.yolo_model);
    }

    #[test]
    fn test_empty_command_is_rejected() {
        let settings = DetectorSettings {
            command: vec![],
            ..Default::default()
        };
        assert!(settings.program().is_none());
        assert!(!settings.program_available());
        assert!(create_detector(DetectorKind::Yolo, &settings).is_err());
    }
}
