//! Detector variants.

use std::fmt;
use std::str::FromStr;

use wildscan_common::WildscanError;

/// Supported detector families.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DetectorKind {
    /// General-purpose YOLO model filtered to animal classes.
    Yolo,
    /// MegaDetector camera-trap model (`animal`, `person`, `vehicle`).
    MegaDetector,
}

impl DetectorKind {
    /// Upper-case name used in configuration and logs.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Yolo => "YOLO",
            Self::MegaDetector => "MEGADETECTOR",
        }
    }

    /// Value of the sidecar's `--kind` argument.
    pub fn sidecar_arg(&self) -> &'static str {
        match self {
            Self::Yolo => "yolo",
            Self::MegaDetector => "megadetector",
        }
    }
}

impl fmt::Display for DetectorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for DetectorKind {
    type Err = WildscanError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_uppercase().as_str() {
            "YOLO" => Ok(Self::Yolo),
            "MEGADETECTOR" => Ok(Self::MegaDetector),
            other => Err(WildscanError::config(format!("Unknown detector: {other}"))),
        }
    }
}
