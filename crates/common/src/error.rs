//! Error types shared across Wildscan crates.

use std::path::PathBuf;

/// Top-level error type for Wildscan operations.
#[derive(Debug, thiserror::Error)]
pub enum WildscanError {
    #[error("Failed to open video: {message}")]
    Open { message: String },

    #[error("Segment cut failed: {message}")]
    Cut { message: String },

    #[error("Post-processing error: {message}")]
    PostProcess { message: String },

    #[error("Probe error: {message}")]
    Probe { message: String },

    #[error("Codec error: {message}")]
    Codec { message: String },

    #[error("Detector error: {message}")]
    Detector { message: String },

    #[error("Configuration error: {message}")]
    Config { message: String },

    #[error("File not found: {path}")]
    FileNotFound { path: PathBuf },

    #[error("Unsupported operation: {message}")]
    Unsupported { message: String },

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Json(#[from] serde_json::Error),

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

/// Result type alias using WildscanError.
pub type WildscanResult<T> = Result<T, WildscanError>;

impl WildscanError {
    pub fn open(msg: impl Into<String>) -> Self {
        Self::Open {
            message: msg.into(),
        }
    }

    pub fn cut(msg: impl Into<String>) -> Self {
        Self::Cut {
            message: msg.into(),
        }
    }

    pub fn postprocess(msg: impl Into<String>) -> Self {
        Self::PostProcess {
            message: msg.into(),
        }
    }

    pub fn probe(msg: impl Into<String>) -> Self {
        Self::Probe {
            message: msg.into(),
        }
    }

    pub fn codec(msg: impl Into<String>) -> Self {
        Self::Codec {
            message: msg.into(),
        }
    }

    pub fn detector(msg: impl Into<String>) -> Self {
        Self::Detector {
            message: msg.into(),
        }
    }

    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config {
            message: msg.into(),
        }
    }

    pub fn file_not_found(path: impl Into<PathBuf>) -> Self {
        Self::FileNotFound { path: path.into() }
    }

    pub fn unsupported(msg: impl Into<String>) -> Self {
        Self::Unsupported {
            message: msg.into(),
        }
    }
}
