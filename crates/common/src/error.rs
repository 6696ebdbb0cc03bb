//! Error types shared across Rallycast crates.

use std::path::PathBuf;

/// Top-level error type for Rallycast operations.
#[derive(Debug, thiserror::Error)]
pub enum RallycastError {
    #[error("Invalid court calibration: {message}")]
    InvalidCalibration { message: String },

    #[error("Detection stream error: {message}")]
    Detection { message: String },

    #[error("Configuration error: {message}")]
    Config { message: String },

    #[error("File not found: {path}")]
    FileNotFound { path: PathBuf },

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Json(#[from] serde_json::Error),

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

/// Result type alias using RallycastError.
pub type RallycastResult<T> = Result<T, RallycastError>;

impl RallycastError {
    pub fn invalid_calibration(msg: impl Into<String>) -> Self {
        Self::InvalidCalibration {
            message: msg.into(),
        }
    }

    pub fn detection(msg: impl Into<String>) -> Self {
        Self::Detection {
            message: msg.into(),
        }
    }

    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config {
            message: msg.into(),
        }
    }

    /// Whether this error was caused by a malformed detection stream.
    pub fn is_detection(&self) -> bool {
        matches!(self, Self::Detection { .. })
    }

    /// Whether this error was caused by a bad court calibration.
    pub fn is_calibration(&self) -> bool {
        matches!(self, Self::InvalidCalibration { .. })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_calibration_error_message() {
        let err = RallycastError::invalid_calibration("expected 4 corners, got 3");
        assert!(err.is_calibration());
        assert_eq!(
            err.to_string(),
            "Invalid court calibration: expected 4 corners, got 3"
        );
    }

    #[test]
    fn test_json_error_converts() {
        let parse: Result<u32, _> = serde_json::from_str("not json");
        let err: RallycastError = parse.unwrap_err().into();
        assert!(matches!(err, RallycastError::Json(_)));
        assert!(!err.is_calibration());
    }
}
