use std::path::PathBuf;
use thiserror::Error;

/// Reasons a run does not start, or stops early.
#[derive(Debug, Error)]
pub enum ClickerError {
    #[error("calibration incomplete: {missing} not captured yet")]
    IncompleteCalibration { missing: String },

    #[error("calibration looks invalid (grid extent {width}x{height} px is not positive), recalibrate points")]
    InvalidCalibration { width: i32, height: i32 },

    #[error("cell size {width:.2}x{height:.2} px rounds to zero, check calibration points")]
    DegenerateCellSize { width: f64, height: f64 },

    #[error("a run is already in progress")]
    AlreadyRunning,

    #[error("fail-safe triggered: pointer parked at ({x}, {y})")]
    FailSafe { x: i32, y: i32 },

    #[error(transparent)]
    Pointer(#[from] PointerError),
}

#[derive(Debug, Error)]
#[allow(dead_code)] // enigo 0.1 calls are infallible; test doubles report through this
pub enum PointerError {
    #[error("{action} failed: {reason}")]
    Action { action: &'static str, reason: String },
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to write default config {path}: {source}")]
    Write {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}
