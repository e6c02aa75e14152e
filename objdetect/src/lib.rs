//! Object detection
//!
//! Turns object clusters into labelled detections:
//! - `classifier`: the pluggable [`Classifier`] capability and the linear model artifact
//! - `registry`: per-cycle [`DetectedObject`] storage and cluster colorization
//! - `palette`: deterministic display colors for clusters
//! - `markers`: label markers for visualization

pub mod classifier;
pub mod markers;
pub mod palette;
pub mod registry;

pub use classifier::*;
pub use markers::*;
pub use palette::*;
pub use registry::*;

pub type Result<T> = std::result::Result<T, DetectError>;

#[derive(Debug, thiserror::Error)]
pub enum DetectError {
    #[error("Model error: {0}")]
    Model(String),

    #[error("Feature dimension {actual} does not match model dimension {expected}")]
    DimensionMismatch { expected: usize, actual: usize },

    #[error("Feature error: {0}")]
    Feature(#[from] pnp_features::FeatureError),

    #[error("Cloud error: {0}")]
    Cloud(#[from] pnp_core::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Model file is not valid JSON: {0}")]
    Json(#[from] serde_json::Error),
}
