//! Perception runtime
//!
//! Drives one perception cycle per sensor frame:
//! preprocess, segment, cluster, classify, register, publish, resolve.
//!
//! - `config`: the YAML [`PipelineConfig`] tying every stage's parameters together
//! - `slot`: single-frame hand-off between the sensor callback and the worker
//! - `publish`: per-cycle [`PerceptionOutput`] and its sinks
//! - `pipeline`: the [`PerceptionPipeline`] itself
//! - `worker`: a dedicated thread serving a [`FrameSlot`]

pub mod config;
pub mod pipeline;
pub mod publish;
pub mod slot;
pub mod worker;

pub use config::*;
pub use pipeline::*;
pub use publish::*;
pub use slot::*;
pub use worker::*;

use pnp_core::ServiceError;
use pnp_objdetect::DetectError;
use pnp_point_cloud::SegmentationError;
use pnp_task::TaskError;
use std::path::PathBuf;

pub type Result<T> = std::result::Result<T, PipelineError>;

/// Cycle-fatal failures. Anything not listed here is logged and skipped.
#[derive(Debug, thiserror::Error)]
pub enum PipelineError {
    #[error("Segmentation failed: {0}")]
    Segmentation(#[from] SegmentationError),

    #[error("Service call failed: {0}")]
    Service(#[from] ServiceError),

    #[error("Detection failed: {0}")]
    Detect(DetectError),

    #[error("Task resolution failed: {0}")]
    Task(#[from] TaskError),

    #[error("Cloud error: {0}")]
    Cloud(#[from] pnp_core::Error),

    #[error("Invalid pipeline config {path}: {source}")]
    Config {
        path: PathBuf,
        #[source]
        source: serde_yaml::Error,
    },
}

impl From<DetectError> for PipelineError {
    /// Normal-service failures surface as [`PipelineError::Service`].
    fn from(e: DetectError) -> Self {
        match e {
            DetectError::Feature(pnp_features::FeatureError::Normals(s)) => PipelineError::Service(s),
            DetectError::Cloud(c) => PipelineError::Cloud(c),
            other => PipelineError::Detect(other),
        }
    }
}

impl PipelineError {
    pub fn is_configuration(&self) -> bool {
        match self {
            PipelineError::Task(t) => t.is_configuration(),
            PipelineError::Config { .. } => true,
            _ => false,
        }
    }
}
