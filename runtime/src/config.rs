use crate::{PipelineError, Result};
use pnp_features::FeatureConfig;
use pnp_point_cloud::{ClusterConfig, PlaneConfig, PreprocessConfig};
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;

/// Parameters of every stage of a perception cycle.
///
/// All sections are optional in the YAML file; missing keys take their
/// defaults.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PipelineConfig {
    pub preprocess: PreprocessConfig,
    pub plane: PlaneConfig,
    pub cluster: ClusterConfig,
    pub features: FeatureConfig,
    /// Neighbourhood size for the in-process normal estimator.
    pub normals_k: usize,
    pub actuation_timeout_ms: u64,
    /// Height of label markers above their cluster.
    pub marker_z_offset: f32,
    pub palette_seed: u64,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            preprocess: PreprocessConfig::default(),
            plane: PlaneConfig::default(),
            cluster: ClusterConfig::default(),
            features: FeatureConfig::default(),
            normals_k: 15,
            actuation_timeout_ms: 30_000,
            marker_z_offset: 0.4,
            palette_seed: 0x5eed_c010,
        }
    }
}

impl PipelineConfig {
    pub fn from_yaml(text: &str) -> std::result::Result<Self, serde_yaml::Error> {
        serde_yaml::from_str(text)
    }

    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path).map_err(pnp_core::Error::from)?;
        let config = Self::from_yaml(&text).map_err(|source| PipelineError::Config {
            path: path.to_path_buf(),
            source,
        })?;
        tracing::info!("Loaded pipeline config from {}", path.display());
        Ok(config)
    }

    pub fn actuation_timeout(&self) -> Duration {
        Duration::from_millis(self.actuation_timeout_ms)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pnp_point_cloud::Axis;

    #[test]
    fn test_partial_yaml_keeps_defaults() {
        let cfg = PipelineConfig::from_yaml(
            "cluster:\n  tolerance: 0.05\nplane:\n  seed: 7\nmarker_z_offset: 0.25\n",
        )
        .unwrap();

        assert_eq!(cfg.cluster.tolerance, 0.05);
        assert_eq!(cfg.cluster.min_size, 10);
        assert_eq!(cfg.plane.seed, Some(7));
        assert_eq!(cfg.plane.distance_threshold, 0.02);
        assert_eq!(cfg.marker_z_offset, 0.25);
        assert_eq!(cfg.features.bins, 32);
        assert_eq!(cfg.preprocess.clips[0].axis, Axis::Z);
    }

    #[test]
    fn test_empty_document_is_default() {
        assert_eq!(PipelineConfig::from_yaml("{}").unwrap(), PipelineConfig::default());
    }

    #[test]
    fn test_bad_file_reports_path() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("pipeline.yaml");
        std::fs::write(&path, "cluster: [1, 2]\n").unwrap();
        let err = PipelineConfig::from_file(&path).unwrap_err();
        assert!(err.is_configuration());
        assert!(err.to_string().contains("pipeline.yaml"));
    }
}
