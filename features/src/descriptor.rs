//! Cluster descriptor: color histogram followed by normal histogram.

use crate::color::ColorSpace;
use crate::histogram::{compute_color_histograms, compute_normal_histograms};
use crate::normals::NormalEstimator;
use crate::{FeatureError, Result};
use pnp_core::PointCloud;
use serde::{Deserialize, Serialize};
use std::time::Duration;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FeatureConfig {
    /// Bins per channel, for both histograms.
    pub bins: usize,
    pub color_space: ColorSpace,
    #[serde(with = "millis")]
    pub normals_timeout: Duration,
}

impl Default for FeatureConfig {
    fn default() -> Self {
        Self {
            bins: 32,
            color_space: ColorSpace::Hsv,
            normals_timeout: Duration::from_secs(5),
        }
    }
}

impl FeatureConfig {
    /// Length of every vector this configuration produces.
    pub fn feature_len(&self) -> usize {
        6 * self.bins
    }
}

/// Fixed-length feature vector for one cluster.
#[derive(Debug, Clone, PartialEq)]
pub struct FeatureVector(pub Vec<f32>);

impl FeatureVector {
    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn as_slice(&self) -> &[f32] {
        &self.0
    }
}

#[derive(Debug, Clone, Default)]
pub struct FeatureExtractor {
    config: FeatureConfig,
}

impl FeatureExtractor {
    pub fn new(config: FeatureConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &FeatureConfig {
        &self.config
    }

    /// Describe `cluster` using normals from `normals`.
    ///
    /// Points without color count as black.
    pub fn extract(
        &self,
        cluster: &PointCloud,
        normals: &dyn NormalEstimator,
    ) -> Result<FeatureVector> {
        if cluster.is_empty() {
            return Err(FeatureError::EmptyCluster);
        }

        let colors = match &cluster.colors {
            Some(c) => c.clone(),
            None => vec![nalgebra::Point3::origin(); cluster.len()],
        };
        let mut features = compute_color_histograms(&colors, self.config.bins, self.config.color_space);

        let n = normals.estimate_normals(cluster, self.config.normals_timeout)?;
        if n.len() != cluster.len() {
            return Err(FeatureError::NormalCountMismatch {
                normals: n.len(),
                points: cluster.len(),
            });
        }
        features.extend(compute_normal_histograms(&n, self.config.bins));

        Ok(FeatureVector(features))
    }
}

/// `Duration` as integer milliseconds in config files.
pub(crate) mod millis {
    use serde::{Deserialize, Deserializer, Serializer};
    use std::time::Duration;

    pub fn serialize<S: Serializer>(d: &Duration, s: S) -> Result<S::Ok, S::Error> {
        s.serialize_u64(d.as_millis() as u64)
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(d: D) -> Result<Duration, D::Error> {
        Ok(Duration::from_millis(u64::deserialize(d)?))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use nalgebra::{Point3, Vector3};
    use pnp_core::{ServiceError, ServiceResult};

    struct FixedNormals(Vector3<f32>);

    impl NormalEstimator for FixedNormals {
        fn estimate_normals(&self, cloud: &PointCloud, _: Duration) -> ServiceResult<Vec<Vector3<f32>>> {
            Ok(vec![self.0; cloud.len()])
        }
    }

    struct Down;

    impl NormalEstimator for Down {
        fn estimate_normals(&self, _: &PointCloud, timeout: Duration) -> ServiceResult<Vec<Vector3<f32>>> {
            Err(ServiceError::Timeout {
                service: "get_normals".into(),
                timeout,
            })
        }
    }

    fn red_patch() -> PointCloud {
        let points = (0..12).map(|i| Point3::new(i as f32 * 0.01, 0.0, 0.8)).collect();
        PointCloud::new(points)
            .with_colors(vec![Point3::new(1.0, 0.0, 0.0); 12])
            .unwrap()
    }

    #[test]
    fn test_feature_length_and_halves() {
        let fx = FeatureExtractor::default();
        let f = fx.extract(&red_patch(), &FixedNormals(Vector3::z())).unwrap();

        assert_eq!(f.len(), fx.config().feature_len());
        let (color, normal) = f.as_slice().split_at(96);
        assert!((color.iter().sum::<f32>() - 1.0).abs() < 1e-5);
        assert!((normal.iter().sum::<f32>() - 1.0).abs() < 1e-5);
    }

    #[test]
    fn test_service_timeout_surfaces() {
        let err = FeatureExtractor::default().extract(&red_patch(), &Down).unwrap_err();
        assert!(matches!(err, FeatureError::Normals(ref e) if e.is_timeout()));
    }

    #[test]
    fn test_empty_cluster_rejected() {
        let err = FeatureExtractor::default()
            .extract(&PointCloud::default(), &FixedNormals(Vector3::z()))
            .unwrap_err();
        assert!(matches!(err, FeatureError::EmptyCluster));
    }
}
