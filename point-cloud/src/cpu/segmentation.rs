//! RANSAC plane segmentation.

use crate::PlaneConfig;
use nalgebra::{Matrix3, Point3, SymmetricEigen, Vector3};
use pnp_core::{PointCloud, Ransac, RobustConfig, RobustModel};

/// Minimum inliers for a fitted plane to count as a support surface.
const MIN_PLANE_INLIERS: usize = 3;

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum SegmentationError {
    #[error("Plane segmentation needs at least {required} points, got {actual}")]
    TooFewPoints { required: usize, actual: usize },

    #[error("No planar model within {threshold} of enough points among {points}")]
    NoPlane { threshold: f32, points: usize },
}

pub struct PlaneEstimator;

impl RobustModel<Point3<f32>> for PlaneEstimator {
    type Model = [f32; 4];

    fn min_sample_size(&self) -> usize {
        3
    }

    fn estimate(&self, data: &[&Point3<f32>]) -> Option<Self::Model> {
        let (p1, p2, p3) = (data[0], data[1], data[2]);
        let normal = (p2 - p1).cross(&(p3 - p1)).try_normalize(1e-12)?;
        let d = -normal.dot(&p1.coords);
        Some([normal.x, normal.y, normal.z, d])
    }

    fn compute_error(&self, model: &Self::Model, data: &Point3<f32>) -> f64 {
        let [a, b, c, d] = *model;
        ((a * data.x + b * data.y + c * data.z + d).abs()) as f64
    }
}

/// Support plane split of a cloud.
#[derive(Debug, Clone, PartialEq)]
pub struct PlaneSegmentation {
    /// Unit-normal plane `ax + by + cz + d = 0`.
    pub coefficients: [f32; 4],
    pub inliers: Vec<usize>,
    pub outliers: Vec<usize>,
}

impl PlaneSegmentation {
    /// The plane's points (the support surface).
    pub fn table(&self, cloud: &PointCloud) -> pnp_core::Result<PointCloud> {
        cloud.select(&self.inliers)
    }

    /// Everything off the plane (candidate objects).
    pub fn objects(&self, cloud: &PointCloud) -> pnp_core::Result<PointCloud> {
        cloud.select(&self.outliers)
    }
}

/// Fit the dominant plane of `pc`. Points within `config.distance_threshold` are inliers.
pub fn segment_plane(
    pc: &PointCloud,
    config: &PlaneConfig,
) -> Result<PlaneSegmentation, SegmentationError> {
    let estimator = PlaneEstimator;
    let required = estimator.min_sample_size();
    if pc.len() < required {
        return Err(SegmentationError::TooFewPoints {
            required,
            actual: pc.len(),
        });
    }

    let ransac = Ransac::new(RobustConfig {
        threshold: config.distance_threshold as f64,
        max_iterations: config.max_iterations,
        confidence: config.confidence,
        seed: config.seed,
    });
    let res = ransac.run(&estimator, &pc.points);

    let model = match res.model {
        Some(model) if res.num_inliers >= MIN_PLANE_INLIERS => model,
        _ => {
            return Err(SegmentationError::NoPlane {
                threshold: config.distance_threshold,
                points: pc.len(),
            })
        }
    };

    let mut coefficients = model;
    let mut mask = res.inliers;

    // Least-squares refit on the consensus set, kept only if it does not lose support.
    if let Some(refined) = fit_plane(&pc.points, &mask) {
        let refined_mask: Vec<bool> = pc
            .points
            .iter()
            .map(|p| estimator.compute_error(&refined, p) <= config.distance_threshold as f64)
            .collect();
        let count = refined_mask.iter().filter(|&&m| m).count();
        if count >= res.num_inliers {
            coefficients = refined;
            mask = refined_mask;
        }
    }

    let (inliers, outliers): (Vec<usize>, Vec<usize>) = (0..pc.len()).partition(|&i| mask[i]);

    tracing::debug!(
        "plane {:?}: {} inliers, {} outliers after {} iterations",
        coefficients,
        inliers.len(),
        outliers.len(),
        res.iterations
    );

    Ok(PlaneSegmentation {
        coefficients,
        inliers,
        outliers,
    })
}

/// Total least squares plane through the masked points.
fn fit_plane(points: &[Point3<f32>], mask: &[bool]) -> Option<[f32; 4]> {
    let selected: Vec<&Point3<f32>> = points
        .iter()
        .zip(mask)
        .filter(|(_, &m)| m)
        .map(|(p, _)| p)
        .collect();
    if selected.len() < 3 {
        return None;
    }

    let n = selected.len() as f32;
    let centroid = selected.iter().fold(Vector3::zeros(), |acc, p| acc + p.coords) / n;
    let cov = selected.iter().fold(Matrix3::zeros(), |acc, p| {
        let d = p.coords - centroid;
        acc + d * d.transpose()
    }) / n;

    let eigen = SymmetricEigen::new(cov);
    let normal: Vector3<f32> = eigen
        .eigenvectors
        .column(eigen.eigenvalues.imin())
        .into_owned()
        .try_normalize(1e-12)?;
    let d = -normal.dot(&centroid);
    Some([normal.x, normal.y, normal.z, d])
}

#[derive(Debug, Clone, Default)]
pub struct PlaneSegmenter {
    config: PlaneConfig,
}

impl PlaneSegmenter {
    pub fn new(config: PlaneConfig) -> Self {
        Self { config }
    }

    pub fn segment(&self, cloud: &PointCloud) -> Result<PlaneSegmentation, SegmentationError> {
        segment_plane(cloud, &self.config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config(seed: u64) -> PlaneConfig {
        PlaneConfig {
            distance_threshold: 0.1,
            max_iterations: 100,
            confidence: 0.99,
            seed: Some(seed),
        }
    }

    #[test]
    fn test_segment_plane() {
        let mut points = Vec::new();
        for x in 0..10 {
            for y in 0..10 {
                points.push(Point3::new(x as f32, y as f32, 0.0));
            }
        }
        points.push(Point3::new(0.0, 0.0, 10.0));
        points.push(Point3::new(1.0, 1.0, 10.0));

        let pc = PointCloud::new(points);
        let seg = segment_plane(&pc, &config(1)).unwrap();

        let [_, _, c, d] = seg.coefficients;
        assert!(c.abs() > 0.9);
        assert!(d.abs() < 0.1);
        assert_eq!(seg.inliers.len(), 100);
        assert_eq!(seg.outliers, vec![100, 101]);
    }

    #[test]
    fn test_too_few_points() {
        let pc = PointCloud::new(vec![Point3::new(0.0, 0.0, 0.0), Point3::new(1.0, 0.0, 0.0)]);
        assert_eq!(
            segment_plane(&pc, &config(1)),
            Err(SegmentationError::TooFewPoints { required: 3, actual: 2 })
        );
    }

    #[test]
    fn test_colinear_points_have_no_plane() {
        let pc = PointCloud::new((0..20).map(|i| Point3::new(i as f32, 0.0, 0.0)).collect());
        let err = segment_plane(&pc, &config(3)).unwrap_err();
        assert!(matches!(err, SegmentationError::NoPlane { .. }));
    }

    #[test]
    fn test_table_and_objects_partition_cloud() {
        let mut points = Vec::new();
        for x in 0..20 {
            for y in 0..20 {
                points.push(Point3::new(x as f32 * 0.01, y as f32 * 0.01, 0.7));
            }
        }
        for i in 0..15 {
            points.push(Point3::new(0.1, 0.1, 0.8 + i as f32 * 0.01));
        }
        let pc = PointCloud::new(points);
        let seg = PlaneSegmenter::new(PlaneConfig {
            seed: Some(11),
            ..PlaneConfig::default()
        })
        .segment(&pc)
        .unwrap();

        let table = seg.table(&pc).unwrap();
        let objects = seg.objects(&pc).unwrap();
        assert_eq!(table.len() + objects.len(), pc.len());
        assert_eq!(objects.len(), 15);
        assert!(table.points.iter().all(|p| (p.z - 0.7).abs() < 1e-6));
    }
}
