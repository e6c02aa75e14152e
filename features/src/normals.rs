//! Surface normal estimation boundary.
//!
//! Normals come from a blocking service. [`PcaNormalEstimator`] provides an
//! in-process implementation built on the point-cloud crate.

use nalgebra::{Point3, Vector3};
use pnp_core::{call_with_timeout, PointCloud, ServiceResult};
use std::time::Duration;

/// Synchronous normal estimation service: one normal per input point.
pub trait NormalEstimator: Send + Sync {
    fn estimate_normals(
        &self,
        cloud: &PointCloud,
        timeout: Duration,
    ) -> ServiceResult<Vec<Vector3<f32>>>;
}

/// k-nearest-neighbour PCA normals, computed on a worker thread under the deadline.
#[derive(Debug, Clone)]
pub struct PcaNormalEstimator {
    pub k: usize,
    pub viewpoint: Point3<f32>,
}

impl Default for PcaNormalEstimator {
    fn default() -> Self {
        Self {
            k: 15,
            viewpoint: Point3::origin(),
        }
    }
}

impl NormalEstimator for PcaNormalEstimator {
    fn estimate_normals(
        &self,
        cloud: &PointCloud,
        timeout: Duration,
    ) -> ServiceResult<Vec<Vector3<f32>>> {
        let positions = cloud.positions_only();
        let (k, viewpoint) = (self.k, self.viewpoint);
        call_with_timeout("get_normals", timeout, move || {
            Ok(pnp_point_cloud::estimate_normals(&positions, k, viewpoint))
        })
    }
}
