//! Normal estimation using PCA on k-nearest neighbours.

use crate::spatial::{build_index, is_finite, query};
use nalgebra::{Matrix3, Point3, SymmetricEigen, Vector3};
use pnp_core::PointCloud;
use rayon::prelude::*;

/// Estimate one unit normal per point from the covariance of its `k` nearest
/// neighbours. Normals are flipped to face `viewpoint`. A non-finite point gets
/// the +z fallback normal.
pub fn estimate_normals(pc: &PointCloud, k: usize, viewpoint: Point3<f32>) -> Vec<Vector3<f32>> {
    if pc.is_empty() {
        return Vec::new();
    }

    let tree = build_index(&pc.points);

    pc.points
        .par_iter()
        .map(|p| {
            if !is_finite(p) {
                return Vector3::z();
            }
            let neighbors: Vec<_> = tree.nearest_neighbor_iter(&query(p)).take(k).collect();

            if neighbors.len() < 3 {
                return Vector3::z();
            }

            let centroid = neighbors
                .iter()
                .fold(Vector3::zeros(), |acc, n| acc + n.1.coords)
                / neighbors.len() as f32;

            let cov = neighbors.iter().fold(Matrix3::zeros(), |acc, n| {
                let d = n.1.coords - centroid;
                acc + d * d.transpose()
            }) / neighbors.len() as f32;

            let eigen = SymmetricEigen::new(cov);
            let min_idx = eigen.eigenvalues.imin();
            let mut normal: Vector3<f32> = eigen.eigenvectors.column(min_idx).into_owned();

            if normal.dot(&(viewpoint - p)) < 0.0 {
                normal = -normal;
            }
            normal
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_plane_normals_face_viewpoint() {
        let mut points = Vec::new();
        for i in 0..6 {
            for j in 0..6 {
                points.push(Point3::new(i as f32 * 0.01, j as f32 * 0.01, 1.0));
            }
        }
        let pc = PointCloud::new(points);
        let normals = estimate_normals(&pc, 8, Point3::origin());

        assert_eq!(normals.len(), 36);
        for n in &normals {
            assert!(n.z < -0.9, "normal {:?} should point back at the sensor", n);
        }
    }

    #[test]
    fn test_too_few_neighbours_default_up() {
        let pc = PointCloud::new(vec![Point3::new(0.0, 0.0, 0.0), Point3::new(1.0, 0.0, 0.0)]);
        let normals = estimate_normals(&pc, 5, Point3::origin());
        assert_eq!(normals, vec![Vector3::z(), Vector3::z()]);
    }

    #[test]
    fn test_nan_point_keeps_plane_normals() {
        let mut points = Vec::new();
        for i in 0..6 {
            for j in 0..6 {
                points.push(Point3::new(i as f32 * 0.01, j as f32 * 0.01, 1.0));
            }
        }
        points.push(Point3::new(f32::NAN, f32::NAN, f32::NAN));
        let normals = estimate_normals(&PointCloud::new(points), 8, Point3::origin());

        assert_eq!(normals.len(), 37);
        assert_eq!(normals[36], Vector3::z());
        assert!(normals[..36].iter().all(|n| n.z < -0.9));
    }
}
