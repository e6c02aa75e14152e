//! Cloud preprocessing filters.
//!
//! Every filter returns a new cloud; colors and normals follow their points.

use crate::spatial::{build_index, is_finite, query};
use crate::{Axis, PreprocessConfig};
use nalgebra::{Point3, Vector3};
use pnp_core::PointCloud;
use rayon::prelude::*;
use rstar::PointDistance;

/// Drop points with a NaN or infinite coordinate.
pub fn remove_non_finite(pc: &PointCloud) -> PointCloud {
    pc.retain(|i| is_finite(&pc.points[i]))
}

/// Remove statistical outliers.
///
/// Computes each point's mean distance to its `k` nearest neighbours. Points whose
/// mean distance exceeds `global_mean + stddev_mul * global_stddev` are removed.
/// Non-finite points are always removed and do not enter the statistics.
/// Returns the filtered cloud and the indices of the kept points.
pub fn remove_statistical_outliers(
    pc: &PointCloud,
    k: usize,
    stddev_mul: f64,
) -> (PointCloud, Vec<usize>) {
    if pc.len() < 2 || k == 0 {
        let inliers = (0..pc.len()).filter(|&i| is_finite(&pc.points[i])).collect();
        return (remove_non_finite(pc), inliers);
    }

    let tree = build_index(&pc.points);

    let distances: Vec<f64> = pc
        .points
        .par_iter()
        .map(|p| {
            if !is_finite(p) {
                return f64::INFINITY;
            }
            let q = query(p);
            // The nearest hit is the point itself.
            let (sum, count) = tree
                .nearest_neighbor_iter(&q)
                .skip(1)
                .take(k)
                .fold((0.0f64, 0usize), |(sum, count), n| {
                    (sum + (n.distance_2(&q) as f64).sqrt(), count + 1)
                });

            if count > 0 {
                sum / count as f64
            } else {
                0.0
            }
        })
        .collect();

    let finite: Vec<f64> = distances.iter().copied().filter(|d| d.is_finite()).collect();
    if finite.is_empty() {
        return (PointCloud::new(Vec::new()), Vec::new());
    }
    let n = finite.len() as f64;
    let mean = finite.iter().sum::<f64>() / n;
    let variance = finite.iter().map(|d| (d - mean) * (d - mean)).sum::<f64>() / n;
    let threshold = mean + stddev_mul * variance.sqrt();
    let keep = |d: f64| d.is_finite() && d <= threshold;

    let inliers: Vec<usize> = distances
        .iter()
        .enumerate()
        .filter(|(_, &d)| keep(d))
        .map(|(i, _)| i)
        .collect();

    let kept = pc.retain(|i| keep(distances[i]));
    (kept, inliers)
}

/// Downsample with a uniform voxel grid of edge `leaf_size`.
/// Each occupied voxel is replaced by the centroid of its points (and colors).
/// Non-finite points fall in no voxel.
pub fn voxel_down_sample(pc: &PointCloud, leaf_size: f32) -> PointCloud {
    if leaf_size <= 0.0 || pc.is_empty() {
        return pc.clone();
    }

    let n = pc.len();
    let mut indices: Vec<(i64, i64, i64, usize)> = pc
        .points
        .iter()
        .enumerate()
        .filter(|(_, p)| is_finite(p))
        .map(|(i, p)| {
            (
                (p.x / leaf_size).floor() as i64,
                (p.y / leaf_size).floor() as i64,
                (p.z / leaf_size).floor() as i64,
                i,
            )
        })
        .collect();

    // Stable so that points inside one voxel keep input order.
    if n > 10000 {
        indices.par_sort_by(|a, b| (a.0, a.1, a.2).cmp(&(b.0, b.1, b.2)));
    } else {
        indices.sort_by(|a, b| (a.0, a.1, a.2).cmp(&(b.0, b.1, b.2)));
    }

    let mut points = Vec::new();
    let mut colors = pc.colors.as_ref().map(|_| Vec::new());
    let mut normals = pc.normals.as_ref().map(|_| Vec::new());

    let mut start = 0;
    while start < indices.len() {
        let key = (indices[start].0, indices[start].1, indices[start].2);
        let mut end = start;
        while end < indices.len() && (indices[end].0, indices[end].1, indices[end].2) == key {
            end += 1;
        }

        let members = &indices[start..end];
        let factor = 1.0 / members.len() as f32;

        let sum_p = members
            .iter()
            .fold(Vector3::zeros(), |acc, m| acc + pc.points[m.3].coords);
        points.push(Point3::from(sum_p * factor));

        if let (Some(out), Some(src)) = (colors.as_mut(), pc.colors.as_ref()) {
            let sum_c = members.iter().fold(Vector3::zeros(), |acc, m| acc + src[m.3].coords);
            out.push(Point3::from(sum_c * factor));
        }

        if let (Some(out), Some(src)) = (normals.as_mut(), pc.normals.as_ref()) {
            let mut sum_n = members.iter().fold(Vector3::zeros(), |acc, m| acc + src[m.3]);
            if sum_n.norm_squared() > 1e-12 {
                sum_n.normalize_mut();
            }
            out.push(sum_n);
        }

        start = end;
    }

    PointCloud {
        points,
        colors,
        normals,
    }
}

/// Keep points whose coordinate on `axis` lies in `[min, max]`.
pub fn clip_axis_range(pc: &PointCloud, axis: Axis, min: f32, max: f32) -> PointCloud {
    let a = axis.index();
    pc.retain(|i| {
        let v = pc.points[i][a];
        v >= min && v <= max
    })
}

/// Outlier removal, then voxel downsampling, then each axis clip in order.
#[derive(Debug, Clone, Default)]
pub struct Preprocessor {
    config: PreprocessConfig,
}

impl Preprocessor {
    pub fn new(config: PreprocessConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &PreprocessConfig {
        &self.config
    }

    pub fn run(&self, raw: &PointCloud) -> PointCloud {
        let finite = remove_non_finite(raw);
        if finite.len() < raw.len() {
            tracing::debug!("preprocess: dropped {} non-finite points", raw.len() - finite.len());
        }
        let (denoised, _) = remove_statistical_outliers(
            &finite,
            self.config.outlier_mean_k,
            self.config.outlier_stddev_mul,
        );
        let mut cloud = voxel_down_sample(&denoised, self.config.leaf_size);
        for clip in &self.config.clips {
            cloud = clip_axis_range(&cloud, clip.axis, clip.min, clip.max);
        }

        tracing::debug!(
            "preprocess: {} raw -> {} denoised -> {} filtered",
            raw.len(),
            denoised.len(),
            cloud.len()
        );
        cloud
    }
}
