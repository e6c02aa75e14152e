//! Euclidean cluster extraction.

use crate::spatial::{build_index, is_finite, query};
use crate::ClusterConfig;
use pnp_core::{Cluster, PointCloud};

/// Connected components of `pc` under the distance `tolerance`.
///
/// Only positions are used. Components with fewer than `min_size` or more than
/// `max_size` points are dropped. Clusters come out in discovery order: a scan
/// over point indices starting a flood fill at each unvisited point, so the
/// order depends on the input point ordering. Non-finite points join no cluster.
pub fn euclidean_cluster(
    pc: &PointCloud,
    tolerance: f32,
    min_size: usize,
    max_size: usize,
) -> Vec<Cluster> {
    let n = pc.len();
    if n == 0 {
        return Vec::new();
    }

    let tree = build_index(&pc.points);
    let tol2 = tolerance * tolerance;

    let mut processed = vec![false; n];
    let mut clusters = Vec::new();

    for seed in 0..n {
        if processed[seed] {
            continue;
        }
        processed[seed] = true;
        if !is_finite(&pc.points[seed]) {
            continue;
        }

        let mut members = vec![seed];
        let mut head = 0;
        while head < members.len() {
            let current = members[head];
            head += 1;

            for nb in tree.locate_within_distance(query(&pc.points[current]), tol2) {
                if !processed[nb.0] {
                    processed[nb.0] = true;
                    members.push(nb.0);
                }
            }
        }

        if members.len() >= min_size && members.len() <= max_size {
            clusters.push(Cluster::new(members));
        }
    }

    tracing::debug!("extracted {} clusters from {} points", clusters.len(), n);
    clusters
}

#[derive(Debug, Clone, Default)]
pub struct ClusterExtractor {
    config: ClusterConfig,
}

impl ClusterExtractor {
    pub fn new(config: ClusterConfig) -> Self {
        Self { config }
    }

    pub fn extract(&self, objects: &PointCloud) -> Vec<Cluster> {
        euclidean_cluster(
            objects,
            self.config.tolerance,
            self.config.min_size,
            self.config.max_size,
        )
    }
}
