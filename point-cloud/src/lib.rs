//! Point cloud processing for the perception front end.
//!
//! # Module Organization
//!
//! - `cpu::filtering`: statistical outlier removal, voxel grid downsampling, axis clipping
//! - `cpu::segmentation`: RANSAC plane segmentation
//! - `cpu::clustering`: Euclidean cluster extraction
//! - `cpu::normals`: k-nearest-neighbour PCA normal estimation
//!
//! The stateful wrappers [`Preprocessor`], [`PlaneSegmenter`] and
//! [`ClusterExtractor`] bundle each stage with its configuration.

pub mod cpu;
mod spatial;

pub use cpu::*;

use serde::{Deserialize, Serialize};
use std::fmt;

/// Coordinate axis used by pass-through clipping.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Axis {
    X,
    Y,
    Z,
}

impl Axis {
    pub fn index(self) -> usize {
        match self {
            Axis::X => 0,
            Axis::Y => 1,
            Axis::Z => 2,
        }
    }
}

impl fmt::Display for Axis {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Axis::X => "x",
            Axis::Y => "y",
            Axis::Z => "z",
        };
        f.write_str(name)
    }
}

/// Closed interval on one axis.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct AxisClip {
    pub axis: Axis,
    pub min: f32,
    pub max: f32,
}

impl AxisClip {
    pub fn new(axis: Axis, min: f32, max: f32) -> Self {
        Self { axis, min, max }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PreprocessConfig {
    /// Neighbours used for the mean-distance estimate.
    pub outlier_mean_k: usize,
    pub outlier_stddev_mul: f64,
    pub leaf_size: f32,
    /// Applied in order after downsampling.
    pub clips: Vec<AxisClip>,
}

impl Default for PreprocessConfig {
    fn default() -> Self {
        Self {
            outlier_mean_k: 50,
            outlier_stddev_mul: 0.1,
            leaf_size: 0.01,
            clips: vec![
                AxisClip::new(Axis::Z, 0.6, 1.2),
                AxisClip::new(Axis::Y, -0.5, 0.5),
            ],
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PlaneConfig {
    pub distance_threshold: f32,
    pub max_iterations: usize,
    pub confidence: f64,
    /// Fixed RANSAC seed. `None` draws a fresh seed every cycle.
    pub seed: Option<u64>,
}

impl Default for PlaneConfig {
    fn default() -> Self {
        Self {
            distance_threshold: 0.02,
            max_iterations: 1000,
            confidence: 0.99,
            seed: None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ClusterConfig {
    pub tolerance: f32,
    pub min_size: usize,
    pub max_size: usize,
}

impl Default for ClusterConfig {
    fn default() -> Self {
        Self {
            tolerance: 0.02,
            min_size: 10,
            max_size: 20000,
        }
    }
}
