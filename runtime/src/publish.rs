//! Per-cycle perception products and where they go.

use nalgebra::Point3;
use pnp_core::PointCloud;
use pnp_objdetect::LabelMarker;
use serde::Serialize;
use std::fs::File;
use std::path::{Path, PathBuf};

/// A labelled detection as published for visualization.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DetectionSummary {
    pub label: String,
    pub points: usize,
    pub centroid: Option<Point3<f32>>,
}

/// Everything one cycle produced before task resolution.
#[derive(Debug, Clone, Default)]
pub struct PerceptionOutput {
    pub sequence: u64,
    pub objects: PointCloud,
    pub table: PointCloud,
    /// Every cluster, each painted with its own palette color.
    pub clustered: PointCloud,
    pub markers: Vec<LabelMarker>,
    pub detected: Vec<DetectionSummary>,
}

impl PerceptionOutput {
    pub fn labels(&self) -> Vec<&str> {
        self.detected.iter().map(|d| d.label.as_str()).collect()
    }
}

/// Receives each cycle's [`PerceptionOutput`]. Failures are logged, not fatal.
pub trait PerceptionSink: Send {
    fn publish(&mut self, output: &PerceptionOutput) -> pnp_core::Result<()>;
}

/// Discards everything.
#[derive(Debug, Clone, Copy, Default)]
pub struct NullSink;

impl PerceptionSink for NullSink {
    fn publish(&mut self, _output: &PerceptionOutput) -> pnp_core::Result<()> {
        Ok(())
    }
}

/// Keeps every output; useful when driving the pipeline from tests.
#[derive(Debug, Clone, Default)]
pub struct RecordingSink {
    pub outputs: Vec<PerceptionOutput>,
}

impl PerceptionSink for RecordingSink {
    fn publish(&mut self, output: &PerceptionOutput) -> pnp_core::Result<()> {
        self.outputs.push(output.clone());
        Ok(())
    }
}

#[derive(Serialize)]
struct MarkerFile<'a> {
    sequence: u64,
    markers: &'a [LabelMarker],
    detected_objects: &'a [DetectionSummary],
}

/// Writes the cycle's clouds as PLY and its markers as YAML into a directory.
///
/// Files are overwritten every cycle: `pcl_objects.ply`, `pcl_table.ply`,
/// `pcl_cluster.ply` and `object_markers.yaml`.
#[derive(Debug, Clone)]
pub struct PlyPublisher {
    dir: PathBuf,
}

impl PlyPublisher {
    pub fn new<P: AsRef<Path>>(dir: P) -> Self {
        Self {
            dir: dir.as_ref().to_path_buf(),
        }
    }
}

impl PerceptionSink for PlyPublisher {
    fn publish(&mut self, output: &PerceptionOutput) -> pnp_core::Result<()> {
        pnp_io::write_cloud(self.dir.join("pcl_objects.ply"), &output.objects)?;
        pnp_io::write_cloud(self.dir.join("pcl_table.ply"), &output.table)?;
        pnp_io::write_cloud(self.dir.join("pcl_cluster.ply"), &output.clustered)?;

        let markers = MarkerFile {
            sequence: output.sequence,
            markers: &output.markers,
            detected_objects: &output.detected,
        };
        let file = File::create(self.dir.join("object_markers.yaml"))?;
        serde_yaml::to_writer(file, &markers)
            .map_err(|e| pnp_core::Error::InvalidInput(e.to_string()))?;

        tracing::debug!("Published cycle {} to {}", output.sequence, self.dir.display());
        Ok(())
    }
}
