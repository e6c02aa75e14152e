//! Per-cycle store of classified objects.

use crate::palette::ColorPalette;
use crate::Result;
use nalgebra::Point3;
use pnp_core::{Cluster, PointCloud};
use std::sync::OnceLock;

/// A classified cluster. The label is fixed at construction.
#[derive(Debug, Clone)]
pub struct DetectedObject {
    label: String,
    cloud: PointCloud,
    centroid: OnceLock<Option<Point3<f32>>>,
}

impl DetectedObject {
    pub fn new(label: impl Into<String>, cloud: PointCloud) -> Self {
        Self {
            label: label.into(),
            cloud,
            centroid: OnceLock::new(),
        }
    }

    pub fn label(&self) -> &str {
        &self.label
    }

    pub fn cloud(&self) -> &PointCloud {
        &self.cloud
    }

    /// Mean of the object's point positions, computed on first use.
    /// `None` only for an object with no points.
    pub fn centroid(&self) -> Option<Point3<f32>> {
        *self.centroid.get_or_init(|| self.cloud.centroid())
    }
}

/// Detections of the current cycle, in cluster-extraction order.
///
/// Detections are cleared at the start of every cycle. The cluster color
/// palette lives as long as the registry.
#[derive(Debug, Clone, Default)]
pub struct ObjectRegistry {
    objects: Vec<DetectedObject>,
    palette: ColorPalette,
}

impl ObjectRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_palette(palette: ColorPalette) -> Self {
        Self {
            objects: Vec::new(),
            palette,
        }
    }

    /// Drop the previous cycle's detections.
    pub fn begin_cycle(&mut self) {
        self.objects.clear();
    }

    pub fn push(&mut self, object: DetectedObject) {
        self.objects.push(object);
    }

    pub fn objects(&self) -> &[DetectedObject] {
        &self.objects
    }

    pub fn len(&self) -> usize {
        self.objects.len()
    }

    pub fn is_empty(&self) -> bool {
        self.objects.is_empty()
    }

    pub fn labels(&self) -> Vec<&str> {
        self.objects.iter().map(|o| o.label()).collect()
    }

    /// First detection carrying `label`.
    pub fn find_first(&self, label: &str) -> Option<&DetectedObject> {
        self.objects.iter().find(|o| o.label == label)
    }

    pub fn palette(&self) -> &ColorPalette {
        &self.palette
    }

    /// One cloud holding every cluster's points, each cluster painted with its palette color.
    pub fn colorize_clusters(&mut self, objects: &PointCloud, clusters: &[Cluster]) -> Result<PointCloud> {
        let palette = self.palette.colors(clusters.len()).to_vec();

        let mut points = Vec::new();
        let mut colors = Vec::new();
        for (cluster, color) in clusters.iter().zip(palette) {
            let part = cluster.extract(objects)?;
            colors.extend(std::iter::repeat(color).take(part.len()));
            points.extend(part.points);
        }

        Ok(PointCloud::new(points).with_colors(colors)?)
    }
}
