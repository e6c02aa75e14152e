use nalgebra::Point3;
use serde::Serialize;

/// Text marker placed above a detected object.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LabelMarker {
    pub id: usize,
    pub label: String,
    pub position: Point3<f32>,
}

impl LabelMarker {
    /// Marker `z_offset` above `anchor`, usually the cluster's first point.
    pub fn above(id: usize, label: &str, anchor: &Point3<f32>, z_offset: f32) -> Self {
        Self {
            id,
            label: label.to_string(),
            position: Point3::new(anchor.x, anchor.y, anchor.z + z_offset),
        }
    }
}
