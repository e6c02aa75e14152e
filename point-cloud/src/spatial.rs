use nalgebra::Point3;
use rstar::{PointDistance, RTree, RTreeObject, AABB};

/// A point tagged with its index in the source cloud, for R-tree queries.
pub(crate) struct IndexedPoint(pub usize, pub Point3<f32>);

impl RTreeObject for IndexedPoint {
    type Envelope = AABB<[f32; 3]>;

    fn envelope(&self) -> Self::Envelope {
        AABB::from_point([self.1.x, self.1.y, self.1.z])
    }
}

impl PointDistance for IndexedPoint {
    fn distance_2(&self, point: &[f32; 3]) -> f32 {
        let dx = self.1.x - point[0];
        let dy = self.1.y - point[1];
        let dz = self.1.z - point[2];
        dx * dx + dy * dy + dz * dz
    }
}

/// Bulk-load an R-tree over positions only. Non-finite points are left out
/// because the bulk loader cannot order them.
pub(crate) fn build_index(points: &[Point3<f32>]) -> RTree<IndexedPoint> {
    let wrappers = points
        .iter()
        .enumerate()
        .filter(|(_, p)| is_finite(p))
        .map(|(i, p)| IndexedPoint(i, *p))
        .collect();
    RTree::bulk_load(wrappers)
}

pub(crate) fn is_finite(p: &Point3<f32>) -> bool {
    p.coords.iter().all(|v| v.is_finite())
}

pub(crate) fn query(p: &Point3<f32>) -> [f32; 3] {
    [p.x, p.y, p.z]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_index_skips_non_finite_points() {
        let points = vec![
            Point3::new(0.0, 0.0, 0.0),
            Point3::new(f32::NAN, 0.0, 0.0),
            Point3::new(1.0, f32::INFINITY, 0.0),
            Point3::new(0.1, 0.0, 0.0),
        ];
        let tree = build_index(&points);

        assert_eq!(tree.size(), 2);
        let near: Vec<usize> = tree.nearest_neighbor_iter(&[0.0, 0.0, 0.0]).map(|n| n.0).collect();
        assert_eq!(near, vec![0, 3]);
    }
}
