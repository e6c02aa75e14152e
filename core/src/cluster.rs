use crate::point_cloud::PointCloud;

/// A set of indices into the objects cloud a cluster was extracted from.
///
/// Indices are stored in ascending order.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Cluster {
    indices: Vec<usize>,
}

impl Cluster {
    pub fn new(mut indices: Vec<usize>) -> Self {
        indices.sort_unstable();
        indices.dedup();
        Self { indices }
    }

    pub fn indices(&self) -> &[usize] {
        &self.indices
    }

    pub fn len(&self) -> usize {
        self.indices.len()
    }

    pub fn is_empty(&self) -> bool {
        self.indices.is_empty()
    }

    pub fn contains(&self, index: usize) -> bool {
        self.indices.binary_search(&index).is_ok()
    }

    /// The cluster's points, copied out of `cloud` with their colors.
    pub fn extract(&self, cloud: &PointCloud) -> crate::Result<PointCloud> {
        cloud.select(&self.indices)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use nalgebra::Point3;

    #[test]
    fn test_cluster_sorted_and_deduplicated() {
        let c = Cluster::new(vec![5, 1, 3, 1]);
        assert_eq!(c.indices(), &[1, 3, 5]);
        assert!(c.contains(3));
        assert!(!c.contains(2));
    }

    #[test]
    fn test_extract_points() {
        let cloud = PointCloud::new((0..4).map(|i| Point3::new(i as f32, 0.0, 0.0)).collect());
        let c = Cluster::new(vec![2, 3]);
        let pts = c.extract(&cloud).unwrap();
        assert_eq!(pts.points, vec![Point3::new(2.0, 0.0, 0.0), Point3::new(3.0, 0.0, 0.0)]);
    }
}
