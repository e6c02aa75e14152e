use nalgebra::{Point3, Scalar, Vector3};

/// An ordered, optionally colored point cloud.
///
/// Colors are stored as RGB triples in `[0, 1]`. Every stage of the perception
/// pipeline produces a new cloud rather than mutating its input.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PointCloud<T: Scalar = f32> {
    pub points: Vec<Point3<T>>,
    pub colors: Option<Vec<Point3<T>>>,
    pub normals: Option<Vec<Vector3<T>>>,
}

impl<T: Scalar> PointCloud<T> {
    pub fn new(points: Vec<Point3<T>>) -> Self {
        Self {
            points,
            colors: None,
            normals: None,
        }
    }

    pub fn with_colors(mut self, colors: Vec<Point3<T>>) -> crate::Result<Self> {
        if colors.len() == self.points.len() {
            self.colors = Some(colors);
            Ok(self)
        } else {
            Err(crate::Error::InvalidInput(format!(
                "Color count {} does not match point count {}",
                colors.len(),
                self.points.len()
            )))
        }
    }

    pub fn with_normals(mut self, normals: Vec<Vector3<T>>) -> crate::Result<Self> {
        if normals.len() == self.points.len() {
            self.normals = Some(normals);
            Ok(self)
        } else {
            Err(crate::Error::InvalidInput(format!(
                "Normal count {} does not match point count {}",
                normals.len(),
                self.points.len()
            )))
        }
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    /// Copy out the points at `indices`, in the given order, with their attributes.
    pub fn select(&self, indices: &[usize]) -> crate::Result<Self> {
        let len = self.len();
        if let Some(&index) = indices.iter().find(|&&i| i >= len) {
            return Err(crate::Error::IndexOutOfBounds { index, len });
        }

        Ok(Self {
            points: indices.iter().map(|&i| self.points[i].clone()).collect(),
            colors: self
                .colors
                .as_ref()
                .map(|c| indices.iter().map(|&i| c[i].clone()).collect()),
            normals: self
                .normals
                .as_ref()
                .map(|n| indices.iter().map(|&i| n[i].clone()).collect()),
        })
    }

    /// Keep the points for which `keep(index)` holds. Attributes follow their points.
    pub fn retain<F>(&self, mut keep: F) -> Self
    where
        F: FnMut(usize) -> bool,
    {
        let mask: Vec<bool> = (0..self.len()).map(|i| keep(i)).collect();
        let pick = |i: &usize| mask[*i];

        Self {
            points: (0..self.len())
                .filter(pick)
                .map(|i| self.points[i].clone())
                .collect(),
            colors: self.colors.as_ref().map(|c| {
                (0..self.len()).filter(pick).map(|i| c[i].clone()).collect()
            }),
            normals: self.normals.as_ref().map(|n| {
                (0..self.len()).filter(pick).map(|i| n[i].clone()).collect()
            }),
        }
    }
}

impl PointCloud<f32> {
    /// Elementwise mean of the point positions. `None` for an empty cloud.
    pub fn centroid(&self) -> Option<Point3<f32>> {
        centroid(&self.points)
    }

    /// Drop colors and normals, keeping positions only.
    pub fn positions_only(&self) -> Self {
        Self::new(self.points.clone())
    }
}

/// Mean position of `points`, accumulated in f64.
pub fn centroid(points: &[Point3<f32>]) -> Option<Point3<f32>> {
    if points.is_empty() {
        return None;
    }

    let sum = points.iter().fold(Vector3::<f64>::zeros(), |acc, p| {
        acc + Vector3::new(p.x as f64, p.y as f64, p.z as f64)
    });
    let mean = sum / points.len() as f64;

    Some(Point3::new(mean.x as f32, mean.y as f32, mean.z as f32))
}
