//! CPU point cloud operations
//!
//! - Filtering (outlier removal, voxel downsampling, axis clipping)
//! - Plane segmentation
//! - Euclidean clustering
//! - Normal estimation

pub mod clustering;
pub mod filtering;
pub mod normals;
pub mod segmentation;

pub use clustering::*;
pub use filtering::*;
pub use normals::*;
pub use segmentation::*;
