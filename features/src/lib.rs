pub mod color;
pub mod descriptor;
pub mod histogram;
pub mod normals;

pub use color::*;
pub use descriptor::*;
pub use histogram::*;
pub use normals::*;

use pnp_core::ServiceError;

pub type Result<T> = std::result::Result<T, FeatureError>;

#[derive(Debug, thiserror::Error)]
pub enum FeatureError {
    #[error("Empty cluster: no points to describe")]
    EmptyCluster,

    #[error("Normal estimation error: {0}")]
    Normals(#[from] ServiceError),

    #[error("Normal count {normals} does not match point count {points}")]
    NormalCountMismatch { normals: usize, points: usize },
}
