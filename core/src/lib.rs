pub mod cluster;
pub mod point_cloud;
pub mod robust;
pub mod service;

pub use cluster::*;
pub use point_cloud::*;
pub use robust::*;
pub use service::*;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Index {index} out of bounds for cloud of {len} points")]
    IndexOutOfBounds { index: usize, len: usize },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Parse error: {0}")]
    Parse(String),

    #[error("Unsupported format: {0}")]
    UnsupportedFormat(String),
}
