//! Point cloud file I/O
//!
//! Frames are exchanged as ASCII files:
//! - PLY (Polygon File Format), used for published perception clouds
//! - PCD (Point Cloud Data, PCL format), the usual capture format

pub mod pcd;
pub mod ply;

pub use pcd::{pack_rgb, read_pcd, unpack_rgb, write_pcd, PcdData};
pub use ply::{read_ply, write_ply};

pub use pnp_core::{Error, Result};

use pnp_core::PointCloud;
use std::fs::File;
use std::io::{BufReader, BufWriter, Write};
use std::path::Path;

/// Upper bound on rows reserved up front from a header's declared count.
/// Larger clouds still load; their buffers grow as rows are read.
const MAX_RESERVED_ROWS: usize = 1 << 20;

pub(crate) fn reserve_rows(declared: usize) -> usize {
    declared.min(MAX_RESERVED_ROWS)
}

/// On-disk cloud format, chosen by file extension.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CloudFormat {
    Ply,
    Pcd,
}

impl CloudFormat {
    pub fn from_path(path: &Path) -> Result<Self> {
        let ext = path
            .extension()
            .and_then(|e| e.to_str())
            .map(|e| e.to_ascii_lowercase());
        match ext.as_deref() {
            Some("ply") => Ok(CloudFormat::Ply),
            Some("pcd") => Ok(CloudFormat::Pcd),
            _ => Err(Error::UnsupportedFormat(format!(
                "cannot infer cloud format from '{}'",
                path.display()
            ))),
        }
    }
}

/// Read a cloud, picking the parser from the file extension.
pub fn read_cloud<P: AsRef<Path>>(path: P) -> Result<PointCloud> {
    let path = path.as_ref();
    let format = CloudFormat::from_path(path)?;
    let reader = BufReader::new(File::open(path)?);
    let cloud = match format {
        CloudFormat::Ply => read_ply(reader)?,
        CloudFormat::Pcd => read_pcd(reader)?,
    };
    tracing::debug!("Read {} points from {}", cloud.len(), path.display());
    Ok(cloud)
}

/// Write a cloud, picking the encoder from the file extension.
pub fn write_cloud<P: AsRef<Path>>(path: P, cloud: &PointCloud) -> Result<()> {
    let path = path.as_ref();
    let format = CloudFormat::from_path(path)?;
    let mut writer = BufWriter::new(File::create(path)?);
    match format {
        CloudFormat::Ply => write_ply(&mut writer, cloud)?,
        CloudFormat::Pcd => write_pcd(&mut writer, cloud)?,
    }
    writer.flush()?;
    Ok(())
}
