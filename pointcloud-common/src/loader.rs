//! Point cloud loader
//!
//! Reads a whole `.pts` file from disk and decodes it. The read is the only
//! side effect.

use std::fs;
use std::io::ErrorKind;
use std::path::Path;

use crate::error::PointFileError;
use crate::formats::pts::decode_points;
use crate::point::PointCloud;

/// Load a point file from `path`
pub fn load_point_file(path: &Path) -> Result<PointCloud, PointFileError> {
    let bytes = fs::read(path).map_err(|source| match source.kind() {
        ErrorKind::NotFound => PointFileError::FileNotFound(path.to_path_buf()),
        _ => PointFileError::Io {
            path: path.to_path_buf(),
            source,
        },
    })?;

    let cloud = decode_points(&bytes)?;
    tracing::debug!("Loaded {} points from {:?}", cloud.len(), path);
    Ok(cloud)
}
