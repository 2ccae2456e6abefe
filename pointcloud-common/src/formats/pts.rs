//! Raw point file format (.pts)
//!
//! Flat array of 32-bit floats, three per point.
//! POD format - no magic bytes, no header, no metadata.
//!
//! # Layout
//! ```text
//! 0x00: x0 f32 (little-endian)
//! 0x04: y0 f32
//! 0x08: z0 f32
//! 0x0C: x1 f32
//! ...
//! ```
//!
//! Byte length must be a multiple of [`POINT_STRIDE`]. An empty file is a
//! valid, empty cloud.

use std::io::{self, Write};

use crate::error::{Malformation, PointFileError};
use crate::point::{Point3, PointCloud};

/// File extension without dot
pub const PTS_EXT: &str = "pts";

/// Size of one scalar in bytes
pub const SCALAR_SIZE: usize = 4;

/// Size of one point record in bytes
pub const POINT_STRIDE: usize = SCALAR_SIZE * 3;

/// Decode a complete point file.
///
/// Point `i` is read from bytes `[12i, 12i + 12)`. Every scalar keeps its
/// exact bit pattern. Fails without returning any points if the buffer is not
/// a whole number of records.
pub fn decode_points(bytes: &[u8]) -> Result<PointCloud, PointFileError> {
    let len = bytes.len();

    let trailing = len % SCALAR_SIZE;
    if trailing != 0 {
        return Err(PointFileError::MalformedInput {
            len,
            reason: Malformation::MisalignedScalar { trailing },
        });
    }

    let trailing = (len / SCALAR_SIZE) % 3;
    if trailing != 0 {
        return Err(PointFileError::MalformedInput {
            len,
            reason: Malformation::IncompleteTriple { trailing },
        });
    }

    let points: Vec<Point3> = bytes
        .chunks_exact(POINT_STRIDE)
        .map(|record| {
            Point3::new(
                read_f32(record, 0),
                read_f32(record, 4),
                read_f32(record, 8),
            )
        })
        .collect();

    tracing::debug!("Decoded {} points from {} bytes", points.len(), len);
    Ok(PointCloud::from_points(points))
}

/// Encode points to the on-disk representation
pub fn encode_points(points: &[Point3]) -> Vec<u8> {
    let mut bytes = Vec::with_capacity(points.len() * POINT_STRIDE);
    for f in bytemuck::cast_slice::<Point3, f32>(points) {
        bytes.extend_from_slice(&f.to_le_bytes());
    }
    bytes
}

/// Write points to `w` in the on-disk representation
pub fn write_points<W: Write>(w: &mut W, points: &[Point3]) -> io::Result<()> {
    for f in bytemuck::cast_slice::<Point3, f32>(points) {
        w.write_all(&f.to_le_bytes())?;
    }
    Ok(())
}

fn read_f32(record: &[u8], offset: usize) -> f32 {
    f32::from_le_bytes([
        record[offset],
        record[offset + 1],
        record[offset + 2],
        record[offset + 3],
    ])
}
