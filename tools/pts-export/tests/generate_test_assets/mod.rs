//! Test point file generators

use std::io;
use std::path::Path;

use pointcloud_common::{Point3, encode_points};

/// The single point (1, 2, 3)
pub fn generate_single_point(path: &Path) -> io::Result<()> {
    std::fs::write(path, encode_points(&[Point3::new(1.0, 2.0, 3.0)]))
}

/// 8 corners of a unit cube centred on the origin
pub fn generate_cube_corners(path: &Path) -> io::Result<Vec<Point3>> {
    let points: Vec<Point3> = (0..8)
        .map(|i| {
            Point3::new(
                if i & 1 == 0 { -0.5 } else { 0.5 },
                if i & 2 == 0 { -0.5 } else { 0.5 },
                if i & 4 == 0 { -0.5 } else { 0.5 },
            )
        })
        .collect();
    std::fs::write(path, encode_points(&points))?;
    Ok(points)
}

/// A file that is one byte short of two whole points
pub fn generate_truncated(path: &Path) -> io::Result<()> {
    let mut bytes = encode_points(&[Point3::new(1.0, 2.0, 3.0), Point3::new(4.0, 5.0, 6.0)]);
    bytes.pop();
    std::fs::write(path, bytes)
}
