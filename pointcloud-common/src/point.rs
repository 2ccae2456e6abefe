//! Point and point cloud types

use bytemuck::{Pod, Zeroable};
use glam::Vec3;

/// A single 3D point (12 bytes, same layout as one `.pts` record)
#[derive(Debug, Clone, Copy, Default, PartialEq, Pod, Zeroable)]
#[repr(C)]
pub struct Point3 {
    pub x: f32,
    pub y: f32,
    pub z: f32,
}

impl Point3 {
    pub const fn new(x: f32, y: f32, z: f32) -> Self {
        Self { x, y, z }
    }

    pub fn to_array(self) -> [f32; 3] {
        [self.x, self.y, self.z]
    }

    /// Bitwise equality. Unlike `==`, NaN equals NaN with the same payload
    /// and `0.0` differs from `-0.0`.
    pub fn bit_eq(&self, other: &Self) -> bool {
        self.x.to_bits() == other.x.to_bits()
            && self.y.to_bits() == other.y.to_bits()
            && self.z.to_bits() == other.z.to_bits()
    }
}

impl From<[f32; 3]> for Point3 {
    fn from([x, y, z]: [f32; 3]) -> Self {
        Self { x, y, z }
    }
}

impl From<Point3> for [f32; 3] {
    fn from(p: Point3) -> Self {
        p.to_array()
    }
}

impl From<Point3> for Vec3 {
    fn from(p: Point3) -> Self {
        Vec3::new(p.x, p.y, p.z)
    }
}

/// Axis-aligned bounding box of a point cloud
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Bounds {
    pub min: Vec3,
    pub max: Vec3,
}

impl Bounds {
    pub fn size(&self) -> Vec3 {
        self.max - self.min
    }

    pub fn center(&self) -> Vec3 {
        (self.min + self.max) * 0.5
    }
}

/// Ordered sequence of points, in file order
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PointCloud {
    points: Vec<Point3>,
}

impl PointCloud {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_points(points: Vec<Point3>) -> Self {
        Self { points }
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    pub fn points(&self) -> &[Point3] {
        &self.points
    }

    /// Flat view of all scalars (x0, y0, z0, x1, ...)
    pub fn scalars(&self) -> &[f32] {
        bytemuck::cast_slice(&self.points)
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Point3> {
        self.points.iter()
    }

    /// Bounding box, `None` for an empty cloud.
    ///
    /// NaN coordinates are skipped by `min`/`max`; a cloud made only of NaN
    /// points reports infinite bounds.
    pub fn bounds(&self) -> Option<Bounds> {
        if self.points.is_empty() {
            return None;
        }

        let (min, max) = self.points.iter().map(|&p| Vec3::from(p)).fold(
            (Vec3::splat(f32::INFINITY), Vec3::splat(f32::NEG_INFINITY)),
            |(min, max), p| (min.min(p), max.max(p)),
        );
        Some(Bounds { min, max })
    }

    /// Bitwise comparison of two clouds (see [`Point3::bit_eq`])
    pub fn bit_eq(&self, other: &Self) -> bool {
        self.len() == other.len() && self.iter().zip(other.iter()).all(|(a, b)| a.bit_eq(b))
    }
}

impl From<Vec<Point3>> for PointCloud {
    fn from(points: Vec<Point3>) -> Self {
        Self::from_points(points)
    }
}

impl FromIterator<Point3> for PointCloud {
    fn from_iter<I: IntoIterator<Item = Point3>>(iter: I) -> Self {
        Self::from_points(iter.into_iter().collect())
    }
}

impl<'a> IntoIterator for &'a PointCloud {
    type Item = &'a Point3;
    type IntoIter = std::slice::Iter<'a, Point3>;

    fn into_iter(self) -> Self::IntoIter {
        self.points.iter()
    }
}
