//! Output formats for point clouds
//!
//! Every format is vertex-only: points are written as vertices with no faces
//! or edges.

use anyhow::Result;
use ply_rs::{
    ply::{
        Addable, DefaultElement, ElementDef, Encoding, Ply, Property, PropertyDef, PropertyType,
        ScalarType,
    },
    writer::Writer,
};
use serde::Deserialize;
use std::fmt;
use std::io::Write;
use std::str::FromStr;

use pointcloud_common::{PTS_EXT, Point3, write_points};

/// Supported output formats
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Deserialize)]
#[serde(try_from = "String")]
pub enum ExportFormat {
    /// Raw little-endian f32 triples (same as the input format)
    Pts,
    /// Wavefront OBJ, `v` lines only
    Obj,
    /// PLY 1.0, binary little-endian
    #[default]
    Ply,
    /// PLY 1.0, ascii
    PlyAscii,
    /// Whitespace-separated `x y z` lines
    Xyz,
}

impl ExportFormat {
    pub const ALL: [ExportFormat; 5] = [
        ExportFormat::Pts,
        ExportFormat::Obj,
        ExportFormat::Ply,
        ExportFormat::PlyAscii,
        ExportFormat::Xyz,
    ];

    /// Canonical name, as accepted on the command line
    pub fn name(self) -> &'static str {
        match self {
            ExportFormat::Pts => "pts",
            ExportFormat::Obj => "obj",
            ExportFormat::Ply => "ply",
            ExportFormat::PlyAscii => "ply-ascii",
            ExportFormat::Xyz => "xyz",
        }
    }

    /// File extension without dot
    pub fn extension(self) -> &'static str {
        match self {
            ExportFormat::Pts => PTS_EXT,
            ExportFormat::Obj => "obj",
            ExportFormat::Ply | ExportFormat::PlyAscii => "ply",
            ExportFormat::Xyz => "xyz",
        }
    }
}

impl fmt::Display for ExportFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Format name that matches no [`ExportFormat`]
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unsupported export format {0:?} (use pts, obj, ply, ply-ascii or xyz)")]
pub struct UnknownFormat(pub String);

impl FromStr for ExportFormat {
    type Err = UnknownFormat;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "pts" => Ok(ExportFormat::Pts),
            "obj" => Ok(ExportFormat::Obj),
            "ply" => Ok(ExportFormat::Ply),
            "ply-ascii" | "ply_ascii" | "plyascii" => Ok(ExportFormat::PlyAscii),
            "xyz" | "txt" => Ok(ExportFormat::Xyz),
            _ => Err(UnknownFormat(s.to_string())),
        }
    }
}

impl TryFrom<String> for ExportFormat {
    type Error = UnknownFormat;

    fn try_from(s: String) -> Result<Self, Self::Error> {
        s.parse()
    }
}

/// Write `points` as a mesh named `name` in `format`
pub fn write_point_cloud<W: Write>(
    w: &mut W,
    format: ExportFormat,
    name: &str,
    points: &[Point3],
) -> Result<()> {
    match format {
        ExportFormat::Pts => write_points(w, points)?,
        ExportFormat::Obj => write_obj(w, name, points)?,
        ExportFormat::Ply => write_ply(w, name, points, Encoding::BinaryLittleEndian)?,
        ExportFormat::PlyAscii => write_ply(w, name, points, Encoding::Ascii)?,
        ExportFormat::Xyz => write_xyz(w, points)?,
    }
    Ok(())
}

/// Write a vertex-only Wavefront OBJ
///
/// Floats use Rust's shortest round-trip formatting, so they parse back to
/// the same value.
pub fn write_obj<W: Write>(w: &mut W, name: &str, points: &[Point3]) -> Result<()> {
    writeln!(w, "# {} vertices", points.len())?;
    let name = first_line(name);
    if !name.is_empty() {
        writeln!(w, "o {}", name)?;
    }
    for p in points {
        writeln!(w, "v {} {} {}", p.x, p.y, p.z)?;
    }
    Ok(())
}

/// Write a PLY 1.0 file with a single `vertex` element (float x, y, z)
///
/// `Encoding::BinaryLittleEndian` gives a body byte-identical to a `.pts`
/// file. The mesh name, if any, goes into a header comment.
pub fn write_ply<W: Write>(
    w: &mut W,
    name: &str,
    points: &[Point3],
    encoding: Encoding,
) -> Result<()> {
    let mut ply = Ply::<DefaultElement>::new();
    ply.header.encoding = encoding;

    let name = first_line(name);
    if !name.is_empty() {
        ply.header.comments.push(name.to_string());
    }

    let mut vertex_element = ElementDef::new("vertex".to_string());
    for axis in ["x", "y", "z"] {
        let p = PropertyDef::new(axis.to_string(), PropertyType::Scalar(ScalarType::Float));
        vertex_element.properties.add(p);
    }
    ply.header.elements.add(vertex_element);

    let vertices: Vec<DefaultElement> = points
        .iter()
        .map(|p| {
            let mut vertex = DefaultElement::new();
            vertex.insert("x".to_string(), Property::Float(p.x));
            vertex.insert("y".to_string(), Property::Float(p.y));
            vertex.insert("z".to_string(), Property::Float(p.z));
            vertex
        })
        .collect();
    ply.payload.insert("vertex".to_string(), vertices);

    let writer = Writer::new();
    writer.write_ply(w, &mut ply)?;
    Ok(())
}

// Names go into single-line header records
fn first_line(name: &str) -> &str {
    name.lines().next().unwrap_or("")
}

/// Write one `x y z` line per point
pub fn write_xyz<W: Write>(w: &mut W, points: &[Point3]) -> Result<()> {
    for p in points {
        writeln!(w, "{} {} {}", p.x, p.y, p.z)?;
    }
    Ok(())
}
