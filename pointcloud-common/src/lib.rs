//! Shared types and utilities for raw point cloud files
//!
//! This crate provides the pieces shared between:
//! - `pts-export` (conversion tool)
//! - anything that wants to feed `.pts` clouds into its own mesh host
//!
//! # Modules
//!
//! - [`point`] - `Point3`, `PointCloud` and bounds
//! - [`formats`] - the headerless `.pts` binary format
//! - [`loader`] - path -> `PointCloud`
//! - [`sink`] - the mesh sink capability and an in-memory scene

pub mod error;
pub mod formats;
pub mod loader;
pub mod point;
pub mod sink;

pub use error::{ImportError, Malformation, PointFileError, SinkError};
pub use formats::pts::{
    POINT_STRIDE, PTS_EXT, SCALAR_SIZE, decode_points, encode_points, write_points,
};
pub use loader::load_point_file;
pub use point::{Bounds, Point3, PointCloud};
pub use sink::{Mesh, MeshHandle, MeshSink, SceneSink, import_point_file};
