//! pts-export library
//!
//! Provides point cloud conversion functions for use by other tools.

pub mod export;
pub mod formats;
pub mod manifest;

// Re-export the data model and loader from pointcloud-common
pub use pointcloud_common::{
    Bounds, MeshHandle, MeshSink, Point3, PointCloud, PointFileError, SceneSink, SinkError,
    load_point_file,
};

// Re-export key types for conversion
pub use export::{ConvertedPoints, FileSink, convert_points, convert_points_to_memory};
pub use formats::{ExportFormat, UnknownFormat};
