//! Point cloud converter (.pts -> OBJ/PLY/XYZ/.pts)

use anyhow::{Context, Result, bail};
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};
use tempfile::NamedTempFile;

use pointcloud_common::{
    Bounds, Mesh, MeshHandle, MeshSink, PointCloud, SinkError, import_point_file,
    load_point_file,
};

use crate::formats::{ExportFormat, write_point_cloud};

/// Mesh sink backed by a single output file.
///
/// `create_mesh` only stores the cloud; `attach_to_scene` writes it.
pub struct FileSink {
    output: PathBuf,
    format: ExportFormat,
    meshes: Vec<Mesh>,
    written: Option<MeshHandle>,
}

impl FileSink {
    pub fn new(output: impl Into<PathBuf>, format: ExportFormat) -> Self {
        Self {
            output: output.into(),
            format,
            meshes: Vec::new(),
            written: None,
        }
    }

    pub fn mesh(&self, handle: MeshHandle) -> Option<&Mesh> {
        self.meshes.get(handle.index())
    }

    /// Handle of the mesh written to the output, if any
    pub fn written(&self) -> Option<MeshHandle> {
        self.written
    }

    fn write_mesh(&self, mesh: &Mesh) -> Result<()> {
        write_atomically(&self.output, |w| {
            write_point_cloud(w, self.format, &mesh.name, mesh.points.points())
        })
    }
}

/// Write `output` through a temporary file in the same directory.
///
/// The target is only replaced once `write` succeeds; on failure the
/// temporary file is removed and any existing `output` is left untouched.
pub fn write_atomically<F>(output: &Path, write: F) -> Result<()>
where
    F: FnOnce(&mut BufWriter<&mut File>) -> Result<()>,
{
    let dir = match output.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    };
    let mut temp = NamedTempFile::new_in(dir)
        .with_context(|| format!("Failed to create output: {:?}", output))?;

    {
        let mut writer = BufWriter::new(temp.as_file_mut());
        write(&mut writer)?;
        writer.flush()?;
    }

    temp.persist(output)
        .with_context(|| format!("Failed to write output: {:?}", output))?;
    Ok(())
}

impl MeshSink for FileSink {
    fn create_mesh(&mut self, name: &str, points: PointCloud) -> Result<MeshHandle, SinkError> {
        let index = u32::try_from(self.meshes.len())
            .map_err(|_| SinkError::HostUnavailable("too many meshes".to_string()))?;
        self.meshes.push(Mesh {
            name: name.to_string(),
            points,
        });
        Ok(MeshHandle::new(index))
    }

    fn attach_to_scene(&mut self, handle: MeshHandle) -> Result<(), SinkError> {
        let mesh = self.mesh(handle).ok_or(SinkError::UnknownMesh(handle))?;

        match self.written {
            Some(held) if held == handle => return Err(SinkError::AlreadyAttached(handle)),
            Some(held) => {
                return Err(SinkError::OutputTaken {
                    held,
                    rejected: handle,
                });
            }
            None => {}
        }

        self.write_mesh(mesh)
            .map_err(|e| SinkError::HostUnavailable(format!("{:#}", e)))?;
        self.written = Some(handle);
        Ok(())
    }
}

/// Result of a single conversion
#[derive(Debug, Clone)]
pub struct ConvertedPoints {
    /// Mesh name written to the output
    pub name: String,
    pub output: PathBuf,
    pub format: ExportFormat,
    pub point_count: usize,
    /// `None` for an empty cloud
    pub bounds: Option<Bounds>,
}

/// Load a point file into memory without writing anything
pub fn convert_points_to_memory(input: &Path) -> Result<PointCloud> {
    load_point_file(input).with_context(|| format!("Failed to load point file: {:?}", input))
}

/// Convert a point file to `format`, written to `output`.
///
/// `name` defaults to the input's file stem. Nothing is written if the input
/// fails to load.
pub fn convert_points(
    input: &Path,
    output: &Path,
    format: ExportFormat,
    name: Option<&str>,
) -> Result<ConvertedPoints> {
    let name = name
        .map(str::to_string)
        .unwrap_or_else(|| mesh_name_for(input));

    let mut sink = FileSink::new(output, format);
    let handle = import_point_file(&mut sink, input, &name)
        .with_context(|| format!("Failed to convert {:?}", input))?;

    let mesh = sink.mesh(handle).ok_or(SinkError::UnknownMesh(handle))?;

    let converted = ConvertedPoints {
        name,
        output: output.to_path_buf(),
        format,
        point_count: mesh.points.len(),
        bounds: mesh.points.bounds(),
    };

    match converted.bounds {
        Some(b) => tracing::info!(
            "Converted point cloud: {} points, format={}, bounds=[{:?} .. {:?}]",
            converted.point_count,
            format,
            b.min,
            b.max
        ),
        None => tracing::info!("Converted point cloud: 0 points, format={}", format),
    }

    Ok(converted)
}

/// Default output path: the input with the format's extension.
///
/// Refuses to pick the input itself (e.g. `.pts` -> `pts`).
pub fn default_output_path(input: &Path, format: ExportFormat) -> Result<PathBuf> {
    let output = input.with_extension(format.extension());
    if output == input {
        bail!(
            "Output would overwrite input {:?}; pass an explicit output path",
            input
        );
    }
    Ok(output)
}

/// Mesh name derived from a file path (its stem)
pub fn mesh_name_for(path: &Path) -> String {
    path.file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_default()
}
