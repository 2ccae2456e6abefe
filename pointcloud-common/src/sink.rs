//! Mesh sink capability
//!
//! A mesh sink receives point clouds as vertex-only meshes and links them
//! into whatever it calls a scene: a 3D application, a file on disk, or the
//! in-memory [`SceneSink`] used by tests.

use std::fmt;
use std::path::Path;

use crate::error::{ImportError, SinkError};
use crate::loader::load_point_file;
use crate::point::PointCloud;

/// Opaque reference to a mesh created by a sink
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct MeshHandle(u32);

impl MeshHandle {
    pub const fn new(index: u32) -> Self {
        Self(index)
    }

    pub const fn index(self) -> usize {
        self.0 as usize
    }
}

impl fmt::Display for MeshHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Named vertex-only mesh
#[derive(Debug, Clone, PartialEq)]
pub struct Mesh {
    pub name: String,
    pub points: PointCloud,
}

/// Receives point clouds and links them into a scene.
pub trait MeshSink {
    /// Build a named mesh from `points`. The mesh is not visible until
    /// attached.
    fn create_mesh(&mut self, name: &str, points: PointCloud) -> Result<MeshHandle, SinkError>;

    /// Link a created mesh into the scene.
    fn attach_to_scene(&mut self, handle: MeshHandle) -> Result<(), SinkError>;
}

/// In-memory scene: keeps every created mesh and the attach order.
#[derive(Debug, Default)]
pub struct SceneSink {
    meshes: Vec<Mesh>,
    attached: Vec<MeshHandle>,
}

impl SceneSink {
    pub fn new() -> Self {
        Self::default()
    }

    /// Every mesh created so far, attached or not
    pub fn meshes(&self) -> &[Mesh] {
        &self.meshes
    }

    pub fn mesh(&self, handle: MeshHandle) -> Option<&Mesh> {
        self.meshes.get(handle.index())
    }

    pub fn is_attached(&self, handle: MeshHandle) -> bool {
        self.attached.contains(&handle)
    }

    /// Meshes linked into the scene, in attach order
    pub fn scene_objects(&self) -> impl Iterator<Item = &Mesh> {
        self.attached.iter().map(|h| &self.meshes[h.index()])
    }
}

impl MeshSink for SceneSink {
    fn create_mesh(&mut self, name: &str, points: PointCloud) -> Result<MeshHandle, SinkError> {
        let index = u32::try_from(self.meshes.len())
            .map_err(|_| SinkError::HostUnavailable("scene mesh table is full".to_string()))?;
        self.meshes.push(Mesh {
            name: name.to_string(),
            points,
        });
        Ok(MeshHandle(index))
    }

    fn attach_to_scene(&mut self, handle: MeshHandle) -> Result<(), SinkError> {
        if self.mesh(handle).is_none() {
            return Err(SinkError::UnknownMesh(handle));
        }
        if self.is_attached(handle) {
            return Err(SinkError::AlreadyAttached(handle));
        }
        self.attached.push(handle);
        Ok(())
    }
}

/// Load `path` and hand it to `sink` as a mesh named `name`, then attach it.
///
/// Nothing reaches the sink if the file fails to load.
pub fn import_point_file<S: MeshSink + ?Sized>(
    sink: &mut S,
    path: &Path,
    name: &str,
) -> Result<MeshHandle, ImportError> {
    let points = load_point_file(path)?;
    let count = points.len();

    let handle = sink.create_mesh(name, points)?;
    sink.attach_to_scene(handle)?;

    tracing::debug!("Imported '{}' ({} points) as mesh {}", name, count, handle);
    Ok(handle)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::PointFileError;
    use crate::formats::pts::encode_points;
    use crate::point::Point3;
    use tempfile::tempdir;

    fn cloud(n: usize) -> PointCloud {
        (0..n).map(|i| Point3::new(i as f32, 0.0, 0.0)).collect()
    }

    #[test]
    fn test_create_then_attach() {
        let mut scene = SceneSink::new();
        let a = scene.create_mesh("a", cloud(2)).unwrap();
        let b = scene.create_mesh("b", cloud(3)).unwrap();
        assert_ne!(a, b);
        assert_eq!(scene.scene_objects().count(), 0);

        scene.attach_to_scene(b).unwrap();
        scene.attach_to_scene(a).unwrap();

        let names: Vec<&str> = scene.scene_objects().map(|m| m.name.as_str()).collect();
        assert_eq!(names, ["b", "a"]);
        assert_eq!(scene.mesh(b).unwrap().points.len(), 3);
    }

    #[test]
    fn test_attach_unknown_handle() {
        let mut scene = SceneSink::new();
        let handle = MeshHandle::new(7);
        assert_eq!(
            scene.attach_to_scene(handle),
            Err(SinkError::UnknownMesh(handle))
        );
    }

    #[test]
    fn test_attach_twice() {
        let mut scene = SceneSink::new();
        let handle = scene.create_mesh("", cloud(1)).unwrap();
        scene.attach_to_scene(handle).unwrap();
        assert_eq!(
            scene.attach_to_scene(handle),
            Err(SinkError::AlreadyAttached(handle))
        );
        assert_eq!(scene.scene_objects().count(), 1);
    }

    #[test]
    fn test_import_point_file() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("foo.pts");
        std::fs::write(&path, encode_points(&[Point3::new(1.0, 2.0, 3.0)])).unwrap();

        let mut scene = SceneSink::new();
        let handle = import_point_file(&mut scene, &path, "foo").unwrap();

        assert!(scene.is_attached(handle));
        let mesh = scene.mesh(handle).unwrap();
        assert_eq!(mesh.name, "foo");
        assert_eq!(mesh.points.points(), &[Point3::new(1.0, 2.0, 3.0)]);
    }

    #[test]
    fn test_import_missing_file_leaves_scene_untouched() {
        let dir = tempdir().unwrap();
        let mut scene = SceneSink::new();

        let err = import_point_file(&mut scene, &dir.path().join("nope.pts"), "nope").unwrap_err();
        assert!(matches!(
            err,
            ImportError::Load(PointFileError::FileNotFound(_))
        ));
        assert!(scene.meshes().is_empty());
    }

    #[test]
    fn test_import_through_trait_object() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("empty.pts");
        std::fs::write(&path, []).unwrap();

        let mut scene = SceneSink::new();
        let sink: &mut dyn MeshSink = &mut scene;
        let handle = import_point_file(sink, &path, "empty").unwrap();
        assert!(scene.mesh(handle).unwrap().points.is_empty());
    }
}
