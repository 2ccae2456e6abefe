//! Error types for loading point files and handing them to a mesh sink

use std::io;
use std::path::PathBuf;

use crate::sink::MeshHandle;

/// Why a byte buffer is not a valid point file
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum Malformation {
    /// Byte length is not a multiple of 4
    #[error("{trailing} trailing byte(s) do not form a 32-bit float")]
    MisalignedScalar { trailing: usize },

    /// Scalar count is not a multiple of 3
    #[error("{trailing} trailing scalar(s) do not form an x/y/z triple")]
    IncompleteTriple { trailing: usize },
}

/// Failure to load a point file
#[derive(Debug, thiserror::Error)]
pub enum PointFileError {
    /// Input path does not exist
    #[error("point file not found: {}", .0.display())]
    FileNotFound(PathBuf),

    /// Byte or triple misalignment
    #[error("malformed point data ({len} bytes): {reason}")]
    MalformedInput { len: usize, reason: Malformation },

    /// Any other read failure
    #[error("failed to read point file {}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
}

/// Failure reported by a mesh sink
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SinkError {
    /// The sink's backing host or store cannot be reached
    #[error("mesh host unavailable: {0}")]
    HostUnavailable(String),

    /// Handle was not created by this sink
    #[error("unknown mesh {0}")]
    UnknownMesh(MeshHandle),

    /// Handle is already linked into the scene
    #[error("mesh {0} is already attached to the scene")]
    AlreadyAttached(MeshHandle),

    /// Single-output sink already holds another mesh
    #[error("sink output already holds mesh {held}, cannot attach {rejected}")]
    OutputTaken {
        held: MeshHandle,
        rejected: MeshHandle,
    },
}

/// Failure of the full load -> create -> attach pipeline
#[derive(Debug, thiserror::Error)]
pub enum ImportError {
    #[error(transparent)]
    Load(#[from] PointFileError),

    #[error(transparent)]
    Sink(#[from] SinkError),
}
