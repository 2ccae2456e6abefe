//! points.toml manifest parsing and batch builds
//!
//! ```toml
//! [output]
//! dir = "build"
//! format = "ply"
//!
//! [[clouds]]
//! id = "bunny"
//! path = "scans/bunny.pts"
//! format = "obj"   # optional, overrides [output].format
//! name = "Bunny"   # optional, defaults to id
//! ```
//!
//! Relative paths are resolved against the manifest's directory.

use anyhow::{Context, Result, bail};
use hashbrown::HashSet;
use serde::Deserialize;
use std::path::{Path, PathBuf};

use crate::export::{ConvertedPoints, convert_points};
use crate::formats::ExportFormat;

/// Default manifest file name
pub const DEFAULT_MANIFEST: &str = "points.toml";

/// points.toml manifest structure
#[derive(Debug, Deserialize)]
pub struct PointsManifest {
    #[serde(default)]
    pub output: OutputSection,
    #[serde(default)]
    pub clouds: Vec<CloudEntry>,

    /// Directory relative paths are resolved against
    #[serde(skip)]
    pub base_dir: PathBuf,
}

/// Output configuration section
#[derive(Debug, Deserialize)]
pub struct OutputSection {
    /// Output directory.
    /// Default: manifest directory
    #[serde(default = "default_output_dir")]
    pub dir: PathBuf,

    /// Format for entries without their own.
    /// Default: binary PLY
    #[serde(default)]
    pub format: ExportFormat,
}

impl Default for OutputSection {
    fn default() -> Self {
        Self {
            dir: default_output_dir(),
            format: ExportFormat::default(),
        }
    }
}

fn default_output_dir() -> PathBuf {
    PathBuf::from(".")
}

/// Single point cloud entry
#[derive(Debug, Deserialize)]
pub struct CloudEntry {
    /// Output file stem, unique within the manifest
    pub id: String,
    /// Input .pts file
    pub path: PathBuf,
    #[serde(default)]
    pub format: Option<ExportFormat>,
    /// Mesh name written into the output.
    /// Default: id
    #[serde(default)]
    pub name: Option<String>,
}

impl CloudEntry {
    pub fn mesh_name(&self) -> &str {
        self.name.as_deref().unwrap_or(&self.id)
    }
}

impl PointsManifest {
    /// Parse manifest text. Relative paths resolve against the current directory.
    pub fn parse(content: &str) -> Result<Self> {
        toml::from_str(content).context("Failed to parse points manifest")
    }

    /// Resolve a manifest-relative path
    pub fn resolve(&self, path: &Path) -> PathBuf {
        self.base_dir.join(path)
    }

    pub fn format_for(&self, entry: &CloudEntry) -> ExportFormat {
        entry.format.unwrap_or(self.output.format)
    }

    /// `[output].dir` resolved against the manifest, unless overridden
    pub fn output_dir(&self, output_override: Option<&Path>) -> PathBuf {
        match output_override {
            Some(dir) => dir.to_path_buf(),
            None => self.resolve(&self.output.dir),
        }
    }

    /// Where `entry` is written, given the output directory
    pub fn output_path(&self, entry: &CloudEntry, output_dir: &Path) -> PathBuf {
        output_dir.join(format!("{}.{}", entry.id, self.format_for(entry).extension()))
    }
}

/// Load and parse a manifest file
pub fn load_manifest(path: &Path) -> Result<PointsManifest> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read manifest: {:?}", path))?;
    let mut manifest = PointsManifest::parse(&content)
        .with_context(|| format!("Invalid manifest: {:?}", path))?;
    manifest.base_dir = path.parent().map(Path::to_path_buf).unwrap_or_default();
    Ok(manifest)
}

/// Check ids, inputs and outputs without converting anything.
///
/// Outputs are checked against `[output].dir`.
pub fn validate(manifest: &PointsManifest) -> Result<()> {
    validate_for_output(manifest, &manifest.output_dir(None))
}

/// Like [`validate`], with outputs going to `output_dir`.
///
/// Rejects any output that would land on an entry's input file.
pub fn validate_for_output(manifest: &PointsManifest, output_dir: &Path) -> Result<()> {
    let mut seen = HashSet::new();
    let mut inputs = HashSet::new();

    for entry in &manifest.clouds {
        if entry.id.trim().is_empty() {
            bail!("Cloud entry for {:?} has an empty id", entry.path);
        }
        if entry.id.contains(['/', '\\']) || entry.id == "." || entry.id == ".." {
            bail!("Cloud id '{}' is not a valid file name", entry.id);
        }
        if !seen.insert(entry.id.as_str()) {
            bail!("Duplicate cloud id '{}'", entry.id);
        }

        let input = manifest.resolve(&entry.path);
        if !input.is_file() {
            bail!("Cloud '{}': input not found: {:?}", entry.id, input);
        }
        inputs.insert(comparable_path(&input));
    }

    for entry in &manifest.clouds {
        let output = manifest.output_path(entry, output_dir);
        if inputs.contains(&comparable_path(&output)) {
            bail!(
                "Cloud '{}': output {:?} would overwrite an input file",
                entry.id,
                output
            );
        }
    }

    if manifest.clouds.is_empty() {
        tracing::warn!("Manifest declares no clouds");
    }

    Ok(())
}

// Absolute path with symlinks resolved as far as it exists
fn comparable_path(path: &Path) -> PathBuf {
    let absolute = std::path::absolute(path).unwrap_or_else(|_| path.to_path_buf());
    canonical_prefix(&absolute)
}

fn canonical_prefix(path: &Path) -> PathBuf {
    if let Ok(canonical) = path.canonicalize() {
        return canonical;
    }
    match (path.parent(), path.file_name()) {
        (Some(parent), Some(name)) => canonical_prefix(parent).join(name),
        _ => path.to_path_buf(),
    }
}

/// Convert every entry. `output_override` replaces `[output].dir`.
///
/// Stops at the first failing entry.
pub fn build_all(
    manifest: &PointsManifest,
    output_override: Option<&Path>,
) -> Result<Vec<ConvertedPoints>> {
    let output_dir = manifest.output_dir(output_override);
    validate_for_output(manifest, &output_dir)?;

    std::fs::create_dir_all(&output_dir)
        .with_context(|| format!("Failed to create output directory: {:?}", output_dir))?;

    let mut converted = Vec::with_capacity(manifest.clouds.len());
    for entry in &manifest.clouds {
        let input = manifest.resolve(&entry.path);
        let output = manifest.output_path(entry, &output_dir);
        tracing::info!("[{}] {:?} -> {:?}", entry.id, input, output);

        let result = convert_points(
            &input,
            &output,
            manifest.format_for(entry),
            Some(entry.mesh_name()),
        )
        .with_context(|| format!("Cloud '{}' failed", entry.id))?;
        converted.push(result);
    }

    tracing::info!("Built {} point cloud(s) into {:?}", converted.len(), output_dir);
    Ok(converted)
}
