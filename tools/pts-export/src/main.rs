//! pts-export - point cloud export tool
//!
//! Converts raw `.pts` float files (x, y, z little-endian f32 triples) to
//! vertex-only mesh formats (.obj, .ply, .xyz, .pts)

use anyhow::Result;
use clap::{Parser, Subcommand};
use std::path::PathBuf;

// Use modules from library
use pts_export::{ExportFormat, export, manifest};

#[derive(Parser)]
#[command(name = "pts-export")]
#[command(about = "Point cloud export tool")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Convert a single point file
    Convert {
        /// Input .pts file
        input: PathBuf,

        /// Output format (pts, obj, ply, ply-ascii, xyz)
        format: ExportFormat,

        /// Output file (default: input with the format's extension)
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Mesh name (default: input file stem)
        #[arg(short, long)]
        name: Option<String>,
    },

    /// Print point count and bounds of a point file
    Info {
        /// Input .pts file
        input: PathBuf,
    },

    /// Convert every cloud listed in a manifest file
    Build {
        /// Path to points.toml manifest
        #[arg(default_value = manifest::DEFAULT_MANIFEST)]
        manifest: PathBuf,

        /// Output directory (overrides manifest)
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Verbose output
        #[arg(short, long)]
        verbose: bool,
    },

    /// Validate manifest without building
    Check {
        /// Path to points.toml manifest
        #[arg(default_value = manifest::DEFAULT_MANIFEST)]
        manifest: PathBuf,
    },
}

fn main() -> Result<()> {
    // Initialize logging
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive(tracing::Level::INFO.into()),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Convert {
            input,
            format,
            output,
            name,
        } => {
            let output = match output {
                Some(output) => output,
                None => export::default_output_path(&input, format)?,
            };
            tracing::info!("Converting {:?} -> {:?} ({})", input, output, format);
            export::convert_points(&input, &output, format, name.as_deref())?;
            tracing::info!("Done!");
        }

        Commands::Info { input } => {
            let cloud = export::convert_points_to_memory(&input)?;
            tracing::info!("{:?}: {} points", input, cloud.len());
            if let Some(bounds) = cloud.bounds() {
                tracing::info!("  min:    {:?}", bounds.min);
                tracing::info!("  max:    {:?}", bounds.max);
                tracing::info!("  size:   {:?}", bounds.size());
                tracing::info!("  center: {:?}", bounds.center());
            }
        }

        Commands::Build {
            manifest,
            output,
            verbose,
        } => {
            if verbose {
                tracing::info!("Building point clouds from {:?}", manifest);
            }
            let config = manifest::load_manifest(&manifest)?;
            let results = manifest::build_all(&config, output.as_deref())?;
            if verbose {
                for r in &results {
                    tracing::info!("  {} -> {:?}: {} points", r.name, r.output, r.point_count);
                }
            }
            tracing::info!("Build complete!");
        }

        Commands::Check { manifest } => {
            tracing::info!("Checking manifest {:?}", manifest);
            let config = manifest::load_manifest(&manifest)?;
            manifest::validate(&config)?;
            tracing::info!("Manifest is valid!");
        }
    }

    Ok(())
}
