//! # mapa-cli
//!
//! Command line front end for turning a GeoTIFF elevation model into closed
//! terrain meshes.
//!
//! The binary reads the raster, derives the elevation scale from its
//! georeferencing, runs [`mapa_mesh::convert`] and reports one summary line
//! per tile. The summary can also be printed or written as JSON.
//!
//! ```bash
//! mapa --input USGS_13_n48w123_20240327.tif --model-size 150 --tiles 2*2 --output summary.json
//! ```

use clap::Parser;
use mapa_dem::{DemError, DemRaster};
use mapa_mesh::{
    convert, ConvertOptions, CutFormat, DataQualityWarning, MeshConfig, MeshError, ScaleParameters, TileFormat,
};
use serde::Serialize;
use std::fmt::Write as _;
use std::fs::File;
use std::io::{BufWriter, Write as _};
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::info;
use tracing_subscriber::EnvFilter;

/// Errors reported by the command line front end.
#[derive(Debug, Error)]
pub enum CliError {
    /// The input raster path is unusable.
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// The summary output path is unusable.
    #[error("Invalid output: {0}")]
    InvalidOutput(String),

    /// Mesh generation failed.
    #[error(transparent)]
    Mesh(#[from] MeshError),

    /// Reading the raster failed.
    #[error(transparent)]
    Dem(#[from] DemError),

    /// I/O error writing the summary.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Summary serialization failed.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Result type for CLI operations.
pub type Result<T> = std::result::Result<T, CliError>;

/// Turn a GeoTIFF elevation model into watertight terrain meshes.
#[derive(Parser, Debug, Clone)]
#[command(name = "mapa", version, about, long_about = None)]
pub struct Cli {
    /// GeoTIFF elevation model (`.tif` or `.tiff`)
    #[arg(short, long)]
    pub input: PathBuf,

    /// YAML file with conversion defaults
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    /// Model size in millimetres along the row axis
    #[arg(long)]
    pub model_size: Option<f64>,

    /// Ground clearance below the lowest surface point in millimetres
    #[arg(long, allow_hyphen_values = true, conflicts_with = "natural_z")]
    pub z_offset: Option<f64>,

    /// Keep the natural height of the lowest point instead of a fixed clearance
    #[arg(long)]
    pub natural_z: bool,

    /// Elevation exaggeration multiplier
    #[arg(long)]
    pub z_scale: Option<f64>,

    /// Mesh at full resolution instead of reducing large rasters
    #[arg(long)]
    pub max_res: bool,

    /// Crop the raster to a square
    #[arg(long, conflicts_with_all = ["aspect_ratio", "tiles"])]
    pub ensure_squared: bool,

    /// Crop the raster to a width:height ratio
    #[arg(long, conflicts_with = "tiles")]
    pub aspect_ratio: Option<f64>,

    /// Split the model into `n*m` tiles
    #[arg(long)]
    pub tiles: Option<TileFormat>,

    /// Print the summary as JSON
    #[arg(long)]
    pub json: bool,

    /// Also write the JSON summary to this file
    #[arg(short, long)]
    pub output: Option<PathBuf>,

    /// Enable debug logging
    #[arg(short, long)]
    pub verbose: bool,
}

impl Cli {
    /// Footprint shaping selected by the flags.
    pub fn cut_format(&self) -> CutFormat {
        if self.ensure_squared {
            CutFormat::AspectRatio(1.0)
        } else if let Some(ratio) = self.aspect_ratio {
            CutFormat::AspectRatio(ratio)
        } else if let Some(tiles) = self.tiles {
            CutFormat::Tiles(tiles)
        } else {
            CutFormat::Native
        }
    }

    /// Configuration file (or defaults) with command line overrides applied.
    pub fn mesh_config(&self) -> Result<MeshConfig> {
        let mut config = match &self.config {
            Some(path) => MeshConfig::from_file(path)?,
            None => MeshConfig::default(),
        };
        if let Some(model_size) = self.model_size {
            config.model_size = model_size;
        }
        if self.natural_z {
            config.z_offset = None;
        } else if let Some(z_offset) = self.z_offset {
            config.z_offset = Some(z_offset);
        }
        if let Some(z_scale) = self.z_scale {
            config.z_scale = z_scale;
        }
        Ok(config)
    }
}

/// Install the global `tracing` subscriber.
///
/// `RUST_LOG` takes precedence; otherwise the level is `info`, or `debug`
/// when `verbose` is set.
pub fn init_tracing(verbose: bool) {
    let default_level = if verbose { "debug" } else { "info" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .try_init();
}

/// Check that `path` is an existing GeoTIFF file.
pub fn validate_input(path: &Path) -> Result<()> {
    let is_tiff = path
        .extension()
        .and_then(|e| e.to_str())
        .map(|e| e.eq_ignore_ascii_case("tif") || e.eq_ignore_ascii_case("tiff"))
        .unwrap_or(false);
    if !is_tiff {
        return Err(CliError::InvalidInput(format!(
            "{} is not a GeoTIFF file, expected a .tif or .tiff extension",
            path.display()
        )));
    }
    if !path.is_file() {
        return Err(CliError::InvalidInput(format!("{} does not exist", path.display())));
    }
    Ok(())
}

/// Check that the directory `path` would be written into exists.
pub fn validate_output(path: &Path) -> Result<()> {
    let parent = match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => return Ok(()),
    };
    if !parent.is_dir() {
        return Err(CliError::InvalidOutput(format!(
            "Directory {} of {} does not exist",
            parent.display(),
            path.display()
        )));
    }
    Ok(())
}

/// Per-tile part of a [`Summary`].
#[derive(Debug, Clone, Serialize)]
pub struct TileSummary {
    /// Position in tile order.
    pub index: usize,
    /// Number of triangles in the closed mesh.
    pub triangles: usize,
    /// Model extent along x, y and z in millimetres.
    pub dimensions_mm: [f64; 3],
}

/// Outcome of one run.
#[derive(Debug, Clone, Serialize)]
pub struct Summary {
    /// Raster that was converted.
    pub input: PathBuf,
    /// Raster size in pixels as `(rows, cols)`.
    pub raster_shape: (usize, usize),
    /// Grid size after preprocessing as `(rows, cols)`.
    pub grid_shape: (usize, usize),
    /// Model millimetres per meter of elevation.
    pub elevation_scale: f64,
    /// Scale shared by all tiles.
    pub scale: ScaleParameters,
    /// One entry per tile.
    pub tiles: Vec<TileSummary>,
    /// Non-fatal problems found during conversion.
    pub warnings: Vec<DataQualityWarning>,
}

/// Read the raster, convert it and collect a summary.
///
/// When `--output` is given the summary is also written there as JSON.
pub fn run(cli: &Cli) -> Result<Summary> {
    validate_input(&cli.input)?;
    if let Some(output) = &cli.output {
        validate_output(output)?;
    }
    let config = cli.mesh_config()?;

    let raster = DemRaster::from_file(&cli.input)?;
    let elevation_scale = raster.elevation_scale(config.model_size)?;
    let grid = raster.to_elevation_grid()?;
    let raster_shape = grid.shape();
    info!(
        "Loaded {}x{} raster from {}",
        raster_shape.0,
        raster_shape.1,
        cli.input.display()
    );

    let options = ConvertOptions {
        format: cli.cut_format(),
        use_max_resolution: cli.max_res,
        ..ConvertOptions::from_config(&config, elevation_scale)
    };
    let conversion = convert(grid, &options)?;

    let tiles = conversion
        .tiles
        .iter()
        .enumerate()
        .map(|(index, mesh)| TileSummary {
            index,
            triangles: mesh.len(),
            dimensions_mm: mesh.dimensions(),
        })
        .collect();
    let summary = Summary {
        input: cli.input.clone(),
        raster_shape,
        grid_shape: conversion.grid_shape,
        elevation_scale,
        scale: conversion.scale,
        tiles,
        warnings: conversion.warnings,
    };

    if let Some(output) = &cli.output {
        let mut writer = BufWriter::new(File::create(output)?);
        serde_json::to_writer_pretty(&mut writer, &summary)?;
        writer.flush()?;
        info!("Wrote summary to {}", output.display());
    }
    Ok(summary)
}

/// Human readable form of a [`Summary`].
pub fn render_summary(summary: &Summary) -> String {
    let mut out = String::new();
    let _ = writeln!(
        out,
        "{}: {}x{} raster, meshed at {}x{}",
        summary.input.display(),
        summary.raster_shape.0,
        summary.raster_shape.1,
        summary.grid_shape.0,
        summary.grid_shape.1
    );
    for tile in &summary.tiles {
        let [x, y, z] = tile.dimensions_mm;
        let _ = writeln!(
            out,
            "  tile {}: {} triangles, {:.2} x {:.2} x {:.2} mm",
            tile.index, tile.triangles, x, y, z
        );
    }
    for warning in &summary.warnings {
        let _ = writeln!(out, "  warning: {}", warning);
    }
    out
}
