//! End-to-end conversion of an elevation grid into closed triangle meshes.

use crate::base::triangulate_base;
use crate::config::MeshConfig;
use crate::corners::build_corner_grid;
use crate::grid::{CornerGrid, ElevationGrid};
use crate::preprocess::{bin_factor_for, cut_to_aspect_ratio, reduce_resolution, trim_empty_borders};
use crate::scale::ScaleParameters;
use crate::surface::triangulate_surface;
use crate::tiling::{split_into_tiles, TileFormat};
use crate::triangle::{assemble, TriangleBatch};
use crate::walls::triangulate_walls;
use crate::{MeshError, Result};
use rayon::prelude::*;
use serde::Serialize;
use std::fmt;
use std::time::Instant;
use tracing::{debug, info, warn};

/// How the footprint of the model is shaped.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub enum CutFormat {
    /// Keep the grid's own aspect.
    #[default]
    Native,
    /// Crop to a width:height ratio; `1.0` gives a square model.
    AspectRatio(f64),
    /// Split into independently meshed tiles.
    Tiles(TileFormat),
}

/// Non-fatal problems found during a conversion.
///
/// Each warning is logged when raised and also returned in [`Conversion`].
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum DataQualityWarning {
    /// An explicit negative Z offset may push the surface below the base plate.
    NegativeZOffset {
        /// Requested offset in millimetres.
        z_offset: f64,
    },
    /// Max resolution was requested for a very large grid.
    MaxResolutionPerformance {
        /// Pixels in the grid.
        pixels: usize,
        /// Configured warning threshold.
        threshold: usize,
    },
}

impl fmt::Display for DataQualityWarning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DataQualityWarning::NegativeZOffset { z_offset } => write!(
                f,
                "Be careful using negative z offsets ({}), as it might break your 3D model",
                z_offset
            ),
            DataQualityWarning::MaxResolutionPerformance { pixels, threshold } => write!(
                f,
                "Using max resolution on {} pixels (threshold {}) might cause performance issues, \
                 consider disabling it",
                pixels, threshold
            ),
        }
    }
}

/// Parameters of one conversion.
#[derive(Debug, Clone, PartialEq)]
pub struct ConvertOptions {
    /// Target model size in millimetres along the row axis.
    pub target_size: f64,
    /// Explicit ground clearance, `None` for natural height.
    pub z_offset: Option<f64>,
    /// Elevation exaggeration multiplier.
    pub z_scale: f64,
    /// Model millimetres per real-world elevation unit, from the raster's georeferencing.
    pub elevation_scale: f64,
    /// Footprint shaping.
    pub format: CutFormat,
    /// Skip resolution reduction.
    pub use_max_resolution: bool,
    /// Pixels per side the resolution reduction aims for.
    pub maximum_resolution: usize,
    /// Pixel count above which a max-resolution run is flagged.
    pub performance_warning_threshold: usize,
}

impl ConvertOptions {
    /// Options taken from a configuration, native format, reduced resolution.
    pub fn from_config(config: &MeshConfig, elevation_scale: f64) -> Self {
        Self {
            target_size: config.model_size,
            z_offset: config.z_offset,
            z_scale: config.z_scale,
            elevation_scale,
            format: CutFormat::Native,
            use_max_resolution: false,
            maximum_resolution: config.maximum_resolution,
            performance_warning_threshold: config.performance_warning_threshold,
        }
    }
}

impl Default for ConvertOptions {
    fn default() -> Self {
        Self::from_config(&MeshConfig::default(), 1.0)
    }
}

/// Result of [`convert`].
#[derive(Debug, Clone)]
pub struct Conversion {
    /// One closed mesh per tile, in tile order. A single entry unless tiling was requested.
    pub tiles: Vec<TriangleBatch>,
    /// Parameters shared by every tile.
    pub scale: ScaleParameters,
    /// Shape of the grid after preprocessing, before tiling.
    pub grid_shape: (usize, usize),
    /// Shape of each meshed grid.
    pub tile_shape: (usize, usize),
    /// Non-fatal problems encountered.
    pub warnings: Vec<DataQualityWarning>,
}

impl Conversion {
    /// Total triangles over all tiles.
    pub fn triangle_count(&self) -> usize {
        self.tiles.iter().map(TriangleBatch::len).sum()
    }

    /// The single mesh of an untiled conversion (the first tile otherwise).
    pub fn mesh(&self) -> &TriangleBatch {
        &self.tiles[0]
    }
}

/// Build the closed mesh of one grid: surface, then walls, then base.
pub fn compute_all_triangles(
    grid: &ElevationGrid,
    corners: &CornerGrid,
    scale: &ScaleParameters,
) -> Result<TriangleBatch> {
    let (rows, cols) = grid.shape();

    let start = Instant::now();
    let surface = triangulate_surface(grid, corners, scale)?;
    debug!("Computed {} surface triangles in {:?}", surface.len(), start.elapsed());

    let start = Instant::now();
    let walls = triangulate_walls(corners, rows, cols, scale)?;
    debug!("Computed {} wall triangles in {:?}", walls.len(), start.elapsed());

    let base = triangulate_base(rows, cols, scale)?;
    Ok(assemble(surface, walls, base))
}

/// Fail with [`MeshError::InvalidArgument`] if any sample is NaN or infinite.
fn ensure_finite(grid: &ElevationGrid) -> Result<()> {
    let mut non_finite = grid.as_slice().iter().enumerate().filter(|(_, v)| !v.is_finite());
    let Some((first, value)) = non_finite.next() else {
        return Ok(());
    };
    let count = 1 + non_finite.count();
    Err(MeshError::InvalidArgument(format!(
        "Grid contains {} non-finite samples, first {} at row {}, col {}",
        count,
        value,
        first / grid.cols(),
        first % grid.cols()
    )))
}

/// Crop, shape and downsample a raw grid before meshing.
///
/// Warnings raised here are appended to `warnings`.
pub fn prepare_grid(
    grid: &ElevationGrid,
    options: &ConvertOptions,
    warnings: &mut Vec<DataQualityWarning>,
) -> Result<ElevationGrid> {
    grid.ensure_non_empty("convert")?;
    ensure_finite(grid)?;
    let mut grid = trim_empty_borders(grid);

    if let CutFormat::AspectRatio(ratio) = options.format {
        grid = cut_to_aspect_ratio(&grid, ratio)?;
        debug!("Cut grid to ratio {}: {}x{}", ratio, grid.rows(), grid.cols());
    }

    let (rows, cols) = grid.shape();
    if options.use_max_resolution {
        let pixels = rows * cols;
        if pixels > options.performance_warning_threshold {
            let warning = DataQualityWarning::MaxResolutionPerformance {
                pixels,
                threshold: options.performance_warning_threshold,
            };
            warn!("{}", warning);
            warnings.push(warning);
        }
    } else {
        let bin_factor = bin_factor_for(rows, cols, options.maximum_resolution);
        if bin_factor > 1 {
            let start = Instant::now();
            grid = reduce_resolution(&grid, bin_factor)?;
            info!(
                "Reduced resolution by factor {}: {}x{} -> {}x{} ({:?})",
                bin_factor,
                rows,
                cols,
                grid.rows(),
                grid.cols(),
                start.elapsed()
            );
        }
    }

    Ok(grid)
}

/// Convert an elevation grid into one closed mesh per tile.
///
/// Pipeline: trim empty borders, apply the [`CutFormat`], reduce resolution
/// (unless `use_max_resolution`), split into tiles, then for every tile build
/// the corner grid and triangulate surface, walls and base.
///
/// All tiles share one [`ScaleParameters`]: the Z offset is resolved against
/// the lowest corner of all tiles, and tiles are scaled so that together they
/// span `target_size` along the row axis.
pub fn convert(grid: ElevationGrid, options: &ConvertOptions) -> Result<Conversion> {
    let total = Instant::now();
    let mut warnings = Vec::new();
    let grid = prepare_grid(&grid, options, &mut warnings)?;
    let grid_shape = grid.shape();

    let (grids, aspect_ratio, target_size) = match options.format {
        CutFormat::Tiles(tile_format) => (
            split_into_tiles(&grid, tile_format)?,
            None,
            options.target_size / tile_format.x as f64,
        ),
        CutFormat::AspectRatio(ratio) => (vec![grid], Some(ratio), options.target_size),
        CutFormat::Native => (vec![grid], None, options.target_size),
    };
    let tile_shape = grids[0].shape();

    let start = Instant::now();
    let corners = grids
        .par_iter()
        .map(build_corner_grid)
        .collect::<Result<Vec<_>>>()?;
    debug!("Created {} corner grids in {:?}", corners.len(), start.elapsed());

    let min_corner = corners
        .iter()
        .map(CornerGrid::min)
        .fold(f64::INFINITY, f64::min);
    let scale = ScaleParameters::resolve(
        target_size,
        tile_shape.0,
        tile_shape.1,
        aspect_ratio,
        options.z_offset,
        options.z_scale,
        options.elevation_scale,
        min_corner,
    );
    if let Some(z_offset) = options.z_offset.filter(|z| *z < 0.0) {
        let warning = DataQualityWarning::NegativeZOffset { z_offset };
        warn!("{}", warning);
        warnings.push(warning);
    }
    debug!("Resolved scale parameters: {:?}", scale);

    let tiles = grids
        .par_iter()
        .zip(corners.par_iter())
        .map(|(grid, corners)| compute_all_triangles(grid, corners, &scale))
        .collect::<Result<Vec<_>>>()?;

    let conversion = Conversion {
        tiles,
        scale,
        grid_shape,
        tile_shape,
        warnings,
    };
    info!(
        "Converted {}x{} grid into {} tile(s) with {} triangles in {:?}",
        grid_shape.0,
        grid_shape.1,
        conversion.tiles.len(),
        conversion.triangle_count(),
        total.elapsed()
    );
    Ok(conversion)
}
