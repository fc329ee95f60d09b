//! # mapa-mesh
//!
//! Watertight terrain meshes from digital elevation grids.
//!
//! An [`ElevationGrid`] of elevation samples is turned into a closed, printable
//! solid made of three parts:
//! - a terrain surface of four triangles per pixel, fanned around the pixel centre
//! - vertical walls along the four boundary sides, down to `z = 0`
//! - a flat rectangular base plate at `z = 0`
//!
//! Surface corners are shared between neighbouring pixels through a
//! [`CornerGrid`], so every interior edge is used by exactly two triangles and
//! the rim of the surface coincides with the top edge of the walls.
//!
//! ## Overview
//!
//! Coordinates are in millimetres. Grid row index `i` maps to X and column
//! index `j` maps to Y; elevations are scaled to Z and lifted by a Z offset.
//! The [`ScaleParameters`] for a conversion are derived from a target model
//! size, an optional aspect ratio and the elevation scale of the source raster.
//!
//! Before meshing, [`convert`] strips all-zero borders, optionally crops to an
//! aspect ratio, reduces resolution and splits the grid into tiles.
//!
//! ## Example
//!
//! ```
//! use mapa_mesh::{convert, ConvertOptions, ElevationGrid};
//!
//! let grid = ElevationGrid::from_rows(&[[0.0, 1.0, 2.0], [3.0, 4.0, 5.0], [6.0, 7.0, 8.0]])?;
//! let options = ConvertOptions {
//!     target_size: 200.0,
//!     elevation_scale: 10.0,
//!     ..ConvertOptions::default()
//! };
//!
//! let conversion = convert(grid, &options)?;
//! // 4 per pixel, 2 per boundary edge, 2 for the base
//! assert_eq!(conversion.mesh().len(), 4 * 9 + 2 * 12 + 2);
//! # Ok::<(), mapa_mesh::MeshError>(())
//! ```

mod base;
mod config;
mod convert;
mod corners;
mod error;
mod grid;
mod preprocess;
mod scale;
mod surface;
mod tiling;
mod triangle;
mod walls;

pub use base::triangulate_base;
pub use config::{
    MeshConfig, DEFAULT_MAXIMUM_RESOLUTION, DEFAULT_MODEL_SIZE_MM, DEFAULT_PERFORMANCE_WARNING_THRESHOLD,
    DEFAULT_Z_OFFSET_MM, DEFAULT_Z_SCALE,
};
pub use convert::{compute_all_triangles, convert, prepare_grid, Conversion, ConvertOptions, CutFormat, DataQualityWarning};
pub use corners::build_corner_grid;
pub use error::MeshError;
pub use grid::{CornerGrid, ElevationGrid};
pub use preprocess::{bin_factor_for, cut_to_aspect_ratio, cut_to_square, reduce_resolution, trim_empty_borders};
pub use scale::{combined_z_scale, resolve_z_offset, xy_scales, ScaleParameters};
pub use surface::{triangulate_surface, TRIANGLES_PER_CELL};
pub use tiling::{split_into_tiles, TileFormat};
pub use triangle::{assemble, BoundingBox, Triangle, TriangleBatch, Vertex};
pub use walls::{triangulate_walls, wall_triangle_count};

/// Result type for mesh operations.
pub type Result<T> = std::result::Result<T, MeshError>;
