//! # mapa-dem
//!
//! Elevation raster input for terrain model generation.
//!
//! This crate reads single-band GeoTIFF digital elevation models into an
//! [`ElevationGrid`](mapa_mesh::ElevationGrid) and derives the elevation
//! scale that ties real-world meters to model millimetres.
//!
//! ## Georeferencing
//!
//! Pixel coordinates are mapped to latitude/longitude from the GeoTIFF
//! ModelTiepoint (33922) and ModelPixelScale (33550) tags. Files without
//! these tags may instead follow the USGS naming convention, e.g.
//! `USGS_13_n48w123_20240327.tif` for the one-degree cell whose north-west
//! corner is at 48°N 123°W.
//!
//! No-data samples (GDAL_NODATA, tag 42113) are replaced with `0.0`.
//!
//! ## Example
//!
//! ```no_run
//! use mapa_dem::DemRaster;
//!
//! let raster = DemRaster::from_file("dem_data/USGS_13_n48w123_20240327.tif")?;
//! let grid = raster.to_elevation_grid()?;
//! let elevation_scale = raster.elevation_scale(200.0)?;
//! println!("{}x{} grid, {} mm per meter", grid.rows(), grid.cols(), elevation_scale);
//! # Ok::<(), mapa_dem::DemError>(())
//! ```

mod error;
mod geodesy;
mod raster;

pub use error::DemError;
pub use geodesy::{haversine_distance, EARTH_RADIUS_M};
pub use raster::{DemRaster, GeoTransform, RasterBounds};

/// Result type for DEM operations.
pub type Result<T> = std::result::Result<T, DemError>;
