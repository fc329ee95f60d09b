//! Error types for the DEM crate.

use mapa_mesh::MeshError;
use thiserror::Error;

/// Errors that can occur when reading an elevation raster.
#[derive(Debug, Error)]
pub enum DemError {
    /// I/O error reading a file.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// TIFF decoding error.
    #[error("TIFF decode error: {0}")]
    TiffDecode(#[from] tiff::TiffError),

    /// Invalid GeoTIFF - missing or inconsistent georeferencing.
    #[error("Invalid GeoTIFF: {0}")]
    InvalidGeoTiff(String),

    /// Invalid raster filename - cannot parse coordinates.
    #[error("Invalid raster filename: {0}")]
    InvalidFilename(String),

    /// The raster has no pixels.
    #[error("Raster {path} is empty ({width}x{height} pixels)")]
    EmptyRaster {
        /// Path of the offending file.
        path: String,
        /// Width in pixels.
        width: u32,
        /// Height in pixels.
        height: u32,
    },

    /// The decoded samples could not be turned into an elevation grid.
    #[error(transparent)]
    Mesh(#[from] MeshError),
}
