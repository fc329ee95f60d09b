//! Error types for the mesh crate.

use thiserror::Error;

/// Errors that can occur while preprocessing a grid or building a mesh.
#[derive(Debug, Error)]
pub enum MeshError {
    /// The grid has fewer rows or columns than the operation requires.
    #[error("Invalid dimensions for {operation}: got {rows}x{cols} grid, need at least 1x1")]
    InvalidDimensions {
        /// Name of the operation that rejected the grid.
        operation: &'static str,
        /// Number of rows in the offending grid.
        rows: usize,
        /// Number of columns in the offending grid.
        cols: usize,
    },

    /// An argument is outside its valid domain.
    #[error("{0}")]
    InvalidArgument(String),

    /// I/O error reading a configuration file.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Configuration could not be parsed.
    #[error("Invalid configuration: {0}")]
    Config(#[from] serde_yaml::Error),
}

impl MeshError {
    pub(crate) fn invalid_dimensions(operation: &'static str, rows: usize, cols: usize) -> Self {
        MeshError::InvalidDimensions {
            operation,
            rows,
            cols,
        }
    }
}
