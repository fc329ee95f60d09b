//! Row-major elevation grids.
//!
//! [`ElevationGrid`] holds one altitude sample per raster cell, [`CornerGrid`]
//! holds the derived elevations at the shared cell corners and is always one
//! row and one column larger than the grid it was built from.

use crate::{MeshError, Result};
use std::ops::Index;

/// A 2D grid of altitude samples in row-major order.
///
/// Row index `i` runs along the model's X axis, column index `j` along its
/// Y axis. Preprocessing steps never mutate a grid in place; each returns a
/// new grid.
#[derive(Debug, Clone, PartialEq)]
pub struct ElevationGrid {
    rows: usize,
    cols: usize,
    data: Vec<f64>,
}

impl ElevationGrid {
    /// Create a grid from row-major samples.
    ///
    /// Returns [`MeshError::InvalidArgument`] if `data.len() != rows * cols`.
    pub fn new(rows: usize, cols: usize, data: Vec<f64>) -> Result<Self> {
        if data.len() != rows * cols {
            return Err(MeshError::InvalidArgument(format!(
                "Grid data has {} samples, expected {}x{} = {}",
                data.len(),
                rows,
                cols,
                rows * cols
            )));
        }
        Ok(Self { rows, cols, data })
    }

    /// Create a grid from nested rows. All rows must have the same length.
    pub fn from_rows<R: AsRef<[f64]>>(rows: &[R]) -> Result<Self> {
        let cols = rows.first().map_or(0, |r| r.as_ref().len());
        let mut data = Vec::with_capacity(rows.len() * cols);
        for (i, row) in rows.iter().enumerate() {
            let row = row.as_ref();
            if row.len() != cols {
                return Err(MeshError::InvalidArgument(format!(
                    "Row {} has {} columns, expected {}",
                    i,
                    row.len(),
                    cols
                )));
            }
            data.extend_from_slice(row);
        }
        Ok(Self {
            rows: rows.len(),
            cols,
            data,
        })
    }

    /// Create a grid where every sample has the same value.
    pub fn filled(rows: usize, cols: usize, value: f64) -> Self {
        Self {
            rows,
            cols,
            data: vec![value; rows * cols],
        }
    }

    /// Build a grid by evaluating `f(i, j)` for every cell.
    pub fn from_fn<F: FnMut(usize, usize) -> f64>(rows: usize, cols: usize, mut f: F) -> Self {
        let mut data = Vec::with_capacity(rows * cols);
        for i in 0..rows {
            for j in 0..cols {
                data.push(f(i, j));
            }
        }
        Self { rows, cols, data }
    }

    /// Number of rows.
    pub fn rows(&self) -> usize {
        self.rows
    }

    /// Number of columns.
    pub fn cols(&self) -> usize {
        self.cols
    }

    /// `(rows, cols)`.
    pub fn shape(&self) -> (usize, usize) {
        (self.rows, self.cols)
    }

    /// True if the grid has no samples.
    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    /// Sample at `(i, j)`, or `None` if out of range.
    pub fn get(&self, i: usize, j: usize) -> Option<f64> {
        if i < self.rows && j < self.cols {
            Some(self.data[i * self.cols + j])
        } else {
            None
        }
    }

    /// One row as a slice.
    pub fn row(&self, i: usize) -> &[f64] {
        &self.data[i * self.cols..(i + 1) * self.cols]
    }

    /// All samples in row-major order.
    pub fn as_slice(&self) -> &[f64] {
        &self.data
    }

    /// Iterate over one column from top to bottom.
    pub fn column(&self, j: usize) -> impl Iterator<Item = f64> + '_ {
        (0..self.rows).map(move |i| self.data[i * self.cols + j])
    }

    /// Copy out the rectangular window `[row_start, row_end) x [col_start, col_end)`.
    ///
    /// Bounds are clamped to the grid.
    pub fn window(&self, row_start: usize, row_end: usize, col_start: usize, col_end: usize) -> Self {
        let row_end = row_end.min(self.rows);
        let col_end = col_end.min(self.cols);
        let row_start = row_start.min(row_end);
        let col_start = col_start.min(col_end);
        let cols = col_end - col_start;
        let mut data = Vec::with_capacity((row_end - row_start) * cols);
        for i in row_start..row_end {
            data.extend_from_slice(&self.row(i)[col_start..col_end]);
        }
        Self {
            rows: row_end - row_start,
            cols,
            data,
        }
    }

    /// Fail with [`MeshError::InvalidDimensions`] unless the grid has at least one row and column.
    pub(crate) fn ensure_non_empty(&self, operation: &'static str) -> Result<()> {
        if self.rows < 1 || self.cols < 1 {
            return Err(MeshError::invalid_dimensions(operation, self.rows, self.cols));
        }
        Ok(())
    }
}

impl Index<(usize, usize)> for ElevationGrid {
    type Output = f64;

    fn index(&self, (i, j): (usize, usize)) -> &f64 {
        debug_assert!(i < self.rows && j < self.cols);
        &self.data[i * self.cols + j]
    }
}

/// Elevations at the corners shared by neighbouring cells.
///
/// Built by [`build_corner_grid`](crate::build_corner_grid); shape is
/// `(rows + 1, cols + 1)` of the source grid.
#[derive(Debug, Clone, PartialEq)]
pub struct CornerGrid {
    rows: usize,
    cols: usize,
    data: Vec<f64>,
}

impl CornerGrid {
    pub(crate) fn from_raw(rows: usize, cols: usize, data: Vec<f64>) -> Self {
        debug_assert_eq!(data.len(), rows * cols);
        Self { rows, cols, data }
    }

    /// Number of corner rows (source rows + 1).
    pub fn rows(&self) -> usize {
        self.rows
    }

    /// Number of corner columns (source cols + 1).
    pub fn cols(&self) -> usize {
        self.cols
    }

    /// `(rows, cols)`.
    pub fn shape(&self) -> (usize, usize) {
        (self.rows, self.cols)
    }

    /// Lowest corner elevation.
    pub fn min(&self) -> f64 {
        self.data.iter().copied().fold(f64::INFINITY, f64::min)
    }

    /// Highest corner elevation.
    pub fn max(&self) -> f64 {
        self.data.iter().copied().fold(f64::NEG_INFINITY, f64::max)
    }

    /// All corner elevations in row-major order.
    pub fn as_slice(&self) -> &[f64] {
        &self.data
    }
}

impl Index<(usize, usize)> for CornerGrid {
    type Output = f64;

    fn index(&self, (i, j): (usize, usize)) -> &f64 {
        debug_assert!(i < self.rows && j < self.cols);
        &self.data[i * self.cols + j]
    }
}
