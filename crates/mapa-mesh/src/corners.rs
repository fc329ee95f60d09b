//! Cell-centre to cell-corner elevation transform.
//!
//! Every input pixel becomes four triangles meeting at the pixel centre, so the
//! mesh also needs an elevation at each pixel corner. Picture the corner raster
//! `r` laid over the input array `a`, offset by half a pixel:
//!
//! ```text
//! r   r   r   r
//!   a   a   a
//! r   r   r   r
//!   a   a   a
//! r   r   r   r
//! ```
//!
//! Interior corners average the four pixels around them. Corners on the leading
//! edge take the pixel below/right of them, corners on the trailing edge take the
//! pixel above/left of them.

use crate::grid::{CornerGrid, ElevationGrid};
use crate::Result;

/// Derive the `(rows + 1) x (cols + 1)` corner grid of `grid`.
///
/// For corner `(i, j)` with `R = rows`, `C = cols`:
/// - `i == R, j < C`: `grid[i-1, j]`
/// - `j == C, i < R`: `grid[i, j-1]`
/// - `i == R, j == C`: `grid[i-1, j-1]`
/// - `i == 0` or `j == 0`: `grid[i, j]`
/// - otherwise the mean of the four pixels touching the corner.
///
/// Fails with [`MeshError::InvalidDimensions`](crate::MeshError::InvalidDimensions)
/// on an empty grid. Single-row and single-column grids are valid.
pub fn build_corner_grid(grid: &ElevationGrid) -> Result<CornerGrid> {
    grid.ensure_non_empty("build_corner_grid")?;
    let (rows, cols) = grid.shape();
    let samples = grid.as_slice();
    let at = |i: usize, j: usize| samples[i * cols + j];

    let out_cols = cols + 1;
    let mut corners = Vec::with_capacity((rows + 1) * out_cols);
    for i in 0..=rows {
        for j in 0..=cols {
            let value = if i == rows && j < cols {
                at(i - 1, j)
            } else if j == cols && i < rows {
                at(i, j - 1)
            } else if i == rows && j == cols {
                at(i - 1, j - 1)
            } else if i == 0 || j == 0 {
                at(i, j)
            } else {
                (at(i, j) + at(i - 1, j) + at(i, j - 1) + at(i - 1, j - 1)) / 4.0
            };
            corners.push(value);
        }
    }

    Ok(CornerGrid::from_raw(rows + 1, out_cols, corners))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::MeshError;
    use approx::assert_relative_eq;

    #[test]
    fn test_two_by_two() {
        let grid = ElevationGrid::from_rows(&[[0.3, 0.9], [0.1, 0.7]]).unwrap();
        let corners = build_corner_grid(&grid).unwrap();
        assert_eq!(corners.shape(), (3, 3));

        assert_eq!(corners[(0, 0)], grid[(0, 0)]);
        assert_eq!(corners[(0, 1)], grid[(0, 1)]);
        assert_eq!(corners[(1, 0)], grid[(1, 0)]);
        assert_eq!(corners[(2, 0)], grid[(1, 0)]);
        assert_eq!(corners[(0, 2)], grid[(0, 1)]);
        assert_eq!(corners[(2, 2)], grid[(1, 1)]);
        assert_eq!(corners[(1, 2)], grid[(1, 1)]);
        assert_eq!(corners[(2, 1)], grid[(1, 1)]);

        let mean = grid.as_slice().iter().sum::<f64>() / 4.0;
        assert_relative_eq!(corners[(1, 1)], mean);
    }

    #[test]
    fn test_shape_for_rectangles() {
        for (rows, cols) in [(1, 1), (1, 5), (5, 1), (3, 7), (8, 2)] {
            let grid = ElevationGrid::from_fn(rows, cols, |i, j| (i + j) as f64);
            let corners = build_corner_grid(&grid).unwrap();
            assert_eq!(corners.shape(), (rows + 1, cols + 1));
        }
    }

    #[test]
    fn test_single_row() {
        let grid = ElevationGrid::from_rows(&[[1.0, 2.0, 3.0]]).unwrap();
        let corners = build_corner_grid(&grid).unwrap();
        assert_eq!(corners.as_slice(), &[1.0, 2.0, 3.0, 3.0, 1.0, 2.0, 3.0, 3.0]);
    }

    #[test]
    fn test_empty_grid_is_rejected() {
        let grid = ElevationGrid::new(0, 3, vec![]).unwrap();
        let err = build_corner_grid(&grid).unwrap_err();
        assert!(matches!(
            err,
            MeshError::InvalidDimensions { rows: 0, cols: 3, .. }
        ));
    }
}
