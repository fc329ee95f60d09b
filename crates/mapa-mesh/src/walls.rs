//! Side walls closing the mesh between the surface rim and the ground plane.
//!
//! Walking along one side of the surface, every pair of neighbouring rim
//! corners `s` is joined to the ground `b` below them by two triangles: one with
//! two vertices on the rim, one with two vertices on the ground.
//!
//! ```text
//!         s
//! s   s       s       s           s
//!                 s       s   s       s
//!
//! b   b   b   b   b   b   b   b   b   b
//! ```

use crate::grid::CornerGrid;
use crate::scale::ScaleParameters;
use crate::triangle::{Triangle, TriangleBatch};
use crate::{MeshError, Result};

/// Number of wall triangles for a `rows x cols` grid.
///
/// Corner cells contribute to two sides, so nothing is subtracted.
pub fn wall_triangle_count(rows: usize, cols: usize) -> usize {
    2 * (2 * rows + 2 * cols)
}

/// Triangulate the four side walls of a `rows x cols` grid.
///
/// Cells are visited row by row; a boundary cell emits its pairs in the order
/// first row, last row, first column, last column. A single-row or
/// single-column grid therefore emits both opposing walls from the same cell.
///
/// Rim vertices use the true boundary corners (row `rows` for the last row,
/// column `cols` for the last column) so they coincide bit for bit with the
/// surface rim. Ground vertices always have `z = 0`.
pub fn triangulate_walls(
    corners: &CornerGrid,
    rows: usize,
    cols: usize,
    scale: &ScaleParameters,
) -> Result<TriangleBatch> {
    if rows < 1 || cols < 1 {
        return Err(MeshError::invalid_dimensions("triangulate_walls", rows, cols));
    }
    if corners.shape() != (rows + 1, cols + 1) {
        return Err(MeshError::InvalidArgument(format!(
            "Corner grid is {}x{}, expected {}x{}",
            corners.rows(),
            corners.cols(),
            rows + 1,
            cols + 1
        )));
    }

    let rim = |i: usize, j: usize| scale.vertex(i as f64, j as f64, corners[(i, j)]);
    let ground = |i: usize, j: usize| scale.ground(i as f64, j as f64);

    let mut triangles = TriangleBatch::with_capacity(wall_triangle_count(rows, cols));
    for i in 0..rows {
        for j in 0..cols {
            if i == 0 {
                triangles.push(Triangle([rim(0, j), rim(0, j + 1), ground(0, j)]));
                triangles.push(Triangle([ground(0, j), rim(0, j + 1), ground(0, j + 1)]));
            }
            if i == rows - 1 {
                triangles.push(Triangle([rim(rows, j + 1), rim(rows, j), ground(rows, j)]));
                triangles.push(Triangle([rim(rows, j + 1), ground(rows, j), ground(rows, j + 1)]));
            }
            if j == 0 {
                triangles.push(Triangle([rim(i + 1, 0), rim(i, 0), ground(i, 0)]));
                triangles.push(Triangle([rim(i + 1, 0), ground(i, 0), ground(i + 1, 0)]));
            }
            if j == cols - 1 {
                triangles.push(Triangle([rim(i, cols), rim(i + 1, cols), ground(i, cols)]));
                triangles.push(Triangle([ground(i, cols), rim(i + 1, cols), ground(i + 1, cols)]));
            }
        }
    }

    Ok(triangles)
}
