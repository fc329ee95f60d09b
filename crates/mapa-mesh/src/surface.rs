//! Triangles of the visible terrain surface.
//!
//! Each pixel with centre `C` and corners 1-4 is drawn as four triangles that
//! meet in the centre:
//!
//! ```text
//! 1-----------------2
//! | x             x |
//! |   x         x   |
//! |     x     x     |
//! |        C        |
//! |     x     x     |
//! |   x         x   |
//! | x             x |
//! 3-----------------4
//! ```

use crate::grid::{CornerGrid, ElevationGrid};
use crate::scale::ScaleParameters;
use crate::triangle::{Triangle, TriangleBatch};
use crate::{MeshError, Result};
use rayon::prelude::*;

/// Triangles emitted per pixel.
pub const TRIANGLES_PER_CELL: usize = 4;

/// Triangulate the elevation surface: exactly `4 * rows * cols` triangles.
///
/// Canonical order per cell `(i, j)`, with `Cp` the scaled cell centre and
/// `c(a, b)` the scaled corner `corners[a, b]`:
/// 1. top: `Cp, c(i, j), c(i+1, j)`
/// 2. left: `c(i, j+1), c(i, j), Cp`
/// 3. bottom: `c(i+1, j+1), c(i, j+1), Cp`
/// 4. right: `Cp, c(i+1, j), c(i+1, j+1)`
///
/// Cells are emitted row by row. Rows are filled in parallel but the output
/// order does not depend on scheduling.
pub fn triangulate_surface(
    grid: &ElevationGrid,
    corners: &CornerGrid,
    scale: &ScaleParameters,
) -> Result<TriangleBatch> {
    grid.ensure_non_empty("triangulate_surface")?;
    let (rows, cols) = grid.shape();
    if corners.shape() != (rows + 1, cols + 1) {
        return Err(MeshError::InvalidArgument(format!(
            "Corner grid is {}x{}, expected {}x{} for a {}x{} grid",
            corners.rows(),
            corners.cols(),
            rows + 1,
            cols + 1,
            rows,
            cols
        )));
    }

    let mut triangles = vec![Triangle::SENTINEL; TRIANGLES_PER_CELL * rows * cols];
    triangles
        .par_chunks_mut(TRIANGLES_PER_CELL * cols)
        .enumerate()
        .for_each(|(i, row_out)| {
            let samples = grid.row(i);
            for (j, cell_out) in row_out.chunks_exact_mut(TRIANGLES_PER_CELL).enumerate() {
                let (x, y) = (i as f64, j as f64);
                let center = scale.vertex(x + 0.5, y + 0.5, samples[j]);
                let c00 = scale.vertex(x, y, corners[(i, j)]);
                let c10 = scale.vertex(x + 1.0, y, corners[(i + 1, j)]);
                let c01 = scale.vertex(x, y + 1.0, corners[(i, j + 1)]);
                let c11 = scale.vertex(x + 1.0, y + 1.0, corners[(i + 1, j + 1)]);

                cell_out[0] = Triangle([center, c00, c10]);
                cell_out[1] = Triangle([c01, c00, center]);
                cell_out[2] = Triangle([c11, c01, center]);
                cell_out[3] = Triangle([center, c10, c11]);
            }
        });

    debug_assert!(!triangles.contains(&Triangle::SENTINEL));
    Ok(triangles.into())
}
