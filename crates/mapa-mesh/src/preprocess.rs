//! Grid cropping and downsampling applied before triangulation.

use crate::grid::ElevationGrid;
use crate::{MeshError, Result};

/// Strip all-zero leading/trailing columns and rows.
///
/// Zero is the padding value upstream mosaicking leaves around a clipped
/// region. Each side is checked once, columns first. A dimension is never
/// trimmed below one, and grids with a dimension of one or less are returned
/// unchanged.
pub fn trim_empty_borders(grid: &ElevationGrid) -> ElevationGrid {
    let (rows, cols) = grid.shape();
    if rows <= 1 || cols <= 1 {
        return grid.clone();
    }

    let (mut row_start, mut row_end) = (0, rows);
    let (mut col_start, mut col_end) = (0, cols);

    if all_zero(grid.column(col_start)) {
        col_start += 1;
    }
    if col_end - col_start > 1 && all_zero(grid.column(col_end - 1)) {
        col_end -= 1;
    }
    let row_values = |i: usize| grid.row(i)[col_start..col_end].iter().copied();
    if all_zero(row_values(row_start)) {
        row_start += 1;
    }
    if row_end - row_start > 1 && all_zero(row_values(row_end - 1)) {
        row_end -= 1;
    }

    if (row_start, row_end, col_start, col_end) != (0, rows, 0, cols) {
        tracing::debug!(
            "Trimmed empty borders: {}x{} -> {}x{}",
            rows,
            cols,
            row_end - row_start,
            col_end - col_start
        );
    }
    grid.window(row_start, row_end, col_start, col_end)
}

fn all_zero(mut values: impl Iterator<Item = f64>) -> bool {
    values.all(|v| v == 0.0)
}

/// Crop a grid to a width:height ratio by dropping trailing rows or columns.
///
/// Ratios above 1.0 are inverted so the ratio always reads smaller over
/// larger. A ratio of exactly 1.0 crops the longer axis down to the shorter.
/// Otherwise the shorter axis (columns, for square grids) is cut to
/// `trunc(other_axis * ratio)`, never growing and never below one. Grids
/// already at the ratio are returned unchanged, so the operation is
/// idempotent.
///
/// Fails with [`MeshError::InvalidArgument`] for a zero, negative or
/// non-finite ratio.
pub fn cut_to_aspect_ratio(grid: &ElevationGrid, ratio: f64) -> Result<ElevationGrid> {
    if ratio == 0.0 {
        return Err(MeshError::InvalidArgument(
            "Cannot cut array to format with ratio 0.0. Choose a format ratio between 0.0 and 1.0".to_string(),
        ));
    }
    if !ratio.is_finite() || ratio < 0.0 {
        return Err(MeshError::InvalidArgument(format!(
            "Invalid format ratio {}, expected a positive number",
            ratio
        )));
    }
    grid.ensure_non_empty("cut_to_aspect_ratio")?;
    if ratio == 1.0 {
        return Ok(cut_to_square(grid));
    }

    let ratio = if ratio > 1.0 { 1.0 / ratio } else { ratio };
    let (rows, cols) = grid.shape();
    let (rows_f, cols_f) = (rows as f64, cols as f64);
    if rows_f / cols_f == ratio || cols_f / rows_f == ratio {
        return Ok(grid.clone());
    }

    let truncated = |length: usize, keep: usize| ((length as f64 * ratio) as usize).clamp(1, keep);
    if cols > rows {
        Ok(grid.window(0, truncated(cols, rows), 0, cols))
    } else {
        Ok(grid.window(0, rows, 0, truncated(rows, cols)))
    }
}

/// Crop the longer axis to the length of the shorter one, from the end.
pub fn cut_to_square(grid: &ElevationGrid) -> ElevationGrid {
    let side = grid.rows().min(grid.cols());
    grid.window(0, side, 0, side)
}

/// Downsample by averaging non-overlapping `bin_factor x bin_factor` blocks.
///
/// Both dimensions are integer-divided by `bin_factor`; trailing rows and
/// columns that do not fill a block are dropped.
pub fn reduce_resolution(grid: &ElevationGrid, bin_factor: usize) -> Result<ElevationGrid> {
    if bin_factor == 0 {
        return Err(MeshError::InvalidArgument(
            "Bin factor must be at least 1".to_string(),
        ));
    }
    let rows = grid.rows() / bin_factor;
    let cols = grid.cols() / bin_factor;
    if rows == 0 || cols == 0 {
        return Err(MeshError::invalid_dimensions(
            "reduce_resolution",
            grid.rows(),
            grid.cols(),
        ));
    }

    let block = (bin_factor * bin_factor) as f64;
    let mut data = vec![0.0; rows * cols];
    for bi in 0..rows {
        let out = &mut data[bi * cols..(bi + 1) * cols];
        for di in 0..bin_factor {
            let src = grid.row(bi * bin_factor + di);
            for (bj, sum) in out.iter_mut().enumerate() {
                *sum += src[bj * bin_factor..(bj + 1) * bin_factor].iter().sum::<f64>();
            }
        }
        for value in out.iter_mut() {
            *value /= block;
        }
    }

    ElevationGrid::new(rows, cols, data)
}

/// Bin factor that brings a `rows x cols` grid close to `maximum_resolution`
/// pixels per side: the mean of both axis ratios, rounded half to even.
///
/// Capped at the shorter side so that reducing never empties a thin strip.
pub fn bin_factor_for(rows: usize, cols: usize, maximum_resolution: usize) -> usize {
    let max = maximum_resolution.max(1) as f64;
    let factor = (rows as f64 / max + cols as f64 / max) / 2.0;
    (factor.round_ties_even() as usize).min(rows.min(cols))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ramp(rows: usize, cols: usize) -> ElevationGrid {
        ElevationGrid::from_fn(rows, cols, |i, j| (i * cols + j + 1) as f64)
    }

    #[test]
    fn test_trim_empty_borders() {
        let grid = ElevationGrid::from_rows(&[
            [0.0, 0.0, 0.0, 0.0],
            [0.0, 1.0, 2.0, 0.0],
            [0.0, 3.0, 4.0, 0.0],
            [0.0, 0.0, 0.0, 0.0],
        ])
        .unwrap();
        let trimmed = trim_empty_borders(&grid);
        assert_eq!(trimmed, ElevationGrid::from_rows(&[[1.0, 2.0], [3.0, 4.0]]).unwrap());
    }

    #[test]
    fn test_trim_only_once_per_side() {
        let grid = ElevationGrid::from_rows(&[
            [0.0, 0.0, 5.0],
            [0.0, 0.0, 6.0],
        ])
        .unwrap();
        let trimmed = trim_empty_borders(&grid);
        assert_eq!(trimmed, ElevationGrid::from_rows(&[[0.0, 5.0], [0.0, 6.0]]).unwrap());
    }

    #[test]
    fn test_trim_keeps_non_empty_borders() {
        let grid = ramp(3, 3);
        assert_eq!(trim_empty_borders(&grid), grid);
    }

    #[test]
    fn test_trim_skips_thin_grids() {
        let row = ElevationGrid::from_rows(&[[0.0, 0.0, 0.0]]).unwrap();
        assert_eq!(trim_empty_borders(&row), row);
        let col = ElevationGrid::from_rows(&[[0.0], [0.0]]).unwrap();
        assert_eq!(trim_empty_borders(&col), col);
    }

    #[test]
    fn test_trim_all_zero_never_empties() {
        let grid = ElevationGrid::filled(2, 2, 0.0);
        let trimmed = trim_empty_borders(&grid);
        assert_eq!(trimmed.shape(), (1, 1));
    }

    #[test]
    fn test_cut_to_square() {
        let square = ramp(10, 10);
        assert_eq!(cut_to_aspect_ratio(&square, 1.0).unwrap(), square);

        let tall = ramp(10, 5);
        assert_eq!(cut_to_aspect_ratio(&tall, 1.0).unwrap().shape(), (5, 5));

        let wide = ramp(2, 4);
        let cut = cut_to_aspect_ratio(&wide, 1.0).unwrap();
        assert_eq!(cut, ElevationGrid::from_rows(&[[1.0, 2.0], [5.0, 6.0]]).unwrap());
    }

    #[test]
    fn test_cut_to_rectangle() {
        // already in ratio
        let grid = ramp(10, 5);
        assert_eq!(cut_to_aspect_ratio(&grid, 0.5).unwrap().shape(), (10, 5));
        assert_eq!(cut_to_aspect_ratio(&grid, 2.0).unwrap().shape(), (10, 5));

        // more rows than cols: cut cols
        let grid = ramp(10, 8);
        assert_eq!(cut_to_aspect_ratio(&grid, 0.5).unwrap().shape(), (10, 5));

        // more cols than rows: cut rows
        let grid = ramp(8, 10);
        assert_eq!(cut_to_aspect_ratio(&grid, 0.5).unwrap().shape(), (5, 10));

        // square: cut cols
        let grid = ramp(10, 10);
        assert_eq!(cut_to_aspect_ratio(&grid, 0.3).unwrap().shape(), (10, 3));

        // truncation, not rounding
        let grid = ramp(10, 10);
        assert_eq!(cut_to_aspect_ratio(&grid, 0.39).unwrap().shape(), (10, 3));
    }

    #[test]
    fn test_cut_is_idempotent() {
        for (rows, cols) in [(10, 10), (10, 8), (8, 10), (10, 2), (7, 13), (100, 37)] {
            for ratio in [0.3, 0.5, 0.75, 1.0, 1.5, 4.0] {
                let once = cut_to_aspect_ratio(&ramp(rows, cols), ratio).unwrap();
                let twice = cut_to_aspect_ratio(&once, ratio).unwrap();
                assert_eq!(once, twice, "{}x{} with ratio {}", rows, cols, ratio);
            }
        }
    }

    #[test]
    fn test_cut_rejects_zero_ratio() {
        let err = cut_to_aspect_ratio(&ramp(4, 4), 0.0).unwrap_err();
        assert!(matches!(err, MeshError::InvalidArgument(_)));
        assert!(cut_to_aspect_ratio(&ramp(4, 4), -0.5).is_err());
        assert!(cut_to_aspect_ratio(&ramp(4, 4), f64::NAN).is_err());
    }

    #[test]
    fn test_reduce_resolution_constant() {
        let grid = ElevationGrid::filled(4, 4, 7.5);
        let reduced = reduce_resolution(&grid, 2).unwrap();
        assert_eq!(reduced, ElevationGrid::filled(2, 2, 7.5));
    }

    #[test]
    fn test_reduce_resolution_means_and_drops_partial_blocks() {
        let grid = ElevationGrid::from_rows(&[
            [1.0, 3.0, 5.0, 7.0, 100.0],
            [1.0, 3.0, 5.0, 7.0, 100.0],
            [2.0, 2.0, 4.0, 4.0, 100.0],
            [2.0, 2.0, 4.0, 4.0, 100.0],
            [100.0, 100.0, 100.0, 100.0, 100.0],
        ])
        .unwrap();
        let reduced = reduce_resolution(&grid, 2).unwrap();
        assert_eq!(reduced, ElevationGrid::from_rows(&[[2.0, 6.0], [2.0, 4.0]]).unwrap());
    }

    #[test]
    fn test_reduce_resolution_errors() {
        assert!(reduce_resolution(&ramp(4, 4), 0).is_err());
        assert!(matches!(
            reduce_resolution(&ramp(1, 4), 2),
            Err(MeshError::InvalidDimensions { .. })
        ));
    }

    #[test]
    fn test_bin_factor_for() {
        assert_eq!(bin_factor_for(1000, 1000, 1000), 1);
        assert_eq!(bin_factor_for(3000, 5000, 1000), 4);
        // 2.5 rounds to even
        assert_eq!(bin_factor_for(2500, 2500, 1000), 2);
        assert_eq!(bin_factor_for(3500, 3500, 1000), 4);
        assert_eq!(bin_factor_for(10, 20, 1000), 0);
    }

    #[test]
    fn test_bin_factor_capped_by_shorter_side() {
        assert_eq!(bin_factor_for(1, 5000, 1000), 1);
        assert_eq!(bin_factor_for(2, 6000, 1000), 2);
        assert_eq!(bin_factor_for(6000, 3, 1000), 3);
        let strip = ElevationGrid::filled(2, 6000, 1.0);
        let reduced = reduce_resolution(&strip, bin_factor_for(2, 6000, 1000)).unwrap();
        assert_eq!(reduced.shape(), (1, 3000));
    }
}
