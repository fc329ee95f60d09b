//! Splitting a grid into independently meshed tiles.

use crate::grid::ElevationGrid;
use crate::{MeshError, Result};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Number of tiles along the row (`x`) and column (`y`) axes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TileFormat {
    /// Row-wise partitions.
    pub x: usize,
    /// Column-wise partitions.
    pub y: usize,
}

impl TileFormat {
    /// Create a tile format. Both counts must be positive.
    pub fn new(x: usize, y: usize) -> Result<Self> {
        if x == 0 || y == 0 {
            return Err(MeshError::InvalidArgument(format!(
                "Tile format {}*{} must have at least one tile per axis",
                x, y
            )));
        }
        Ok(Self { x, y })
    }

    /// Total number of tiles.
    pub fn count(&self) -> usize {
        self.x * self.y
    }
}

impl fmt::Display for TileFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}*{}", self.x, self.y)
    }
}

const TILE_FORMAT_ERROR: &str = "Invalid format for tiles. Input value needs to be of format `n*m`, \
    where `n` and `m` are positive integers.";

impl FromStr for TileFormat {
    type Err = MeshError;

    /// Parse `"n*m"`, e.g. `"3*2"`.
    fn from_str(s: &str) -> Result<Self> {
        let parts: Vec<&str> = s.split('*').collect();
        if parts.len() != 2 {
            return Err(MeshError::InvalidArgument(format!("{} Got `{}`", TILE_FORMAT_ERROR, s)));
        }
        let parse = |part: &str| {
            if part.is_empty() || !part.bytes().all(|b| b.is_ascii_digit()) {
                return Err(MeshError::InvalidArgument(format!("{} Got `{}`", TILE_FORMAT_ERROR, s)));
            }
            part.parse::<usize>().map_err(|e| {
                MeshError::InvalidArgument(format!("{} Got `{}`: {}", TILE_FORMAT_ERROR, s, e))
            })
        };
        let (x, y) = (parse(parts[0])?, parse(parts[1])?);
        if x == 0 || y == 0 {
            return Err(MeshError::InvalidArgument(format!("{} Got `{}`", TILE_FORMAT_ERROR, s)));
        }
        Ok(Self { x, y })
    }
}

/// Split `grid` into `tile_format.count()` equally sized tiles.
///
/// Trailing rows and columns that do not divide evenly by the tile counts are
/// dropped first. Tiles are returned row partition first, then column
/// partition: `(0,0), (0,1), ..., (1,0), ...`.
///
/// Fails with [`MeshError::InvalidArgument`] if the grid has fewer rows or
/// columns than requested tiles.
pub fn split_into_tiles(grid: &ElevationGrid, tile_format: TileFormat) -> Result<Vec<ElevationGrid>> {
    let (rows, cols) = grid.shape();
    if tile_format.x == 0 || tile_format.y == 0 {
        return Err(MeshError::InvalidArgument(format!(
            "Tile format {} must have at least one tile per axis",
            tile_format
        )));
    }
    if tile_format.x > rows || tile_format.y > cols {
        return Err(MeshError::InvalidArgument(format!(
            "Input array is too small to be split into tiles. Got {}x{} grid for {} tiles.",
            rows, cols, tile_format
        )));
    }

    let rows_per_tile = rows / tile_format.x;
    let cols_per_tile = cols / tile_format.y;
    if rows % tile_format.x != 0 || cols % tile_format.y != 0 {
        tracing::debug!(
            "Dropping {} trailing rows and {} trailing cols to split {}x{} grid into {} tiles",
            rows % tile_format.x,
            cols % tile_format.y,
            rows,
            cols,
            tile_format
        );
    }

    let mut tiles = Vec::with_capacity(tile_format.count());
    for tx in 0..tile_format.x {
        for ty in 0..tile_format.y {
            tiles.push(grid.window(
                tx * rows_per_tile,
                (tx + 1) * rows_per_tile,
                ty * cols_per_tile,
                (ty + 1) * cols_per_tile,
            ));
        }
    }
    Ok(tiles)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn grid<const C: usize>(rows: &[[f64; C]]) -> ElevationGrid {
        ElevationGrid::from_rows(rows).unwrap()
    }

    #[test]
    fn test_split_square_into_two_by_two() {
        let four_by_four = grid(&[
            [1.0, 2.0, 3.0, 4.0],
            [5.0, 6.0, 7.0, 8.0],
            [9.0, 0.0, 1.0, 2.0],
            [3.0, 4.0, 5.0, 6.0],
        ]);
        let tiles = split_into_tiles(&four_by_four, TileFormat::new(2, 2).unwrap()).unwrap();
        assert_eq!(
            tiles,
            vec![
                grid(&[[1.0, 2.0], [5.0, 6.0]]),
                grid(&[[3.0, 4.0], [7.0, 8.0]]),
                grid(&[[9.0, 0.0], [3.0, 4.0]]),
                grid(&[[1.0, 2.0], [5.0, 6.0]]),
            ]
        );
    }

    #[test]
    fn test_split_drops_remainder() {
        let three_by_three_values = [1.0, 2.0, 3.0, 5.0, 6.0, 7.0, 9.0, 0.0, 1.0];
        let expected: Vec<ElevationGrid> = three_by_three_values
            .iter()
            .map(|v| ElevationGrid::filled(1, 1, *v))
            .collect();

        let three_by_three = grid(&[[1.0, 2.0, 3.0], [5.0, 6.0, 7.0], [9.0, 0.0, 1.0]]);
        let format = TileFormat::new(3, 3).unwrap();
        assert_eq!(split_into_tiles(&three_by_three, format).unwrap(), expected);

        let four_by_five = grid(&[
            [1.0, 2.0, 3.0, 4.0, 5.0],
            [5.0, 6.0, 7.0, 8.0, 9.0],
            [9.0, 0.0, 1.0, 2.0, 3.0],
            [3.0, 4.0, 5.0, 6.0, 7.0],
        ]);
        assert_eq!(split_into_tiles(&four_by_five, format).unwrap(), expected);
    }

    #[test]
    fn test_split_too_small() {
        let two_by_two = grid(&[[1.0, 2.0], [5.0, 6.0]]);
        let err = split_into_tiles(&two_by_two, TileFormat::new(3, 3).unwrap()).unwrap_err();
        assert!(matches!(err, MeshError::InvalidArgument(_)));
        assert!(err
            .to_string()
            .contains("Input array is too small to be split into tiles."));

        let err = split_into_tiles(&two_by_two, TileFormat { x: 1, y: 3 }).unwrap_err();
        assert!(err.to_string().contains("too small"));
    }

    #[test]
    fn test_parse_tile_format() {
        assert_eq!("3*3".parse::<TileFormat>().unwrap(), TileFormat { x: 3, y: 3 });
        assert_eq!("2*10".parse::<TileFormat>().unwrap(), TileFormat { x: 2, y: 10 });

        for invalid in ["foo", "1*2*3", "a*f", "0*2", "-1*2", "*", " 2 * 3", "+2*3", "2*+3", "2 *3"] {
            let err = invalid.parse::<TileFormat>().unwrap_err();
            assert!(
                err.to_string().contains("Invalid format"),
                "unexpected error for {:?}: {}",
                invalid,
                err
            );
        }
    }
}
