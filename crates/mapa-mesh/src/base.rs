//! The flat bottom plate at `z = 0`.

use crate::scale::ScaleParameters;
use crate::triangle::{Triangle, TriangleBatch};
use crate::{MeshError, Result};

/// Triangulate the bottom of a `rows x cols` footprint as two triangles.
///
/// The plate spans `(0, 0)` to `(rows * x_scale, cols * y_scale)`.
pub fn triangulate_base(rows: usize, cols: usize, scale: &ScaleParameters) -> Result<TriangleBatch> {
    if rows < 1 || cols < 1 {
        return Err(MeshError::invalid_dimensions("triangulate_base", rows, cols));
    }
    let (x, y) = (rows as f64, cols as f64);
    let origin = scale.ground(0.0, 0.0);
    let far_x = scale.ground(x, 0.0);
    let far_y = scale.ground(0.0, y);
    let far = scale.ground(x, y);

    Ok(vec![
        Triangle([origin, far_y, far_x]),
        Triangle([far_y, far, far_x]),
    ]
    .into())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_base_plate() {
        let scale = ScaleParameters {
            x_scale: 1.0,
            y_scale: 2.0,
            z_scale: 7.0,
            z_offset: 9.0,
        };
        let base = triangulate_base(3, 2, &scale).unwrap();
        let actual: Vec<[[f64; 3]; 3]> = base.iter().map(|t| t.0).collect();
        assert_eq!(
            actual,
            vec![
                [[0.0, 0.0, 0.0], [0.0, 4.0, 0.0], [3.0, 0.0, 0.0]],
                [[0.0, 4.0, 0.0], [3.0, 4.0, 0.0], [3.0, 0.0, 0.0]],
            ]
        );
    }

    #[test]
    fn test_base_rejects_empty_footprint() {
        let scale = ScaleParameters {
            x_scale: 1.0,
            y_scale: 1.0,
            z_scale: 1.0,
            z_offset: 0.0,
        };
        assert!(triangulate_base(0, 4, &scale).is_err());
    }
}
