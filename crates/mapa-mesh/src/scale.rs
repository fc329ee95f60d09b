//! Model scale and Z offset resolution.

use serde::Serialize;

/// Scale factors and offset mapping grid indices and elevations to millimetres.
///
/// Derived once per conversion and shared by the surface, wall and base builders.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct ScaleParameters {
    /// Millimetres per grid row.
    pub x_scale: f64,
    /// Millimetres per grid column.
    pub y_scale: f64,
    /// Millimetres per elevation unit (elevation scale times the user multiplier).
    pub z_scale: f64,
    /// Added to every scaled surface elevation.
    pub z_offset: f64,
}

impl ScaleParameters {
    /// Resolve all four parameters for a grid of `rows x cols` pixels.
    ///
    /// `min_corner` is the lowest value of the grid's corner grid.
    #[allow(clippy::too_many_arguments)]
    pub fn resolve(
        target_size: f64,
        rows: usize,
        cols: usize,
        aspect_ratio: Option<f64>,
        z_offset: Option<f64>,
        z_scale: f64,
        elevation_scale: f64,
        min_corner: f64,
    ) -> Self {
        let (x_scale, y_scale) = xy_scales(target_size, rows, cols, aspect_ratio);
        Self {
            x_scale,
            y_scale,
            z_scale: combined_z_scale(elevation_scale, z_scale),
            z_offset: resolve_z_offset(z_offset, min_corner, elevation_scale),
        }
    }

    /// Map a grid position (in cell units) and an elevation to a model vertex.
    #[inline]
    pub(crate) fn vertex(&self, x: f64, y: f64, elevation: f64) -> [f64; 3] {
        [
            x * self.x_scale,
            y * self.y_scale,
            elevation * self.z_scale + self.z_offset,
        ]
    }

    /// The point below `(x, y)` on the ground plane. Z is always zero, whatever the offset.
    #[inline]
    pub(crate) fn ground(&self, x: f64, y: f64) -> [f64; 3] {
        [x * self.x_scale, y * self.y_scale, 0.0]
    }
}

/// Compute `(x_scale, y_scale)`.
///
/// Without an aspect ratio both axes use `target_size / rows` so the native
/// pixel aspect is kept. With one, the Y extent becomes `target_size * ratio`
/// (ratios above 1.0 are inverted first).
pub fn xy_scales(target_size: f64, rows: usize, cols: usize, aspect_ratio: Option<f64>) -> (f64, f64) {
    let x_scale = target_size / rows as f64;
    let y_scale = match aspect_ratio {
        Some(ratio) if ratio != 0.0 => {
            let ratio = if ratio > 1.0 { 1.0 / ratio } else { ratio };
            target_size * ratio / cols as f64
        }
        _ => target_size / rows as f64,
    };
    (x_scale, y_scale)
}

/// Resolve the Z offset against the lowest corner elevation.
///
/// `None` selects natural mode: the lowest point keeps its real relative
/// height, so islands sit near zero and mountains float above the base.
/// An explicit offset places the lowest point at that height instead.
pub fn resolve_z_offset(z_offset: Option<f64>, min_corner: f64, elevation_scale: f64) -> f64 {
    match z_offset {
        None => min_corner * elevation_scale,
        Some(offset) => offset - min_corner * elevation_scale,
    }
}

/// Elevation units to millimetres, including the user's exaggeration factor.
pub fn combined_z_scale(elevation_scale: f64, z_scale: f64) -> f64 {
    elevation_scale * z_scale
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_xy_scales_native() {
        let (x, y) = xy_scales(200.0, 4, 8, None);
        assert_eq!(x, 50.0);
        assert_eq!(y, 50.0);
    }

    #[test]
    fn test_xy_scales_with_ratio() {
        let (x, y) = xy_scales(200.0, 10, 5, Some(0.5));
        assert_eq!(x, 20.0);
        assert_eq!(y, 20.0);

        // 2.0 is the transposed form of 0.5
        let (_, y_inverted) = xy_scales(200.0, 10, 5, Some(2.0));
        assert_eq!(y_inverted, y);
    }

    #[test]
    fn test_z_offset_modes() {
        assert_relative_eq!(resolve_z_offset(None, 120.0, 0.01), 1.2);
        assert_relative_eq!(resolve_z_offset(Some(4.0), 120.0, 0.01), 2.8);
        assert_relative_eq!(resolve_z_offset(Some(-1.0), 0.0, 0.01), -1.0);
    }

    #[test]
    fn test_resolve_combines_z_scale() {
        let params = ScaleParameters::resolve(100.0, 2, 2, None, Some(0.0), 3.0, 0.5, 0.0);
        assert_eq!(params.z_scale, 1.5);
        assert_eq!(params.vertex(1.0, 2.0, 2.0), [50.0, 100.0, 3.0]);
    }
}
