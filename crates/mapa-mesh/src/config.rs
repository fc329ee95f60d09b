//! Conversion defaults, optionally loaded from a YAML file.
//!
//! ```yaml
//! model_size: 150.0
//! z_offset: null        # natural height
//! z_scale: 2.5
//! maximum_resolution: 800
//! ```

use crate::Result;
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Pixels per side the resolution reduction aims for.
pub const DEFAULT_MAXIMUM_RESOLUTION: usize = 1_000;

/// Pixel count above which max-resolution conversions are flagged.
pub const DEFAULT_PERFORMANCE_WARNING_THRESHOLD: usize = 5_000 * 5_000;

/// Size of the longer model side in millimetres.
pub const DEFAULT_MODEL_SIZE_MM: f64 = 200.0;

/// Ground clearance below the lowest surface point in millimetres.
pub const DEFAULT_Z_OFFSET_MM: f64 = 4.0;

/// Elevation exaggeration multiplier.
pub const DEFAULT_Z_SCALE: f64 = 1.0;

/// Tunable conversion parameters.
///
/// Every field has a default, so a YAML file only needs the keys it changes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct MeshConfig {
    /// Pixels per side the resolution reduction aims for.
    pub maximum_resolution: usize,
    /// Pixel count above which a max-resolution run is flagged.
    pub performance_warning_threshold: usize,
    /// Target model size in millimetres.
    pub model_size: f64,
    /// Explicit ground clearance in millimetres, `None` for natural height.
    pub z_offset: Option<f64>,
    /// Elevation exaggeration multiplier.
    pub z_scale: f64,
}

impl Default for MeshConfig {
    fn default() -> Self {
        Self {
            maximum_resolution: DEFAULT_MAXIMUM_RESOLUTION,
            performance_warning_threshold: DEFAULT_PERFORMANCE_WARNING_THRESHOLD,
            model_size: DEFAULT_MODEL_SIZE_MM,
            z_offset: Some(DEFAULT_Z_OFFSET_MM),
            z_scale: DEFAULT_Z_SCALE,
        }
    }
}

impl MeshConfig {
    /// Parse a configuration from YAML text.
    pub fn from_yaml_str(yaml: &str) -> Result<Self> {
        Ok(serde_yaml::from_str(yaml)?)
    }

    /// Load a configuration from a YAML file.
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let text = std::fs::read_to_string(path)?;
        Self::from_yaml_str(&text)
    }
}
