//! Single-band elevation raster loaded from a GeoTIFF file.

use crate::geodesy::haversine_distance;
use crate::{DemError, Result};
use mapa_mesh::ElevationGrid;
use std::io::{Read, Seek};
use std::path::Path;
use tiff::decoder::{Decoder, DecodingResult, Limits};
use tiff::tags::Tag;
use tracing::{debug, warn};

const MODEL_TIEPOINT_TAG: u16 = 33922;
const MODEL_PIXEL_SCALE_TAG: u16 = 33550;
const GDAL_NODATA_TAG: u16 = 42113;

/// Decoder limit for large rasters (1 GB).
const DECODING_LIMIT_BYTES: usize = 1024 * 1024 * 1024;

/// Affine mapping from pixel indices to geographic coordinates.
///
/// Built from a GeoTIFF tiepoint (pixel `(tie_col, tie_row)` sits at
/// `(tie_lon, tie_lat)`) and a pixel scale in degrees. Rows run south,
/// columns run east.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GeoTransform {
    /// Raster column of the tiepoint.
    pub tie_col: f64,
    /// Raster row of the tiepoint.
    pub tie_row: f64,
    /// Longitude of the tiepoint.
    pub tie_lon: f64,
    /// Latitude of the tiepoint.
    pub tie_lat: f64,
    /// Degrees of longitude per pixel.
    pub scale_lon: f64,
    /// Degrees of latitude per pixel.
    pub scale_lat: f64,
}

impl GeoTransform {
    /// Latitude and longitude of the centre of pixel `(row, col)`.
    ///
    /// `col` may equal the raster width, addressing the pixel just past the
    /// eastern edge.
    pub fn pixel_center(&self, row: usize, col: usize) -> (f64, f64) {
        let lat = self.tie_lat - (row as f64 + 0.5 - self.tie_row) * self.scale_lat;
        let lon = self.tie_lon + (col as f64 + 0.5 - self.tie_col) * self.scale_lon;
        (lat, lon)
    }

    /// Geographic bounds of a `width x height` raster.
    pub fn bounds(&self, width: u32, height: u32) -> RasterBounds {
        let max_lat = self.tie_lat + self.tie_row * self.scale_lat;
        let min_lon = self.tie_lon - self.tie_col * self.scale_lon;
        RasterBounds {
            min_lat: max_lat - height as f64 * self.scale_lat,
            max_lat,
            min_lon,
            max_lon: min_lon + width as f64 * self.scale_lon,
        }
    }
}

/// Geographic bounds of a raster.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RasterBounds {
    /// Minimum latitude (south edge).
    pub min_lat: f64,
    /// Maximum latitude (north edge).
    pub max_lat: f64,
    /// Minimum longitude (west edge).
    pub min_lon: f64,
    /// Maximum longitude (east edge).
    pub max_lon: f64,
}

/// A single-band elevation raster.
///
/// Samples are stored row-major, north to south and west to east. No-data
/// samples are replaced with `0.0`, the value border trimming treats as
/// padding.
#[derive(Debug, Clone)]
pub struct DemRaster {
    data: Vec<f32>,
    width: u32,
    height: u32,
    transform: GeoTransform,
    no_data_value: Option<f32>,
}

impl DemRaster {
    /// Load the first band of a GeoTIFF file.
    ///
    /// Georeferencing comes from the ModelTiepoint and ModelPixelScale tags.
    /// Without them the USGS naming convention (`..._n48w123_...tif`, one
    /// degree per file) is used as a fallback.
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let file = std::fs::File::open(path)?;
        let mut limits = Limits::default();
        limits.decoding_buffer_size = DECODING_LIMIT_BYTES;
        limits.intermediate_buffer_size = DECODING_LIMIT_BYTES;
        limits.ifd_value_size = DECODING_LIMIT_BYTES;
        let mut decoder = Decoder::new(file)?.with_limits(limits);

        let (width, height) = decoder.dimensions()?;
        if width == 0 || height == 0 {
            return Err(DemError::EmptyRaster {
                path: path.display().to_string(),
                width,
                height,
            });
        }

        let transform = match read_geotransform(&mut decoder)? {
            Some(transform) => transform,
            None => {
                debug!("No georeferencing tags in {}, parsing filename", path.display());
                transform_from_filename(path, width, height)?
            }
        };
        let no_data_value = read_nodata_value(&mut decoder);
        let samples = decode_samples(&mut decoder)?;
        let data = first_band(samples, width as usize * height as usize)?;

        let raster = Self::new(data, width, height, transform, no_data_value)?;
        debug!(
            "Loaded {}x{} raster from {} (nodata: {:?})",
            width,
            height,
            path.display(),
            no_data_value
        );
        Ok(raster)
    }

    /// Create a raster from row-major samples.
    ///
    /// Samples equal to `no_data_value` become `0.0`.
    pub fn new(
        mut data: Vec<f32>,
        width: u32,
        height: u32,
        transform: GeoTransform,
        no_data_value: Option<f32>,
    ) -> Result<Self> {
        if data.len() != width as usize * height as usize {
            return Err(DemError::InvalidGeoTiff(format!(
                "Expected {}x{} samples, got {}",
                width,
                height,
                data.len()
            )));
        }
        if let Some(nodata) = no_data_value {
            let mut replaced = 0usize;
            for value in data.iter_mut().filter(|v| is_no_data(**v, nodata)) {
                *value = 0.0;
                replaced += 1;
            }
            if replaced > 0 {
                warn!("Replaced {} no-data samples with 0.0", replaced);
            }
        }
        Ok(Self {
            data,
            width,
            height,
            transform,
            no_data_value,
        })
    }

    /// Width in pixels (grid columns).
    pub fn width(&self) -> u32 {
        self.width
    }

    /// Height in pixels (grid rows).
    pub fn height(&self) -> u32 {
        self.height
    }

    /// Row-major samples.
    pub fn data(&self) -> &[f32] {
        &self.data
    }

    /// Pixel-to-geographic mapping.
    pub fn transform(&self) -> &GeoTransform {
        &self.transform
    }

    /// Value that marked missing samples in the source file.
    pub fn no_data_value(&self) -> Option<f32> {
        self.no_data_value
    }

    /// Geographic bounds.
    pub fn bounds(&self) -> RasterBounds {
        self.transform.bounds(self.width, self.height)
    }

    /// Latitude and longitude of the centre of pixel `(row, col)`.
    pub fn pixel_center(&self, row: usize, col: usize) -> (f64, f64) {
        self.transform.pixel_center(row, col)
    }

    /// The samples as an elevation grid of `height x width`.
    pub fn to_elevation_grid(&self) -> Result<ElevationGrid> {
        let data = self.data.iter().map(|&v| v as f64).collect();
        Ok(ElevationGrid::new(self.height as usize, self.width as usize, data)?)
    }

    /// Model millimetres per meter of real-world elevation for a model of
    /// `model_size` millimetres.
    ///
    /// The reference length is the great-circle distance along the top row,
    /// from the centre of the first pixel to the centre of the pixel just past
    /// the last column.
    pub fn elevation_scale(&self, model_size: f64) -> Result<f64> {
        let (lat1, lon1) = self.pixel_center(0, 0);
        let (lat2, lon2) = self.pixel_center(0, self.width as usize);
        let distance = haversine_distance(lat1, lon1, lat2, lon2);
        if !distance.is_finite() || distance <= 0.0 {
            return Err(DemError::InvalidGeoTiff(format!(
                "Cannot derive elevation scale: top row spans {} m",
                distance
            )));
        }
        debug!("Top row spans {:.1} m", distance);
        Ok(model_size / distance)
    }
}

fn is_no_data(value: f32, nodata: f32) -> bool {
    if nodata.is_nan() {
        value.is_nan()
    } else {
        (value - nodata).abs() < 0.001
    }
}

/// Read ModelTiepoint and ModelPixelScale, if both are present.
fn read_geotransform<R: Read + Seek>(decoder: &mut Decoder<R>) -> Result<Option<GeoTransform>> {
    let tiepoint = decoder.get_tag_f64_vec(Tag::from_u16_exhaustive(MODEL_TIEPOINT_TAG));
    let pixel_scale = decoder.get_tag_f64_vec(Tag::from_u16_exhaustive(MODEL_PIXEL_SCALE_TAG));

    let (tiepoint, scale) = match (tiepoint, pixel_scale) {
        (Ok(tiepoint), Ok(scale)) => (tiepoint, scale),
        _ => return Ok(None),
    };
    // Tiepoint format: [i, j, k, x, y, z]
    if tiepoint.len() < 6 || scale.len() < 2 {
        return Err(DemError::InvalidGeoTiff(format!(
            "Malformed georeferencing: tiepoint has {} values, pixel scale has {}",
            tiepoint.len(),
            scale.len()
        )));
    }
    Ok(Some(GeoTransform {
        tie_col: tiepoint[0],
        tie_row: tiepoint[1],
        tie_lon: tiepoint[3],
        tie_lat: tiepoint[4],
        scale_lon: scale[0],
        scale_lat: scale[1],
    }))
}

/// Georeferencing from a USGS filename like `USGS_13_n48w123_20240327.tif`.
///
/// The name gives the north-west corner of a one-degree cell.
fn transform_from_filename(path: &Path, width: u32, height: u32) -> Result<GeoTransform> {
    let filename = path
        .file_name()
        .and_then(|s| s.to_str())
        .ok_or_else(|| DemError::InvalidFilename(path.display().to_string()))?;
    let (north, west) = parse_cell_name(filename)
        .ok_or_else(|| DemError::InvalidFilename(filename.to_string()))?;

    Ok(GeoTransform {
        tie_col: 0.0,
        tie_row: 0.0,
        tie_lon: west,
        tie_lat: north,
        scale_lon: 1.0 / width as f64,
        scale_lat: 1.0 / height as f64,
    })
}

/// Parse the first `[ns]<digits>[ew]<digits>` token into the signed latitude
/// of the north edge and longitude of the west edge.
fn parse_cell_name(filename: &str) -> Option<(f64, f64)> {
    let lower = filename.to_ascii_lowercase();
    let bytes = lower.as_bytes();
    (0..bytes.len()).find_map(|start| {
        let lat_sign = match bytes[start] {
            b'n' => 1.0,
            b's' => -1.0,
            _ => return None,
        };
        let lat_len = bytes[start + 1..].iter().take_while(|b| b.is_ascii_digit()).count();
        let lon_pos = start + 1 + lat_len;
        let lon_sign = match bytes.get(lon_pos) {
            Some(b'e') => 1.0,
            Some(b'w') => -1.0,
            _ => return None,
        };
        let lon_len = bytes[lon_pos + 1..].iter().take_while(|b| b.is_ascii_digit()).count();
        if lat_len == 0 || lon_len == 0 {
            return None;
        }
        let lat: f64 = lower[start + 1..lon_pos].parse().ok()?;
        let lon: f64 = lower[lon_pos + 1..lon_pos + 1 + lon_len].parse().ok()?;
        Some((lat_sign * lat, lon_sign * lon))
    })
}

/// Decode all samples of the first image as f32.
fn decode_samples<R: Read + Seek>(decoder: &mut Decoder<R>) -> Result<Vec<f32>> {
    let samples = match decoder.read_image()? {
        DecodingResult::F32(data) => data,
        DecodingResult::F64(data) => data.into_iter().map(|v| v as f32).collect(),
        DecodingResult::I16(data) => data.into_iter().map(|v| v as f32).collect(),
        DecodingResult::I32(data) => data.into_iter().map(|v| v as f32).collect(),
        DecodingResult::U16(data) => data.into_iter().map(|v| v as f32).collect(),
        DecodingResult::U32(data) => data.into_iter().map(|v| v as f32).collect(),
        DecodingResult::U8(data) => data.into_iter().map(|v| v as f32).collect(),
        DecodingResult::I8(data) => data.into_iter().map(|v| v as f32).collect(),
        DecodingResult::U64(data) => data.into_iter().map(|v| v as f32).collect(),
        DecodingResult::I64(data) => data.into_iter().map(|v| v as f32).collect(),
    };
    Ok(samples)
}

/// Keep the first sample of every pixel of interleaved multi-band data.
fn first_band(samples: Vec<f32>, pixels: usize) -> Result<Vec<f32>> {
    if samples.len() == pixels {
        return Ok(samples);
    }
    if pixels == 0 || samples.len() % pixels != 0 {
        return Err(DemError::InvalidGeoTiff(format!(
            "Decoded {} samples for {} pixels",
            samples.len(),
            pixels
        )));
    }
    let bands = samples.len() / pixels;
    debug!("Dropping {} extra bands", bands - 1);
    Ok(samples.into_iter().step_by(bands).collect())
}

/// GDAL stores no-data as an ASCII string.
fn read_nodata_value<R: Read + Seek>(decoder: &mut Decoder<R>) -> Option<f32> {
    decoder
        .get_tag_ascii_string(Tag::from_u16_exhaustive(GDAL_NODATA_TAG))
        .ok()
        .and_then(|s| s.trim_matches(char::from(0)).trim().parse().ok())
}
