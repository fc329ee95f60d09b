//! Reading GeoTIFF files written with the `tiff` encoder.

use approx::assert_relative_eq;
use mapa_dem::{haversine_distance, DemError, DemRaster};
use std::fs::File;
use std::path::PathBuf;
use tiff::encoder::{colortype, TiffEncoder};
use tiff::tags::Tag;

struct TestTiff {
    path: PathBuf,
}

impl Drop for TestTiff {
    fn drop(&mut self) {
        let _ = std::fs::remove_file(&self.path);
    }
}

fn test_path(name: &str) -> PathBuf {
    std::env::temp_dir().join(format!("mapa-dem-{}-{}", std::process::id(), name))
}

/// Write a Gray32Float image with optional georeferencing and no-data tags.
fn write_tiff(
    name: &str,
    width: u32,
    height: u32,
    data: &[f32],
    georef: Option<([f64; 6], [f64; 3])>,
    nodata: Option<&str>,
) -> TestTiff {
    let path = test_path(name);
    let mut file = File::create(&path).expect("create test file");
    let mut tiff = TiffEncoder::new(&mut file).expect("tiff encoder");
    let mut image = tiff
        .new_image::<colortype::Gray32Float>(width, height)
        .expect("new image");
    if let Some((tiepoint, scale)) = georef {
        image
            .encoder()
            .write_tag(Tag::Unknown(33922), &tiepoint[..])
            .expect("tiepoint tag");
        image
            .encoder()
            .write_tag(Tag::Unknown(33550), &scale[..])
            .expect("pixel scale tag");
    }
    if let Some(nodata) = nodata {
        image
            .encoder()
            .write_tag(Tag::Unknown(42113), nodata)
            .expect("nodata tag");
    }
    image.write_data(data).expect("write data");
    TestTiff { path }
}

#[test]
fn test_read_georeferenced_raster() {
    let data: Vec<f32> = (0..12).map(|v| v as f32 * 10.0).collect();
    let tiff = write_tiff(
        "georef.tif",
        4,
        3,
        &data,
        Some(([0.0, 0.0, 0.0, 8.0, 47.0, 0.0], [0.01, 0.01, 0.0])),
        None,
    );

    let raster = DemRaster::from_file(&tiff.path).expect("load raster");
    assert_eq!((raster.width(), raster.height()), (4, 3));
    assert_eq!(raster.data(), data.as_slice());

    let bounds = raster.bounds();
    assert_relative_eq!(bounds.max_lat, 47.0);
    assert_relative_eq!(bounds.min_lat, 46.97, epsilon = 1e-9);
    assert_relative_eq!(bounds.min_lon, 8.0);
    assert_relative_eq!(bounds.max_lon, 8.04, epsilon = 1e-9);

    let grid = raster.to_elevation_grid().unwrap();
    assert_eq!(grid.shape(), (3, 4));
    assert_eq!(grid[(2, 3)], 110.0);
}

#[test]
fn test_elevation_scale_from_top_row() {
    let tiff = write_tiff(
        "scale.tif",
        4,
        2,
        &[1.0; 8],
        Some(([0.0, 0.0, 0.0, 8.0, 47.0, 0.0], [0.01, 0.01, 0.0])),
        None,
    );
    let raster = DemRaster::from_file(&tiff.path).unwrap();

    let distance = haversine_distance(46.995, 8.005, 46.995, 8.045);
    assert_relative_eq!(raster.elevation_scale(150.0).unwrap(), 150.0 / distance, max_relative = 1e-9);
}

#[test]
fn test_nodata_samples_become_zero() {
    let tiff = write_tiff(
        "nodata.tif",
        3,
        1,
        &[-9999.0, 5.0, -9999.0],
        Some(([0.0, 0.0, 0.0, 8.0, 47.0, 0.0], [0.01, 0.01, 0.0])),
        Some("-9999"),
    );
    let raster = DemRaster::from_file(&tiff.path).unwrap();
    assert_eq!(raster.no_data_value(), Some(-9999.0));
    assert_eq!(raster.data(), &[0.0, 5.0, 0.0]);
}

#[test]
fn test_filename_fallback() {
    let tiff = write_tiff("USGS_13_n48w123_20240327.tif", 2, 2, &[1.0, 2.0, 3.0, 4.0], None, None);
    let raster = DemRaster::from_file(&tiff.path).unwrap();
    let bounds = raster.bounds();
    assert_relative_eq!(bounds.max_lat, 48.0);
    assert_relative_eq!(bounds.min_lat, 47.0);
    assert_relative_eq!(bounds.min_lon, -123.0);
    assert_relative_eq!(bounds.max_lon, -122.0);
}

#[test]
fn test_missing_georeferencing() {
    let tiff = write_tiff("plain.tif", 2, 2, &[1.0; 4], None, None);
    assert!(matches!(DemRaster::from_file(&tiff.path), Err(DemError::InvalidFilename(_))));
}

#[test]
fn test_missing_file() {
    assert!(matches!(
        DemRaster::from_file(test_path("does-not-exist.tif")),
        Err(DemError::Io(_))
    ));
}
