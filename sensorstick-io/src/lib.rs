//! I/O operations for captured samples and training sets
//!
//! This crate persists the output of a capture run: the labeled feature
//! training set (JSON) and, optionally, the raw colored samples (PLY).

pub mod ply;
pub mod training_set;

pub use ply::{PlyReader, PlyWriter};
pub use training_set::{LabeledFeature, TrainingSet, default_file_name, read_training_set, write_training_set};

use sensorstick_core::{ColoredPointCloud3f, Result};

/// Trait for reading colored point clouds from files
pub trait PointCloudReader {
    fn read_point_cloud<P: AsRef<std::path::Path>>(path: P) -> Result<ColoredPointCloud3f>;
}

/// Trait for writing colored point clouds to files
pub trait PointCloudWriter {
    fn write_point_cloud<P: AsRef<std::path::Path>>(cloud: &ColoredPointCloud3f, path: P) -> Result<()>;
}

/// Auto-detect format and read a colored point cloud
pub fn read_point_cloud<P: AsRef<std::path::Path>>(path: P) -> Result<ColoredPointCloud3f> {
    let path = path.as_ref();
    match path.extension().and_then(|s| s.to_str()) {
        Some("ply") => ply::PlyReader::read_point_cloud(path),
        _ => Err(sensorstick_core::Error::UnsupportedFormat(
            format!("Unsupported point cloud format: {:?}", path.extension())
        )),
    }
}

/// Auto-detect format and write a colored point cloud
pub fn write_point_cloud<P: AsRef<std::path::Path>>(cloud: &ColoredPointCloud3f, path: P) -> Result<()> {
    let path = path.as_ref();
    match path.extension().and_then(|s| s.to_str()) {
        Some("ply") => ply::PlyWriter::write_point_cloud(cloud, path),
        _ => Err(sensorstick_core::Error::UnsupportedFormat(
            format!("Unsupported point cloud format: {:?}", path.extension())
        )),
    }
}
