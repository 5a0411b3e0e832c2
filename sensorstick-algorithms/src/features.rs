//! Histogram feature extraction
//!
//! A sample's feature vector is the concatenation of a normalized color
//! histogram (three channels) and a normalized normal histogram (three
//! components), each channel split into the same number of bins.

use crate::color::ColorSpace;
use crate::normals::NormalEstimator;
use log::trace;
use serde::{Deserialize, Serialize};
use sensorstick_core::{ColoredPointCloud3f, Error, NormalPointCloud3f, Result};

/// Value range of color channels after conversion
pub const COLOR_RANGE: (f32, f32) = (0.0, 256.0);

/// Value range of unit normal components
pub const NORMAL_RANGE: (f32, f32) = (-1.0, 1.0);

/// Histogram feature configuration
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct HistogramConfig {
    /// Bins per channel
    pub bins: usize,
    /// Color space of the color histogram
    pub color_space: ColorSpace,
}

impl Default for HistogramConfig {
    fn default() -> Self {
        Self {
            bins: 32,
            color_space: ColorSpace::Hsv,
        }
    }
}

impl HistogramConfig {
    pub fn with_bins(mut self, bins: usize) -> Self {
        self.bins = bins;
        self
    }

    pub fn with_color_space(mut self, color_space: ColorSpace) -> Self {
        self.color_space = color_space;
        self
    }

    /// Length of the concatenated color + normal feature vector
    pub fn feature_len(&self) -> usize {
        6 * self.bins
    }
}

/// Count `values` into `bins` equal-width bins spanning `range`
///
/// The last bin is closed on the right. Values outside the range and
/// non-finite values are ignored.
pub fn histogram<I>(values: I, bins: usize, range: (f32, f32)) -> Vec<f32>
where
    I: IntoIterator<Item = f32>,
{
    let mut counts = vec![0.0; bins];
    let (lo, hi) = range;
    if bins == 0 || hi <= lo {
        return counts;
    }

    let width = (hi - lo) / bins as f32;
    for value in values {
        if !value.is_finite() || value < lo || value > hi {
            continue;
        }
        let bin = (((value - lo) / width) as usize).min(bins - 1);
        counts[bin] += 1.0;
    }
    counts
}

/// Scale `features` in place so that they sum to one
pub fn normalize_histogram(features: &mut [f32]) -> Result<()> {
    let total: f32 = features.iter().sum();
    if total <= 0.0 {
        return Err(Error::Algorithm(
            "cannot normalize a histogram with no counts".to_string(),
        ));
    }
    features.iter_mut().for_each(|f| *f /= total);
    Ok(())
}

/// Compute the normalized color histogram of a colored cloud
///
/// Returns `3 * bins` values, channel by channel.
pub fn compute_color_histograms(
    cloud: &ColoredPointCloud3f,
    color_space: ColorSpace,
    bins: usize,
) -> Result<Vec<f32>> {
    check_bins(bins)?;
    if cloud.is_empty() {
        return Err(Error::InvalidData("color histogram of an empty cloud".to_string()));
    }

    let colors: Vec<[f32; 3]> = cloud
        .iter()
        .filter(|p| p.is_finite())
        .map(|p| color_space.convert(p.color))
        .collect();

    let mut features = Vec::with_capacity(3 * bins);
    for channel in 0..3 {
        features.extend(histogram(colors.iter().map(|c| c[channel]), bins, COLOR_RANGE));
    }

    normalize_histogram(&mut features)?;
    Ok(features)
}

/// Compute the normalized histogram of the normal components of a cloud
///
/// Returns `3 * bins` values for the x, y and z components.
pub fn compute_normal_histograms(normals: &NormalPointCloud3f, bins: usize) -> Result<Vec<f32>> {
    check_bins(bins)?;
    if normals.is_empty() {
        return Err(Error::InvalidData("normal histogram of an empty cloud".to_string()));
    }

    let normals = normals.normals();
    let mut features = Vec::with_capacity(3 * bins);
    for axis in 0..3 {
        features.extend(histogram(
            normals.iter().map(|n| n[axis]),
            bins,
            NORMAL_RANGE,
        ));
    }

    normalize_histogram(&mut features)?;
    Ok(features)
}

/// Build the full feature vector of a non-empty sample
pub fn extract_features<N: NormalEstimator + ?Sized>(
    cloud: &ColoredPointCloud3f,
    normal_estimator: &N,
    config: &HistogramConfig,
) -> Result<Vec<f32>> {
    let color_hist = compute_color_histograms(cloud, config.color_space, config.bins)?;
    let normals = normal_estimator.get_normals(cloud)?;
    let normal_hist = compute_normal_histograms(&normals, config.bins)?;

    let mut feature = color_hist;
    feature.extend(normal_hist);
    trace!("extracted {} feature values from {} points", feature.len(), cloud.len());
    Ok(feature)
}

fn check_bins(bins: usize) -> Result<()> {
    if bins == 0 {
        return Err(Error::InvalidData("bins must be greater than 0".to_string()));
    }
    Ok(())
}
