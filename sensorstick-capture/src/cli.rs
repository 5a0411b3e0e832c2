//! Command line interface of `capture_features`

use crate::config::{CaptureConfig, DEFAULT_MAX_TRIES, DEFAULT_TIMES};
use clap::Parser;
use sensorstick_algorithms::{ColorSpace, HistogramConfig, NormalEstimationConfig};
use sensorstick_sim::SyntheticSimulatorConfig;
use std::path::PathBuf;

/// Capture labeled color and normal histogram features for a pick list
#[derive(Parser, Debug, Clone, PartialEq)]
#[command(name = "capture_features", version)]
pub struct Args {
    /// Pick list to capture: 1, 2 or 3; any other value selects the general list
    #[arg(short = 'l', long = "list", allow_negative_numbers = true)]
    pub list: i32,

    /// Number of captures for each model
    #[arg(short = 't', long = "times", default_value_t = DEFAULT_TIMES)]
    pub times: usize,

    /// Build color histograms from RGB instead of HSV
    #[arg(long = "no-hsv")]
    pub no_hsv: bool,

    /// Sample attempts per capture before giving up on empty clouds
    #[arg(long, default_value_t = DEFAULT_MAX_TRIES)]
    pub tries: usize,

    /// Histogram bins per channel
    #[arg(long, default_value_t = 32)]
    pub bins: usize,

    /// Neighbors used for normal estimation
    #[arg(long = "normals-k", default_value_t = 10)]
    pub normals_k: usize,

    /// Use neighbors within this radius for normals, k-NN where too few are inside
    #[arg(long = "normals-radius")]
    pub normals_radius: Option<f32>,

    /// Training set path [default: training_set_<list>.json]
    #[arg(short, long)]
    pub output: Option<PathBuf>,

    /// Seed of the synthetic world, for reproducible runs
    #[arg(long)]
    pub seed: Option<u64>,

    /// Probability that the synthetic sensor returns an empty frame
    #[arg(long, default_value_t = 0.0)]
    pub dropout: f64,

    /// Write every accepted sample as PLY into this directory
    #[arg(long = "dump-clouds")]
    pub dump_clouds: Option<PathBuf>,
}

impl Args {
    pub fn color_space(&self) -> ColorSpace {
        if self.no_hsv {
            ColorSpace::Rgb
        } else {
            ColorSpace::Hsv
        }
    }

    pub fn capture_config(&self) -> CaptureConfig {
        let histogram = HistogramConfig::default()
            .with_bins(self.bins)
            .with_color_space(self.color_space());

        CaptureConfig::new(self.list)
            .with_times(self.times)
            .with_max_tries(self.tries)
            .with_histogram(histogram)
            .with_output(self.output.clone())
            .with_dump_dir(self.dump_clouds.clone())
    }

    pub fn normal_config(&self) -> NormalEstimationConfig {
        NormalEstimationConfig::default()
            .with_k_neighbors(self.normals_k)
            .with_radius(self.normals_radius)
    }

    pub fn simulator_config(&self) -> SyntheticSimulatorConfig {
        SyntheticSimulatorConfig::default()
            .with_seed(self.seed)
            .with_dropout_probability(self.dropout)
    }
}
