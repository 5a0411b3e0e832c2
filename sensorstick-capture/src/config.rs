//! Capture run configuration

use sensorstick_algorithms::HistogramConfig;
use sensorstick_core::{Error, Result};
use sensorstick_io::default_file_name;
use std::path::PathBuf;

/// Attempts per capture before an empty-cloud streak is given up
pub const DEFAULT_MAX_TRIES: usize = 5;

/// Captures per model
pub const DEFAULT_TIMES: usize = 50;

/// Configuration of one capture run
#[derive(Debug, Clone, PartialEq)]
pub struct CaptureConfig {
    /// Pick list selector the models come from
    pub pick_list: i32,
    /// Captures per model
    pub times: usize,
    /// Sample attempts per capture
    pub max_tries: usize,
    pub histogram: HistogramConfig,
    /// Training set path, `training_set_<list>.json` when `None`
    pub output: Option<PathBuf>,
    /// Directory receiving every accepted sample as PLY
    pub dump_dir: Option<PathBuf>,
}

impl Default for CaptureConfig {
    fn default() -> Self {
        Self {
            pick_list: 1,
            times: DEFAULT_TIMES,
            max_tries: DEFAULT_MAX_TRIES,
            histogram: HistogramConfig::default(),
            output: None,
            dump_dir: None,
        }
    }
}

impl CaptureConfig {
    pub fn new(pick_list: i32) -> Self {
        Self {
            pick_list,
            ..Default::default()
        }
    }

    pub fn with_times(mut self, times: usize) -> Self {
        self.times = times;
        self
    }

    pub fn with_max_tries(mut self, max_tries: usize) -> Self {
        self.max_tries = max_tries;
        self
    }

    pub fn with_histogram(mut self, histogram: HistogramConfig) -> Self {
        self.histogram = histogram;
        self
    }

    pub fn with_output(mut self, output: Option<PathBuf>) -> Self {
        self.output = output;
        self
    }

    pub fn with_dump_dir(mut self, dump_dir: Option<PathBuf>) -> Self {
        self.dump_dir = dump_dir;
        self
    }

    /// Where the training set is written
    pub fn output_path(&self) -> PathBuf {
        self.output
            .clone()
            .unwrap_or_else(|| PathBuf::from(default_file_name(self.pick_list)))
    }

    pub fn validate(&self) -> Result<()> {
        if self.max_tries == 0 {
            return Err(Error::InvalidData("max_tries must be greater than 0".to_string()));
        }
        if self.histogram.bins == 0 {
            return Err(Error::InvalidData("bins must be greater than 0".to_string()));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = CaptureConfig::new(3);
        assert_eq!(config.times, 50);
        assert_eq!(config.max_tries, 5);
        assert_eq!(config.histogram.feature_len(), 192);
        assert_eq!(config.output_path(), PathBuf::from("training_set_3.json"));
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_output_override() {
        let config = CaptureConfig::new(1).with_output(Some(PathBuf::from("out/set.json")));
        assert_eq!(config.output_path(), PathBuf::from("out/set.json"));
    }

    #[test]
    fn test_zero_tries_rejected() {
        assert!(CaptureConfig::new(1).with_max_tries(0).validate().is_err());
    }
}
