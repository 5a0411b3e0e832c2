//! Labeled feature training sets
//!
//! A training set is written once per capture run as a JSON document. The
//! features keep their capture order; metadata records how they were built so
//! a classifier can refuse mismatched inputs.

use log::info;
use sensorstick_algorithms::{ColorSpace, HistogramConfig};
use sensorstick_core::{Error, Result};
use serde::{Deserialize, Serialize};
use std::fs::File;
use std::io::{BufReader, BufWriter, Write};
use std::path::Path;

/// A feature vector paired with the model name it was captured from
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LabeledFeature {
    pub feature: Vec<f32>,
    pub label: String,
}

impl LabeledFeature {
    pub fn new(feature: Vec<f32>, label: impl Into<String>) -> Self {
        Self {
            feature,
            label: label.into(),
        }
    }
}

/// All labeled features of one capture run
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrainingSet {
    /// Pick list the models were taken from
    pub pick_list: i32,
    pub color_space: ColorSpace,
    /// Histogram bins per channel
    pub bins: usize,
    /// Length every feature vector must have
    pub feature_len: usize,
    pub samples: Vec<LabeledFeature>,
}

impl TrainingSet {
    pub fn new(pick_list: i32, config: &HistogramConfig) -> Self {
        Self {
            pick_list,
            color_space: config.color_space,
            bins: config.bins,
            feature_len: config.feature_len(),
            samples: Vec::new(),
        }
    }

    /// Append a labeled feature, rejecting vectors of the wrong length
    pub fn push(&mut self, sample: LabeledFeature) -> Result<()> {
        if sample.feature.len() != self.feature_len {
            return Err(Error::InvalidData(format!(
                "feature for '{}' has {} values, expected {}",
                sample.label,
                sample.feature.len(),
                self.feature_len
            )));
        }
        self.samples.push(sample);
        Ok(())
    }

    pub fn len(&self) -> usize {
        self.samples.len()
    }

    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }

    /// Number of samples carrying `label`
    pub fn count_label(&self, label: &str) -> usize {
        self.samples.iter().filter(|s| s.label == label).count()
    }

    /// Distinct labels in first-seen order
    pub fn labels(&self) -> Vec<&str> {
        let mut labels: Vec<&str> = Vec::new();
        for sample in &self.samples {
            if !labels.contains(&sample.label.as_str()) {
                labels.push(&sample.label);
            }
        }
        labels
    }

    fn validate(&self) -> Result<()> {
        if self.feature_len != 6 * self.bins {
            return Err(Error::InvalidData(format!(
                "feature length {} does not match {} bins",
                self.feature_len, self.bins
            )));
        }
        if let Some(bad) = self.samples.iter().find(|s| s.feature.len() != self.feature_len) {
            return Err(Error::InvalidData(format!(
                "feature for '{}' has {} values, expected {}",
                bad.label,
                bad.feature.len(),
                self.feature_len
            )));
        }
        Ok(())
    }
}

/// Default output file name for a pick list
pub fn default_file_name(pick_list: i32) -> String {
    format!("training_set_{}.json", pick_list)
}

/// Write a training set as JSON
pub fn write_training_set<P: AsRef<Path>>(set: &TrainingSet, path: P) -> Result<()> {
    let path = path.as_ref();
    set.validate()?;

    let mut writer = BufWriter::new(File::create(path)?);
    serde_json::to_writer(&mut writer, set)?;
    writer.flush()?;

    info!("wrote {} labeled features to {}", set.len(), path.display());
    Ok(())
}

/// Read a training set written by [`write_training_set`]
pub fn read_training_set<P: AsRef<Path>>(path: P) -> Result<TrainingSet> {
    let reader = BufReader::new(File::open(path)?);
    let set: TrainingSet = serde_json::from_reader(reader)?;
    set.validate()?;
    Ok(set)
}
