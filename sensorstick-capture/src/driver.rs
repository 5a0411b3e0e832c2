//! Capture loop
//!
//! For each model: spawn, capture `times` samples, delete. Each capture
//! resamples up to `max_tries` times while the sensor returns an empty cloud;
//! a capture whose tries are all empty is skipped and counted, so every
//! labeled feature comes from a non-empty cloud.

use crate::config::CaptureConfig;
use log::{debug, info, warn};
use sensorstick_algorithms::{extract_features, NormalEstimator};
use sensorstick_core::{Bounded, ColoredPointCloud3f, Result};
use sensorstick_io::{LabeledFeature, PlyWriter, PointCloudWriter, TrainingSet};
use sensorstick_sim::{DepthSensor, SimulatorClient};
use std::fmt;

/// Per model counters of a capture run
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ModelReport {
    pub name: String,
    /// Captures that produced a labeled feature
    pub captured: usize,
    /// Captures given up after every try came back empty
    pub skipped: usize,
    /// Empty clouds seen, over all tries
    pub invalid_clouds: usize,
}

/// Summary of a capture run
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct CaptureReport {
    pub models: Vec<ModelReport>,
}

impl CaptureReport {
    pub fn total_captured(&self) -> usize {
        self.models.iter().map(|m| m.captured).sum()
    }

    pub fn total_skipped(&self) -> usize {
        self.models.iter().map(|m| m.skipped).sum()
    }

    pub fn total_invalid_clouds(&self) -> usize {
        self.models.iter().map(|m| m.invalid_clouds).sum()
    }
}

impl fmt::Display for CaptureReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for model in &self.models {
            writeln!(
                f,
                "{:<14} captured {:>4}  skipped {:>3}  invalid clouds {:>3}",
                model.name, model.captured, model.skipped, model.invalid_clouds
            )?;
        }
        write!(
            f,
            "total: {} captured, {} skipped, {} invalid clouds",
            self.total_captured(),
            self.total_skipped(),
            self.total_invalid_clouds()
        )
    }
}

/// Result of [`CaptureDriver::run`]
#[derive(Debug, Clone)]
pub struct CaptureOutcome {
    pub training_set: TrainingSet,
    pub report: CaptureReport,
}

/// Drives a simulator and a normal estimator through a capture run
pub struct CaptureDriver<S, N> {
    simulator: S,
    normals: N,
    config: CaptureConfig,
}

impl<S, N> CaptureDriver<S, N>
where
    S: SimulatorClient + DepthSensor,
    N: NormalEstimator,
{
    /// Checks both the capture and the normal estimation settings, so a bad
    /// configuration fails before the simulator is touched
    pub fn new(simulator: S, normals: N, config: CaptureConfig) -> Result<Self> {
        config.validate()?;
        normals.validate()?;
        Ok(Self {
            simulator,
            normals,
            config,
        })
    }

    pub fn config(&self) -> &CaptureConfig {
        &self.config
    }

    pub fn simulator(&self) -> &S {
        &self.simulator
    }

    /// Give back the simulator, e.g. to inspect its final state
    pub fn into_simulator(self) -> S {
        self.simulator
    }

    /// Capture every model in `models`, in order
    pub fn run(&mut self, models: &[&str]) -> Result<CaptureOutcome> {
        if let Some(dir) = &self.config.dump_dir {
            std::fs::create_dir_all(dir)?;
        }

        self.simulator.initial_setup()?;

        let mut training_set = TrainingSet::new(self.config.pick_list, &self.config.histogram);
        let mut report = CaptureReport::default();

        for model_name in models {
            self.simulator.spawn_model(model_name)?;
            let model_report = self.capture_model(model_name, &mut training_set)?;
            self.simulator.delete_model()?;

            info!(
                "{}: {} features captured, {} skipped",
                model_name, model_report.captured, model_report.skipped
            );
            report.models.push(model_report);
        }

        Ok(CaptureOutcome {
            training_set,
            report,
        })
    }

    fn capture_model(&mut self, model_name: &str, training_set: &mut TrainingSet) -> Result<ModelReport> {
        let mut model_report = ModelReport {
            name: model_name.to_string(),
            ..Default::default()
        };

        for attempt in 0..self.config.times {
            let (sample, invalid) = self.sample_non_empty()?;
            model_report.invalid_clouds += invalid;

            let Some(cloud) = sample else {
                warn!(
                    "{}: giving up on capture {} after {} empty clouds",
                    model_name, attempt, self.config.max_tries
                );
                model_report.skipped += 1;
                continue;
            };

            let (min, max) = cloud.bounding_box();
            debug!(
                "{}: capture {} has {} points spanning {:.3?} to {:.3?}",
                model_name, attempt, cloud.len(), min, max
            );

            if let Some(dir) = &self.config.dump_dir {
                let path = dir.join(format!("{}_{:03}.ply", model_name, attempt));
                PlyWriter::write_point_cloud(&cloud, &path)?;
            }

            let feature = extract_features(&cloud, &self.normals, &self.config.histogram)?;
            training_set.push(LabeledFeature::new(feature, model_name))?;
            model_report.captured += 1;
        }

        Ok(model_report)
    }

    /// Sample until a cloud with at least one finite point comes back
    ///
    /// Returns the cloud, if any, and how many empty clouds were seen.
    fn sample_non_empty(&mut self) -> Result<(Option<ColoredPointCloud3f>, usize)> {
        let mut invalid = 0;
        while invalid < self.config.max_tries {
            let mut cloud = self.simulator.capture_sample()?;
            cloud.retain_finite();
            if cloud.is_empty() {
                debug!("invalid cloud detected");
                invalid += 1;
            } else {
                return Ok((Some(cloud), invalid));
            }
        }
        Ok((None, invalid))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use sensorstick_algorithms::{HistogramConfig, NormalEstimationConfig, PcaNormalEstimator};
    use sensorstick_core::{ColoredPoint3f, Error, Point3f, PointCloud};
    use std::collections::VecDeque;

    /// Simulator replaying a scripted sequence of frame sizes
    #[derive(Default)]
    struct ScriptedSimulator {
        frames: VecDeque<usize>,
        log: Vec<String>,
        spawned: Option<String>,
        /// Emit every frame as a grid at one depth
        flat: bool,
    }

    impl ScriptedSimulator {
        fn with_frames(frames: &[usize]) -> Self {
            Self {
                frames: frames.iter().copied().collect(),
                ..Default::default()
            }
        }
    }

    impl SimulatorClient for ScriptedSimulator {
        fn initial_setup(&mut self) -> Result<()> {
            self.log.push("setup".to_string());
            Ok(())
        }

        fn spawn_model(&mut self, model_name: &str) -> Result<()> {
            if self.spawned.is_some() {
                return Err(Error::Simulation("already spawned".to_string()));
            }
            self.spawned = Some(model_name.to_string());
            self.log.push(format!("spawn {}", model_name));
            Ok(())
        }

        fn delete_model(&mut self) -> Result<()> {
            self.spawned = None;
            self.log.push("delete".to_string());
            Ok(())
        }
    }

    impl DepthSensor for ScriptedSimulator {
        fn capture_sample(&mut self) -> Result<ColoredPointCloud3f> {
            let size = self.frames.pop_front().unwrap_or(0);
            self.log.push(format!("capture {}", size));
            let flat = self.flat;
            let points = (0..size)
                .map(|i| {
                    let t = i as f32;
                    let position = if flat {
                        Point3f::new((i % 10) as f32 * 0.01, (i / 10) as f32 * 0.01, 1.0)
                    } else {
                        Point3f::new((t * 0.37).sin() * 0.05, (t * 0.71).cos() * 0.05, 1.0 + t * 1e-4)
                    };
                    ColoredPoint3f::new(position, [200, 30, 30])
                })
                .collect();
            Ok(PointCloud::from_points(points))
        }
    }

    fn driver(frames: &[usize], times: usize) -> CaptureDriver<ScriptedSimulator, PcaNormalEstimator> {
        let config = CaptureConfig::new(1)
            .with_times(times)
            .with_histogram(HistogramConfig::default().with_bins(4));
        CaptureDriver::new(ScriptedSimulator::with_frames(frames), PcaNormalEstimator::default(), config).unwrap()
    }

    #[test]
    fn test_retry_until_non_empty() {
        let mut driver = driver(&[0, 0, 20], 1);
        let outcome = driver.run(&["soap"]).unwrap();

        assert_eq!(outcome.training_set.len(), 1);
        assert_eq!(outcome.training_set.samples[0].label, "soap");
        assert_eq!(outcome.training_set.samples[0].feature.len(), 24);
        assert_eq!(outcome.report.models[0].invalid_clouds, 2);
        assert_eq!(outcome.report.models[0].skipped, 0);
    }

    #[test]
    fn test_exhausted_capture_is_skipped() {
        // Five empty frames exhaust the first capture, the second one succeeds
        let mut driver = driver(&[0, 0, 0, 0, 0, 15], 2);
        let outcome = driver.run(&["glue"]).unwrap();

        assert_eq!(outcome.training_set.len(), 1);
        assert_eq!(outcome.report.total_skipped(), 1);
        assert_eq!(outcome.report.total_invalid_clouds(), 5);

        let captures = driver
            .simulator()
            .log
            .iter()
            .filter(|entry| entry.starts_with("capture"))
            .count();
        assert_eq!(captures, 6);
    }

    #[test]
    fn test_spawn_delete_bracketing() {
        let mut driver = driver(&[10, 10, 10, 10], 2);
        driver.run(&["biscuits", "soap"]).unwrap();

        let log = &driver.simulator().log;
        assert_eq!(log[0], "setup");
        assert_eq!(log[1], "spawn biscuits");
        assert_eq!(log[4], "delete");
        assert_eq!(log[5], "spawn soap");
        assert_eq!(log.last().map(String::as_str), Some("delete"));
    }

    #[test]
    fn test_at_most_times_features_per_model() {
        let mut driver = driver(&[12; 9], 3);
        let outcome = driver.run(&["a", "b", "c"]).unwrap();

        for name in ["a", "b", "c"] {
            assert_eq!(outcome.training_set.count_label(name), 3);
        }
        assert!(outcome.training_set.samples.iter().all(|s| s.feature.len() == 24));
        assert_eq!(outcome.report.total_captured(), 9);
    }

    #[test]
    fn test_non_finite_points_count_as_empty() {
        struct NanSensor(ScriptedSimulator);

        impl SimulatorClient for NanSensor {
            fn initial_setup(&mut self) -> Result<()> {
                self.0.initial_setup()
            }

            fn spawn_model(&mut self, name: &str) -> Result<()> {
                self.0.spawn_model(name)
            }

            fn delete_model(&mut self) -> Result<()> {
                self.0.delete_model()
            }
        }

        impl DepthSensor for NanSensor {
            fn capture_sample(&mut self) -> Result<ColoredPointCloud3f> {
                Ok(PointCloud::from_points(vec![ColoredPoint3f::new(
                    Point3f::new(f32::NAN, 0.0, 1.0),
                    [0, 0, 0],
                )]))
            }
        }

        let config = CaptureConfig::new(1).with_times(1).with_max_tries(3);
        let mut driver = CaptureDriver::new(
            NanSensor(ScriptedSimulator::default()),
            PcaNormalEstimator::default(),
            config,
        )
        .unwrap();
        let outcome = driver.run(&["eraser"]).unwrap();
        assert!(outcome.training_set.is_empty());
        assert_eq!(outcome.report.total_invalid_clouds(), 3);
    }

    #[test]
    fn test_flat_depth_frames_are_captured() {
        let simulator = ScriptedSimulator {
            flat: true,
            ..ScriptedSimulator::with_frames(&[300, 300])
        };
        let config = CaptureConfig::new(2).with_times(2);
        let mut driver = CaptureDriver::new(simulator, PcaNormalEstimator::default(), config).unwrap();

        let outcome = driver.run(&["book"]).unwrap();
        assert_eq!(outcome.training_set.count_label("book"), 2);
        assert_eq!(outcome.report.total_skipped(), 0);
    }

    #[test]
    fn test_bad_normal_config_fails_before_setup() {
        let normals = PcaNormalEstimator::new(NormalEstimationConfig::default().with_k_neighbors(2));
        let result = CaptureDriver::new(ScriptedSimulator::with_frames(&[10]), normals, CaptureConfig::new(1));
        assert!(result.is_err());
    }

    #[test]
    fn test_report_display() {
        let report = CaptureReport {
            models: vec![ModelReport {
                name: "soap".to_string(),
                captured: 4,
                skipped: 1,
                invalid_clouds: 6,
            }],
        };
        let text = report.to_string();
        assert!(text.contains("soap"));
        assert!(text.ends_with("total: 4 captured, 1 skipped, 6 invalid clouds"));
    }
}
