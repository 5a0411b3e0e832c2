//! # Sensorstick Sim
//!
//! Interfaces to the simulated world the training samples are captured from.
//!
//! - [`SimulatorClient`] spawns and deletes the model under capture
//! - [`DepthSensor`] re-poses the model and returns one colored point cloud
//! - [`SyntheticSimulator`] implements both without an external simulator,
//!   rendering the models of a [`ModelCatalog`] from simple primitives

pub mod catalog;
pub mod synthetic;

pub use catalog::*;
pub use synthetic::*;

use sensorstick_core::{ColoredPointCloud3f, Result};

/// Control of the simulated world
pub trait SimulatorClient {
    /// Prepare the world for isolated captures: no gravity, no ground plane
    fn initial_setup(&mut self) -> Result<()>;

    /// Spawn `model_name` as the training model
    fn spawn_model(&mut self, model_name: &str) -> Result<()>;

    /// Remove the training model, if any
    fn delete_model(&mut self) -> Result<()>;
}

/// A depth camera looking at the training model
pub trait DepthSensor {
    /// Move the training model to a random orientation and capture one frame
    ///
    /// The returned cloud is expressed in the sensor frame and may be empty.
    fn capture_sample(&mut self) -> Result<ColoredPointCloud3f>;
}
