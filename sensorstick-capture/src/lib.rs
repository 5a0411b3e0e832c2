//! Labeled feature capture
//!
//! Spawns every model of a pick list in the simulator, captures repeated
//! samples of it from random orientations, and turns each non-empty sample
//! into a (color + normal histogram, model name) training pair.

pub mod cli;
pub mod config;
pub mod driver;
pub mod model_lists;

pub use config::CaptureConfig;
pub use driver::{CaptureDriver, CaptureOutcome, CaptureReport, ModelReport};
pub use model_lists::{list_name, models_for_list};
