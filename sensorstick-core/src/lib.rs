//! Core data structures and traits for sensorstick
//!
//! This crate provides the fundamental types shared by the capture pipeline:
//! colored and normal-carrying points, point clouds, rigid poses and the
//! common error type.

pub mod point;
pub mod point_cloud;
pub mod traits;
pub mod transform;
pub mod error;

pub use point::*;
pub use point_cloud::*;
pub use traits::*;
pub use transform::*;
pub use error::*;
