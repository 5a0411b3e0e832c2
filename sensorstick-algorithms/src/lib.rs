//! # Sensorstick Algorithms
//!
//! Point cloud algorithms used to turn a captured sample into a feature vector.
//!
//! This crate provides nearest neighbor search, surface normal estimation,
//! color space conversion and the color / normal histogram features consumed
//! by the object classifier.

pub mod color;
pub mod normals;
pub mod nearest_neighbor;
pub mod features;

// Re-export commonly used items
pub use color::*;
pub use normals::*;
pub use nearest_neighbor::*;
pub use features::*;
