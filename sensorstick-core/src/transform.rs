//! Rigid poses used to place models and sensors

use nalgebra::{Isometry3, Point3, Translation3, UnitQuaternion, Vector3};
use serde::{Deserialize, Serialize};

/// A rigid transformation (rotation followed by translation)
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Pose {
    pub isometry: Isometry3<f32>,
}

impl Pose {
    /// Create a pure translation
    pub fn translation(translation: Vector3<f32>) -> Self {
        Self {
            isometry: Isometry3::from_parts(Translation3::from(translation), UnitQuaternion::identity()),
        }
    }

    /// Create a pose from a position and roll, pitch, yaw angles in radians
    pub fn from_position_rpy(position: Vector3<f32>, roll: f32, pitch: f32, yaw: f32) -> Self {
        Self {
            isometry: Isometry3::from_parts(
                Translation3::from(position),
                UnitQuaternion::from_euler_angles(roll, pitch, yaw),
            ),
        }
    }

    /// A camera pose at `eye` looking at `target`, with +Z as the optical axis
    pub fn look_at(eye: &Point3<f32>, target: &Point3<f32>, up: &Vector3<f32>) -> Self {
        // face_towards maps +Z onto (target - eye)
        Self {
            isometry: Isometry3::face_towards(eye, target, up),
        }
    }

    /// Position component
    pub fn position(&self) -> Vector3<f32> {
        self.isometry.translation.vector
    }

    /// Rotation component
    pub fn orientation(&self) -> UnitQuaternion<f32> {
        self.isometry.rotation
    }

    /// Apply the pose to a point
    pub fn transform_point(&self, point: &Point3<f32>) -> Point3<f32> {
        self.isometry.transform_point(point)
    }

    /// Apply the rotation part of the pose to a vector
    pub fn transform_vector(&self, vector: &Vector3<f32>) -> Vector3<f32> {
        self.isometry.transform_vector(vector)
    }

    /// Get the inverse pose
    pub fn inverse(self) -> Self {
        Self {
            isometry: self.isometry.inverse(),
        }
    }
}
