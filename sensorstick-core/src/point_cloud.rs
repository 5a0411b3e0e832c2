//! Point clouds as captured by the sensor and produced by normal estimation

use crate::point::*;
use crate::transform::Pose;
use serde::{Deserialize, Serialize};
use std::ops::Index;

/// An ordered set of points of one kind
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PointCloud<T> {
    pub points: Vec<T>,
}

/// Positions only
pub type PointCloud3f = PointCloud<Point3f>;

/// A sensor frame: positions with RGB color
pub type ColoredPointCloud3f = PointCloud<ColoredPoint3f>;

/// Positions with their estimated surface normals
pub type NormalPointCloud3f = PointCloud<NormalPoint3f>;

impl<T> PointCloud<T> {
    pub fn new() -> Self {
        Self { points: Vec::new() }
    }

    pub fn from_points(points: Vec<T>) -> Self {
        Self { points }
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    pub fn push(&mut self, point: T) {
        self.points.push(point);
    }

    pub fn iter(&self) -> std::slice::Iter<'_, T> {
        self.points.iter()
    }
}

impl<T> Default for PointCloud<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> Index<usize> for PointCloud<T> {
    type Output = T;

    fn index(&self, index: usize) -> &T {
        &self.points[index]
    }
}

impl<T> IntoIterator for PointCloud<T> {
    type Item = T;
    type IntoIter = std::vec::IntoIter<T>;

    fn into_iter(self) -> Self::IntoIter {
        self.points.into_iter()
    }
}

impl<'a, T> IntoIterator for &'a PointCloud<T> {
    type Item = &'a T;
    type IntoIter = std::slice::Iter<'a, T>;

    fn into_iter(self) -> Self::IntoIter {
        self.points.iter()
    }
}

impl<T> FromIterator<T> for PointCloud<T> {
    fn from_iter<I: IntoIterator<Item = T>>(iter: I) -> Self {
        Self::from_points(iter.into_iter().collect())
    }
}

impl ColoredPointCloud3f {
    /// Move every point by `pose`, keeping colors
    pub fn transform(&mut self, pose: &Pose) {
        for point in &mut self.points {
            point.position = pose.transform_point(&point.position);
        }
    }

    /// Copy out the positions only
    pub fn positions(&self) -> Vec<Point3f> {
        self.points.iter().map(|p| p.position).collect()
    }

    /// Drop points with non-finite coordinates
    pub fn retain_finite(&mut self) {
        self.points.retain(|p| p.is_finite());
    }
}

impl NormalPointCloud3f {
    /// Copy out the normals only
    pub fn normals(&self) -> Vec<Vector3f> {
        self.points.iter().map(|p| p.normal).collect()
    }
}
