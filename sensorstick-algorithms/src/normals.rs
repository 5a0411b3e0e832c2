//! Normal estimation algorithms

use crate::nearest_neighbor::KdTree;
use log::debug;
use nalgebra::Matrix3;
use rayon::prelude::*;
use sensorstick_core::{
    ColoredPointCloud3f, Error, NearestNeighborSearch, NormalPoint3f, NormalPointCloud3f, Point3f,
    PointCloud, Result, Vector3f,
};

/// Fewest neighbors a covariance fit needs to define a plane
const MIN_PLANE_NEIGHBORS: usize = 3;

/// Configuration for normal estimation
#[derive(Debug, Clone, PartialEq)]
pub struct NormalEstimationConfig {
    /// Number of nearest neighbors used for the local plane fit
    pub k_neighbors: usize,
    /// Optional search radius; falls back to k-NN when too few points are inside it
    pub radius: Option<f32>,
    /// Flip normals so that they face the viewpoint
    pub consistent_orientation: bool,
    /// Viewpoint used for orientation, the sensor origin when `None`
    pub viewpoint: Option<Point3f>,
}

impl Default for NormalEstimationConfig {
    fn default() -> Self {
        Self {
            k_neighbors: 10,
            radius: None,
            consistent_orientation: true,
            viewpoint: None,
        }
    }
}

impl NormalEstimationConfig {
    pub fn with_k_neighbors(mut self, k_neighbors: usize) -> Self {
        self.k_neighbors = k_neighbors;
        self
    }

    pub fn with_radius(mut self, radius: Option<f32>) -> Self {
        self.radius = radius;
        self
    }

    pub fn with_viewpoint(mut self, viewpoint: Point3f) -> Self {
        self.viewpoint = Some(viewpoint);
        self
    }

    pub fn validate(&self) -> Result<()> {
        if self.k_neighbors < MIN_PLANE_NEIGHBORS {
            return Err(Error::InvalidData(format!(
                "k_neighbors must be at least {}", MIN_PLANE_NEIGHBORS
            )));
        }
        if let Some(radius) = self.radius {
            if radius <= 0.0 {
                return Err(Error::InvalidData("radius must be positive".to_string()));
            }
        }
        Ok(())
    }
}

/// Estimate normals for a point cloud using k-nearest neighbors
///
/// Each normal is the eigenvector of the smallest eigenvalue of the
/// covariance of the point's neighborhood, oriented towards the origin.
///
/// # Example
/// ```rust
/// use sensorstick_core::{PointCloud, Point3f};
/// use sensorstick_algorithms::estimate_normals;
///
/// fn main() -> sensorstick_core::Result<()> {
///     let cloud = PointCloud::from_points(vec![
///         Point3f::new(0.0, 0.0, -1.0),
///         Point3f::new(0.1, 0.0, -1.0),
///         Point3f::new(0.0, 0.1, -1.0),
///         Point3f::new(0.1, 0.1, -1.0),
///     ]);
///
///     let normals = estimate_normals(&cloud, 4)?;
///     assert_eq!(normals.len(), 4);
///     Ok(())
/// }
/// ```
pub fn estimate_normals(cloud: &PointCloud<Point3f>, k: usize) -> Result<NormalPointCloud3f> {
    let config = NormalEstimationConfig::default().with_k_neighbors(k);
    estimate_normals_with_config(cloud, &config)
}

/// Estimate normals with full control over the neighborhood and orientation
pub fn estimate_normals_with_config(
    cloud: &PointCloud<Point3f>,
    config: &NormalEstimationConfig,
) -> Result<NormalPointCloud3f> {
    config.validate()?;

    if cloud.is_empty() {
        return Ok(PointCloud::new());
    }

    let tree = KdTree::new(&cloud.points)?;
    let viewpoint = config.viewpoint.unwrap_or_else(Point3f::origin);

    let points: Vec<NormalPoint3f> = cloud
        .points
        .par_iter()
        .map(|point| {
            let neighbors = neighborhood(&tree, point, config);
            let normal = if neighbors.len() < MIN_PLANE_NEIGHBORS {
                // Not enough support for a plane, fall back to the view ray
                fallback_normal(point, &viewpoint)
            } else {
                let positions: Vec<Point3f> = neighbors.iter().map(|(idx, _)| cloud.points[*idx]).collect();
                plane_normal(&positions)
            };

            let normal = if config.consistent_orientation {
                orient_towards(normal, point, &viewpoint)
            } else {
                normal
            };

            NormalPoint3f::new(*point, normal)
        })
        .collect();

    debug!("estimated {} normals (k = {})", points.len(), config.k_neighbors);
    Ok(PointCloud::from_points(points))
}

fn neighborhood(tree: &KdTree, point: &Point3f, config: &NormalEstimationConfig) -> Vec<(usize, f32)> {
    if let Some(radius) = config.radius {
        let neighbors = tree.find_radius_neighbors(point, radius);
        if neighbors.len() >= MIN_PLANE_NEIGHBORS {
            return neighbors;
        }
    }
    tree.find_k_nearest(point, config.k_neighbors)
}

/// Normal of the least-squares plane through `positions`
fn plane_normal(positions: &[Point3f]) -> Vector3f {
    let count = positions.len() as f32;
    let centroid = positions
        .iter()
        .fold(Vector3f::zeros(), |acc, p| acc + p.coords)
        / count;

    let covariance = positions.iter().fold(Matrix3::<f32>::zeros(), |acc, p| {
        let d = p.coords - centroid;
        acc + d * d.transpose()
    }) / count;

    let eigen = covariance.symmetric_eigen();
    let smallest = eigen
        .eigenvalues
        .iter()
        .enumerate()
        .min_by(|a, b| a.1.partial_cmp(b.1).unwrap_or(std::cmp::Ordering::Equal))
        .map(|(i, _)| i)
        .unwrap_or(2);

    let normal = eigen.eigenvectors.column(smallest).into_owned();
    normal.try_normalize(f32::EPSILON).unwrap_or_else(Vector3f::z)
}

fn fallback_normal(point: &Point3f, viewpoint: &Point3f) -> Vector3f {
    (viewpoint - point)
        .try_normalize(f32::EPSILON)
        .unwrap_or_else(Vector3f::z)
}

fn orient_towards(normal: Vector3f, point: &Point3f, viewpoint: &Point3f) -> Vector3f {
    if normal.dot(&(viewpoint - point)) < 0.0 {
        -normal
    } else {
        normal
    }
}

/// A provider of surface normals for captured samples
pub trait NormalEstimator {
    /// Compute one normal per point of `cloud`
    fn get_normals(&self, cloud: &ColoredPointCloud3f) -> Result<NormalPointCloud3f>;

    /// Reject settings that would make every `get_normals` call fail
    fn validate(&self) -> Result<()> {
        Ok(())
    }
}

/// Normal estimator running the local PCA fit in-process
#[derive(Debug, Clone, Default)]
pub struct PcaNormalEstimator {
    pub config: NormalEstimationConfig,
}

impl PcaNormalEstimator {
    pub fn new(config: NormalEstimationConfig) -> Self {
        Self { config }
    }
}

impl NormalEstimator for PcaNormalEstimator {
    fn get_normals(&self, cloud: &ColoredPointCloud3f) -> Result<NormalPointCloud3f> {
        let positions = PointCloud::from_points(cloud.positions());
        estimate_normals_with_config(&positions, &self.config)
    }

    fn validate(&self) -> Result<()> {
        self.config.validate()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use sensorstick_core::ColoredPoint3f;

    /// A jittered square patch close to the plane z = `depth`
    fn planar_patch(depth: f32, n: usize) -> PointCloud<Point3f> {
        let mut points = Vec::new();
        for i in 0..n {
            for j in 0..n {
                let jitter = ((i * 31 + j * 17) as f32).sin() * 1e-4;
                points.push(Point3f::new(
                    i as f32 * 0.01 + jitter,
                    j as f32 * 0.01 - jitter,
                    depth + jitter * 0.1,
                ));
            }
        }
        PointCloud::from_points(points)
    }

    #[test]
    fn test_planar_normals_face_viewpoint() {
        let cloud = planar_patch(-1.0, 10);
        let normals = estimate_normals(&cloud, 8).unwrap();

        assert_eq!(normals.len(), cloud.len());
        for p in normals.iter() {
            // Origin is above the plane, so normals must point to +z
            assert_relative_eq!(p.normal.z, 1.0, epsilon = 1e-3);
            assert_relative_eq!(p.normal.norm(), 1.0, epsilon = 1e-5);
        }
    }

    #[test]
    fn test_viewpoint_flips_orientation() {
        let cloud = planar_patch(-1.0, 8);
        let config = NormalEstimationConfig::default()
            .with_k_neighbors(6)
            .with_viewpoint(Point3f::new(0.0, 0.0, -5.0));
        let normals = estimate_normals_with_config(&cloud, &config).unwrap();

        for p in normals.iter() {
            assert!(p.normal.z < -0.99);
        }
    }

    #[test]
    fn test_radius_estimation() {
        let cloud = planar_patch(-2.0, 8);
        let config = NormalEstimationConfig::default().with_radius(Some(0.025));
        let normals = estimate_normals_with_config(&cloud, &config).unwrap();
        for p in normals.iter() {
            assert!(p.normal.z > 0.99);
        }
    }

    #[test]
    fn test_tiny_cloud_uses_view_ray() {
        let cloud = PointCloud::from_points(vec![
            Point3f::new(0.0, 0.0, -2.0),
            Point3f::new(0.0, 0.1, -2.0),
        ]);
        let normals = estimate_normals(&cloud, 5).unwrap();
        assert_eq!(normals.len(), 2);
        assert_relative_eq!(normals[0].normal, Vector3f::z(), epsilon = 1e-6);
    }

    #[test]
    fn test_empty_cloud() {
        let normals = estimate_normals(&PointCloud::new(), 5).unwrap();
        assert!(normals.is_empty());
    }

    #[test]
    fn test_invalid_config() {
        let cloud = planar_patch(-1.0, 4);
        assert!(estimate_normals(&cloud, 2).is_err());
        let zero_radius = NormalEstimationConfig::default().with_radius(Some(0.0));
        assert!(estimate_normals_with_config(&cloud, &zero_radius).is_err());
        assert!(PcaNormalEstimator::new(NormalEstimationConfig::default().with_k_neighbors(2))
            .validate()
            .is_err());
        assert!(PcaNormalEstimator::default().validate().is_ok());
    }

    #[test]
    fn test_flat_depth_frame() {
        // Every point at the same depth, no jitter
        let colored: ColoredPointCloud3f = (0..20)
            .flat_map(|i| (0..20).map(move |j| (i, j)))
            .map(|(i, j)| ColoredPoint3f::new(Point3f::new(i as f32 * 0.01, j as f32 * 0.01, 1.0), [90, 90, 90]))
            .collect();
        let normals = PcaNormalEstimator::default().get_normals(&colored).unwrap();

        assert_eq!(normals.len(), 400);
        for p in normals.iter() {
            // Sensor origin is in front of the plane, at lower z
            assert_relative_eq!(p.normal.z, -1.0, epsilon = 1e-3);
        }
    }

    #[test]
    fn test_repeated_points() {
        let colored: ColoredPointCloud3f = (0..40)
            .map(|_| ColoredPoint3f::new(Point3f::new(0.1, 0.2, 1.0), [10, 200, 10]))
            .collect();
        let normals = PcaNormalEstimator::default().get_normals(&colored).unwrap();

        assert_eq!(normals.len(), 40);
        for p in normals.iter() {
            assert!(p.normal.iter().all(|c| c.is_finite()));
            assert_relative_eq!(p.normal.norm(), 1.0, epsilon = 1e-5);
        }
    }

    #[test]
    fn test_estimator_on_colored_cloud() {
        let colored: ColoredPointCloud3f = planar_patch(-1.0, 6)
            .into_iter()
            .map(|p| ColoredPoint3f::new(p, [200, 10, 10]))
            .collect();
        let estimator = PcaNormalEstimator::default();
        let normals = estimator.get_normals(&colored).unwrap();
        assert_eq!(normals.len(), colored.len());
    }
}
