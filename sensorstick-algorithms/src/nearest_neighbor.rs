//! Nearest neighbor search implementations

use kiddo::{KdTree as KiddoTree, SquaredEuclidean};
use log::debug;
use nalgebra::UnitQuaternion;
use sensorstick_core::{Error, NearestNeighborSearch, Point3f, Result};
use std::cmp::Ordering;

/// Leaf capacity of kiddo's default float tree. A leaf cannot be split once
/// this many items share its split coordinate.
const BUCKET_SIZE: usize = 32;

/// Off-axis rotation that breaks up planes aligned with a coordinate axis
fn tilted_frame() -> UnitQuaternion<f32> {
    UnitQuaternion::from_euler_angles(0.61, -0.47, 0.83)
}

/// KD-Tree for nearest neighbor search, backed by kiddo
///
/// Indices in query results refer to the slice the tree was built from.
/// Coincident points are stored once and expanded on query. A flat face at a
/// single depth is indexed in a rotated frame. If neither helps, the tree
/// degrades to a linear scan rather than overflowing a kiddo leaf.
pub struct KdTree {
    backend: Backend,
    len: usize,
}

enum Backend {
    Tree(TreeIndex),
    Linear(BruteForceSearch),
}

struct TreeIndex {
    tree: KiddoTree<f32, 3>,
    frame: UnitQuaternion<f32>,
    /// Source indices grouped by position; group `slot` is
    /// `members[offsets[slot]..offsets[slot + 1]]`
    members: Vec<usize>,
    offsets: Vec<usize>,
}

impl KdTree {
    pub fn new(points: &[Point3f]) -> Result<Self> {
        Self::build(points, BUCKET_SIZE)
    }

    fn build(points: &[Point3f], bucket_size: usize) -> Result<Self> {
        if let Some(idx) = points.iter().position(|p| !p.coords.iter().all(|c| c.is_finite())) {
            return Err(Error::InvalidData(format!("point {} has non-finite coordinates", idx)));
        }

        let (unique, members, offsets) = group_coincident(points);
        let backend = match choose_frame(&unique, bucket_size) {
            Some((frame, framed)) => {
                let mut tree: KiddoTree<f32, 3> = KiddoTree::with_capacity(framed.len());
                for (slot, p) in framed.iter().enumerate() {
                    tree.add(&[p.x, p.y, p.z], slot as u64);
                }
                Backend::Tree(TreeIndex {
                    tree,
                    frame,
                    members,
                    offsets,
                })
            }
            None => {
                debug!("{} points share too many coordinates, using a linear scan", points.len());
                Backend::Linear(BruteForceSearch::new(points))
            }
        };

        Ok(Self {
            backend,
            len: points.len(),
        })
    }

    /// Number of indexed points
    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }
}

impl TreeIndex {
    fn query(&self, point: &Point3f) -> [f32; 3] {
        let p = self.frame.transform_point(point);
        [p.x, p.y, p.z]
    }

    fn group(&self, slot: u64) -> &[usize] {
        let slot = slot as usize;
        &self.members[self.offsets[slot]..self.offsets[slot + 1]]
    }

    fn positions(&self) -> usize {
        self.offsets.len() - 1
    }
}

impl NearestNeighborSearch for KdTree {
    fn find_k_nearest(&self, query: &Point3f, k: usize) -> Vec<(usize, f32)> {
        if k == 0 || self.is_empty() {
            return Vec::new();
        }

        let index = match &self.backend {
            Backend::Tree(index) => index,
            Backend::Linear(scan) => return scan.find_k_nearest(query, k),
        };

        // Every stored position stands for at least one source point
        let mut result = Vec::with_capacity(k);
        for neighbor in index
            .tree
            .nearest_n::<SquaredEuclidean>(&index.query(query), k.min(index.positions()))
        {
            let distance = neighbor.distance.sqrt();
            result.extend(index.group(neighbor.item).iter().map(|&idx| (idx, distance)));
            if result.len() >= k {
                break;
            }
        }
        result.truncate(k);
        result
    }

    fn find_radius_neighbors(&self, query: &Point3f, radius: f32) -> Vec<(usize, f32)> {
        if self.is_empty() {
            return Vec::new();
        }

        match &self.backend {
            Backend::Tree(index) => index
                .tree
                .within::<SquaredEuclidean>(&index.query(query), radius * radius)
                .into_iter()
                .flat_map(|neighbor| {
                    let distance = neighbor.distance.sqrt();
                    index.group(neighbor.item).iter().map(move |&idx| (idx, distance))
                })
                .collect(),
            Backend::Linear(scan) => scan.find_radius_neighbors(query, radius),
        }
    }
}

/// Linear scan over every point
pub struct BruteForceSearch {
    points: Vec<Point3f>,
}

impl BruteForceSearch {
    pub fn new(points: &[Point3f]) -> Self {
        Self {
            points: points.to_vec(),
        }
    }

    fn distances(&self, query: &Point3f) -> impl Iterator<Item = (usize, f32)> + '_ {
        let query = *query;
        self.points
            .iter()
            .enumerate()
            .map(move |(idx, p)| (idx, nalgebra::distance(p, &query)))
    }
}

impl NearestNeighborSearch for BruteForceSearch {
    fn find_k_nearest(&self, query: &Point3f, k: usize) -> Vec<(usize, f32)> {
        let mut ranked: Vec<(usize, f32)> = self.distances(query).collect();
        ranked.sort_by(|a, b| a.1.total_cmp(&b.1));
        ranked.truncate(k);
        ranked
    }

    fn find_radius_neighbors(&self, query: &Point3f, radius: f32) -> Vec<(usize, f32)> {
        self.distances(query).filter(|(_, d)| *d <= radius).collect()
    }
}

/// Merge coincident points
///
/// Returns the distinct positions plus the source indices of each one, in
/// the layout used by [`TreeIndex`].
fn group_coincident(points: &[Point3f]) -> (Vec<Point3f>, Vec<usize>, Vec<usize>) {
    let mut members: Vec<usize> = (0..points.len()).collect();
    members.sort_by(|&a, &b| compare_positions(&points[a], &points[b]));

    let mut unique: Vec<Point3f> = Vec::new();
    let mut offsets = Vec::new();
    for (at, &idx) in members.iter().enumerate() {
        if unique.last() != Some(&points[idx]) {
            unique.push(points[idx]);
            offsets.push(at);
        }
    }
    offsets.push(members.len());

    (unique, members, offsets)
}

fn compare_positions(a: &Point3f, b: &Point3f) -> Ordering {
    // +0.0 folds negative zero into positive zero
    (0..3)
        .map(|axis| (a[axis] + 0.0).total_cmp(&(b[axis] + 0.0)))
        .find(|ord| ord.is_ne())
        .unwrap_or(Ordering::Equal)
}

/// Pick a frame in which no kiddo leaf can fill up with one coordinate
fn choose_frame(points: &[Point3f], bucket_size: usize) -> Option<(UnitQuaternion<f32>, Vec<Point3f>)> {
    [UnitQuaternion::identity(), tilted_frame()]
        .into_iter()
        .map(|frame| {
            let framed: Vec<Point3f> = points.iter().map(|p| frame.transform_point(p)).collect();
            (frame, framed)
        })
        .find(|(_, framed)| max_shared_coordinate(framed) < bucket_size)
}

/// Largest number of points sharing one value on any axis
fn max_shared_coordinate(points: &[Point3f]) -> usize {
    (0..3)
        .map(|axis| {
            let mut values: Vec<f32> = points.iter().map(|p| p[axis] + 0.0).collect();
            values.sort_by(f32::total_cmp);
            values.chunk_by(|a, b| a == b).map(<[f32]>::len).max().unwrap_or(0)
        })
        .max()
        .unwrap_or(0)
}
