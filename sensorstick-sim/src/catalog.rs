//! Model catalog
//!
//! Every spawnable model is approximated by one primitive shape with a body
//! color and an optional accent color on its end faces.

use nalgebra::Vector3;
use rand::Rng;
use sensorstick_core::{Error, Point3f, Result, Vector3f};
use std::collections::BTreeMap;
use std::f32::consts::PI;

/// Primitive shape of a model, centered on its local origin
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Primitive {
    /// Axis aligned box given by its half extents
    Box { half_extents: Vector3f },
    /// Cylinder along local z
    Cylinder { radius: f32, half_height: f32 },
    Sphere { radius: f32 },
}

/// A point on a primitive surface with its outward normal
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SurfaceSample {
    pub position: Point3f,
    pub normal: Vector3f,
    /// Whether the point lies on an end face (box top/bottom, cylinder cap)
    pub on_end_face: bool,
}

impl Primitive {
    /// Total surface area
    pub fn area(&self) -> f32 {
        match *self {
            Primitive::Box { half_extents: h } => {
                8.0 * (h.x * h.y + h.y * h.z + h.x * h.z)
            }
            Primitive::Cylinder { radius, half_height } => {
                2.0 * PI * radius * (2.0 * half_height) + 2.0 * PI * radius * radius
            }
            Primitive::Sphere { radius } => 4.0 * PI * radius * radius,
        }
    }

    /// Distance from the center to the lowest point when resting upright
    pub fn rest_height(&self) -> f32 {
        match *self {
            Primitive::Box { half_extents } => half_extents.z,
            Primitive::Cylinder { half_height, .. } => half_height,
            Primitive::Sphere { radius } => radius,
        }
    }

    /// Draw one point uniformly distributed over the surface
    pub fn sample_surface<R: Rng + ?Sized>(&self, rng: &mut R) -> SurfaceSample {
        match *self {
            Primitive::Box { half_extents: h } => {
                let areas = [h.y * h.z, h.x * h.z, h.x * h.y];
                let total: f32 = areas.iter().sum();
                let pick = rng.gen_range(0.0..total);
                let axis = if pick < areas[0] {
                    0
                } else if pick < areas[0] + areas[1] {
                    1
                } else {
                    2
                };
                let sign = if rng.gen_bool(0.5) { 1.0 } else { -1.0 };

                let mut position = Vector3::new(
                    rng.gen_range(-h.x..=h.x),
                    rng.gen_range(-h.y..=h.y),
                    rng.gen_range(-h.z..=h.z),
                );
                position[axis] = sign * h[axis];
                let mut normal = Vector3f::zeros();
                normal[axis] = sign;

                SurfaceSample {
                    position: Point3f::from(position),
                    normal,
                    on_end_face: axis == 2,
                }
            }
            Primitive::Cylinder { radius, half_height } => {
                let side = 2.0 * PI * radius * 2.0 * half_height;
                let caps = 2.0 * PI * radius * radius;
                let theta = rng.gen_range(0.0..2.0 * PI);

                if rng.gen_range(0.0..side + caps) < side {
                    let (s, c) = theta.sin_cos();
                    SurfaceSample {
                        position: Point3f::new(radius * c, radius * s, rng.gen_range(-half_height..=half_height)),
                        normal: Vector3f::new(c, s, 0.0),
                        on_end_face: false,
                    }
                } else {
                    // sqrt keeps the cap density uniform
                    let r = radius * rng.gen::<f32>().sqrt();
                    let sign = if rng.gen_bool(0.5) { 1.0 } else { -1.0 };
                    SurfaceSample {
                        position: Point3f::new(r * theta.cos(), r * theta.sin(), sign * half_height),
                        normal: Vector3f::new(0.0, 0.0, sign),
                        on_end_face: true,
                    }
                }
            }
            Primitive::Sphere { radius } => {
                let z: f32 = rng.gen_range(-1.0..=1.0);
                let phi = rng.gen_range(0.0..2.0 * PI);
                let r = (1.0 - z * z).max(0.0).sqrt();
                let normal = Vector3f::new(r * phi.cos(), r * phi.sin(), z);
                SurfaceSample {
                    position: Point3f::from(normal * radius),
                    normal,
                    on_end_face: false,
                }
            }
        }
    }
}

/// Description of a spawnable model
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ModelSpec {
    pub primitive: Primitive,
    pub color: [u8; 3],
    pub accent: Option<[u8; 3]>,
}

impl ModelSpec {
    pub fn new(primitive: Primitive, color: [u8; 3]) -> Self {
        Self {
            primitive,
            color,
            accent: None,
        }
    }

    pub fn with_accent(mut self, accent: [u8; 3]) -> Self {
        self.accent = Some(accent);
        self
    }

    /// Color of a surface sample
    pub fn color_at(&self, sample: &SurfaceSample) -> [u8; 3] {
        match self.accent {
            Some(accent) if sample.on_end_face => accent,
            _ => self.color,
        }
    }
}

fn cuboid(x: f32, y: f32, z: f32) -> Primitive {
    Primitive::Box {
        half_extents: Vector3f::new(x, y, z),
    }
}

fn cylinder(radius: f32, half_height: f32) -> Primitive {
    Primitive::Cylinder { radius, half_height }
}

/// Named collection of spawnable models
#[derive(Debug, Clone, Default)]
pub struct ModelCatalog {
    models: BTreeMap<String, ModelSpec>,
}

impl ModelCatalog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Catalog with every model used by the built-in pick lists
    pub fn builtin() -> Self {
        let mut catalog = Self::new();
        catalog
            .insert("biscuits", ModelSpec::new(cuboid(0.08, 0.025, 0.06), [196, 150, 82]).with_accent([120, 60, 30]))
            .insert("soap", ModelSpec::new(cuboid(0.045, 0.03, 0.015), [230, 220, 240]).with_accent([80, 140, 200]))
            .insert("soap2", ModelSpec::new(cuboid(0.04, 0.025, 0.02), [60, 170, 90]).with_accent([240, 240, 240]))
            .insert("book", ModelSpec::new(cuboid(0.1, 0.075, 0.015), [40, 60, 140]).with_accent([235, 230, 215]))
            .insert("glue", ModelSpec::new(cylinder(0.02, 0.055), [250, 250, 250]).with_accent([230, 120, 20]))
            .insert("sticky_notes", ModelSpec::new(cuboid(0.038, 0.038, 0.02), [250, 230, 60]))
            .insert("snacks", ModelSpec::new(cuboid(0.05, 0.03, 0.09), [210, 40, 40]).with_accent([250, 200, 40]))
            .insert("eraser", ModelSpec::new(cuboid(0.03, 0.012, 0.01), [240, 240, 240]).with_accent([40, 90, 200]))
            .insert("beer", ModelSpec::new(cylinder(0.033, 0.06), [120, 70, 20]).with_accent([200, 200, 200]))
            .insert("bowl", ModelSpec::new(Primitive::Sphere { radius: 0.07 }, [240, 240, 235]))
            .insert("create", ModelSpec::new(cylinder(0.17, 0.045), [80, 80, 80]).with_accent([60, 150, 60]))
            .insert("disk_part", ModelSpec::new(cylinder(0.06, 0.01), [150, 150, 160]))
            .insert("hammer", ModelSpec::new(cuboid(0.15, 0.02, 0.015), [110, 75, 40]).with_accent([70, 70, 75]))
            .insert("plastic_cup", ModelSpec::new(cylinder(0.04, 0.06), [40, 100, 220]))
            .insert("soda_can", ModelSpec::new(cylinder(0.033, 0.06), [200, 20, 30]).with_accent([190, 190, 195]));
        catalog
    }

    /// Add or replace a model
    pub fn insert(&mut self, name: impl Into<String>, spec: ModelSpec) -> &mut Self {
        self.models.insert(name.into(), spec);
        self
    }

    pub fn get(&self, name: &str) -> Result<&ModelSpec> {
        self.models
            .get(name)
            .ok_or_else(|| Error::ModelNotFound(name.to_string()))
    }

    pub fn contains(&self, name: &str) -> bool {
        self.models.contains_key(name)
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.models.keys().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.models.len()
    }

    pub fn is_empty(&self) -> bool {
        self.models.is_empty()
    }
}
