//! In-process synthetic world
//!
//! Renders the training model from its catalog primitive as seen by a fixed
//! depth camera: surface points facing the camera are kept, perturbed by
//! sensor noise, and returned in the camera frame.

use crate::catalog::{ModelCatalog, ModelSpec};
use crate::{DepthSensor, SimulatorClient};
use log::{debug, info, trace};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use sensorstick_core::{
    ColoredPoint3f, ColoredPointCloud3f, Error, Point3f, PointCloud, Pose, Result, Vector3f,
};
use std::f32::consts::PI;

/// Configuration of the synthetic world and its depth camera
#[derive(Debug, Clone, PartialEq)]
pub struct SyntheticSimulatorConfig {
    /// Where the training model is spawned, in world coordinates
    pub spawn_position: Vector3f,
    /// Camera position, looking at the spawn position
    pub sensor_position: Point3f,
    /// Surface points drawn per frame before visibility culling
    pub points_per_sample: usize,
    /// Uniform position noise amplitude per axis, in meters
    pub position_noise: f32,
    /// Uniform color noise amplitude per channel
    pub color_jitter: u8,
    /// Probability that a frame comes back empty
    pub dropout_probability: f64,
    /// Half size of the square ground patch seen by the camera
    pub ground_half_extent: f32,
    /// Seed for reproducible captures, entropy when `None`
    pub seed: Option<u64>,
}

impl Default for SyntheticSimulatorConfig {
    fn default() -> Self {
        Self {
            spawn_position: Vector3f::new(0.0, 0.0, 1.0),
            sensor_position: Point3f::new(0.0, -0.8, 1.6),
            points_per_sample: 4000,
            position_noise: 0.0005,
            color_jitter: 6,
            dropout_probability: 0.0,
            ground_half_extent: 0.5,
            seed: None,
        }
    }
}

impl SyntheticSimulatorConfig {
    pub fn with_seed(mut self, seed: Option<u64>) -> Self {
        self.seed = seed;
        self
    }

    pub fn with_dropout_probability(mut self, probability: f64) -> Self {
        self.dropout_probability = probability;
        self
    }

    pub fn with_points_per_sample(mut self, points: usize) -> Self {
        self.points_per_sample = points;
        self
    }

    fn validate(&self) -> Result<()> {
        if !(0.0..=1.0).contains(&self.dropout_probability) {
            return Err(Error::InvalidData(format!(
                "dropout probability {} is outside [0, 1]",
                self.dropout_probability
            )));
        }
        if self.position_noise < 0.0 || !self.position_noise.is_finite() {
            return Err(Error::InvalidData("position noise must be non-negative".to_string()));
        }
        if (self.sensor_position.coords - self.spawn_position).norm() < f32::EPSILON {
            return Err(Error::InvalidData(
                "sensor cannot sit at the spawn position".to_string(),
            ));
        }
        Ok(())
    }
}

/// The model currently in the world
#[derive(Debug, Clone, PartialEq)]
pub struct SpawnedModel {
    pub name: String,
    pub spec: ModelSpec,
    pub pose: Pose,
}

/// Synthetic simulator and depth camera
pub struct SyntheticSimulator {
    config: SyntheticSimulatorConfig,
    catalog: ModelCatalog,
    rng: StdRng,
    camera: Pose,
    gravity: bool,
    ground_plane: bool,
    model: Option<SpawnedModel>,
    frames: usize,
}

impl SyntheticSimulator {
    pub fn new(config: SyntheticSimulatorConfig, catalog: ModelCatalog) -> Result<Self> {
        config.validate()?;

        let rng = match config.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };
        let target = Point3f::from(config.spawn_position);
        let camera = Pose::look_at(&config.sensor_position, &target, &Vector3f::z());

        Ok(Self {
            config,
            catalog,
            rng,
            camera,
            gravity: true,
            ground_plane: true,
            model: None,
            frames: 0,
        })
    }

    /// Synthetic world with the built-in catalog
    pub fn with_builtin_catalog(config: SyntheticSimulatorConfig) -> Result<Self> {
        Self::new(config, ModelCatalog::builtin())
    }

    pub fn catalog(&self) -> &ModelCatalog {
        &self.catalog
    }

    pub fn spawned_model(&self) -> Option<&SpawnedModel> {
        self.model.as_ref()
    }

    pub fn gravity_enabled(&self) -> bool {
        self.gravity
    }

    pub fn has_ground_plane(&self) -> bool {
        self.ground_plane
    }

    /// Frames captured so far, empty ones included
    pub fn frames_captured(&self) -> usize {
        self.frames
    }

    /// Pose of the camera in world coordinates
    pub fn camera_pose(&self) -> Pose {
        self.camera
    }

    fn random_orientation_pose(&mut self, position: Vector3f) -> Pose {
        let roll = self.rng.gen_range(0.0..2.0 * PI);
        let pitch = self.rng.gen_range(0.0..2.0 * PI);
        let yaw = self.rng.gen_range(0.0..2.0 * PI);
        Pose::from_position_rpy(position, roll, pitch, yaw)
    }

    fn render_model(&mut self, spec: &ModelSpec, pose: &Pose, eye: &Point3f, out: &mut Vec<ColoredPoint3f>) {
        for _ in 0..self.config.points_per_sample {
            let sample = spec.primitive.sample_surface(&mut self.rng);
            let position = pose.transform_point(&sample.position);
            let normal = pose.transform_vector(&sample.normal);

            if normal.dot(&(*eye - position)) <= 0.0 {
                continue;
            }
            let color = self.jitter_color(spec.color_at(&sample));
            out.push(ColoredPoint3f::new(position, color));
        }
    }

    fn render_ground(&mut self, eye: &Point3f, out: &mut Vec<ColoredPoint3f>) {
        if eye.z <= 0.0 {
            return;
        }
        let half = self.config.ground_half_extent;
        let center = self.config.spawn_position;
        for _ in 0..self.config.points_per_sample / 2 {
            let position = Point3f::new(
                center.x + self.rng.gen_range(-half..=half),
                center.y + self.rng.gen_range(-half..=half),
                0.0,
            );
            let color = self.jitter_color([128, 128, 128]);
            out.push(ColoredPoint3f::new(position, color));
        }
    }

    fn jitter_color(&mut self, color: [u8; 3]) -> [u8; 3] {
        let jitter = self.config.color_jitter as i16;
        if jitter == 0 {
            return color;
        }
        color.map(|c| (c as i16 + self.rng.gen_range(-jitter..=jitter)).clamp(0, 255) as u8)
    }

    fn add_noise(&mut self, point: Point3f) -> Point3f {
        let noise = self.config.position_noise;
        if noise == 0.0 {
            return point;
        }
        point + Vector3f::new(
            self.rng.gen_range(-noise..=noise),
            self.rng.gen_range(-noise..=noise),
            self.rng.gen_range(-noise..=noise),
        )
    }
}

impl SimulatorClient for SyntheticSimulator {
    fn initial_setup(&mut self) -> Result<()> {
        self.gravity = false;
        self.ground_plane = false;
        info!("synthetic world ready: gravity disabled, ground plane removed");
        Ok(())
    }

    fn spawn_model(&mut self, model_name: &str) -> Result<()> {
        if let Some(existing) = &self.model {
            return Err(Error::Simulation(format!(
                "cannot spawn '{}': '{}' is still in the world",
                model_name, existing.name
            )));
        }

        let spec = *self.catalog.get(model_name)?;
        let pose = Pose::translation(self.config.spawn_position);
        debug!("spawned '{}' at {:?}", model_name, self.config.spawn_position);

        self.model = Some(SpawnedModel {
            name: model_name.to_string(),
            spec,
            pose,
        });
        Ok(())
    }

    fn delete_model(&mut self) -> Result<()> {
        match self.model.take() {
            Some(model) => debug!("deleted '{}'", model.name),
            None => debug!("delete requested with no model in the world"),
        }
        Ok(())
    }
}

impl DepthSensor for SyntheticSimulator {
    fn capture_sample(&mut self) -> Result<ColoredPointCloud3f> {
        self.frames += 1;

        let mut world_points = Vec::new();
        let eye = self.config.sensor_position;

        if let Some(model) = self.model.clone() {
            let mut position = self.config.spawn_position;
            let falling = self.gravity;
            if falling {
                // Dropped models land on the ground or leave the scene
                position.z = model.spec.primitive.rest_height();
            }

            let pose = self.random_orientation_pose(position);
            if let Some(spawned) = self.model.as_mut() {
                spawned.pose = pose;
            }

            if !falling || self.ground_plane {
                self.render_model(&model.spec, &pose, &eye, &mut world_points);
            }
        }

        if self.ground_plane {
            self.render_ground(&eye, &mut world_points);
        }

        if self.config.dropout_probability > 0.0 && self.rng.gen_bool(self.config.dropout_probability) {
            trace!("frame {} dropped", self.frames);
            return Ok(PointCloud::new());
        }

        let mut cloud = PointCloud::from_points(world_points);
        cloud.transform(&self.camera.inverse());
        for point in &mut cloud.points {
            point.position = self.add_noise(point.position);
        }

        trace!("frame {} has {} points", self.frames, cloud.len());
        Ok(cloud)
    }
}
