//! Scene description: lights plus the models placed in the room.
//!
//! The scene is plain data. [`SceneRenderer`](super::SceneRenderer) mirrors it
//! onto the GPU and picks up newly added models on the next frame.

use glam::{Mat4, Vec3};

use super::mesh::MeshData;
use crate::math::Transform;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AmbientLight {
    pub color: Vec3,
    pub intensity: f32,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DirectionalLight {
    pub position: Vec3,
    pub target: Vec3,
    pub color: Vec3,
    pub intensity: f32,
}

impl DirectionalLight {
    /// Direction the light travels in.
    pub fn direction(&self) -> Vec3 {
        (self.target - self.position).normalize_or_zero()
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PointLight {
    pub position: Vec3,
    pub color: Vec3,
    pub intensity: f32,
    /// Falloff exponent; 2 is inverse-square, 0 disables decay.
    pub decay: f32,
}

impl PointLight {
    /// Intensity multiplier at `distance`. Mirrors the fragment shader,
    /// including its clamp near the light.
    pub fn falloff(&self, distance: f32) -> f32 {
        1.0 / distance.powf(self.decay).max(0.01)
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Lighting {
    pub ambient: AmbientLight,
    pub sun: DirectionalLight,
    pub lamp: PointLight,
}

impl Default for Lighting {
    fn default() -> Self {
        Self {
            ambient: AmbientLight {
                color: Vec3::ONE,
                intensity: 0.5,
            },
            sun: DirectionalLight {
                position: Vec3::new(0.0, 10.0, 10.0),
                target: Vec3::ZERO,
                color: Vec3::ONE,
                intensity: 0.5,
            },
            lamp: PointLight {
                position: Vec3::new(0.0, 10.0, 10.0),
                color: Vec3::ONE,
                intensity: 0.5,
                decay: 2.0,
            },
        }
    }
}

#[derive(Debug, Clone)]
pub struct Model {
    pub meshes: Vec<MeshData>,
    pub transform: Transform,
}

impl Model {
    pub fn matrix(&self) -> Mat4 {
        self.transform.to_matrix()
    }
}

#[derive(Debug, Clone, Default)]
pub struct Scene {
    pub lighting: Lighting,
    models: Vec<Model>,
}

impl Scene {
    pub fn new(lighting: Lighting) -> Self {
        Self {
            lighting,
            models: Vec::new(),
        }
    }

    /// Appends a model. Models are never removed, so an index into
    /// [`Scene::models`] stays valid for the life of the scene.
    pub fn add_model(&mut self, meshes: Vec<MeshData>, transform: Transform) -> usize {
        self.models.push(Model { meshes, transform });
        self.models.len() - 1
    }

    pub fn models(&self) -> &[Model] {
        &self.models
    }

    pub fn mesh_count(&self) -> usize {
        self.models.iter().map(|m| m.meshes.len()).sum()
    }
}
