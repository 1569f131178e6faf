mod bootstrap;
mod environment;

pub use bootstrap::bootstrap;
pub use environment::EnvironmentMap;

use crate::model::Model;
use nalgebra_glm as glm;

#[derive(Debug, Clone, Copy)]
pub struct HemisphereLight {
    pub sky: [f32; 3],
    pub ground: [f32; 3],
    pub intensity: f32,
}

#[derive(Debug, Clone, Copy)]
pub struct DirectionalLight {
    pub color: [f32; 3],
    pub intensity: f32,
    /// Unit vector pointing towards the light.
    pub direction: [f32; 3],
}

impl DirectionalLight {
    pub fn from_position(color: [f32; 3], intensity: f32, position: [f32; 3]) -> Self {
        let v = glm::vec3(position[0], position[1], position[2]);
        let v = if glm::length(&v) > f32::EPSILON {
            glm::normalize(&v)
        } else {
            glm::vec3(0.0, 1.0, 0.0)
        };
        Self {
            color,
            intensity,
            direction: [v.x, v.y, v.z],
        }
    }
}

/// Everything that gets drawn: background, lights, environment and the
/// models attached so far.
pub struct Scene {
    pub background: [f32; 3],
    pub hemisphere: HemisphereLight,
    pub sun: DirectionalLight,
    pub environment: Option<EnvironmentMap>,
    pub environment_intensity: f32,
    pub models: Vec<Model>,
}

impl Scene {
    /// Attach a model and return its index in `models`.
    pub fn add(&mut self, model: Model) -> usize {
        self.models.push(model);
        self.models.len() - 1
    }
}
