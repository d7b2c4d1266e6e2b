//! Light sources of a scene

use cgmath::{InnerSpace, Vector3};

use crate::config::{AmbientLightConfig, DirectionalLightConfig, EnvironmentConfig, SceneConfig};

/// Uniform light reaching every surface from all directions
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AmbientLight {
    pub color: [f32; 3],
    pub intensity: f32,
}

impl AmbientLight {
    /// Color premultiplied by intensity
    pub fn radiance(&self) -> [f32; 3] {
        self.color.map(|c| c * self.intensity)
    }
}

impl From<AmbientLightConfig> for AmbientLight {
    fn from(config: AmbientLightConfig) -> Self {
        Self {
            color: config.color,
            intensity: config.intensity,
        }
    }
}

/// Parallel light shining from `position` toward `target`
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DirectionalLight {
    pub position: Vector3<f32>,
    pub target: Vector3<f32>,
    pub color: [f32; 3],
    pub intensity: f32,
}

impl DirectionalLight {
    /// Unit vector from the lit surface toward the light
    ///
    /// Falls back to straight up when position and target coincide.
    pub fn direction(&self) -> Vector3<f32> {
        let offset = self.position - self.target;
        if offset.magnitude2() <= f32::EPSILON {
            return Vector3::unit_y();
        }
        offset.normalize()
    }
}

impl From<DirectionalLightConfig> for DirectionalLight {
    fn from(config: DirectionalLightConfig) -> Self {
        Self {
            position: config.position.into(),
            target: Vector3::new(0.0, 0.0, 0.0),
            color: config.color,
            intensity: config.intensity,
        }
    }
}

/// Everything the shaders need to light the scene
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Lighting {
    pub ambient: AmbientLight,
    pub directional: DirectionalLight,
    pub environment_intensity: f32,
}

impl Lighting {
    pub fn from_config(scene: &SceneConfig, environment: &EnvironmentConfig) -> Self {
        Self {
            ambient: scene.ambient.into(),
            directional: scene.directional.into(),
            environment_intensity: environment.intensity,
        }
    }
}
