//! Application and scene configuration
//!
//! All tunables live here with defaults matching the reference scene: a 2x
//! scaled white metallic cube, one ambient and one directional light, the
//! "city" environment and a camera 5 units back with a 75 degree field of view.

use cgmath::{Point3, Vector3};

use crate::gfx::resources::environment::EnvironmentPreset;

/// Top-level configuration consumed by [`crate::run`]
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub window: WindowConfig,
    /// Fifo presentation when true, Immediate otherwise
    pub vsync: bool,
    pub environment: EnvironmentConfig,
    pub scene: SceneConfig,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            window: WindowConfig::default(),
            vsync: true,
            environment: EnvironmentConfig::default(),
            scene: SceneConfig::default(),
        }
    }
}

#[derive(Debug, Clone)]
pub struct WindowConfig {
    pub title: String,
    pub width: u32,
    pub height: u32,
    /// Start maximized so the canvas covers the viewport
    pub maximized: bool,
    pub fullscreen: bool,
}

impl Default for WindowConfig {
    fn default() -> Self {
        Self {
            title: "metalcube".to_string(),
            width: 1200,
            height: 800,
            maximized: true,
            fullscreen: false,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct EnvironmentConfig {
    pub preset: EnvironmentPreset,
    /// Edge length of each cube face at mip 0
    pub face_size: u32,
    /// Scale applied to image-based lighting
    pub intensity: f32,
}

impl Default for EnvironmentConfig {
    fn default() -> Self {
        Self {
            preset: EnvironmentPreset::City,
            face_size: 128,
            intensity: 1.0,
        }
    }
}

/// Everything the showcase scene is built from
#[derive(Debug, Clone)]
pub struct SceneConfig {
    pub camera: CameraConfig,
    pub ambient: AmbientLightConfig,
    pub directional: DirectionalLightConfig,
    pub cube: CubeConfig,
    pub float: FloatConfig,
    pub spin: SpinConfig,
}

impl Default for SceneConfig {
    fn default() -> Self {
        Self {
            camera: CameraConfig::default(),
            ambient: AmbientLightConfig::default(),
            directional: DirectionalLightConfig::default(),
            cube: CubeConfig::default(),
            float: FloatConfig::default(),
            spin: SpinConfig::default(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CameraConfig {
    pub position: Point3<f32>,
    pub target: Point3<f32>,
    /// Vertical field of view in degrees
    pub fov_degrees: f32,
    pub znear: f32,
    pub zfar: f32,
}

impl Default for CameraConfig {
    fn default() -> Self {
        Self {
            position: Point3::new(0.0, 0.0, 5.0),
            target: Point3::new(0.0, 0.0, 0.0),
            fov_degrees: 75.0,
            znear: 0.1,
            zfar: 1000.0,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AmbientLightConfig {
    pub color: [f32; 3],
    pub intensity: f32,
}

impl Default for AmbientLightConfig {
    fn default() -> Self {
        Self {
            color: [1.0, 1.0, 1.0],
            intensity: 0.5,
        }
    }
}

/// Directional light shining from `position` toward the origin
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DirectionalLightConfig {
    pub position: [f32; 3],
    pub color: [f32; 3],
    pub intensity: f32,
}

impl Default for DirectionalLightConfig {
    fn default() -> Self {
        Self {
            position: [10.0, 10.0, 5.0],
            color: [1.0, 1.0, 1.0],
            intensity: 1.0,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CubeConfig {
    /// Box geometry extents before scaling
    pub size: Vector3<f32>,
    pub scale: f32,
    pub color: [f32; 4],
    pub metalness: f32,
    pub roughness: f32,
}

impl Default for CubeConfig {
    fn default() -> Self {
        Self {
            size: Vector3::new(1.0, 1.0, 1.0),
            scale: 2.0,
            color: [1.0, 1.0, 1.0, 1.0],
            metalness: 0.5,
            roughness: 0.2,
        }
    }
}

/// Idle float motion applied to the group around the cube
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FloatConfig {
    pub enabled: bool,
    pub speed: f32,
    pub rotation_intensity: f32,
    pub float_intensity: f32,
    pub floating_range: [f32; 2],
}

impl Default for FloatConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            speed: 1.5,
            rotation_intensity: 0.2,
            float_intensity: 0.5,
            floating_range: [-0.1, 0.1],
        }
    }
}

/// Radians per second about the two tracked axes
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SpinConfig {
    pub primary_rate: f32,
    pub secondary_rate: f32,
}

impl Default for SpinConfig {
    fn default() -> Self {
        Self {
            primary_rate: 0.2,
            secondary_rate: 0.1,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_match_reference_scene() {
        let config = AppConfig::default();
        let scene = &config.scene;

        assert_eq!(scene.camera.position, Point3::new(0.0, 0.0, 5.0));
        assert_eq!(scene.camera.fov_degrees, 75.0);
        assert_eq!(scene.ambient.intensity, 0.5);
        assert_eq!(scene.directional.position, [10.0, 10.0, 5.0]);
        assert_eq!(scene.directional.intensity, 1.0);
        assert_eq!(scene.cube.scale, 2.0);
        assert_eq!(scene.cube.metalness, 0.5);
        assert_eq!(scene.cube.roughness, 0.2);
        assert_eq!(scene.float.speed, 1.5);
        assert_eq!(scene.float.rotation_intensity, 0.2);
        assert_eq!(scene.float.float_intensity, 0.5);
        assert_eq!(config.environment.preset, EnvironmentPreset::City);
    }

    #[test]
    fn test_spin_secondary_rate_is_half_primary() {
        let spin = SpinConfig::default();
        assert_eq!(spin.secondary_rate * 2.0, spin.primary_rate);
    }
}
