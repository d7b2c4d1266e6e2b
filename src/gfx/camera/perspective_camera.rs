use cgmath::{perspective, Deg, Matrix4, Point3, Vector3};

use super::camera_utils::{Camera, CameraUniform, OPENGL_TO_WGPU_MATRIX};
use crate::config::CameraConfig;

/// Fixed perspective camera looking at a target point
#[derive(Debug, Clone, Copy)]
pub struct PerspectiveCamera {
    pub eye: Point3<f32>,
    pub target: Point3<f32>,
    pub up: Vector3<f32>,
    pub aspect: f32,
    /// Vertical field of view
    pub fovy: Deg<f32>,
    pub znear: f32,
    pub zfar: f32,
    pub uniform: CameraUniform,
}

impl Camera for PerspectiveCamera {
    fn build_view_projection_matrix(&self) -> Matrix4<f32> {
        let view = Matrix4::look_at_rh(self.eye, self.target, self.up);
        let proj = OPENGL_TO_WGPU_MATRIX * perspective(self.fovy, self.aspect, self.znear, self.zfar);
        proj * view
    }
}

impl PerspectiveCamera {
    pub fn new(config: &CameraConfig, aspect: f32) -> Self {
        let mut camera = Self {
            eye: config.position,
            target: config.target,
            up: Vector3::unit_y(),
            aspect,
            fovy: Deg(config.fov_degrees),
            znear: config.znear,
            zfar: config.zfar,
            uniform: CameraUniform::default(),
        };
        camera.update_view_proj();
        camera
    }

    /// Tracks the surface aspect ratio; zero-sized surfaces are ignored
    pub fn resize_projection(&mut self, width: u32, height: u32) {
        if width == 0 || height == 0 {
            return;
        }
        self.aspect = width as f32 / height as f32;
    }

    pub fn update_view_proj(&mut self) {
        self.uniform.view_position = [self.eye.x, self.eye.y, self.eye.z, 1.0];
        self.uniform.view_proj = self.build_view_projection_matrix().into();
    }
}
