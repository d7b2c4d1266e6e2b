//! Node transforms
//!
//! Rotations are stored as raw Euler angles rather than quaternions so the
//! per-frame animations can accumulate into them directly. Angles are never
//! wrapped; the rotation matrix is periodic so values past a full turn draw
//! identically.

use cgmath::{Matrix4, Rad, Vector3};

/// Euler angles in radians, applied in X, Y, Z order
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Orientation {
    pub x: f32,
    pub y: f32,
    pub z: f32,
}

impl Orientation {
    pub const ZERO: Self = Self {
        x: 0.0,
        y: 0.0,
        z: 0.0,
    };

    pub fn new(x: f32, y: f32, z: f32) -> Self {
        Self { x, y, z }
    }

    /// Rotation matrix `Rx * Ry * Rz`
    pub fn to_matrix(&self) -> Matrix4<f32> {
        Matrix4::from_angle_x(Rad(self.x))
            * Matrix4::from_angle_y(Rad(self.y))
            * Matrix4::from_angle_z(Rad(self.z))
    }
}

/// Local transform of a scene node
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Transform {
    pub position: Vector3<f32>,
    pub rotation: Orientation,
    pub scale: Vector3<f32>,
}

impl Default for Transform {
    fn default() -> Self {
        Self {
            position: Vector3::new(0.0, 0.0, 0.0),
            rotation: Orientation::ZERO,
            scale: Vector3::new(1.0, 1.0, 1.0),
        }
    }
}

impl Transform {
    pub fn from_scale(scale: f32) -> Self {
        Self {
            scale: Vector3::new(scale, scale, scale),
            ..Default::default()
        }
    }

    /// Composes the local matrix as `T * R * S`
    pub fn matrix(&self) -> Matrix4<f32> {
        let t = Matrix4::from_translation(self.position);
        let r = self.rotation.to_matrix();
        let s = Matrix4::from_nonuniform_scale(self.scale.x, self.scale.y, self.scale.z);
        t * r * s
    }

    /// Resets to the identity transform
    pub fn reset(&mut self) {
        *self = Self::default();
    }

    /// Matrix within `1e-6` of the identity, per element
    #[cfg(test)]
    pub(crate) fn is_identity(&self) -> bool {
        let m: [[f32; 4]; 4] = self.matrix().into();
        m.iter().enumerate().all(|(col, column)| {
            column.iter().enumerate().all(|(row, &value)| {
                let expected = if col == row { 1.0 } else { 0.0 };
                (value - expected).abs() <= 1e-6
            })
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use cgmath::{SquareMatrix, Vector4, Zero};
    use std::f32::consts::{FRAC_PI_2, TAU};

    #[test]
    fn test_zero_orientation_is_identity() {
        assert_eq!(Orientation::ZERO.to_matrix(), Matrix4::identity());
        assert!(Transform::default().is_identity());
    }

    #[test]
    fn test_full_turn_is_identity() {
        let transform = Transform {
            rotation: Orientation::new(TAU, TAU, TAU),
            ..Default::default()
        };
        assert!(transform.matrix() != Matrix4::identity());
        assert!(transform.is_identity());

        let quarter = Transform {
            rotation: Orientation::new(0.0, FRAC_PI_2, 0.0),
            ..Default::default()
        };
        assert!(!quarter.is_identity());
        assert!(!Transform::from_scale(1.001).is_identity());
    }

    #[test]
    fn test_rotation_order_is_xyz() {
        // Rx(90) * Ry(90) applied to +X: Ry sends +X to -Z, then Rx sends -Z to +Y
        let rotation = Orientation::new(FRAC_PI_2, FRAC_PI_2, 0.0).to_matrix();
        let v = rotation * Vector4::new(1.0, 0.0, 0.0, 0.0);
        assert_relative_eq!(v.x, 0.0, epsilon = 1e-6);
        assert_relative_eq!(v.y, 1.0, epsilon = 1e-6);
        assert_relative_eq!(v.z, 0.0, epsilon = 1e-6);
    }

    #[test]
    fn test_full_turn_draws_identically() {
        let a = Orientation::new(0.3, 0.0, 0.0).to_matrix();
        let b = Orientation::new(0.3 + std::f32::consts::TAU, 0.0, 0.0).to_matrix();
        for col in 0..4 {
            for row in 0..4 {
                assert_relative_eq!(a[col][row], b[col][row], epsilon = 1e-5);
            }
        }
    }

    #[test]
    fn test_trs_order() {
        let transform = Transform {
            position: Vector3::new(0.0, 1.0, 0.0),
            rotation: Orientation::ZERO,
            scale: Vector3::new(2.0, 2.0, 2.0),
        };
        // Scale first, then translate
        let p = transform.matrix() * Vector4::new(1.0, 0.0, 0.0, 1.0);
        assert_relative_eq!(p.x, 2.0);
        assert_relative_eq!(p.y, 1.0);

        let mut transform = transform;
        transform.reset();
        assert!(transform.is_identity());
        assert!(transform.position.is_zero());
    }
}
