//! Idle floating motion
//!
//! A slow bob and sway derived from the elapsed time, applied to a group so
//! it composes with whatever its children do.

use crate::config::FloatConfig;
use crate::gfx::scene::{NodeRef, Orientation, SceneGraph, Transform};

use super::frame_loop::FrameState;

/// Upper bound of the random phase offset
pub const MAX_OFFSET: f32 = 10_000.0;

/// Local pose of the float group at one instant
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FloatPose {
    pub rotation: Orientation,
    pub height: f32,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FloatMotion {
    config: FloatConfig,
    offset: f32,
}

fn map_linear(x: f32, a1: f32, a2: f32, b1: f32, b2: f32) -> f32 {
    b1 + (x - a1) * (b2 - b1) / (a2 - a1)
}

impl FloatMotion {
    pub fn new(config: FloatConfig, offset: f32) -> Self {
        Self { config, offset }
    }

    /// Motion with a random phase so separate mounts do not move in lockstep
    pub fn with_random_offset(config: FloatConfig) -> Self {
        Self::new(config, rand::random_range(0.0..MAX_OFFSET))
    }

    pub fn offset(&self) -> f32 {
        self.offset
    }

    pub fn is_active(&self) -> bool {
        self.config.enabled && self.config.speed != 0.0
    }

    /// Pose at `elapsed` seconds, `None` when the motion is inactive
    pub fn sample(&self, elapsed: f32) -> Option<FloatPose> {
        if !self.is_active() {
            return None;
        }

        let c = &self.config;
        let phase = (self.offset + elapsed) / 4.0 * c.speed;
        let (sin, cos) = phase.sin_cos();

        let [low, high] = c.floating_range;
        let height = map_linear(sin / 10.0, -0.1, 0.1, low, high) * c.float_intensity;

        Some(FloatPose {
            rotation: Orientation::new(
                cos / 8.0 * c.rotation_intensity,
                sin / 8.0 * c.rotation_intensity,
                sin / 20.0 * c.rotation_intensity,
            ),
            height,
        })
    }

    /// Writes the pose into `transform`, leaving it untouched when inactive
    pub fn apply_to(&self, transform: &mut Transform, elapsed: f32) {
        if let Some(pose) = self.sample(elapsed) {
            transform.rotation = pose.rotation;
            transform.position.y = pose.height;
        }
    }

    /// Frame callback moving the group behind `target`
    pub fn into_callback(self, target: NodeRef) -> impl FnMut(&FrameState, &mut SceneGraph) {
        move |frame, graph| {
            if let Some(node) = graph.resolve_mut(&target) {
                self.apply_to(&mut node.transform, frame.elapsed);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::gfx::scene::Node;
    use approx::assert_relative_eq;

    fn motion(offset: f32) -> FloatMotion {
        FloatMotion::new(FloatConfig::default(), offset)
    }

    #[test]
    fn test_pose_at_phase_zero() {
        let pose = motion(0.0).sample(0.0).unwrap();
        assert_relative_eq!(pose.rotation.x, 0.2 / 8.0, epsilon = 1e-6);
        assert_relative_eq!(pose.rotation.y, 0.0, epsilon = 1e-6);
        assert_relative_eq!(pose.rotation.z, 0.0, epsilon = 1e-6);
        assert_relative_eq!(pose.height, 0.0, epsilon = 1e-6);
    }

    #[test]
    fn test_peak_height() {
        // phase = t / 4 * 1.5 = pi / 2
        let t = std::f32::consts::FRAC_PI_2 * 4.0 / 1.5;
        let pose = motion(0.0).sample(t).unwrap();
        assert_relative_eq!(pose.height, 0.1 * 0.5, epsilon = 1e-5);
        assert_relative_eq!(pose.rotation.y, 0.2 / 8.0, epsilon = 1e-5);
        assert_relative_eq!(pose.rotation.z, 0.2 / 20.0, epsilon = 1e-5);
    }

    #[test]
    fn test_motion_is_bounded() {
        let m = motion(123.0);
        for i in 0..500 {
            let pose = m.sample(i as f32 * 0.37).unwrap();
            assert!(pose.height.abs() <= 0.05 + 1e-5);
            assert!(pose.rotation.x.abs() <= 0.025 + 1e-6);
            assert!(pose.rotation.y.abs() <= 0.025 + 1e-6);
            assert!(pose.rotation.z.abs() <= 0.01 + 1e-6);
        }
    }

    #[test]
    fn test_custom_range_is_mapped() {
        let config = FloatConfig {
            floating_range: [0.0, 1.0],
            float_intensity: 1.0,
            ..Default::default()
        };
        let pose = FloatMotion::new(config, 0.0).sample(0.0).unwrap();
        assert_relative_eq!(pose.height, 0.5, epsilon = 1e-6);
    }

    #[test]
    fn test_zero_speed_or_disabled_is_noop() {
        let stopped = FloatMotion::new(
            FloatConfig {
                speed: 0.0,
                ..Default::default()
            },
            0.0,
        );
        let disabled = FloatMotion::new(
            FloatConfig {
                enabled: false,
                ..Default::default()
            },
            0.0,
        );

        for m in [stopped, disabled] {
            assert!(m.sample(3.0).is_none());
            let mut transform = Transform::from_scale(2.0);
            transform.position.y = 7.0;
            m.apply_to(&mut transform, 3.0);
            assert_eq!(transform.position.y, 7.0);
            assert_eq!(transform.rotation, Orientation::ZERO);
        }
    }

    #[test]
    fn test_random_offset_in_range() {
        for _ in 0..32 {
            let offset = FloatMotion::with_random_offset(FloatConfig::default()).offset();
            assert!((0.0..MAX_OFFSET).contains(&offset));
        }
    }

    #[test]
    fn test_callback_skips_detached_group() {
        let mut graph = SceneGraph::new();
        let id = graph.insert(Node::group("float"));
        let target = NodeRef::new();
        let mut callback = motion(0.0).into_callback(target.clone());

        let frame = FrameState {
            elapsed: 2.0,
            ..Default::default()
        };
        callback(&frame, &mut graph);
        assert!(graph.get(id).unwrap().transform.is_identity());

        target.attach(id);
        callback(&frame, &mut graph);
        assert!(!graph.get(id).unwrap().transform.is_identity());
    }
}
