//! Constant-rate spin of a mesh node
//!
//! Each frame the node's rotation about x grows by `delta * primary_rate`
//! and about y by `delta * secondary_rate`. Angles are never wrapped.

use crate::config::SpinConfig;
use crate::gfx::scene::{NodeRef, Orientation, SceneGraph};

use super::frame_loop::FrameState;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Spin {
    /// Radians per second about x
    pub primary_rate: f32,
    /// Radians per second about y
    pub secondary_rate: f32,
}

impl Default for Spin {
    fn default() -> Self {
        SpinConfig::default().into()
    }
}

impl From<SpinConfig> for Spin {
    fn from(config: SpinConfig) -> Self {
        Self {
            primary_rate: config.primary_rate,
            secondary_rate: config.secondary_rate,
        }
    }
}

impl Spin {
    pub fn advance(&self, orientation: &mut Orientation, delta: f32) {
        orientation.x += delta * self.primary_rate;
        orientation.y += delta * self.secondary_rate;
    }

    /// Advances the node behind `target`, if it is mounted
    ///
    /// Returns whether the node was found.
    pub fn apply(&self, target: &NodeRef, delta: f32, graph: &mut SceneGraph) -> bool {
        match graph.resolve_mut(target) {
            Some(node) => {
                self.advance(&mut node.transform.rotation, delta);
                true
            }
            None => false,
        }
    }

    /// Frame callback spinning the node behind `target`
    pub fn into_callback(self, target: NodeRef) -> impl FnMut(&FrameState, &mut SceneGraph) {
        move |frame, graph| {
            if !self.apply(&target, frame.delta, graph) {
                log::trace!("Spin target not mounted, skipping frame {}", frame.frame);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::animation::FrameLoop;
    use crate::gfx::scene::Node;
    use approx::assert_relative_eq;

    fn frame(delta: f32) -> FrameState {
        FrameState {
            delta,
            ..Default::default()
        }
    }

    fn mounted() -> (SceneGraph, NodeRef) {
        let mut graph = SceneGraph::new();
        let target = NodeRef::new();
        target.attach(graph.insert(Node::mesh("cube", 0, "metal")));
        (graph, target)
    }

    fn orientation(graph: &SceneGraph, target: &NodeRef) -> Orientation {
        graph
            .resolve(target)
            .map(|node| node.transform.rotation)
            .unwrap()
    }

    #[test]
    fn test_one_second_from_rest() {
        let mut o = Orientation::ZERO;
        Spin::default().advance(&mut o, 1.0);
        assert_relative_eq!(o.x, 0.2, epsilon = 1e-6);
        assert_relative_eq!(o.y, 0.1, epsilon = 1e-6);
        assert_eq!(o.z, 0.0);
    }

    #[test]
    fn test_two_half_second_frames() {
        let mut o = Orientation::ZERO;
        let spin = Spin::default();
        spin.advance(&mut o, 0.5);
        spin.advance(&mut o, 0.5);
        assert_relative_eq!(o.x, 0.2, epsilon = 1e-6);
        assert_relative_eq!(o.y, 0.1, epsilon = 1e-6);
    }

    #[test]
    fn test_linear_in_elapsed_time() {
        let spin = Spin::default();
        for (d1, d2) in [(0.016, 0.033), (1.0, 2.5), (0.0, 0.25)] {
            let mut o = Orientation::ZERO;
            spin.advance(&mut o, d1);
            spin.advance(&mut o, d2);
            assert_relative_eq!(o.x, 0.2 * d1 + 0.2 * d2, epsilon = 1e-6);
        }
    }

    #[test]
    fn test_zero_delta_is_identity() {
        let mut o = Orientation::new(1.25, -0.5, 0.3);
        Spin::default().advance(&mut o, 0.0);
        assert_eq!(o, Orientation::new(1.25, -0.5, 0.3));
    }

    #[test]
    fn test_secondary_is_half_primary() {
        let mut o = Orientation::ZERO;
        let spin = Spin::default();
        for delta in [0.016, 0.5, 0.0, 3.0, 0.001] {
            spin.advance(&mut o, delta);
            assert_relative_eq!(o.y, 0.5 * o.x, epsilon = 1e-6);
        }
    }

    #[test]
    fn test_angles_are_not_wrapped() {
        let mut o = Orientation::ZERO;
        Spin::default().advance(&mut o, 100.0);
        assert_relative_eq!(o.x, 20.0, epsilon = 1e-4);
        assert!(o.x > std::f32::consts::TAU);
    }

    #[test]
    fn test_detached_handle_is_skipped() {
        let mut graph = SceneGraph::new();
        let id = graph.insert(Node::mesh("cube", 0, "metal"));
        let target = NodeRef::new();

        assert!(!Spin::default().apply(&target, 1.0, &mut graph));
        let node = graph.get(id).unwrap();
        assert_eq!(node.transform.rotation, Orientation::ZERO);
    }

    #[test]
    fn test_removed_node_is_skipped() {
        let (mut graph, target) = mounted();
        let id = target.get().unwrap();
        graph.remove(id);
        assert!(!Spin::default().apply(&target, 1.0, &mut graph));
    }

    #[test]
    fn test_callback_drives_mounted_node() {
        let frame_loop = FrameLoop::new();
        let (mut graph, target) = mounted();
        let _sub = frame_loop.subscribe(Spin::default().into_callback(target.clone()));

        frame_loop.tick(&frame(0.0), &mut graph);
        frame_loop.tick(&frame(1.0), &mut graph);

        let o = orientation(&graph, &target);
        assert_relative_eq!(o.x, 0.2, epsilon = 1e-6);
        assert_relative_eq!(o.y, 0.1, epsilon = 1e-6);
    }

    #[test]
    fn test_callback_waits_for_mount() {
        let frame_loop = FrameLoop::new();
        let mut graph = SceneGraph::new();
        let target = NodeRef::new();
        let _sub = frame_loop.subscribe(Spin::default().into_callback(target.clone()));

        // Frames before mount are lost, not accumulated
        frame_loop.tick(&frame(5.0), &mut graph);
        target.attach(graph.insert(Node::mesh("cube", 0, "metal")));
        frame_loop.tick(&frame(0.5), &mut graph);

        let o = orientation(&graph, &target);
        assert_relative_eq!(o.x, 0.1, epsilon = 1e-6);
        assert_relative_eq!(o.y, 0.05, epsilon = 1e-6);
    }
}
