//! The displayed scene: a spinning metallic cube inside a floating group
//!
//! Frame callbacks are registered up front and hold [`NodeRef`]s that stay
//! detached until [`Showcase::mount`] inserts the nodes. Frames that arrive
//! before that simply skip the update.

use cgmath::Vector3;

use crate::animation::{FloatMotion, FrameLoop, Spin, Subscription};
use crate::config::{CubeConfig, SceneConfig};
use crate::gfx::geometry::generate_box;
use crate::gfx::resources::StandardMaterial;
use crate::gfx::scene::{Mesh, Node, NodeRef, Scene, Transform};

const CUBE_MATERIAL: &str = "showcase-cube";

pub struct Showcase {
    cube_config: CubeConfig,
    float_group: NodeRef,
    cube: NodeRef,
    mesh: Option<usize>,
    _subscriptions: Vec<Subscription>,
}

impl Showcase {
    /// Registers the float and spin callbacks; no nodes exist yet
    pub fn new(config: &SceneConfig, frame_loop: &FrameLoop) -> Self {
        let float_group = NodeRef::new();
        let cube = NodeRef::new();

        let float = FloatMotion::with_random_offset(config.float);
        let spin = Spin::from(config.spin);
        let subscriptions = vec![
            frame_loop.subscribe(float.into_callback(float_group.clone())),
            frame_loop.subscribe(spin.into_callback(cube.clone())),
        ];
        log::debug!("Float offset {:.1}", float.offset());

        Self {
            cube_config: config.cube,
            float_group,
            cube,
            mesh: None,
            _subscriptions: subscriptions,
        }
    }

    pub fn is_mounted(&self) -> bool {
        self.float_group.is_attached() && self.cube.is_attached()
    }

    /// Handle of the cube mesh node
    pub fn cube(&self) -> &NodeRef {
        &self.cube
    }

    /// Handle of the group carrying the float motion
    pub fn float_group(&self) -> &NodeRef {
        &self.float_group
    }

    /// Inserts the float group and the cube with a fresh zero orientation
    ///
    /// GPU resources are created by the next [`Scene::sync_gpu`].
    pub fn mount(&mut self, scene: &mut Scene) {
        if self.is_mounted() {
            log::debug!("Showcase already mounted");
            return;
        }

        let c = &self.cube_config;
        let mesh = scene.add_mesh(Mesh::from_geometry(
            "showcase-cube",
            &generate_box(c.size.x, c.size.y, c.size.z),
        ));
        scene.materials.add_material(StandardMaterial::new(
            CUBE_MATERIAL,
            c.color,
            c.metalness,
            c.roughness,
        ));

        let group = scene.graph.insert(Node::group("float"));
        let cube = scene.graph.insert(
            Node::mesh("cube", mesh, CUBE_MATERIAL)
                .with_transform(Transform {
                    scale: Vector3::new(c.scale, c.scale, c.scale),
                    ..Default::default()
                })
                .with_parent(group),
        );

        self.mesh = Some(mesh);
        self.float_group.attach(group);
        self.cube.attach(cube);
        log::info!("Showcase mounted");
    }

    /// Removes the nodes and their resources; the spin state is discarded
    pub fn unmount(&mut self, scene: &mut Scene) {
        self.cube.detach();
        if let Some(group) = self.float_group.detach() {
            scene.graph.remove(group);
        }
        if let Some(mesh) = self.mesh.take() {
            scene.remove_mesh(mesh);
        }
        scene.materials.remove_material(CUBE_MATERIAL);
        log::info!("Showcase unmounted");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::animation::FrameState;
    use crate::config::EnvironmentConfig;
    use crate::gfx::scene::{NodeKind, Orientation};
    use approx::assert_relative_eq;

    fn scene() -> Scene {
        Scene::new(&SceneConfig::default(), &EnvironmentConfig::default(), 1.0)
    }

    fn frame(delta: f32, elapsed: f32) -> FrameState {
        FrameState {
            delta,
            elapsed,
            frame: 0,
        }
    }

    fn cube_rotation(showcase: &Showcase, scene: &Scene) -> Option<Orientation> {
        scene
            .graph
            .resolve(showcase.cube())
            .map(|n| n.transform.rotation)
    }

    #[test]
    fn test_new_registers_callbacks_without_nodes() {
        let frame_loop = FrameLoop::new();
        let showcase = Showcase::new(&SceneConfig::default(), &frame_loop);
        assert_eq!(frame_loop.len(), 2);
        assert!(!showcase.is_mounted());
    }

    #[test]
    fn test_frames_before_mount_are_skipped() {
        let frame_loop = FrameLoop::new();
        let mut scene = scene();
        let mut showcase = Showcase::new(&SceneConfig::default(), &frame_loop);

        frame_loop.tick(&frame(0.0, 0.0), &mut scene.graph);
        frame_loop.tick(&frame(2.0, 2.0), &mut scene.graph);
        assert!(scene.graph.is_empty());

        showcase.mount(&mut scene);
        assert_eq!(cube_rotation(&showcase, &scene), Some(Orientation::ZERO));
    }

    #[test]
    fn test_mount_builds_the_cube() {
        let frame_loop = FrameLoop::new();
        let mut scene = scene();
        let mut showcase = Showcase::new(&SceneConfig::default(), &frame_loop);
        showcase.mount(&mut scene);

        assert!(showcase.is_mounted());
        assert_eq!(scene.graph.len(), 2);
        assert_eq!(scene.mesh_count(), 1);

        let group = showcase.float_group().get().unwrap();
        let cube = scene.graph.resolve(showcase.cube()).unwrap();
        assert_eq!(cube.parent(), Some(group));
        assert_eq!(cube.transform.scale, Vector3::new(2.0, 2.0, 2.0));
        let NodeKind::Mesh { material, .. } = &cube.kind else {
            panic!("cube should be a mesh node");
        };

        let material = scene.materials.get_material(material).unwrap();
        assert_eq!(material.color, [1.0, 1.0, 1.0, 1.0]);
        assert_eq!(material.metalness, 0.5);
        assert_eq!(material.roughness, 0.2);
    }

    #[test]
    fn test_mounted_cube_spins() {
        let frame_loop = FrameLoop::new();
        let mut scene = scene();
        let mut showcase = Showcase::new(&SceneConfig::default(), &frame_loop);
        showcase.mount(&mut scene);

        frame_loop.tick(&frame(0.5, 0.5), &mut scene.graph);
        frame_loop.tick(&frame(0.5, 1.0), &mut scene.graph);

        let rotation = cube_rotation(&showcase, &scene).unwrap();
        assert_relative_eq!(rotation.x, 0.2, epsilon = 1e-6);
        assert_relative_eq!(rotation.y, 0.1, epsilon = 1e-6);

        // The float group moves on its own, the cube's local transform only spins
        let group = scene.graph.resolve(showcase.float_group()).unwrap();
        assert!(!group.transform.is_identity());
    }

    #[test]
    fn test_mount_twice_is_noop() {
        let frame_loop = FrameLoop::new();
        let mut scene = scene();
        let mut showcase = Showcase::new(&SceneConfig::default(), &frame_loop);
        showcase.mount(&mut scene);
        showcase.mount(&mut scene);
        assert_eq!(scene.graph.len(), 2);
        assert_eq!(scene.mesh_count(), 1);
    }

    #[test]
    fn test_unmount_discards_orientation() {
        let frame_loop = FrameLoop::new();
        let mut scene = scene();
        let mut showcase = Showcase::new(&SceneConfig::default(), &frame_loop);
        showcase.mount(&mut scene);
        frame_loop.tick(&frame(1.0, 1.0), &mut scene.graph);

        showcase.unmount(&mut scene);
        assert!(!showcase.is_mounted());
        assert!(scene.graph.is_empty());
        assert_eq!(scene.mesh_count(), 0);
        assert!(scene.materials.get_material(CUBE_MATERIAL).is_none());

        // Still subscribed, but nothing to update
        frame_loop.tick(&frame(1.0, 2.0), &mut scene.graph);

        showcase.mount(&mut scene);
        assert_eq!(cube_rotation(&showcase, &scene), Some(Orientation::ZERO));
    }

    #[test]
    fn test_drop_unsubscribes() {
        let frame_loop = FrameLoop::new();
        let showcase = Showcase::new(&SceneConfig::default(), &frame_loop);
        assert_eq!(frame_loop.len(), 2);
        drop(showcase);
        assert!(frame_loop.is_empty());
    }
}
