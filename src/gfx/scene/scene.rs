use std::collections::HashMap;

use wgpu::Device;

use crate::{
    config::{EnvironmentConfig, SceneConfig},
    gfx::{
        camera::PerspectiveCamera,
        resources::material::{material_bind_group_layout, MaterialManager, StandardMaterial},
    },
    wgpu_utils::{binding_types, BindGroupLayoutBuilder, BindGroupLayoutWithDesc},
};

use super::{
    graph::{NodeId, NodeKind, SceneGraph},
    lights::Lighting,
    mesh::{Mesh, ObjectGpuResources},
};

/// Layouts of the per-draw bind groups (slots 1 and 2)
pub struct SceneLayouts {
    pub transform: BindGroupLayoutWithDesc,
    pub material: BindGroupLayoutWithDesc,
}

impl SceneLayouts {
    pub fn new(device: &Device) -> Self {
        Self {
            transform: BindGroupLayoutBuilder::new()
                .next_binding_vertex(binding_types::uniform())
                .create(device, "Transform Bind Group Layout"),
            material: material_bind_group_layout(device),
        }
    }
}

/// Everything needed to issue one draw call
pub struct DrawItem<'a> {
    pub mesh: &'a Mesh,
    pub material: &'a StandardMaterial,
    pub object: &'a ObjectGpuResources,
}

/// Mesh node that should be drawn this frame
#[derive(Debug, Clone, PartialEq)]
pub struct VisibleMesh {
    pub node: NodeId,
    pub mesh: usize,
    pub material: String,
}

/// Camera, lights, node hierarchy and the resources nodes refer to
pub struct Scene {
    pub camera: PerspectiveCamera,
    pub lighting: Lighting,
    pub graph: SceneGraph,
    pub materials: MaterialManager,
    meshes: Vec<Option<Mesh>>,
    objects: HashMap<NodeId, ObjectGpuResources>,
}

impl Scene {
    pub fn new(config: &SceneConfig, environment: &EnvironmentConfig, aspect: f32) -> Self {
        Self {
            camera: PerspectiveCamera::new(&config.camera, aspect),
            lighting: Lighting::from_config(config, environment),
            graph: SceneGraph::new(),
            materials: MaterialManager::new(),
            meshes: Vec::new(),
            objects: HashMap::new(),
        }
    }

    /// Updates the camera matrices
    pub fn update(&mut self) {
        self.camera.update_view_proj();
    }

    pub fn resize(&mut self, width: u32, height: u32) {
        self.camera.resize_projection(width, height);
    }

    /// Stores a mesh and returns the index mesh nodes refer to it by
    pub fn add_mesh(&mut self, mesh: Mesh) -> usize {
        if let Some(index) = self.meshes.iter().position(Option::is_none) {
            self.meshes[index] = Some(mesh);
            return index;
        }
        self.meshes.push(Some(mesh));
        self.meshes.len() - 1
    }

    /// Frees a mesh slot; nodes still pointing at it are skipped when drawing
    pub fn remove_mesh(&mut self, index: usize) -> Option<Mesh> {
        self.meshes.get_mut(index).and_then(Option::take)
    }

    pub fn mesh(&self, index: usize) -> Option<&Mesh> {
        self.meshes.get(index).and_then(Option::as_ref)
    }

    pub fn mesh_count(&self) -> usize {
        self.meshes.iter().flatten().count()
    }

    /// Visible mesh nodes whose mesh still exists
    pub fn visible_meshes(&self) -> Vec<VisibleMesh> {
        self.graph
            .iter()
            .filter_map(|(id, node)| match &node.kind {
                NodeKind::Mesh { mesh, material } => Some(VisibleMesh {
                    node: id,
                    mesh: *mesh,
                    material: material.clone(),
                }),
                NodeKind::Group => None,
            })
            .filter(|item| self.mesh(item.mesh).is_some() && self.graph.is_visible(item.node))
            .collect()
    }

    /// Uploads new meshes and materials, creates transform buffers for new
    /// mesh nodes, drops buffers of removed nodes and writes world matrices
    ///
    /// Call once per frame after the frame callbacks ran.
    pub fn sync_gpu(&mut self, device: &Device, queue: &wgpu::Queue, layouts: &SceneLayouts) {
        for mesh in self.meshes.iter_mut().flatten() {
            mesh.upload(device);
        }

        self.materials
            .update_all_gpu_resources(device, queue, &layouts.material);

        let graph = &self.graph;
        self.objects.retain(|id, _| graph.get(*id).is_some());

        for (id, node) in self.graph.iter() {
            if !matches!(node.kind, NodeKind::Mesh { .. }) {
                continue;
            }
            let Some(world) = self.graph.world_matrix(id) else {
                continue;
            };
            let object = self.objects.entry(id).or_insert_with(|| {
                log::debug!("Creating GPU resources for node '{}'", node.name);
                ObjectGpuResources::new(device, &layouts.transform.layout, &node.name)
            });
            object.write_transform(queue, world);
        }
    }

    /// Draw calls for this frame, in graph order
    pub fn draw_items(&self) -> Vec<DrawItem<'_>> {
        self.visible_meshes()
            .into_iter()
            .filter_map(|item| {
                let mesh = self.mesh(item.mesh)?;
                let object = self.objects.get(&item.node)?;
                Some(DrawItem {
                    mesh,
                    material: self.materials.get_material_or_default(&item.material),
                    object,
                })
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::gfx::{geometry::generate_cube, scene::graph::Node};

    fn scene() -> Scene {
        Scene::new(&SceneConfig::default(), &EnvironmentConfig::default(), 1.5)
    }

    #[test]
    fn test_mesh_slots_are_reused() {
        let mut scene = scene();
        let a = scene.add_mesh(Mesh::from_geometry("a", &generate_cube()));
        let b = scene.add_mesh(Mesh::from_geometry("b", &generate_cube()));
        assert_eq!((a, b), (0, 1));

        assert!(scene.remove_mesh(a).is_some());
        assert!(scene.remove_mesh(a).is_none());
        assert_eq!(scene.mesh_count(), 1);

        let c = scene.add_mesh(Mesh::from_geometry("c", &generate_cube()));
        assert_eq!(c, a);
        assert_eq!(scene.mesh(c).map(|m| m.name.as_str()), Some("c"));
    }

    #[test]
    fn test_visible_meshes_skip_groups_hidden_and_missing() {
        let mut scene = scene();
        let mesh = scene.add_mesh(Mesh::from_geometry("cube", &generate_cube()));

        let group = scene.graph.insert(Node::group("float"));
        let cube = scene
            .graph
            .insert(Node::mesh("cube", mesh, "metal").with_parent(group));
        let hidden = scene.graph.insert(Node::mesh("hidden", mesh, "metal"));
        scene.graph.insert(Node::mesh("dangling", 42, "metal"));
        if let Some(node) = scene.graph.get_mut(hidden) {
            node.visible = false;
        }

        let visible = scene.visible_meshes();
        assert_eq!(visible.len(), 1);
        assert_eq!(visible[0].node, cube);
        assert_eq!(visible[0].material, "metal");
    }

    #[test]
    fn test_nothing_to_draw_before_gpu_sync() {
        let mut scene = scene();
        let mesh = scene.add_mesh(Mesh::from_geometry("cube", &generate_cube()));
        scene.graph.insert(Node::mesh("cube", mesh, "metal"));
        assert!(scene.draw_items().is_empty());
    }

    #[test]
    fn test_resize_updates_aspect() {
        let mut scene = scene();
        scene.resize(800, 400);
        scene.update();
        assert_eq!(scene.camera.aspect, 2.0);
    }
}
