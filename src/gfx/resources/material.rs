//! Metallic-roughness materials
//!
//! Materials are stored in a [`MaterialManager`] and mesh nodes reference
//! them by name. All materials share one bind group layout (slot 2).

use std::collections::HashMap;
use wgpu::Device;

use crate::wgpu_utils::{
    binding_builder::{BindGroupBuilder, BindGroupLayoutBuilder, BindGroupLayoutWithDesc},
    binding_types,
    uniform_buffer::UniformBuffer,
};

pub type MaterialId = String;

/// GPU uniform data, matches `Material` in standard.wgsl
#[repr(C)]
#[derive(Copy, Clone, Debug, PartialEq, bytemuck::Pod, bytemuck::Zeroable)]
pub struct MaterialUniform {
    pub base_color: [f32; 4],
    pub metalness: f32,
    pub roughness: f32,
    _padding: [f32; 2],
}

type MaterialUBO = UniformBuffer<MaterialUniform>;

/// Layout shared by every material bind group
pub fn material_bind_group_layout(device: &Device) -> BindGroupLayoutWithDesc {
    BindGroupLayoutBuilder::new()
        .next_binding_fragment(binding_types::uniform())
        .create(device, "Material Bind Group Layout")
}

struct MaterialGpu {
    ubo: MaterialUBO,
    bind_group: wgpu::BindGroup,
}

/// Physically based surface description
pub struct StandardMaterial {
    pub name: String,
    pub color: [f32; 4],
    /// 0 dielectric, 1 metal
    pub metalness: f32,
    /// 0 mirror, 1 fully diffuse
    pub roughness: f32,
    gpu: Option<MaterialGpu>,
}

impl Default for StandardMaterial {
    fn default() -> Self {
        Self::new("default", [0.8, 0.8, 0.8, 1.0], 0.0, 0.5)
    }
}

impl std::fmt::Debug for StandardMaterial {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("StandardMaterial")
            .field("name", &self.name)
            .field("color", &self.color)
            .field("metalness", &self.metalness)
            .field("roughness", &self.roughness)
            .field("uploaded", &self.gpu.is_some())
            .finish()
    }
}

impl StandardMaterial {
    pub fn new(name: &str, color: [f32; 4], metalness: f32, roughness: f32) -> Self {
        Self {
            name: name.to_string(),
            color,
            metalness: metalness.clamp(0.0, 1.0),
            roughness: roughness.clamp(0.0, 1.0),
            gpu: None,
        }
    }

    pub fn uniform(&self) -> MaterialUniform {
        MaterialUniform {
            base_color: self.color,
            metalness: self.metalness,
            roughness: self.roughness,
            _padding: [0.0; 2],
        }
    }

    /// Creates GPU resources on first call, then syncs the uniform block
    pub fn update_gpu_resources(
        &mut self,
        device: &Device,
        queue: &wgpu::Queue,
        layout: &BindGroupLayoutWithDesc,
    ) {
        let uniform = self.uniform();
        let gpu = self.gpu.get_or_insert_with(|| {
            let ubo = MaterialUBO::new(device);
            let bind_group = BindGroupBuilder::new(layout)
                .resource(ubo.binding_resource())
                .create(device, "Material Bind Group");
            MaterialGpu { ubo, bind_group }
        });
        gpu.ubo.update_content(queue, uniform);
    }

    pub fn bind_group(&self) -> Option<&wgpu::BindGroup> {
        self.gpu.as_ref().map(|gpu| &gpu.bind_group)
    }
}

/// Named material library with a default fallback
pub struct MaterialManager {
    default_material: StandardMaterial,
    materials: HashMap<MaterialId, StandardMaterial>,
}

impl Default for MaterialManager {
    fn default() -> Self {
        Self::new()
    }
}

impl MaterialManager {
    pub fn new() -> Self {
        Self {
            default_material: StandardMaterial::default(),
            materials: HashMap::new(),
        }
    }

    /// Adds or replaces a material under its own name
    pub fn add_material(&mut self, material: StandardMaterial) {
        if material.name == self.default_material.name {
            self.default_material = material;
        } else {
            self.materials.insert(material.name.clone(), material);
        }
    }

    /// Removes a material; the default material cannot be removed
    pub fn remove_material(&mut self, id: &str) -> Option<StandardMaterial> {
        self.materials.remove(id)
    }

    pub fn get_material(&self, id: &str) -> Option<&StandardMaterial> {
        if id == self.default_material.name {
            return Some(&self.default_material);
        }
        self.materials.get(id)
    }

    pub fn get_material_mut(&mut self, id: &str) -> Option<&mut StandardMaterial> {
        if id == self.default_material.name {
            return Some(&mut self.default_material);
        }
        self.materials.get_mut(id)
    }

    /// Looks up a material, falling back to the default one
    pub fn get_material_or_default(&self, id: &str) -> &StandardMaterial {
        self.get_material(id).unwrap_or(&self.default_material)
    }

    /// Number of materials including the default
    pub fn count(&self) -> usize {
        self.materials.len() + 1
    }

    pub fn update_all_gpu_resources(
        &mut self,
        device: &Device,
        queue: &wgpu::Queue,
        layout: &BindGroupLayoutWithDesc,
    ) {
        self.default_material.update_gpu_resources(device, queue, layout);
        for material in self.materials.values_mut() {
            material.update_gpu_resources(device, queue, layout);
        }
    }
}
