//! Global uniform bindings for camera, lights and environment
//!
//! Group 0 carries the per-frame uniform block shared by every draw and
//! group 3 the environment cube map used for image-based lighting.

use crate::{
    gfx::{
        camera::camera_utils::CameraUniform,
        resources::texture_resource::TextureResource,
        scene::lights::Lighting,
    },
    wgpu_utils::{
        binding_builder::{BindGroupBuilder, BindGroupLayoutBuilder, BindGroupLayoutWithDesc},
        binding_types,
        uniform_buffer::UniformBuffer,
    },
};

/// Global uniform buffer content
///
/// MUST match the `Globals` struct in standard.wgsl exactly. Every field is a
/// vec4 so the layout has no implicit padding.
#[repr(C)]
#[derive(Copy, Clone, Debug, PartialEq, bytemuck::Pod, bytemuck::Zeroable)]
pub struct GlobalUBOContent {
    view_position: [f32; 4],
    view_proj: [[f32; 4]; 4],
    /// rgb premultiplied by intensity
    ambient: [f32; 4],
    /// xyz toward the light
    light_direction: [f32; 4],
    /// rgb color, w intensity
    light_color: [f32; 4],
    /// x intensity, y highest mip level
    environment: [f32; 4],
}

impl GlobalUBOContent {
    pub fn new(camera: CameraUniform, lighting: &Lighting, environment_max_lod: f32) -> Self {
        let ambient = lighting.ambient.radiance();
        let direction = lighting.directional.direction();
        let light = lighting.directional;

        Self {
            view_position: camera.view_position,
            view_proj: camera.view_proj,
            ambient: [ambient[0], ambient[1], ambient[2], 1.0],
            light_direction: [direction.x, direction.y, direction.z, 0.0],
            light_color: [light.color[0], light.color[1], light.color[2], light.intensity],
            environment: [lighting.environment_intensity, environment_max_lod, 0.0, 0.0],
        }
    }
}

pub type GlobalUBO = UniformBuffer<GlobalUBOContent>;

/// Writes this frame's camera and lighting into the global uniform buffer
pub fn update_global_ubo(
    ubo: &mut GlobalUBO,
    queue: &wgpu::Queue,
    camera: CameraUniform,
    lighting: &Lighting,
    environment_max_lod: f32,
) {
    ubo.update_content(
        queue,
        GlobalUBOContent::new(camera, lighting, environment_max_lod),
    );
}

/// Bind group layout and bind group for the global uniforms (slot 0)
pub struct GlobalBindings {
    bind_group_layout: BindGroupLayoutWithDesc,
    bind_group: Option<wgpu::BindGroup>,
}

impl GlobalBindings {
    pub fn new(device: &wgpu::Device) -> Self {
        let bind_group_layout = BindGroupLayoutBuilder::new()
            .next_binding_rendering(binding_types::uniform())
            .create(device, "Globals Bind Group Layout");

        GlobalBindings {
            bind_group_layout,
            bind_group: None,
        }
    }

    pub fn create_bind_group(&mut self, device: &wgpu::Device, ubo: &GlobalUBO) {
        self.bind_group = Some(
            BindGroupBuilder::new(&self.bind_group_layout)
                .resource(ubo.binding_resource())
                .create(device, "Global Bind Group"),
        );
    }

    pub fn bind_group_layout(&self) -> &wgpu::BindGroupLayout {
        &self.bind_group_layout.layout
    }

    /// `None` until [`create_bind_group`](Self::create_bind_group) ran
    pub fn bind_group(&self) -> Option<&wgpu::BindGroup> {
        self.bind_group.as_ref()
    }
}

/// Environment cube map and sampler bound at slot 3
pub struct EnvironmentBindings {
    bind_group_layout: BindGroupLayoutWithDesc,
    bind_group: Option<wgpu::BindGroup>,
    texture: Option<TextureResource>,
    max_lod: f32,
}

impl EnvironmentBindings {
    pub fn new(device: &wgpu::Device) -> Self {
        let bind_group_layout = BindGroupLayoutBuilder::new()
            .next_binding_fragment(binding_types::texture_cube())
            .next_binding_fragment(binding_types::sampler(
                wgpu::SamplerBindingType::Filtering,
            ))
            .create(device, "Environment Bind Group Layout");

        Self {
            bind_group_layout,
            bind_group: None,
            texture: None,
            max_lod: 0.0,
        }
    }

    /// Replaces the bound cube map
    pub fn set_environment(&mut self, device: &wgpu::Device, texture: TextureResource, max_lod: f32) {
        self.bind_group = Some(
            BindGroupBuilder::new(&self.bind_group_layout)
                .texture(&texture.view)
                .sampler(&texture.sampler)
                .create(device, "Environment Bind Group"),
        );
        self.texture = Some(texture);
        self.max_lod = max_lod;
    }

    pub fn bind_group_layout(&self) -> &wgpu::BindGroupLayout {
        &self.bind_group_layout.layout
    }

    pub fn bind_group(&self) -> Option<&wgpu::BindGroup> {
        self.bind_group.as_ref()
    }

    pub fn max_lod(&self) -> f32 {
        self.max_lod
    }

    pub fn is_loaded(&self) -> bool {
        self.texture.is_some()
    }
}
