//! Mesh data and per-object GPU resources
//!
//! A [`Mesh`] owns its CPU-side vertices plus, once uploaded, the vertex and
//! index buffers. Per-object transforms are separate ([`ObjectGpuResources`])
//! so several mesh nodes can share one mesh.

use std::ops::Range;

use cgmath::Matrix4;
use wgpu::{util::DeviceExt, Device};

use super::vertex::Vertex3D;
use crate::gfx::geometry::GeometryData;

pub struct Mesh {
    pub name: String,
    vertices: Vec<Vertex3D>,
    indices: Vec<u32>,
    vertex_buffer: Option<wgpu::Buffer>,
    index_buffer: Option<wgpu::Buffer>,
    index_count: u32,
}

impl Mesh {
    pub fn new(name: &str, vertices: Vec<Vertex3D>, indices: Vec<u32>) -> Self {
        let index_count = indices.len() as u32;
        Self {
            name: name.to_string(),
            vertices,
            indices,
            vertex_buffer: None,
            index_buffer: None,
            index_count,
        }
    }

    pub fn from_geometry(name: &str, geometry: &GeometryData) -> Self {
        let (vertices, indices) = geometry.to_scene_format();
        Self::new(name, vertices, indices)
    }

    pub fn vertex_count(&self) -> u32 {
        self.vertices.len() as u32
    }

    pub fn index_count(&self) -> u32 {
        self.index_count
    }

    pub fn is_uploaded(&self) -> bool {
        self.vertex_buffer.is_some() && self.index_buffer.is_some()
    }

    /// Creates the vertex and index buffers if they don't exist yet
    pub fn upload(&mut self, device: &Device) {
        if self.is_uploaded() {
            return;
        }

        self.vertex_buffer = Some(device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some(&format!("{} Vertex Buffer", self.name)),
            contents: bytemuck::cast_slice(&self.vertices),
            usage: wgpu::BufferUsages::VERTEX,
        }));

        self.index_buffer = Some(device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some(&format!("{} Index Buffer", self.name)),
            contents: bytemuck::cast_slice(&self.indices),
            usage: wgpu::BufferUsages::INDEX,
        }));

        log::debug!(
            "Uploaded mesh '{}': {} vertices, {} triangles",
            self.name,
            self.vertices.len(),
            self.index_count / 3
        );
    }
}

/// Transform uniform buffer and bind group of one mesh node
pub struct ObjectGpuResources {
    pub transform_buffer: wgpu::Buffer,
    pub transform_bind_group: wgpu::BindGroup,
}

impl ObjectGpuResources {
    pub fn new(device: &Device, layout: &wgpu::BindGroupLayout, label: &str) -> Self {
        let initial: [[f32; 4]; 4] = Matrix4::from_scale(1.0f32).into();

        let transform_buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some(&format!("{} Transform Buffer", label)),
            contents: bytemuck::cast_slice(&initial),
            usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
        });

        let transform_bind_group = device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some(&format!("{} Transform Bind Group", label)),
            layout,
            entries: &[wgpu::BindGroupEntry {
                binding: 0,
                resource: transform_buffer.as_entire_binding(),
            }],
        });

        Self {
            transform_buffer,
            transform_bind_group,
        }
    }

    /// Writes a world matrix; cgmath is column-major like WGSL
    pub fn write_transform(&self, queue: &wgpu::Queue, world: Matrix4<f32>) {
        let data: [[f32; 4]; 4] = world.into();
        queue.write_buffer(&self.transform_buffer, 0, bytemuck::cast_slice(&data));
    }
}

pub trait DrawMesh<'a> {
    fn draw_mesh(&mut self, mesh: &'a Mesh);
    fn draw_mesh_instanced(&mut self, mesh: &'a Mesh, instances: Range<u32>);
}

impl<'a, 'b> DrawMesh<'b> for wgpu::RenderPass<'a>
where
    'b: 'a,
{
    fn draw_mesh(&mut self, mesh: &'b Mesh) {
        self.draw_mesh_instanced(mesh, 0..1);
    }

    fn draw_mesh_instanced(&mut self, mesh: &'b Mesh, instances: Range<u32>) {
        let (Some(vertex_buffer), Some(index_buffer)) = (&mesh.vertex_buffer, &mesh.index_buffer)
        else {
            // Not uploaded yet
            return;
        };

        self.set_vertex_buffer(0, vertex_buffer.slice(..));
        self.set_index_buffer(index_buffer.slice(..), wgpu::IndexFormat::Uint32);
        self.draw_indexed(0..mesh.index_count, 0, instances);
    }
}
