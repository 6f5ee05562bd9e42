//! Mesh storage: CPU geometry at load time, GPU buffers once a device exists

use std::ops::Range;

use wgpu::util::DeviceExt;

use crate::gfx::geometry::GeometryData;

/// Index into a `MeshLibrary`.
pub type MeshId = usize;

/// Uploaded vertex and index buffers
pub struct Mesh {
    vertex_buffer: wgpu::Buffer,
    index_buffer: wgpu::Buffer,
    index_count: u32,
}

impl Mesh {
    pub fn from_geometry(device: &wgpu::Device, label: &str, geometry: &GeometryData) -> Self {
        let vertices = geometry.to_vertices();

        let vertex_buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some(&format!("{label} Vertex Buffer")),
            contents: bytemuck::cast_slice(&vertices),
            usage: wgpu::BufferUsages::VERTEX,
        });
        let index_buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some(&format!("{label} Index Buffer")),
            contents: bytemuck::cast_slice(&geometry.indices),
            usage: wgpu::BufferUsages::INDEX,
        });

        Self {
            vertex_buffer,
            index_buffer,
            index_count: geometry.indices.len() as u32,
        }
    }

    pub fn index_count(&self) -> u32 {
        self.index_count
    }
}

/// Named geometry registered during scene load, uploaded in one go later.
#[derive(Default)]
pub struct MeshLibrary {
    names: Vec<String>,
    geometry: Vec<GeometryData>,
    gpu: Vec<Mesh>,
}

impl MeshLibrary {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add(&mut self, name: impl Into<String>, geometry: GeometryData) -> MeshId {
        self.names.push(name.into());
        self.geometry.push(geometry);
        self.geometry.len() - 1
    }

    pub fn geometry(&self, id: MeshId) -> &GeometryData {
        &self.geometry[id]
    }

    pub fn name(&self, id: MeshId) -> &str {
        &self.names[id]
    }

    pub fn len(&self) -> usize {
        self.geometry.len()
    }

    pub fn is_empty(&self) -> bool {
        self.geometry.is_empty()
    }

    /// Uploads every mesh not yet on the GPU.
    pub fn upload(&mut self, device: &wgpu::Device) {
        for id in self.gpu.len()..self.geometry.len() {
            let mesh = Mesh::from_geometry(device, &self.names[id], &self.geometry[id]);
            self.gpu.push(mesh);
        }
        log::debug!("{} meshes resident on the GPU", self.gpu.len());
    }

    /// `None` until `upload` has run.
    pub fn gpu(&self, id: MeshId) -> Option<&Mesh> {
        self.gpu.get(id)
    }
}

pub trait DrawMesh {
    fn draw_mesh(&mut self, mesh: &Mesh);
    fn draw_mesh_instanced(&mut self, mesh: &Mesh, instances: Range<u32>);
}

impl DrawMesh for wgpu::RenderPass<'_> {
    fn draw_mesh(&mut self, mesh: &Mesh) {
        self.draw_mesh_instanced(mesh, 0..1);
    }

    fn draw_mesh_instanced(&mut self, mesh: &Mesh, instances: Range<u32>) {
        self.set_vertex_buffer(0, mesh.vertex_buffer.slice(..));
        self.set_index_buffer(mesh.index_buffer.slice(..), wgpu::IndexFormat::Uint32);
        self.draw_indexed(0..mesh.index_count, 0, instances);
    }
}
