//! # Vertex Data Structures
//!
//! GPU vertex format shared by every pipeline. Positions and normals drive
//! lighting and shadows, texture coordinates and tangents drive albedo and
//! normal mapping.

/// A 3D vertex with position, normal, texture coordinate and tangent.
///
/// The `#[repr(C)]` layout is what `desc()` describes to the GPU.
#[repr(C)]
#[derive(Copy, Clone, Debug, Default, PartialEq, bytemuck::Pod, bytemuck::Zeroable)]
pub struct Vertex3D {
    pub position: [f32; 3],
    pub normal: [f32; 3],
    pub tex_coord: [f32; 2],
    /// Object-space tangent; the bitangent is rebuilt in the shader.
    pub tangent: [f32; 3],
}

impl Vertex3D {
    const ATTRIBUTES: [wgpu::VertexAttribute; 4] = wgpu::vertex_attr_array![
        0 => Float32x3,
        1 => Float32x3,
        2 => Float32x2,
        3 => Float32x3,
    ];

    /// Vertex buffer layout:
    /// - location 0: position (Float32x3)
    /// - location 1: normal (Float32x3)
    /// - location 2: tex_coord (Float32x2)
    /// - location 3: tangent (Float32x3)
    pub fn desc() -> wgpu::VertexBufferLayout<'static> {
        wgpu::VertexBufferLayout {
            array_stride: std::mem::size_of::<Vertex3D>() as wgpu::BufferAddress,
            step_mode: wgpu::VertexStepMode::Vertex,
            attributes: &Self::ATTRIBUTES,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn layout_matches_struct() {
        let layout = Vertex3D::desc();
        assert_eq!(layout.array_stride, 44);
        assert_eq!(layout.attributes[2].offset, 24);
        assert_eq!(layout.attributes[3].offset, 32);
    }
}
