//! Phong surface materials
//!
//! Materials are small `Copy` values stored on each node and uploaded with
//! the node's per-draw uniforms, so nodes sharing an appearance simply hold
//! equal copies.

/// GPU layout of a material. MUST match `Material` in `common.wgsl`.
#[repr(C)]
#[derive(Copy, Clone, Debug, Default, PartialEq, bytemuck::Pod, bytemuck::Zeroable)]
pub struct MaterialUniform {
    pub emissive: [f32; 4],
    pub ambient: [f32; 4],
    pub diffuse: [f32; 4],
    pub specular: [f32; 4],
    pub shininess: f32,
    pub _padding: [f32; 3],
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Material {
    pub emissive: [f32; 4],
    /// Reflectance of the directional light's ambient term.
    pub ambient: [f32; 4],
    pub diffuse: [f32; 4],
    pub specular: [f32; 4],
    pub shininess: f32,
}

impl Default for Material {
    fn default() -> Self {
        Self::new([0.0, 0.0, 0.0, 1.0], [1.0; 4], [1.0; 4], 25.0)
    }
}

impl Material {
    /// Ambient reflectance defaults to the diffuse colour.
    pub fn new(emissive: [f32; 4], diffuse: [f32; 4], specular: [f32; 4], shininess: f32) -> Self {
        Self {
            emissive,
            ambient: diffuse,
            diffuse,
            specular,
            shininess: shininess.max(1.0),
        }
    }

    pub fn white_plastic() -> Self {
        Self::new([0.0, 0.0, 0.0, 1.0], [1.0; 4], [1.0; 4], 25.0)
    }

    pub fn white_plastic_no_shine() -> Self {
        Self::new([0.0, 0.0, 0.0, 1.0], [1.0; 4], [0.0, 0.0, 0.0, 1.0], 1.0)
    }

    pub fn white_copper() -> Self {
        Self::new([0.0, 0.0, 0.0, 1.0], [1.0; 4], [0.5, 0.75, 0.6, 0.0], 55.0)
    }

    pub fn with_ambient(mut self, ambient: [f32; 4]) -> Self {
        self.ambient = ambient;
        self
    }

    pub fn with_emission(mut self, r: f32, g: f32, b: f32) -> Self {
        self.emissive = [r, g, b, 1.0];
        self
    }

    pub fn to_uniform(&self) -> MaterialUniform {
        MaterialUniform {
            emissive: self.emissive,
            ambient: self.ambient,
            diffuse: self.diffuse,
            specular: self.specular,
            shininess: self.shininess,
            _padding: [0.0; 3],
        }
    }
}
