//! # Procedural Geometry Generation
//!
//! Primitive shapes for the scene (plane, box, disk, torus) and OBJ import.
//! All primitives are Y-up with counter-clockwise front faces.
//!
//! ```no_run
//! use rift::gfx::geometry::{generate_box, generate_disk};
//!
//! let wall = generate_box([2.0, 12.0, 60.0]);
//! let portal_mask = generate_disk(40, [6.0, 3.0]);
//! ```

pub mod obj;
pub mod primitives;

pub use obj::load_obj;
pub use primitives::*;

use cgmath::{InnerSpace, Vector2, Vector3};

use crate::gfx::scene::vertex::Vertex3D;

/// Represents generated geometry data ready for GPU upload
#[derive(Debug, Clone, Default)]
pub struct GeometryData {
    pub vertices: Vec<[f32; 3]>,
    pub tex_coords: Vec<[f32; 2]>,
    pub normals: Vec<[f32; 3]>,
    /// Empty until `compute_tangents` runs or a generator fills them.
    pub tangents: Vec<[f32; 3]>,
    /// Triangle indices (counter-clockwise winding)
    pub indices: Vec<u32>,
}

impl GeometryData {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn vertex_count(&self) -> usize {
        self.vertices.len()
    }

    pub fn triangle_count(&self) -> usize {
        self.indices.len() / 3
    }

    /// Per-vertex tangents from UV derivatives, orthogonalised against the normal.
    ///
    /// Triangles with degenerate UVs contribute nothing; vertices left without
    /// a tangent get any vector perpendicular to their normal.
    pub fn compute_tangents(&mut self) {
        let mut accum = vec![Vector3::new(0.0f32, 0.0, 0.0); self.vertices.len()];

        for tri in self.indices.chunks_exact(3) {
            let [i0, i1, i2] = [tri[0] as usize, tri[1] as usize, tri[2] as usize];
            let p0 = Vector3::from(self.vertices[i0]);
            let e1 = Vector3::from(self.vertices[i1]) - p0;
            let e2 = Vector3::from(self.vertices[i2]) - p0;

            let uv = |i: usize| {
                self.tex_coords
                    .get(i)
                    .map(|t| Vector2::from(*t))
                    .unwrap_or(Vector2::new(0.0, 0.0))
            };
            let duv1 = uv(i1) - uv(i0);
            let duv2 = uv(i2) - uv(i0);

            let det = duv1.x * duv2.y - duv2.x * duv1.y;
            if det.abs() < 1e-8 {
                continue;
            }
            let tangent = (e1 * duv2.y - e2 * duv1.y) / det;
            for i in [i0, i1, i2] {
                accum[i] += tangent;
            }
        }

        self.tangents = accum
            .into_iter()
            .enumerate()
            .map(|(i, t)| {
                let n = self
                    .normals
                    .get(i)
                    .map(|n| Vector3::from(*n))
                    .unwrap_or(Vector3::unit_y());
                let t = t - n * n.dot(t);
                if t.magnitude2() > 1e-12 {
                    t.normalize().into()
                } else {
                    any_perpendicular(n).into()
                }
            })
            .collect();
    }

    /// Interleaves the attribute streams into GPU vertices.
    pub fn to_vertices(&self) -> Vec<Vertex3D> {
        (0..self.vertices.len())
            .map(|i| Vertex3D {
                position: self.vertices[i],
                normal: self.normals.get(i).copied().unwrap_or([0.0, 1.0, 0.0]),
                tex_coord: self.tex_coords.get(i).copied().unwrap_or([0.0, 0.0]),
                tangent: self.tangents.get(i).copied().unwrap_or([1.0, 0.0, 0.0]),
            })
            .collect()
    }
}

fn any_perpendicular(n: Vector3<f32>) -> Vector3<f32> {
    let axis = if n.x.abs() < 0.9 {
        Vector3::unit_x()
    } else {
        Vector3::unit_y()
    };
    (axis - n * n.dot(axis)).normalize()
}
