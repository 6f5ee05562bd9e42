//! # Primitive Shape Generation
//!
//! Every generator fills positions, normals, texture coordinates and
//! tangents. Front faces wind counter-clockwise.

use super::GeometryData;
use cgmath::{InnerSpace, Vector3};
use std::f32::consts::PI;

/// Pushes one quad centred on `center`, spanning `±u` and `±v`.
///
/// `u × v` must point along the outward normal.
fn push_quad(data: &mut GeometryData, center: Vector3<f32>, u: Vector3<f32>, v: Vector3<f32>) {
    let base = data.vertices.len() as u32;
    let normal = u.cross(v).normalize();
    let tangent = u.normalize();

    let corners = [
        (center - u - v, [0.0, 1.0]),
        (center + u - v, [1.0, 1.0]),
        (center + u + v, [1.0, 0.0]),
        (center - u + v, [0.0, 0.0]),
    ];
    for (position, uv) in corners {
        data.vertices.push(position.into());
        data.normals.push(normal.into());
        data.tex_coords.push(uv);
        data.tangents.push(tangent.into());
    }

    data.indices
        .extend_from_slice(&[base, base + 1, base + 2, base + 2, base + 3, base]);
}

/// Axis-aligned box centred at the origin with the given edge lengths.
pub fn generate_box(size: [f32; 3]) -> GeometryData {
    let mut data = GeometryData::new();
    let h = Vector3::new(size[0], size[1], size[2]) * 0.5;
    let x = Vector3::unit_x();
    let y = Vector3::unit_y();
    let z = Vector3::unit_z();

    // (outward normal scaled to the half extent, u, v) with u × v along the normal
    let faces = [
        (x * h.x, -z * h.z, y * h.y),
        (-x * h.x, z * h.z, y * h.y),
        (y * h.y, x * h.x, -z * h.z),
        (-y * h.y, x * h.x, z * h.z),
        (z * h.z, x * h.x, y * h.y),
        (-z * h.z, -x * h.x, y * h.y),
    ];
    for (center, u, v) in faces {
        push_quad(&mut data, center, u, v);
    }

    data
}

/// Horizontal plane in XZ facing +Y, centred at the origin.
///
/// `uv_repeat` tiles the texture that many times across each axis.
pub fn generate_plane(width: f32, depth: f32, segments: u32, uv_repeat: f32) -> GeometryData {
    let mut data = GeometryData::new();
    let segs = segments.max(1);

    for row in 0..=segs {
        let v = row as f32 / segs as f32;
        for col in 0..=segs {
            let u = col as f32 / segs as f32;
            data.vertices
                .push([(u - 0.5) * width, 0.0, (v - 0.5) * depth]);
            data.normals.push([0.0, 1.0, 0.0]);
            data.tex_coords.push([u * uv_repeat, v * uv_repeat]);
            data.tangents.push([1.0, 0.0, 0.0]);
        }
    }

    for row in 0..segs {
        for col in 0..segs {
            let i = row * (segs + 1) + col;
            let next_row = i + segs + 1;
            data.indices
                .extend_from_slice(&[i, next_row, i + 1, i + 1, next_row, next_row + 1]);
        }
    }

    data
}

/// Elliptical disk in the XY plane facing +Z.
///
/// `radii` are the semi-axes along X and Y. Portal masks are disks.
pub fn generate_disk(slices: u32, radii: [f32; 2]) -> GeometryData {
    let mut data = GeometryData::new();
    let slices = slices.max(3);

    data.vertices.push([0.0, 0.0, 0.0]);
    data.normals.push([0.0, 0.0, 1.0]);
    data.tex_coords.push([0.5, 0.5]);
    data.tangents.push([1.0, 0.0, 0.0]);

    for i in 0..=slices {
        let angle = i as f32 * 2.0 * PI / slices as f32;
        let (sin, cos) = angle.sin_cos();
        data.vertices.push([radii[0] * cos, radii[1] * sin, 0.0]);
        data.normals.push([0.0, 0.0, 1.0]);
        data.tex_coords.push([0.5 + 0.5 * cos, 0.5 - 0.5 * sin]);
        data.tangents.push([1.0, 0.0, 0.0]);
    }

    for i in 1..=slices {
        data.indices.extend_from_slice(&[0, i, i + 1]);
    }

    data
}

/// Torus lying in the XZ plane around the Y axis.
///
/// `stacks` segments run around the ring, `slices` around the tube.
pub fn generate_torus(stacks: u32, slices: u32, thickness: f32, radius: f32) -> GeometryData {
    let mut data = GeometryData::new();
    let stacks = stacks.max(3);
    let slices = slices.max(3);

    for i in 0..=stacks {
        let theta = i as f32 * 2.0 * PI / stacks as f32;
        let (sin_t, cos_t) = theta.sin_cos();
        let ring_dir = Vector3::new(cos_t, 0.0, sin_t);
        let tangent = Vector3::new(-sin_t, 0.0, cos_t);

        for j in 0..=slices {
            let phi = j as f32 * 2.0 * PI / slices as f32;
            let (sin_p, cos_p) = phi.sin_cos();
            let normal = ring_dir * cos_p + Vector3::unit_y() * sin_p;
            let position = ring_dir * radius + normal * thickness;

            data.vertices.push(position.into());
            data.normals.push(normal.into());
            data.tex_coords
                .push([i as f32 / stacks as f32, j as f32 / slices as f32]);
            data.tangents.push(tangent.into());
        }
    }

    let row = slices + 1;
    for i in 0..stacks {
        for j in 0..slices {
            let a = i * row + j;
            let b = a + row;
            data.indices
                .extend_from_slice(&[a, a + 1, b, b, a + 1, b + 1]);
        }
    }

    data
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Every triangle's geometric normal must agree with its vertex normals.
    fn assert_outward_winding(data: &GeometryData) {
        for tri in data.indices.chunks_exact(3) {
            let p = |i: u32| Vector3::from(data.vertices[i as usize]);
            let face = (p(tri[1]) - p(tri[0])).cross(p(tri[2]) - p(tri[0]));
            if face.magnitude2() < 1e-12 {
                continue;
            }
            let n = Vector3::from(data.normals[tri[0] as usize]);
            assert!(face.dot(n) > 0.0, "triangle {tri:?} winds against its normal");
        }
    }

    #[test]
    fn box_has_six_outward_quads() {
        let b = generate_box([2.0, 12.0, 60.0]);
        assert_eq!(b.vertex_count(), 24);
        assert_eq!(b.triangle_count(), 12);
        assert_outward_winding(&b);

        let max_z = b.vertices.iter().map(|v| v[2]).fold(f32::MIN, f32::max);
        let max_y = b.vertices.iter().map(|v| v[1]).fold(f32::MIN, f32::max);
        assert_eq!(max_z, 30.0);
        assert_eq!(max_y, 6.0);
    }

    #[test]
    fn plane_faces_up() {
        let plane = generate_plane(2.0, 2.0, 2, 1.0);
        assert_eq!(plane.vertices.len(), 9);
        assert_eq!(plane.indices.len(), 24);
        assert_outward_winding(&plane);
    }

    #[test]
    fn disk_faces_plus_z() {
        let disk = generate_disk(40, [6.0, 3.0]);
        assert_eq!(disk.vertex_count(), 42);
        assert_eq!(disk.triangle_count(), 40);
        assert_outward_winding(&disk);
        assert!(disk.vertices.iter().all(|v| v[2] == 0.0));
    }

    #[test]
    fn torus_normals_point_away_from_tube_centre() {
        let torus = generate_torus(32, 20, 0.2, 1.2);
        assert_eq!(torus.vertex_count(), 33 * 21);
        assert_outward_winding(&torus);
    }
}
