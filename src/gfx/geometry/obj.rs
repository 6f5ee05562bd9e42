//! OBJ import through `tobj`
//!
//! All models in the file are merged into one `GeometryData`. Missing normals
//! are rebuilt from face normals; tangents are always computed.

use std::path::Path;

use cgmath::{InnerSpace, Vector3};

use super::GeometryData;
use crate::error::AssetError;

pub fn load_obj(path: &Path) -> Result<GeometryData, AssetError> {
    let (models, _materials) = tobj::load_obj(
        path,
        &tobj::LoadOptions {
            triangulate: true,
            single_index: true,
            ..Default::default()
        },
    )
    .map_err(|source| AssetError::Obj {
        path: path.to_path_buf(),
        source,
    })?;

    let mut data = GeometryData::new();
    for model in &models {
        let mesh = &model.mesh;
        let base = data.vertices.len() as u32;
        let count = mesh.positions.len() / 3;

        data.vertices
            .extend(mesh.positions.chunks_exact(3).map(|p| [p[0], p[1], p[2]]));

        if mesh.texcoords.len() == count * 2 {
            // OBJ v runs bottom-up, wgpu textures top-down
            data.tex_coords
                .extend(mesh.texcoords.chunks_exact(2).map(|t| [t[0], 1.0 - t[1]]));
        } else {
            data.tex_coords.extend(std::iter::repeat([0.0, 0.0]).take(count));
        }

        if mesh.normals.len() == mesh.positions.len() {
            data.normals
                .extend(mesh.normals.chunks_exact(3).map(|n| [n[0], n[1], n[2]]));
        } else {
            log::debug!("'{}' has no normals, computing face normals", model.name);
            data.normals
                .extend(face_normals(&mesh.positions, &mesh.indices));
        }

        data.indices.extend(mesh.indices.iter().map(|i| i + base));
    }

    if data.indices.is_empty() {
        return Err(AssetError::EmptyMesh(path.to_path_buf()));
    }

    data.compute_tangents();
    log::info!(
        "loaded '{}': {} vertices, {} triangles",
        path.display(),
        data.vertex_count(),
        data.triangle_count()
    );
    Ok(data)
}

/// Area-weighted vertex normals accumulated from the triangles touching each vertex.
pub fn face_normals(positions: &[f32], indices: &[u32]) -> Vec<[f32; 3]> {
    let vertex = |i: u32| {
        let i = i as usize * 3;
        Vector3::new(positions[i], positions[i + 1], positions[i + 2])
    };

    let mut normals = vec![Vector3::new(0.0f32, 0.0, 0.0); positions.len() / 3];
    for tri in indices.chunks_exact(3) {
        let v0 = vertex(tri[0]);
        let face = (vertex(tri[1]) - v0).cross(vertex(tri[2]) - v0);
        for &i in tri {
            normals[i as usize] += face;
        }
    }

    normals
        .into_iter()
        .map(|n| {
            if n.magnitude2() > 0.0 {
                n.normalize().into()
            } else {
                [0.0, 1.0, 0.0]
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn face_normals_of_ccw_triangle_point_up() {
        let positions = [0.0, 0.0, 0.0, 0.0, 0.0, 1.0, 1.0, 0.0, 0.0];
        let normals = face_normals(&positions, &[0, 1, 2]);
        for n in normals {
            assert_eq!(n, [0.0, 1.0, 0.0]);
        }
    }

    #[test]
    fn missing_file_is_reported_with_path() {
        let err = load_obj(Path::new("does/not/exist.obj")).unwrap_err();
        assert!(matches!(err, AssetError::Obj { .. }));
        assert!(err.to_string().contains("exist.obj"));
    }
}
