// src/gfx/math.rs
//! Small matrix helpers shared by the scene graph, cameras and passes

use cgmath::{InnerSpace, Matrix, Matrix3, Matrix4, Point3, SquareMatrix, Vector3, Vector4};

/// Converts OpenGL clip space (z in [-1, 1]) to wgpu clip space (z in [0, 1]).
#[rustfmt::skip]
pub const OPENGL_TO_WGPU_MATRIX: Matrix4<f32> = Matrix4::new(
    1.0, 0.0, 0.0, 0.0,
    0.0, 1.0, 0.0, 0.0,
    0.0, 0.0, 0.5, 0.0,
    0.0, 0.0, 0.5, 1.0,
);

/// Linear (rotation/scale) part of an affine transform.
pub fn upper_left_3x3(m: &Matrix4<f32>) -> Matrix3<f32> {
    Matrix3::from_cols(m.x.truncate(), m.y.truncate(), m.z.truncate())
}

/// Inverse-transpose of `m`, or `None` when `m` is singular.
pub fn inverse_transpose(m: Matrix3<f32>) -> Option<Matrix3<f32>> {
    m.invert().map(|inv| inv.transpose())
}

pub fn transform_point(m: &Matrix4<f32>, p: Point3<f32>) -> Point3<f32> {
    let v = m * Vector4::new(p.x, p.y, p.z, 1.0);
    Point3::new(v.x / v.w, v.y / v.w, v.z / v.w)
}

pub fn transform_vector(m: &Matrix4<f32>, v: Vector3<f32>) -> Vector3<f32> {
    (m * v.extend(0.0)).truncate()
}

/// Translation column of an affine transform.
pub fn translation_of(m: &Matrix4<f32>) -> Point3<f32> {
    Point3::new(m.w.x, m.w.y, m.w.z)
}

/// Up vector for a view looking along `direction`; +Z when the direction is
/// (anti)parallel to Y, +Y otherwise.
pub fn up_for_direction(direction: Vector3<f32>) -> Vector3<f32> {
    if direction.normalize().y.abs() > 0.999 {
        Vector3::unit_z()
    } else {
        Vector3::unit_y()
    }
}

/// Mat3 laid out as three padded columns, matching WGSL `mat3x3<f32>`.
pub fn mat3_to_padded(m: &Matrix3<f32>) -> [[f32; 4]; 3] {
    [
        [m.x.x, m.x.y, m.x.z, 0.0],
        [m.y.x, m.y.y, m.y.z, 0.0],
        [m.z.x, m.z.y, m.z.z, 0.0],
    ]
}

#[cfg(test)]
pub(crate) mod test_helpers {
    use cgmath::{Matrix3, Matrix4, Point3, Vector3};

    pub const EPS: f32 = 1e-4;

    pub fn assert_mat4_near(a: &Matrix4<f32>, b: &Matrix4<f32>) {
        let a: &[[f32; 4]; 4] = a.as_ref();
        let b: &[[f32; 4]; 4] = b.as_ref();
        for c in 0..4 {
            for r in 0..4 {
                assert!(
                    (a[c][r] - b[c][r]).abs() < EPS,
                    "matrices differ at column {c} row {r}: {a:?} vs {b:?}"
                );
            }
        }
    }

    pub fn assert_mat3_near(a: &Matrix3<f32>, b: &Matrix3<f32>) {
        let a: &[[f32; 3]; 3] = a.as_ref();
        let b: &[[f32; 3]; 3] = b.as_ref();
        for c in 0..3 {
            for r in 0..3 {
                assert!(
                    (a[c][r] - b[c][r]).abs() < EPS,
                    "matrices differ at column {c} row {r}: {a:?} vs {b:?}"
                );
            }
        }
    }

    pub fn assert_vec3_near(a: Vector3<f32>, b: Vector3<f32>) {
        assert!(
            (a.x - b.x).abs() < EPS && (a.y - b.y).abs() < EPS && (a.z - b.z).abs() < EPS,
            "vectors differ: {a:?} vs {b:?}"
        );
    }

    pub fn assert_point3_near(a: Point3<f32>, b: Point3<f32>) {
        assert_vec3_near(
            Vector3::new(a.x, a.y, a.z),
            Vector3::new(b.x, b.y, b.z),
        );
    }
}

#[cfg(test)]
mod tests {
    use super::test_helpers::*;
    use super::*;

    #[test]
    fn upper_left_drops_translation() {
        let m = Matrix4::from_translation(Vector3::new(3.0, 4.0, 5.0))
            * Matrix4::from_nonuniform_scale(2.0, 3.0, 4.0);
        assert_mat3_near(
            &upper_left_3x3(&m),
            &Matrix3::from_diagonal(Vector3::new(2.0, 3.0, 4.0)),
        );
    }

    #[test]
    fn singular_matrix_has_no_inverse_transpose() {
        let m = Matrix3::from_diagonal(Vector3::new(1.0, 0.0, 1.0));
        assert!(inverse_transpose(m).is_none());
    }

    #[test]
    fn points_are_translated_but_vectors_are_not() {
        let m = Matrix4::from_translation(Vector3::new(1.0, 2.0, 3.0));
        assert_point3_near(
            transform_point(&m, Point3::new(1.0, 1.0, 1.0)),
            Point3::new(2.0, 3.0, 4.0),
        );
        assert_vec3_near(
            transform_vector(&m, Vector3::new(1.0, 1.0, 1.0)),
            Vector3::new(1.0, 1.0, 1.0),
        );
    }

    #[test]
    fn vertical_directions_use_z_up() {
        assert_eq!(up_for_direction(Vector3::new(0.0, -1.0, 0.0)), Vector3::unit_z());
        assert_eq!(up_for_direction(Vector3::new(0.0, 0.0, -1.0)), Vector3::unit_y());
    }
}
