// src/gfx/scene/transform.rs
//! Local position/orientation/scale of a scene node

use cgmath::{Euler, Matrix3, Matrix4, Rad, SquareMatrix, Vector3};

use crate::gfx::math::{inverse_transpose, upper_left_3x3};

/// Position, Euler XYZ orientation (radians) and scale.
///
/// Matrices are derived on every call, so there is no cached state to
/// invalidate after a mutation.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Transform {
    pub position: Vector3<f32>,
    pub orientation: Vector3<f32>,
    pub scale: Vector3<f32>,
}

impl Default for Transform {
    fn default() -> Self {
        Self {
            position: Vector3::new(0.0, 0.0, 0.0),
            orientation: Vector3::new(0.0, 0.0, 0.0),
            scale: Vector3::new(1.0, 1.0, 1.0),
        }
    }
}

impl Transform {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_position(x: f32, y: f32, z: f32) -> Self {
        Self::default().with_position(x, y, z)
    }

    pub fn with_position(mut self, x: f32, y: f32, z: f32) -> Self {
        self.position = Vector3::new(x, y, z);
        self
    }

    pub fn with_orientation(mut self, x: f32, y: f32, z: f32) -> Self {
        self.orientation = Vector3::new(x, y, z);
        self
    }

    pub fn with_scale(mut self, x: f32, y: f32, z: f32) -> Self {
        self.scale = Vector3::new(x, y, z);
        self
    }

    pub fn with_uniform_scale(self, s: f32) -> Self {
        self.with_scale(s, s, s)
    }

    pub fn translate(&mut self, delta: Vector3<f32>) {
        self.position += delta;
    }

    /// Adds `delta` (radians) to each Euler angle.
    pub fn rotate(&mut self, delta: Vector3<f32>) {
        self.orientation += delta;
    }

    pub fn rotation_matrix(&self) -> Matrix4<f32> {
        Matrix4::from(Euler::new(
            Rad(self.orientation.x),
            Rad(self.orientation.y),
            Rad(self.orientation.z),
        ))
    }

    /// Local matrix `T · R · S`.
    pub fn matrix(&self) -> Matrix4<f32> {
        Matrix4::from_translation(self.position)
            * self.rotation_matrix()
            * Matrix4::from_nonuniform_scale(self.scale.x, self.scale.y, self.scale.z)
    }

    /// Inverse-transpose of the linear part of `matrix()`.
    ///
    /// A degenerate (zero-scale) transform has no inverse; identity is
    /// returned so lighting stays finite.
    pub fn normal_matrix(&self) -> Matrix3<f32> {
        match inverse_transpose(upper_left_3x3(&self.matrix())) {
            Some(n) => n,
            None => {
                log::warn!(
                    "degenerate transform (scale {:?}), using identity normal matrix",
                    self.scale
                );
                Matrix3::identity()
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::gfx::math::test_helpers::*;
    use cgmath::{InnerSpace, Matrix};
    use std::f32::consts::FRAC_PI_2;

    #[test]
    fn default_is_identity() {
        assert_mat4_near(&Transform::default().matrix(), &Matrix4::identity());
        assert_mat3_near(&Transform::default().normal_matrix(), &Matrix3::identity());
    }

    #[test]
    fn matrix_applies_scale_then_rotation_then_translation() {
        let t = Transform::from_position(1.0, 0.0, 0.0)
            .with_orientation(0.0, 0.0, FRAC_PI_2)
            .with_scale(2.0, 1.0, 1.0);
        // (1,0,0) -> scale (2,0,0) -> rotate 90 about Z (0,2,0) -> translate (1,2,0)
        let p = t.matrix() * cgmath::Vector4::new(1.0, 0.0, 0.0, 1.0);
        assert_vec3_near(p.truncate(), Vector3::new(1.0, 2.0, 0.0));
    }

    #[test]
    fn uniform_scale_normal_matrix_is_scaled_rotation() {
        let t = Transform::default()
            .with_orientation(0.3, 0.2, 0.1)
            .with_uniform_scale(2.0);
        let r = upper_left_3x3(&t.rotation_matrix());
        assert_mat3_near(&t.normal_matrix(), &(r * 0.5));
    }

    #[test]
    fn non_uniform_scale_normal_stays_perpendicular_to_surface() {
        let t = Transform::default().with_scale(1.0, 4.0, 1.0);
        // A 45 degree slope in the XY plane and its normal.
        let tangent = Vector3::new(1.0, 1.0, 0.0);
        let normal = Vector3::new(1.0, -1.0, 0.0);

        let m = upper_left_3x3(&t.matrix());
        let transformed_tangent = m * tangent;

        let good = (t.normal_matrix() * normal).normalize();
        assert!(good.dot(transformed_tangent).abs() < EPS);

        // Transforming the normal with the model matrix itself skews it.
        let naive = (m * normal).normalize();
        assert!(naive.dot(transformed_tangent.normalize()).abs() > 0.5);
    }

    #[test]
    fn normal_matrix_follows_scale_changes() {
        let mut t = Transform::default();
        let before = t.normal_matrix();
        t.scale = Vector3::new(1.0, 3.0, 1.0);
        let after = t.normal_matrix();
        assert_mat3_near(&before, &Matrix3::identity());
        assert_mat3_near(
            &after,
            &Matrix3::from_diagonal(Vector3::new(1.0, 1.0 / 3.0, 1.0)),
        );
    }

    #[test]
    fn zero_scale_falls_back_to_identity() {
        let t = Transform::default().with_scale(0.0, 1.0, 1.0);
        assert_mat3_near(&t.normal_matrix(), &Matrix3::identity());
    }

    #[test]
    fn rotation_matrix_is_orthonormal() {
        let t = Transform::default().with_orientation(1.1, -0.4, 2.5);
        let r = upper_left_3x3(&t.rotation_matrix());
        assert_mat3_near(&(r * r.transpose()), &Matrix3::identity());
    }
}
