// src/gfx/rendering/uniforms.rs
//! Per-draw uniform blocks
//!
//! Layouts MUST match the WGSL structs of the same name.

use cgmath::{Matrix3, Matrix4, Point3, SquareMatrix, Vector3};

use crate::gfx::math::mat3_to_padded;
use crate::gfx::resources::material::{Material, MaterialUniform};
use crate::gfx::scene::light::MAX_SPOT_LIGHTS;

/// Everything the lit vertex and fragment stages need for one node.
#[repr(C)]
#[derive(Copy, Clone, Debug, bytemuck::Pod, bytemuck::Zeroable)]
#[allow(non_snake_case)]
pub struct NodeUniform {
    pub MVP: [[f32; 4]; 4],
    pub M: [[f32; 4]; 4],
    pub N: [[f32; 4]; 3],
    pub lMVP: [[[f32; 4]; 4]; MAX_SPOT_LIGHTS],
    pub material: MaterialUniform,
    /// `1.0` samples the normal map, `-1.0` uses the interpolated normal.
    pub map_norms: f32,
    _padding: [f32; 3],
}

impl NodeUniform {
    /// `light_view_projections[i]` is `P_light · V_light` of shadow entry `i`.
    pub fn new(
        view_projection: &Matrix4<f32>,
        model: &Matrix4<f32>,
        normal: &Matrix3<f32>,
        light_view_projections: &[Matrix4<f32>],
        material: &Material,
        has_normal_map: bool,
    ) -> Self {
        let identity: [[f32; 4]; 4] = Matrix4::identity().into();
        let mut light_mvps = [identity; MAX_SPOT_LIGHTS];
        for (slot, light) in light_mvps.iter_mut().zip(light_view_projections) {
            *slot = (light * model).into();
        }

        Self {
            MVP: (view_projection * model).into(),
            M: (*model).into(),
            N: mat3_to_padded(normal),
            lMVP: light_mvps,
            material: material.to_uniform(),
            map_norms: if has_normal_map { 1.0 } else { -1.0 },
            _padding: [0.0; 3],
        }
    }
}

/// Shadow pass per-draw block: the light-space MVP only.
#[repr(C)]
#[derive(Copy, Clone, Debug, bytemuck::Pod, bytemuck::Zeroable)]
#[allow(non_snake_case)]
pub struct DepthUniform {
    pub lMVP: [[f32; 4]; 4],
}

impl DepthUniform {
    pub fn new(light_view_projection: &Matrix4<f32>, model: &Matrix4<f32>) -> Self {
        Self {
            lMVP: (light_view_projection * model).into(),
        }
    }
}

/// Portal view block for the portal being looked through.
#[repr(C)]
#[derive(Copy, Clone, Debug, bytemuck::Pod, bytemuck::Zeroable)]
pub struct PortalUniform {
    pub portal_pos: [f32; 4],
    pub portal_normal: [f32; 4],
    pub other_portal_normal: [f32; 4],
    /// Inverse of the view offset: maps the real eye to the virtual one.
    pub offset: [[f32; 4]; 4],
}

impl PortalUniform {
    pub fn new(
        portal_pos: Point3<f32>,
        portal_normal: Vector3<f32>,
        other_portal_normal: Vector3<f32>,
        offset: Matrix4<f32>,
    ) -> Self {
        Self {
            portal_pos: [portal_pos.x, portal_pos.y, portal_pos.z, 1.0],
            portal_normal: portal_normal.extend(0.0).into(),
            other_portal_normal: other_portal_normal.extend(0.0).into(),
            offset: offset.into(),
        }
    }
}
