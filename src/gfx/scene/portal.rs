// src/gfx/scene/portal.rs
//! Linked portal pair and the offset matrices between them
//!
//! Each portal is an anchor node (rigid: scale is forced to one) with a
//! child mask node carrying the disk drawn into the stencil buffer. The
//! disk lies in the anchor's local XY plane and faces local +Z.

use std::f32::consts::PI;

use cgmath::{InnerSpace, Matrix4, Point3, Rad, SquareMatrix, Vector3};
use rand::Rng;

use crate::error::SceneError;
use crate::gfx::math::{transform_point, transform_vector, translation_of};
use crate::gfx::scene::mesh::MeshId;
use crate::gfx::scene::node::{NodeHandle, RenderData, SceneGraph, SceneNode};
use crate::gfx::scene::transform::Transform;
use crate::gfx::resources::material::Material;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PortalSide {
    A,
    B,
}

impl PortalSide {
    pub const BOTH: [PortalSide; 2] = [PortalSide::A, PortalSide::B];

    /// Value written into the stencil buffer under this portal's mask.
    pub fn stencil_ref(self) -> u32 {
        match self {
            PortalSide::A => 1,
            PortalSide::B => 2,
        }
    }

    pub fn partner(self) -> PortalSide {
        match self {
            PortalSide::A => PortalSide::B,
            PortalSide::B => PortalSide::A,
        }
    }

    pub fn index(self) -> usize {
        match self {
            PortalSide::A => 0,
            PortalSide::B => 1,
        }
    }
}

#[derive(Debug, Clone, Copy)]
pub struct Portal {
    pub anchor: NodeHandle,
    pub mask: NodeHandle,
    /// Semi-axes of the mask disk along local X and Y.
    pub radii: [f32; 2],
}

impl Portal {
    /// Inserts the anchor and its mask child into `graph`.
    pub fn insert(
        graph: &mut SceneGraph,
        name: &str,
        mut anchor: Transform,
        mask_mesh: MeshId,
        radii: [f32; 2],
    ) -> Result<Self, SceneError> {
        if anchor.scale != Vector3::new(1.0, 1.0, 1.0) {
            log::warn!("portal '{name}' anchor scale {:?} forced to one", anchor.scale);
            anchor.scale = Vector3::new(1.0, 1.0, 1.0);
        }

        let anchor = graph.insert(SceneNode::new(name, anchor))?;
        let mask = graph.insert(
            SceneNode::new(format!("{name}_mask"), Transform::default())
                .with_parent(anchor)
                .with_render(RenderData::new(mask_mesh, Material::default()).mask_only()),
        )?;

        Ok(Self {
            anchor,
            mask,
            radii,
        })
    }
}

/// Random tilt applied to the view offset each frame while enabled.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PortalWobble {
    pub enabled: bool,
    /// Maximum angle in radians about each axis.
    pub amplitude: f32,
}

impl Default for PortalWobble {
    fn default() -> Self {
        Self {
            enabled: false,
            amplitude: 0.02,
        }
    }
}

impl PortalWobble {
    /// `Rx(a) · Ry(b) · Rz(c)` with `a, b, c ~ U(-w, w)`, identity while disabled.
    pub fn sample<R: Rng>(&self, rng: &mut R) -> Matrix4<f32> {
        if !self.enabled || self.amplitude <= 0.0 {
            return Matrix4::identity();
        }
        let w = self.amplitude;
        let a = rng.random_range(-w..w);
        let b = rng.random_range(-w..w);
        let c = rng.random_range(-w..w);
        Matrix4::from_angle_x(Rad(a)) * Matrix4::from_angle_y(Rad(b)) * Matrix4::from_angle_z(Rad(c))
    }
}

#[derive(Debug, Clone, Copy)]
pub struct PortalPair {
    portals: [Portal; 2],
    pub wobble: PortalWobble,
}

impl PortalPair {
    pub fn new(a: Portal, b: Portal) -> Self {
        Self {
            portals: [a, b],
            wobble: PortalWobble::default(),
        }
    }

    pub fn portal(&self, side: PortalSide) -> &Portal {
        &self.portals[side.index()]
    }

    /// Composed anchor matrix `T` of `side`.
    pub fn anchor_matrix(&self, graph: &SceneGraph, side: PortalSide) -> Matrix4<f32> {
        graph.composed_transform_matrix(self.portal(side).anchor)
    }

    /// World-space centre of the mask disk.
    pub fn position(&self, graph: &SceneGraph, side: PortalSide) -> Point3<f32> {
        translation_of(&graph.composed_transform_matrix(self.portal(side).mask))
    }

    /// World-space front-face normal of the mask disk.
    pub fn normal(&self, graph: &SceneGraph, side: PortalSide) -> Vector3<f32> {
        (graph.composed_normal_matrix(self.portal(side).mask) * Vector3::unit_z()).normalize()
    }

    /// `T_destination · R_flip · T_source⁻¹`.
    ///
    /// Carries whatever sits in front of `source` to behind `destination`, so
    /// looking into `destination` shows the world around `source`.
    pub fn offset(&self, graph: &SceneGraph, source: PortalSide, destination: PortalSide) -> Matrix4<f32> {
        let source_matrix = self.anchor_matrix(graph, source);
        let source_inverse = source_matrix.invert().unwrap_or_else(|| {
            log::warn!("portal {source:?} anchor is not invertible");
            Matrix4::identity()
        });
        self.anchor_matrix(graph, destination) * half_turn() * source_inverse
    }

    /// Model pre-transform for rendering the view through `side`.
    pub fn view_offset(&self, graph: &SceneGraph, side: PortalSide) -> Matrix4<f32> {
        self.offset(graph, side.partner(), side)
    }

    /// Signed distance of `point` from the portal plane, positive in front.
    pub fn signed_distance(&self, graph: &SceneGraph, side: PortalSide, point: Point3<f32>) -> f32 {
        (point - self.position(graph, side)).dot(self.normal(graph, side))
    }

    /// Whether `point`, projected onto the portal plane, lies inside the disk.
    pub fn within_disk(&self, graph: &SceneGraph, side: PortalSide, point: Point3<f32>) -> bool {
        let mask = graph.composed_transform_matrix(self.portal(side).mask);
        let Some(to_local) = mask.invert() else {
            return false;
        };
        let local = transform_point(&to_local, point);
        let [rx, ry] = self.portal(side).radii;
        (local.x / rx).powi(2) + (local.y / ry).powi(2) <= 1.0
    }

    /// Rotates a direction by the linear part of `offset`.
    pub fn carry_direction(offset: &Matrix4<f32>, direction: Vector3<f32>) -> Vector3<f32> {
        transform_vector(offset, direction)
    }
}

/// Half-turn about local +Y.
fn half_turn() -> Matrix4<f32> {
    Matrix4::from_angle_y(Rad(PI))
}
