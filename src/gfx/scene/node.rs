// src/gfx/scene/node.rs
//! Hierarchical scene nodes stored in an insertion-ordered arena
//!
//! A node's parent must already be in the graph when the node is inserted,
//! so every parent index is strictly smaller than its child's index and the
//! parent chain always terminates.

use std::collections::BTreeMap;

use cgmath::{Matrix3, Matrix4};

use crate::error::SceneError;
use crate::gfx::resources::material::Material;
use crate::gfx::resources::texture_library::TextureId;
use crate::gfx::scene::mesh::MeshId;
use crate::gfx::scene::transform::Transform;

/// Index of a node inside its `SceneGraph`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeHandle(usize);

impl NodeHandle {
    pub fn index(self) -> usize {
        self.0
    }
}

/// What the renderer needs to draw a node.
#[derive(Debug, Clone, Copy)]
pub struct RenderData {
    pub mesh: MeshId,
    pub material: Material,
    /// Falls back to the checkerboard when `None`.
    pub texture: Option<TextureId>,
    pub normal_map: Option<TextureId>,
    /// Drawn by the scene and portal view passes.
    pub visible: bool,
    pub casts_shadow: bool,
}

impl RenderData {
    pub fn new(mesh: MeshId, material: Material) -> Self {
        Self {
            mesh,
            material,
            texture: None,
            normal_map: None,
            visible: true,
            casts_shadow: true,
        }
    }

    pub fn with_texture(mut self, texture: Option<TextureId>) -> Self {
        self.texture = texture;
        self
    }

    pub fn with_normal_map(mut self, normal_map: Option<TextureId>) -> Self {
        self.normal_map = normal_map;
        self
    }

    /// Geometry used only by the stencil pass (portal masks).
    pub fn mask_only(mut self) -> Self {
        self.visible = false;
        self.casts_shadow = false;
        self
    }
}

#[derive(Debug, Clone)]
pub struct SceneNode {
    pub name: String,
    pub transform: Transform,
    parent: Option<NodeHandle>,
    pub render: Option<RenderData>,
}

impl SceneNode {
    pub fn new(name: impl Into<String>, transform: Transform) -> Self {
        Self {
            name: name.into(),
            transform,
            parent: None,
            render: None,
        }
    }

    pub fn with_parent(mut self, parent: NodeHandle) -> Self {
        self.parent = Some(parent);
        self
    }

    pub fn with_render(mut self, render: RenderData) -> Self {
        self.render = Some(render);
        self
    }

    pub fn parent(&self) -> Option<NodeHandle> {
        self.parent
    }

    pub fn is_drawable(&self) -> bool {
        self.render.is_some_and(|r| r.visible)
    }
}

#[derive(Debug, Default)]
pub struct SceneGraph {
    nodes: Vec<SceneNode>,
    names: BTreeMap<String, NodeHandle>,
}

impl SceneGraph {
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends `node`, validating its parent and name.
    pub fn insert(&mut self, node: SceneNode) -> Result<NodeHandle, SceneError> {
        let handle = NodeHandle(self.nodes.len());

        if let Some(parent) = node.parent {
            if parent.0 >= handle.0 {
                return Err(SceneError::InvalidParent {
                    node: node.name,
                    parent: parent.0,
                });
            }
        }
        if self.names.contains_key(&node.name) {
            return Err(SceneError::DuplicateName(node.name));
        }

        log::trace!("scene node '{}' -> {:?}", node.name, handle);
        self.names.insert(node.name.clone(), handle);
        self.nodes.push(node);
        Ok(handle)
    }

    pub fn get(&self, handle: NodeHandle) -> &SceneNode {
        &self.nodes[handle.0]
    }

    pub fn get_mut(&mut self, handle: NodeHandle) -> &mut SceneNode {
        &mut self.nodes[handle.0]
    }

    pub fn transform(&self, handle: NodeHandle) -> &Transform {
        &self.nodes[handle.0].transform
    }

    pub fn transform_mut(&mut self, handle: NodeHandle) -> &mut Transform {
        &mut self.nodes[handle.0].transform
    }

    pub fn find(&self, name: &str) -> Option<NodeHandle> {
        self.names.get(name).copied()
    }

    pub fn handle(&self, name: &str) -> Result<NodeHandle, SceneError> {
        self.find(name)
            .ok_or_else(|| SceneError::UnknownNode(name.to_string()))
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (NodeHandle, &SceneNode)> {
        self.nodes
            .iter()
            .enumerate()
            .map(|(i, node)| (NodeHandle(i), node))
    }

    /// Nodes the scene and portal view passes draw, in insertion order.
    pub fn drawables(&self) -> impl Iterator<Item = (NodeHandle, &SceneNode, &RenderData)> {
        self.iter().filter_map(|(handle, node)| match &node.render {
            Some(render) if render.visible => Some((handle, node, render)),
            _ => None,
        })
    }

    /// Number of ancestors above `handle`.
    pub fn depth(&self, handle: NodeHandle) -> usize {
        let mut depth = 0;
        let mut current = self.nodes[handle.0].parent;
        while let Some(parent) = current {
            depth += 1;
            current = self.nodes[parent.0].parent;
        }
        depth
    }

    /// `M_root · … · M_parent · M_node`, recomputed on every call.
    pub fn composed_transform_matrix(&self, handle: NodeHandle) -> Matrix4<f32> {
        let node = &self.nodes[handle.0];
        let mut matrix = node.transform.matrix();
        let mut current = node.parent;
        while let Some(parent) = current {
            let parent = &self.nodes[parent.0];
            matrix = parent.transform.matrix() * matrix;
            current = parent.parent;
        }
        matrix
    }

    /// Product of the normal matrices along the parent chain.
    pub fn composed_normal_matrix(&self, handle: NodeHandle) -> Matrix3<f32> {
        let node = &self.nodes[handle.0];
        let mut matrix = node.transform.normal_matrix();
        let mut current = node.parent;
        while let Some(parent) = current {
            let parent = &self.nodes[parent.0];
            matrix = parent.transform.normal_matrix() * matrix;
            current = parent.parent;
        }
        matrix
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::gfx::math::{inverse_transpose, test_helpers::*, upper_left_3x3};
    use cgmath::{SquareMatrix, Vector3, Vector4};

    fn chain(depth: usize) -> (SceneGraph, Vec<NodeHandle>) {
        let transforms = [
            Transform::from_position(1.0, 2.0, 3.0).with_orientation(0.0, 0.5, 0.0),
            Transform::from_position(0.0, 3.75, 0.0).with_scale(1.0, 2.0, 1.0),
            Transform::from_position(-2.0, 0.0, 1.0).with_orientation(0.3, 0.0, 0.2),
            Transform::from_position(0.5, 0.5, 0.5).with_uniform_scale(0.25),
        ];
        let mut graph = SceneGraph::new();
        let mut handles: Vec<NodeHandle> = Vec::new();
        for (i, t) in transforms.iter().take(depth + 1).enumerate() {
            let mut node = SceneNode::new(format!("n{i}"), *t);
            if let Some(parent) = handles.last() {
                node = node.with_parent(*parent);
            }
            handles.push(graph.insert(node).unwrap());
        }
        (graph, handles)
    }

    #[test]
    fn fold_matches_explicit_product_for_depths_zero_to_three() {
        for depth in 0..=3 {
            let (graph, handles) = chain(depth);
            let leaf = *handles.last().unwrap();
            assert_eq!(graph.depth(leaf), depth);

            let expected = handles
                .iter()
                .fold(Matrix4::identity(), |acc, h| acc * graph.transform(*h).matrix());
            assert_mat4_near(&graph.composed_transform_matrix(leaf), &expected);

            let expected_normal = inverse_transpose(upper_left_3x3(&expected)).unwrap();
            assert_mat3_near(&graph.composed_normal_matrix(leaf), &expected_normal);
        }
    }

    #[test]
    fn root_matrix_is_its_local_matrix() {
        let (graph, handles) = chain(0);
        assert_mat4_near(
            &graph.composed_transform_matrix(handles[0]),
            &graph.transform(handles[0]).matrix(),
        );
    }

    #[test]
    fn moving_parent_moves_child_without_touching_child_transform() {
        let (mut graph, handles) = chain(1);
        let child = handles[1];
        let child_local = *graph.transform(child);
        let origin = Vector4::new(0.0, 0.0, 0.0, 1.0);

        let before = graph.composed_transform_matrix(child) * origin;
        graph
            .transform_mut(handles[0])
            .translate(Vector3::new(0.0, 10.0, 0.0));
        let after = graph.composed_transform_matrix(child) * origin;

        assert_vec3_near(after.truncate() - before.truncate(), Vector3::new(0.0, 10.0, 0.0));
        assert_eq!(*graph.transform(child), child_local);
    }

    #[test]
    fn changing_child_leaves_parent_and_sibling_alone() {
        let (mut graph, handles) = chain(1);
        let parent = handles[0];
        let child = handles[1];
        let sibling = graph
            .insert(
                SceneNode::new("sibling", Transform::from_position(4.0, 0.0, -1.0))
                    .with_parent(parent),
            )
            .unwrap();
        let grandchild = graph
            .insert(SceneNode::new("grandchild", Transform::from_position(0.0, 1.0, 0.0)).with_parent(child))
            .unwrap();

        let parent_before = graph.composed_transform_matrix(parent);
        let parent_normal_before = graph.composed_normal_matrix(parent);
        let sibling_before = graph.composed_transform_matrix(sibling);
        let sibling_normal_before = graph.composed_normal_matrix(sibling);
        let grandchild_before = graph.composed_transform_matrix(grandchild);

        let moved = graph.transform_mut(child);
        moved.translate(Vector3::new(5.0, -3.0, 2.0));
        moved.scale = Vector3::new(3.0, 0.5, 1.0);

        assert_eq!(graph.composed_transform_matrix(parent), parent_before);
        assert_eq!(graph.composed_normal_matrix(parent), parent_normal_before);
        assert_eq!(graph.composed_transform_matrix(sibling), sibling_before);
        assert_eq!(graph.composed_normal_matrix(sibling), sibling_normal_before);
        // descendants do follow
        assert!(graph.composed_transform_matrix(grandchild) != grandchild_before);
    }

    #[test]
    fn forward_and_self_parents_are_rejected() {
        let mut graph = SceneGraph::new();
        graph.insert(SceneNode::new("root", Transform::default())).unwrap();

        let own_index = SceneNode::new("self", Transform::default()).with_parent(NodeHandle(1));
        assert!(matches!(
            graph.insert(own_index),
            Err(SceneError::InvalidParent { parent: 1, .. })
        ));

        let forward = SceneNode::new("forward", Transform::default()).with_parent(NodeHandle(7));
        assert!(matches!(
            graph.insert(forward),
            Err(SceneError::InvalidParent { parent: 7, .. })
        ));
        assert_eq!(graph.len(), 1);
    }

    #[test]
    fn names_are_unique_and_resolvable() {
        let mut graph = SceneGraph::new();
        let floor = graph.insert(SceneNode::new("floor", Transform::default())).unwrap();
        assert_eq!(graph.handle("floor"), Ok(floor));
        assert_eq!(
            graph.insert(SceneNode::new("floor", Transform::default())),
            Err(SceneError::DuplicateName("floor".into()))
        );
        assert_eq!(
            graph.handle("ceiling"),
            Err(SceneError::UnknownNode("ceiling".into()))
        );
    }
}
