//! # Scene Module
//!
//! Everything the render passes read each frame: the node arena with its
//! hierarchical transforms, meshes, lights with their shadow entries, the
//! portal pair and the camera rig.
//!
//! ## Key Components
//!
//! - [`SceneGraph`] - insertion-ordered node arena; parents precede children
//! - [`Transform`] - position, Euler orientation and scale of one node
//! - [`PortalPair`] - two linked portals and the offset matrices between them
//! - [`SceneState`] - the whole scene plus its per-frame `update`
//!
//! ```no_run
//! use rift::config::RiftConfig;
//! use rift::gfx::scene::demo_scene;
//!
//! let scene = demo_scene::build(&RiftConfig::from_env()).unwrap();
//! let ring = scene.graph.handle("deviceRing").unwrap();
//! let world = scene.graph.composed_transform_matrix(ring);
//! ```

pub mod animation;
pub mod demo_scene;
pub mod light;
pub mod mesh;
pub mod node;
pub mod portal;
pub mod scene;
pub mod shadow;
pub mod transform;
pub mod traversal;
pub mod vertex;

pub use light::{DirectionalLight, LightSet, PointLight, SpotLight};
pub use mesh::{DrawMesh, Mesh, MeshId, MeshLibrary};
pub use node::{NodeHandle, RenderData, SceneGraph, SceneNode};
pub use portal::{Portal, PortalPair, PortalSide, PortalWobble};
pub use scene::{FrameInput, SceneState};
pub use shadow::{ShadowMapEntry, ShadowMaps};
pub use transform::Transform;
pub use vertex::Vertex3D;
