//! Error types for scene construction, asset loading and GPU setup
//!
//! Per-frame rendering never returns these; setup code logs them and the
//! affected pass is skipped so the frame loop keeps running.

use std::path::PathBuf;

use thiserror::Error;

/// Errors raised while building or querying the scene graph
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum SceneError {
    #[error("node '{node}' cannot use parent index {parent}: parents must be inserted before their children")]
    InvalidParent { node: String, parent: usize },

    #[error("a node named '{0}' already exists")]
    DuplicateName(String),

    #[error("no node named '{0}'")]
    UnknownNode(String),

    #[error("too many {kind} lights (limit is {limit})")]
    TooManyLights { kind: &'static str, limit: usize },
}

/// Errors raised while reading meshes and images from disk
#[derive(Debug, Error)]
pub enum AssetError {
    #[error("failed to load OBJ '{path}': {source}")]
    Obj {
        path: PathBuf,
        #[source]
        source: tobj::LoadError,
    },

    #[error("OBJ '{0}' contains no triangles")]
    EmptyMesh(PathBuf),

    #[error("failed to load image '{path}': {source}")]
    Image {
        path: PathBuf,
        #[source]
        source: image::ImageError,
    },
}

/// Errors raised while creating GPU objects
#[derive(Debug, Error)]
pub enum RenderError {
    #[error("failed to create surface: {0}")]
    Surface(#[from] wgpu::CreateSurfaceError),

    #[error("no suitable GPU adapter: {0}")]
    Adapter(#[from] wgpu::RequestAdapterError),

    #[error("failed to create device: {0}")]
    Device(#[from] wgpu::RequestDeviceError),

    #[error("shader '{name}' failed to build: {message}")]
    Shader { name: String, message: String },

    #[error("pipeline '{name}' failed to build: {message}")]
    Pipeline { name: String, message: String },
}
