//! Public rendering API
//!
//! This module contains the contract between the renderer and the graphics
//! context, and the per-frame data structures applications fill in.

pub mod render_backend;
pub mod frame_data;

// Re-export commonly used types
pub use render_backend::{
    BackendResult, ClearFlags, CullFace, FilterMode, FramebufferAttachments, FramebufferHandle,
    GeometryHandle, GraphicsContext, ShaderHandle, ShaderSource, TextureArrayDescriptor,
    TextureDescriptor, TextureFormat, TextureHandle, UniformLocation, UniformValue,
    VertexArrayHandle,
};
pub use frame_data::{MeshInstance, SceneRenderInfo, ViewRenderInfo, ViewportInfo};
