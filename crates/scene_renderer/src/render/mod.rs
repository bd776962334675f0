//! Rendering system
//!
//! The frame pipeline is split into small layers:
//!
//! - [`api`]: the [`GraphicsContext`] contract and the per-frame data the
//!   application submits
//! - [`primitives`]: meshes and materials
//! - [`systems`]: light sources and the cascaded shadow math
//! - [`resources`]: render targets and fallback textures owned by the renderer
//! - [`passes`]: shadow, scene, tonemap and cascade debug passes
//! - [`backends`]: concrete [`GraphicsContext`] implementations
//!
//! The orchestration of one frame lives in [`crate::scene::SceneRenderer`].
//!
//! # Error policy
//! Violated preconditions (zero cascades, inverted camera planes, missing
//! uniforms in a shader) are programming errors and panic. Failures reported
//! by the graphics context surface as [`RenderError`]. Questionable scene
//! content (extra directional lights, too many point lights, transparent
//! meshes without a texture) is logged and rendered in a degraded way.

use thiserror::Error;

pub mod api;
pub mod backends;
pub mod passes;
pub mod primitives;
pub mod resources;
pub mod systems;

#[cfg(test)]
mod tests;

pub use api::{
    ClearFlags, CullFace, FramebufferHandle, GeometryHandle, GraphicsContext, MeshInstance, SceneRenderInfo,
    ShaderHandle, TextureHandle, UniformValue, ViewRenderInfo, ViewportInfo,
};
pub use primitives::{Material, Mesh};
pub use systems::lighting::{DirectionalLight, PointLight, MAX_POINT_LIGHTS};

/// High-level rendering error types
///
/// Graphics context failures are reported through these variants so that the
/// frame pipeline does not depend on any particular backend's error type.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum RenderError {
    /// Renderer initialization failed during setup
    ///
    /// Occurs when shaders cannot be built or the initial render targets
    /// cannot be allocated.
    #[error("Renderer initialization failed: {0}")]
    InitializationFailed(String),

    /// Resource creation failed
    ///
    /// A texture, texture array or framebuffer could not be created, typically
    /// because of invalid dimensions or exhausted memory.
    #[error("Resource creation failed: {0}")]
    ResourceCreationFailed(String),

    /// A handle that the context does not know (or no longer knows) was used
    #[error("Invalid handle: {0}")]
    InvalidHandle(String),

    /// Backend-specific error occurred
    #[error("Backend error: {0}")]
    BackendError(String),
}

/// Result type for rendering operations
pub type RenderResult<T> = Result<T, RenderError>;
