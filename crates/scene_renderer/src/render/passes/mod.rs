//! Render passes
//!
//! Each pass owns its shader program and the uniform locations it writes,
//! resolved once when the pass is created. A pass only issues commands; the
//! targets it draws into are owned by [`crate::render::resources`].

pub mod debug_view;
pub mod scene_pass;
pub mod shadow_pass;
pub mod tonemap_pass;

pub use debug_view::DebugViewPass;
pub use scene_pass::{ScenePass, ScenePassInput, ScenePassStats, ShadowInput};
pub use shadow_pass::{ShadowPass, ShadowPassInput, ShadowPassStats};
pub use tonemap_pass::TonemapPass;

use crate::core::ShaderStages;
use crate::render::api::{GraphicsContext, ShaderHandle, ShaderSource, UniformLocation};
use crate::render::{RenderError, RenderResult};

/// Fullscreen triangle pair generated in the vertex stage
pub const FULLSCREEN_QUAD_VERTICES: u32 = 6;

/// Create a program from configured stage paths
pub(crate) fn build_shader(ctx: &mut dyn GraphicsContext, label: &str, stages: &ShaderStages) -> RenderResult<ShaderHandle> {
    let source = ShaderSource {
        label: label.to_string(),
        vertex: stages.vertex.clone(),
        geometry: stages.geometry.clone(),
        fragment: stages.fragment.clone(),
    };
    ctx.create_shader(&source)
        .map_err(|e| RenderError::InitializationFailed(format!("shader '{label}': {e}")))
}

/// Resolve a uniform the pass cannot work without
///
/// # Panics
/// When the program does not declare `name`; the shader and the pass are out
/// of sync, which is a build defect rather than a runtime condition.
pub(crate) fn require_uniform(ctx: &dyn GraphicsContext, shader: ShaderHandle, label: &str, name: &str) -> UniformLocation {
    match ctx.uniform_location(shader, name) {
        Some(location) => location,
        None => panic!("shader '{label}' has no uniform '{name}'"),
    }
}
