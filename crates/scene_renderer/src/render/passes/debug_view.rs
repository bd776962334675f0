//! Shadow cascade inspection
//!
//! Draws one layer of the shadow map array as a grayscale image, for editors
//! and debugging overlays.

use crate::core::ShaderConfig;
use crate::foundation::math::Vec4;
use crate::render::api::{
    ClearFlags, FramebufferHandle, GraphicsContext, ShaderHandle, TextureHandle, UniformLocation, UniformValue,
    VertexArrayHandle,
};
use crate::render::RenderResult;

use super::{build_shader, require_uniform, FULLSCREEN_QUAD_VERTICES};

const LABEL: &str = "depth_debug";

/// Depth layer visualisation
#[derive(Debug)]
pub struct DebugViewPass {
    shader: ShaderHandle,
    depth_tex: UniformLocation,
    layer: UniformLocation,
}

impl DebugViewPass {
    /// Build the depth debug program
    pub fn new(ctx: &mut dyn GraphicsContext, shaders: &ShaderConfig) -> RenderResult<Self> {
        let shader = build_shader(ctx, LABEL, &shaders.depth_debug)?;
        Ok(Self {
            shader,
            depth_tex: require_uniform(ctx, shader, LABEL, "depth_tex"),
            layer: require_uniform(ctx, shader, LABEL, "layer"),
        })
    }

    /// Release the program
    pub fn release(&self, ctx: &mut dyn GraphicsContext) {
        ctx.release_shader(self.shader);
    }

    /// Draw `layer` of `depth_array` into `target`
    pub fn execute(
        &self,
        ctx: &mut dyn GraphicsContext,
        target: FramebufferHandle,
        size: (u32, u32),
        depth_array: TextureHandle,
        layer: u32,
        quad: VertexArrayHandle,
    ) {
        ctx.bind_framebuffer(Some(target));
        ctx.set_viewport(0, 0, size.0, size.1);
        ctx.set_clear_color(Vec4::new(0.0, 0.0, 0.0, 1.0));
        ctx.clear(ClearFlags::COLOR);

        ctx.bind_shader(Some(self.shader));
        ctx.bind_texture(0, depth_array);
        ctx.set_uniform(self.depth_tex, UniformValue::Int(0));
        ctx.set_uniform(self.layer, UniformValue::Int(layer as i32));
        ctx.draw_arrays(quad, FULLSCREEN_QUAD_VERTICES);

        ctx.bind_framebuffer(None);
    }
}
