//! HDR tone mapping pass
//!
//! Maps the linear HDR scene color into display range with an exposure curve
//! and writes it to the output target. The fullscreen quad has no vertex
//! buffer; the vertex stage derives positions from the vertex index.

use crate::core::ShaderConfig;
use crate::foundation::math::Vec4;
use crate::render::api::{
    ClearFlags, FramebufferHandle, GraphicsContext, ShaderHandle, TextureHandle, UniformLocation, UniformValue,
    VertexArrayHandle, ViewportInfo,
};
use crate::render::RenderResult;

use super::{build_shader, require_uniform, FULLSCREEN_QUAD_VERTICES};

/// Unit the HDR color is sampled from
pub const HDR_TEXTURE_UNIT: u32 = 0;

const LABEL: &str = "tonemap";

/// Exposure tone mapping into the output target
#[derive(Debug)]
pub struct TonemapPass {
    shader: ShaderHandle,
    hdr_tex: UniformLocation,
    exposure: UniformLocation,
}

impl TonemapPass {
    /// Build the tonemap program
    pub fn new(ctx: &mut dyn GraphicsContext, shaders: &ShaderConfig) -> RenderResult<Self> {
        let shader = build_shader(ctx, LABEL, &shaders.tonemap)?;
        Ok(Self {
            shader,
            hdr_tex: require_uniform(ctx, shader, LABEL, "hdr_tex"),
            exposure: require_uniform(ctx, shader, LABEL, "exposure"),
        })
    }

    /// Release the program
    pub fn release(&self, ctx: &mut dyn GraphicsContext) {
        ctx.release_shader(self.shader);
    }

    /// Tone map `hdr_color` into `output` (`None` = default surface)
    ///
    /// The default surface is bound again afterwards whatever `output` was.
    pub fn execute(
        &self,
        ctx: &mut dyn GraphicsContext,
        output: Option<FramebufferHandle>,
        viewport: ViewportInfo,
        hdr_color: TextureHandle,
        quad: VertexArrayHandle,
        exposure: f32,
    ) {
        ctx.bind_framebuffer(output);
        ctx.set_viewport(viewport.x, viewport.y, viewport.width, viewport.height);
        ctx.set_clear_color(Vec4::new(0.0, 0.0, 0.0, 1.0));
        ctx.clear(ClearFlags::COLOR | ClearFlags::DEPTH);

        ctx.bind_shader(Some(self.shader));
        ctx.bind_texture(HDR_TEXTURE_UNIT, hdr_color);
        ctx.set_uniform(self.hdr_tex, UniformValue::Int(HDR_TEXTURE_UNIT as i32));
        ctx.set_uniform(self.exposure, UniformValue::Float(exposure));
        ctx.draw_arrays(quad, FULLSCREEN_QUAD_VERTICES);

        ctx.bind_framebuffer(None);
    }
}
