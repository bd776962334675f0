//! Whole-frame tests driving the renderer on the headless context


use crate::core::RendererConfig;
use crate::foundation::math::{Mat4, Mat4Ext, Vec3};
use crate::render::api::{FilterMode, GraphicsContext, TextureDescriptor, TextureFormat, TextureHandle, ViewRenderInfo, ViewportInfo};
use crate::render::backends::headless::HeadlessContext;
use crate::scene::SceneRenderer;

/// Small shadow maps keep the headless bookkeeping light
fn test_config() -> RendererConfig {
    RendererConfig::default().with_shadow_map_size(256)
}

fn setup(config: RendererConfig) -> (HeadlessContext, SceneRenderer) {
    let mut ctx = HeadlessContext::new();
    let renderer = SceneRenderer::new(&mut ctx, config).unwrap();
    (ctx, renderer)
}

fn camera(width: u32, height: u32) -> ViewRenderInfo {
    ViewRenderInfo::perspective(
        Mat4::look_at(Vec3::new(0.0, 4.0, 10.0), Vec3::zeros(), Vec3::y()),
        ViewportInfo::new(width, height),
        60.0_f32.to_radians(),
        0.1,
        100.0,
    )
}

fn material_texture(ctx: &mut HeadlessContext, label: &str) -> TextureHandle {
    ctx.create_texture(&TextureDescriptor {
        label,
        width: 4,
        height: 4,
        format: TextureFormat::Rgba8,
        filter: FilterMode::Linear,
        data: None,
    })
    .unwrap()
}
