//! Scene Renderer - runs the frame pipeline
//!
//! One call to [`SceneRenderer::render`] executes, in order:
//!
//! 1. classification of the frame's meshes into opaque and transparent bins
//! 2. cascade split computation for the camera's depth range
//! 3. light-space matrix fitting per cascade
//! 4. the shadow pass (skipped without shadows or without a directional light)
//! 5. the lit scene pass into the HDR target, recreated on viewport change
//! 6. tone mapping into the output target or the default surface
//!
//! The renderer owns its render targets and programs. Scene data is borrowed
//! for the duration of the call only.

use crate::core::RendererConfig;
use crate::foundation::math::Mat4;
use crate::render::api::{
    FramebufferHandle, GraphicsContext, SceneRenderInfo, TextureHandle, VertexArrayHandle, ViewRenderInfo,
};
use crate::render::passes::{
    DebugViewPass, ScenePass, ScenePassInput, ScenePassStats, ShadowInput, ShadowPass, ShadowPassInput,
    ShadowPassStats, TonemapPass,
};
use crate::render::resources::{FallbackTextures, ShadowMaps, SizedTarget, TargetLayout};
use crate::render::systems::shadows::{compute_cascade_splits_into, light_space_matrices_into, CascadeFrustum, CascadeSplit};
use crate::render::{RenderError, RenderResult};

use super::geometry_classifier::GeometryClassifier;

/// What one frame submitted
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct FrameStats {
    /// Opaque mesh instances
    pub opaque_meshes: usize,
    /// Transparent mesh instances
    pub transparent_meshes: usize,
    /// Cascades computed
    pub cascades: usize,
    /// Shadow pass counts; `None` when the pass was skipped
    pub shadow: Option<ShadowPassStats>,
    /// Scene pass counts
    pub scene: ScenePassStats,
    /// Whether the HDR target was (re)created this frame
    pub scene_target_recreated: bool,
}

/// Cascaded-shadow forward renderer with HDR tone mapping
#[derive(Debug)]
pub struct SceneRenderer {
    config: RendererConfig,

    classifier: GeometryClassifier,
    splits: Vec<CascadeSplit>,
    far_planes: Vec<f32>,
    light_matrices: Vec<Mat4>,

    shadow_pass: ShadowPass,
    scene_pass: ScenePass,
    tonemap_pass: TonemapPass,
    debug_pass: DebugViewPass,

    shadow_maps: ShadowMaps,
    scene_target: SizedTarget,
    debug_target: SizedTarget,
    fallback: FallbackTextures,
    fullscreen_quad: VertexArrayHandle,
}

impl SceneRenderer {
    /// Build programs and fixed-size resources
    ///
    /// Viewport-sized targets are created lazily by the first frame.
    pub fn new(ctx: &mut dyn GraphicsContext, config: RendererConfig) -> RenderResult<Self> {
        config
            .validate()
            .map_err(|e| RenderError::InitializationFailed(e.to_string()))?;

        let shadow_pass = ShadowPass::new(ctx, &config.shaders)?;
        let scene_pass = ScenePass::new(ctx, &config.shaders, &config.scene)?;
        let tonemap_pass = TonemapPass::new(ctx, &config.shaders)?;
        let debug_pass = DebugViewPass::new(ctx, &config.shaders)?;

        let shadow_maps = ShadowMaps::create(ctx, config.shadows.map_size, cascade_layers(&config)?)?;
        let fallback = FallbackTextures::create(ctx)?;
        let fullscreen_quad = ctx.create_empty_vertex_array()?;

        log::info!(
            "Scene renderer ready: {} cascades at {}x{}, shadows {}",
            config.shadows.cascade_count,
            config.shadows.map_size,
            config.shadows.map_size,
            if config.shadows.enabled { "on" } else { "off" }
        );

        Ok(Self {
            classifier: GeometryClassifier::new(),
            splits: Vec::with_capacity(config.shadows.cascade_count),
            far_planes: Vec::with_capacity(config.shadows.cascade_count),
            light_matrices: Vec::with_capacity(config.shadows.cascade_count),
            config,
            shadow_pass,
            scene_pass,
            tonemap_pass,
            debug_pass,
            shadow_maps,
            scene_target: SizedTarget::new(TargetLayout::SCENE),
            debug_target: SizedTarget::new(TargetLayout::DEBUG_VIEW),
            fallback,
            fullscreen_quad,
        })
    }

    /// Current configuration
    pub fn config(&self) -> &RendererConfig {
        &self.config
    }

    /// Replace the configuration
    ///
    /// The shadow map array is rebuilt when its size or cascade count changed;
    /// everything else takes effect on the next frame.
    pub fn apply_config(&mut self, ctx: &mut dyn GraphicsContext, config: RendererConfig) -> RenderResult<()> {
        config
            .validate()
            .map_err(|e| RenderError::InitializationFailed(e.to_string()))?;

        if config.shaders != self.config.shaders {
            log::warn!("Shader paths changed at runtime; the new paths apply to a new renderer only");
        }

        let layers = cascade_layers(&config)?;
        if config.shadows.map_size != self.shadow_maps.size() || layers != self.shadow_maps.layers() {
            let maps = ShadowMaps::create(ctx, config.shadows.map_size, layers)?;
            let previous = std::mem::replace(&mut self.shadow_maps, maps);
            previous.release(ctx);
            log::debug!(
                "Shadow maps rebuilt: {} cascades at {}x{}",
                layers,
                config.shadows.map_size,
                config.shadows.map_size
            );
        }

        self.scene_pass.set_sky_color(config.scene.sky_color);
        self.config = config;
        Ok(())
    }

    /// Toggle shadow rendering
    pub fn set_shadows_enabled(&mut self, enabled: bool) {
        self.config.shadows.enabled = enabled;
    }

    /// Change the tone mapping exposure
    pub fn set_exposure(&mut self, exposure: f32) {
        self.config.tonemap.exposure = exposure;
    }

    /// Render one frame into `output` (`None` = default surface)
    ///
    /// # Panics
    /// When the view's planes do not satisfy `0 < near < far`.
    pub fn render(
        &mut self,
        ctx: &mut dyn GraphicsContext,
        scene: &SceneRenderInfo<'_>,
        view: &ViewRenderInfo,
        output: Option<FramebufferHandle>,
    ) -> RenderResult<FrameStats> {
        self.classifier.classify(scene.meshes());

        let shadows = &self.config.shadows;
        compute_cascade_splits_into(
            view.near_plane,
            view.far_plane,
            shadows.cascade_count,
            shadows.split_lambda,
            &mut self.splits,
        );
        self.far_planes.clear();
        self.far_planes.extend(self.splits.iter().map(|split| split.far));

        let shadow_light = scene.directional_light().filter(|_| shadows.enabled);
        let shadow = match shadow_light {
            Some(light) => {
                let frustum = CascadeFrustum {
                    view_matrix: view.view_matrix,
                    fov: view.fov,
                    aspect_ratio: view.aspect_ratio,
                };
                light_space_matrices_into(
                    &frustum,
                    &self.splits,
                    &light.direction(),
                    shadows.z_multiplier,
                    &mut self.light_matrices,
                );
                Some(self.shadow_pass.execute(
                    ctx,
                    &self.shadow_maps,
                    &ShadowPassInput {
                        meshes: scene.meshes(),
                        opaque: self.classifier.opaque(),
                        transparent: self.classifier.transparent(),
                        light_space_matrices: &self.light_matrices,
                    },
                ))
            }
            None => {
                log::trace!("Shadow pass skipped");
                None
            }
        };

        let recreations = self.scene_target.recreations();
        let target = self
            .scene_target
            .ensure(ctx, view.viewport.width, view.viewport.height)?;
        let hdr_color = self
            .scene_target
            .color_texture()
            .ok_or_else(|| RenderError::ResourceCreationFailed("scene target has no color attachment".to_string()))?;

        let scene_stats = self.scene_pass.execute(
            ctx,
            target,
            &self.fallback,
            &ScenePassInput {
                scene,
                view,
                opaque: self.classifier.opaque(),
                transparent: self.classifier.transparent(),
                shadows: ShadowInput {
                    enabled: shadow.is_some(),
                    texture: self.shadow_maps.texture(),
                    cascade_far_planes: &self.far_planes,
                    light_space_matrices: &self.light_matrices,
                    settings: &self.config.shadows,
                },
            },
        );

        self.tonemap_pass.execute(
            ctx,
            output,
            view.viewport,
            hdr_color,
            self.fullscreen_quad,
            self.config.tonemap.exposure,
        );

        Ok(FrameStats {
            opaque_meshes: self.classifier.opaque().len(),
            transparent_meshes: self.classifier.transparent().len(),
            cascades: self.splits.len(),
            shadow,
            scene: scene_stats,
            scene_target_recreated: self.scene_target.recreations() != recreations,
        })
    }

    /// Render shadow cascade `cascade` as a grayscale image
    ///
    /// Out-of-range indices show the last cascade. Returns the color texture
    /// of the debug target, which stays valid until the next call with a
    /// different size.
    pub fn render_cascade_debug(
        &mut self,
        ctx: &mut dyn GraphicsContext,
        width: u32,
        height: u32,
        cascade: usize,
    ) -> RenderResult<TextureHandle> {
        let last = self.shadow_maps.layers() - 1;
        let layer = u32::try_from(cascade).map_or(last, |c| c.min(last));

        let target = self.debug_target.ensure(ctx, width, height)?;
        let (texture, size) = self
            .debug_target
            .color_texture()
            .zip(self.debug_target.size())
            .ok_or_else(|| RenderError::ResourceCreationFailed("debug target has no color attachment".to_string()))?;

        self.debug_pass
            .execute(ctx, target, size, self.shadow_maps.texture(), layer, self.fullscreen_quad);
        Ok(texture)
    }

    /// Cascade ranges of the last frame
    pub fn cascade_splits(&self) -> &[CascadeSplit] {
        &self.splits
    }

    /// Light-space matrices of the last frame that rendered shadows
    pub fn light_space_matrices(&self) -> &[Mat4] {
        &self.light_matrices
    }

    /// Shadow map array
    pub fn shadow_texture(&self) -> TextureHandle {
        self.shadow_maps.texture()
    }

    /// HDR scene framebuffer, once the first frame created it
    pub fn scene_framebuffer(&self) -> Option<FramebufferHandle> {
        self.scene_target.framebuffer()
    }

    /// Size of the HDR scene target
    pub fn scene_target_size(&self) -> Option<(u32, u32)> {
        self.scene_target.size()
    }

    /// Release every resource the renderer created
    pub fn destroy(mut self, ctx: &mut dyn GraphicsContext) {
        self.scene_target.release(ctx);
        self.debug_target.release(ctx);
        self.shadow_maps.release(ctx);
        self.fallback.release(ctx);
        ctx.release_vertex_array(self.fullscreen_quad);

        self.shadow_pass.release(ctx);
        self.scene_pass.release(ctx);
        self.tonemap_pass.release(ctx);
        self.debug_pass.release(ctx);
        log::debug!("Scene renderer resources released");
    }
}

fn cascade_layers(config: &RendererConfig) -> RenderResult<u32> {
    u32::try_from(config.shadows.cascade_count).map_err(|_| {
        RenderError::InitializationFailed(format!(
            "{} shadow cascades do not fit a texture array",
            config.shadows.cascade_count
        ))
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::foundation::math::{Mat4Ext, Vec3};
    use crate::render::api::ViewportInfo;
    use crate::render::backends::headless::HeadlessContext;

    #[test]
    fn test_invalid_config_is_rejected() {
        let mut ctx = HeadlessContext::new();
        let result = SceneRenderer::new(&mut ctx, RendererConfig::default().with_cascade_count(0));
        assert!(matches!(result, Err(RenderError::InitializationFailed(_))));
    }

    #[test]
    fn test_creation_failure_propagates() {
        let mut ctx = HeadlessContext::new();
        ctx.set_creation_failure(true);
        assert!(SceneRenderer::new(&mut ctx, RendererConfig::default()).is_err());
    }

    #[test]
    fn test_apply_config_rebuilds_shadow_maps_only_on_change() {
        let mut ctx = HeadlessContext::new();
        let mut renderer = SceneRenderer::new(&mut ctx, RendererConfig::default()).unwrap();
        let original = renderer.shadow_texture();

        renderer
            .apply_config(&mut ctx, RendererConfig::default().with_exposure(0.5))
            .unwrap();
        assert_eq!(renderer.shadow_texture(), original);

        renderer
            .apply_config(&mut ctx, RendererConfig::default().with_cascade_count(2))
            .unwrap();
        assert_ne!(renderer.shadow_texture(), original);
        assert!(!ctx.is_live_texture(original));
        assert_eq!(ctx.texture_info(renderer.shadow_texture()).unwrap().layers, 2);
    }

    #[test]
    fn test_destroy_releases_owned_resources() {
        let mut ctx = HeadlessContext::new();
        let renderer = SceneRenderer::new(&mut ctx, RendererConfig::default().with_shadow_map_size(64)).unwrap();
        assert!(ctx.live_textures() > 0);
        assert_eq!(ctx.live_shaders(), 5);
        assert_eq!(ctx.live_vertex_arrays(), 1);

        renderer.destroy(&mut ctx);
        assert_eq!(ctx.live_textures(), 0);
        assert_eq!(ctx.live_framebuffers(), 0);
        assert_eq!(ctx.live_shaders(), 0);
        assert_eq!(ctx.live_vertex_arrays(), 0);
        assert_eq!(ctx.stats().invalid_operations, 0);
    }

    #[test]
    fn test_destroy_after_frames_leaves_nothing_behind() {
        let mut ctx = HeadlessContext::new();
        let mut renderer = SceneRenderer::new(&mut ctx, RendererConfig::default().with_shadow_map_size(64)).unwrap();
        let frame = SceneRenderInfo::new();
        let view = ViewRenderInfo::perspective(
            Mat4::look_at(Vec3::new(0.0, 2.0, 8.0), Vec3::zeros(), Vec3::y()),
            ViewportInfo::new(320, 200),
            1.0,
            0.1,
            50.0,
        );
        renderer.render(&mut ctx, &frame, &view, None).unwrap();
        renderer.render_cascade_debug(&mut ctx, 64, 64, 1).unwrap();

        renderer.destroy(&mut ctx);

        let stats = ctx.stats();
        assert_eq!(stats.shaders_released, stats.shaders_created);
        assert_eq!(stats.vertex_arrays_released, stats.vertex_arrays_created);
        assert_eq!(stats.textures_released, stats.textures_created);
        assert_eq!(stats.framebuffers_released, stats.framebuffers_created);
        assert_eq!(ctx.bound_shader(), None);
    }
}
