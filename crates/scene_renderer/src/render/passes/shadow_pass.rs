//! Cascaded shadow map pass
//!
//! Renders scene depth from the directional light into every layer of the
//! shadow map array. The depth shader fans each triangle out to all cascades
//! in its geometry stage, so one draw per mesh covers every layer.
//!
//! Opaque casters are drawn with front faces culled, which moves the stored
//! depth to the back side of closed meshes and keeps their lit side free of
//! acne. Alpha-tested casters are drawn with back-face culling and discard
//! texels by the alpha of their diffuse texture.

use crate::core::ShaderConfig;
use crate::foundation::math::Mat4;
use crate::render::api::{ClearFlags, CullFace, GraphicsContext, MeshInstance, ShaderHandle, UniformLocation, UniformValue};
use crate::render::resources::ShadowMaps;
use crate::render::RenderResult;

use super::{build_shader, require_uniform};

/// Texture unit the alpha-test shader samples the diffuse texture from
pub const SHADOW_ALPHA_TEXTURE_UNIT: u32 = 1;

const DEPTH_LABEL: &str = "shadow_map";
const ALPHA_LABEL: &str = "shadow_map_transparent";

#[derive(Debug, Clone, Copy)]
struct DepthUniforms {
    light_space_matrices: UniformLocation,
    cascade_count: UniformLocation,
    model_matrix: UniformLocation,
}

#[derive(Debug, Clone, Copy)]
struct AlphaUniforms {
    light_space_matrices: UniformLocation,
    cascade_count: UniformLocation,
    model_matrix: UniformLocation,
    tex: UniformLocation,
}

/// Frame data consumed by [`ShadowPass::execute`]
#[derive(Debug, Clone, Copy)]
pub struct ShadowPassInput<'f, 'a> {
    /// All mesh instances of the frame
    pub meshes: &'f [MeshInstance<'a>],
    /// Indices of opaque instances
    pub opaque: &'f [usize],
    /// Indices of transparent instances
    pub transparent: &'f [usize],
    /// One light-space matrix per cascade
    pub light_space_matrices: &'f [Mat4],
}

/// Draw counts of one shadow pass
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ShadowPassStats {
    /// Opaque casters drawn
    pub opaque_draws: usize,
    /// Alpha-tested casters drawn
    pub transparent_draws: usize,
    /// Transparent instances skipped for lack of a diffuse texture
    pub transparent_skipped: usize,
}

/// Depth-only pass into the cascade array
#[derive(Debug)]
pub struct ShadowPass {
    depth_shader: ShaderHandle,
    depth: DepthUniforms,
    alpha_shader: ShaderHandle,
    alpha: AlphaUniforms,
}

impl ShadowPass {
    /// Build both shadow programs and resolve their uniforms
    pub fn new(ctx: &mut dyn GraphicsContext, shaders: &ShaderConfig) -> RenderResult<Self> {
        let depth_shader = build_shader(ctx, DEPTH_LABEL, &shaders.shadow_map)?;
        let alpha_shader = build_shader(ctx, ALPHA_LABEL, &shaders.shadow_map_transparent)?;

        let depth = DepthUniforms {
            light_space_matrices: require_uniform(ctx, depth_shader, DEPTH_LABEL, "light_space_matrices"),
            cascade_count: require_uniform(ctx, depth_shader, DEPTH_LABEL, "cascade_count"),
            model_matrix: require_uniform(ctx, depth_shader, DEPTH_LABEL, "model_matrix"),
        };
        let alpha = AlphaUniforms {
            light_space_matrices: require_uniform(ctx, alpha_shader, ALPHA_LABEL, "light_space_matrices"),
            cascade_count: require_uniform(ctx, alpha_shader, ALPHA_LABEL, "cascade_count"),
            model_matrix: require_uniform(ctx, alpha_shader, ALPHA_LABEL, "model_matrix"),
            tex: require_uniform(ctx, alpha_shader, ALPHA_LABEL, "tex"),
        };

        Ok(Self {
            depth_shader,
            depth,
            alpha_shader,
            alpha,
        })
    }

    /// Release both programs
    pub fn release(&self, ctx: &mut dyn GraphicsContext) {
        ctx.release_shader(self.depth_shader);
        ctx.release_shader(self.alpha_shader);
    }

    /// Render all casters into `maps`
    ///
    /// Leaves back-face culling active.
    ///
    /// # Panics
    /// When the number of light-space matrices differs from the layer count.
    pub fn execute(&self, ctx: &mut dyn GraphicsContext, maps: &ShadowMaps, input: &ShadowPassInput<'_, '_>) -> ShadowPassStats {
        assert_eq!(
            input.light_space_matrices.len(),
            maps.layers() as usize,
            "one light-space matrix per shadow cascade"
        );
        log::trace!(
            "Shadow pass: {} opaque, {} transparent casters",
            input.opaque.len(),
            input.transparent.len()
        );

        let mut stats = ShadowPassStats::default();
        // Geometry invocations past this count emit nothing
        let cascade_count = UniformValue::Int(maps.layers() as i32);

        ctx.bind_framebuffer(Some(maps.framebuffer()));
        ctx.set_viewport(0, 0, maps.size(), maps.size());
        ctx.clear(ClearFlags::DEPTH);

        ctx.set_cull_face(CullFace::Front);
        ctx.bind_shader(Some(self.depth_shader));
        ctx.set_uniform(
            self.depth.light_space_matrices,
            UniformValue::Mat4Array(input.light_space_matrices),
        );
        ctx.set_uniform(self.depth.cascade_count, cascade_count);
        for &index in input.opaque {
            let instance = &input.meshes[index];
            ctx.set_uniform(self.depth.model_matrix, UniformValue::Mat4(instance.model_matrix));
            ctx.draw_geometry(instance.mesh.geometry);
            stats.opaque_draws += 1;
        }

        ctx.set_cull_face(CullFace::Back);
        if !input.transparent.is_empty() {
            ctx.bind_shader(Some(self.alpha_shader));
            ctx.set_uniform(
                self.alpha.light_space_matrices,
                UniformValue::Mat4Array(input.light_space_matrices),
            );
            ctx.set_uniform(self.alpha.cascade_count, cascade_count);
            ctx.set_uniform(self.alpha.tex, UniformValue::Int(SHADOW_ALPHA_TEXTURE_UNIT as i32));

            for &index in input.transparent {
                let instance = &input.meshes[index];
                let Some(texture) = instance.mesh.material.diffuse_texture else {
                    stats.transparent_skipped += 1;
                    continue;
                };
                ctx.bind_texture(SHADOW_ALPHA_TEXTURE_UNIT, texture);
                ctx.set_uniform(self.alpha.model_matrix, UniformValue::Mat4(instance.model_matrix));
                ctx.draw_geometry(instance.mesh.geometry);
                stats.transparent_draws += 1;
            }
        }

        stats
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::render::api::{GeometryHandle, TextureDescriptor, TextureFormat, FilterMode};
    use crate::render::backends::headless::{GraphicsCommand, HeadlessContext, RecordedUniform};
    use crate::render::primitives::{Material, Mesh};

    fn setup(ctx: &mut HeadlessContext, layers: u32) -> (ShadowPass, ShadowMaps) {
        let pass = ShadowPass::new(ctx, &ShaderConfig::default()).unwrap();
        let maps = ShadowMaps::create(ctx, 512, layers).unwrap();
        (pass, maps)
    }

    #[test]
    fn test_opaque_casters_use_front_face_culling() {
        let mut ctx = HeadlessContext::new();
        let (pass, maps) = setup(&mut ctx, 2);
        let mesh = Mesh::new(GeometryHandle(1), Material::default());
        let meshes = [MeshInstance::new(Mat4::identity(), &mesh)];
        let matrices = [Mat4::identity(); 2];

        let stats = pass.execute(
            &mut ctx,
            &maps,
            &ShadowPassInput {
                meshes: &meshes,
                opaque: &[0],
                transparent: &[],
                light_space_matrices: &matrices,
            },
        );

        assert_eq!(stats.opaque_draws, 1);
        let commands = ctx.commands();
        let cull_before_draw = commands
            .iter()
            .take_while(|c| !c.is_draw())
            .filter_map(|c| match c {
                GraphicsCommand::SetCullFace(face) => Some(*face),
                _ => None,
            })
            .last();
        assert_eq!(cull_before_draw, Some(CullFace::Front));
        assert_eq!(ctx.cull_face(), Some(CullFace::Back));
        assert_eq!(ctx.viewport(), (0, 0, 512, 512));
        assert_eq!(
            ctx.uniform(DEPTH_LABEL, "light_space_matrices"),
            Some(&RecordedUniform::Mat4Array(matrices.to_vec()))
        );
    }

    #[test]
    fn test_cascade_count_follows_layer_count() {
        let mut ctx = HeadlessContext::new();
        let (pass, maps) = setup(&mut ctx, 2);
        let leaves = ctx
            .create_texture(&TextureDescriptor {
                label: "leaves",
                width: 2,
                height: 2,
                format: TextureFormat::Rgba8,
                filter: FilterMode::Linear,
                data: None,
            })
            .unwrap();
        let mesh = Mesh::new(
            GeometryHandle(1),
            Material::default().with_transparency(true).with_diffuse_texture(leaves),
        );
        let meshes = [MeshInstance::new(Mat4::identity(), &mesh)];

        pass.execute(
            &mut ctx,
            &maps,
            &ShadowPassInput {
                meshes: &meshes,
                opaque: &[],
                transparent: &[0],
                light_space_matrices: &[Mat4::identity(); 2],
            },
        );

        assert_eq!(ctx.uniform(DEPTH_LABEL, "cascade_count"), Some(&RecordedUniform::Int(2)));
        assert_eq!(ctx.uniform(ALPHA_LABEL, "cascade_count"), Some(&RecordedUniform::Int(2)));
        assert_eq!(ctx.stats().invalid_operations, 0);
    }

    #[test]
    fn test_transparent_without_texture_is_skipped() {
        let mut ctx = HeadlessContext::new();
        let (pass, maps) = setup(&mut ctx, 1);
        let leaves = ctx
            .create_texture(&TextureDescriptor {
                label: "leaves",
                width: 2,
                height: 2,
                format: TextureFormat::Rgba8,
                filter: FilterMode::Linear,
                data: None,
            })
            .unwrap();

        let textured = Mesh::new(
            GeometryHandle(1),
            Material::default().with_transparency(true).with_diffuse_texture(leaves),
        );
        let bare = Mesh::new(GeometryHandle(2), Material::default().with_transparency(true));
        let meshes = [
            MeshInstance::new(Mat4::identity(), &textured),
            MeshInstance::new(Mat4::identity(), &bare),
        ];

        let stats = pass.execute(
            &mut ctx,
            &maps,
            &ShadowPassInput {
                meshes: &meshes,
                opaque: &[],
                transparent: &[0, 1],
                light_space_matrices: &[Mat4::identity()],
            },
        );

        assert_eq!(stats.transparent_draws, 1);
        assert_eq!(stats.transparent_skipped, 1);
        assert_eq!(ctx.draws_with(ALPHA_LABEL), 1);
        assert_eq!(ctx.texture_at_unit(SHADOW_ALPHA_TEXTURE_UNIT), Some(leaves));
        assert_eq!(ctx.uniform(ALPHA_LABEL, "tex"), Some(&RecordedUniform::Int(1)));
    }

    #[test]
    #[should_panic(expected = "one light-space matrix per shadow cascade")]
    fn test_matrix_count_must_match_layers() {
        let mut ctx = HeadlessContext::new();
        let (pass, maps) = setup(&mut ctx, 3);
        pass.execute(
            &mut ctx,
            &maps,
            &ShadowPassInput {
                meshes: &[],
                opaque: &[],
                transparent: &[],
                light_space_matrices: &[Mat4::identity()],
            },
        );
    }
}
