//! Lit scene pass
//!
//! Shades every mesh instance with Blinn-Phong lighting from up to
//! [`MAX_POINT_LIGHTS`] point lights and the directional light, sampling the
//! cascaded shadow maps, into the HDR scene target.
//!
//! Texture units: the shadow array sits on unit 0, material textures follow
//! on the next units. Materials without a texture get the white fallback
//! bound and a `*_tex_enabled = false` flag so every sampler stays valid.

use crate::core::{ScenePassConfig, ShadowConfig, ShaderConfig};
use crate::foundation::math::{Mat4, Vec3};
use crate::render::api::{
    ClearFlags, FramebufferHandle, GraphicsContext, MeshInstance, SceneRenderInfo, ShaderHandle, TextureHandle,
    UniformLocation, UniformValue, ViewRenderInfo,
};
use crate::render::resources::FallbackTextures;
use crate::render::systems::lighting::{DirectionalLight, PointLight, MAX_POINT_LIGHTS};

use super::{build_shader, require_uniform};
use crate::render::RenderResult;

/// Unit of the shadow map array
pub const SHADOW_TEXTURE_UNIT: u32 = 0;
/// Unit of the diffuse texture
pub const DIFFUSE_TEXTURE_UNIT: u32 = SHADOW_TEXTURE_UNIT + 1;
/// Unit of the normal map
pub const NORMAL_TEXTURE_UNIT: u32 = DIFFUSE_TEXTURE_UNIT + 1;

const LABEL: &str = "mesh";

#[derive(Debug, Clone, Copy)]
struct PointLightUniforms {
    position: UniformLocation,
    ambient: UniformLocation,
    diffuse: UniformLocation,
    specular: UniformLocation,
    constant: UniformLocation,
    linear: UniformLocation,
    quadratic: UniformLocation,
}

impl PointLightUniforms {
    fn resolve(ctx: &dyn GraphicsContext, shader: ShaderHandle, index: usize) -> Self {
        let field = |name: &str| require_uniform(ctx, shader, LABEL, &format!("point_lights[{index}].{name}"));
        Self {
            position: field("position"),
            ambient: field("ambient"),
            diffuse: field("diffuse"),
            specular: field("specular"),
            constant: field("constant"),
            linear: field("linear"),
            quadratic: field("quadratic"),
        }
    }

    fn apply(&self, ctx: &mut dyn GraphicsContext, light: &PointLight) {
        ctx.set_uniform(self.position, UniformValue::Vec3(light.position));
        ctx.set_uniform(self.ambient, UniformValue::Vec3(light.ambient));
        ctx.set_uniform(self.diffuse, UniformValue::Vec3(light.diffuse));
        ctx.set_uniform(self.specular, UniformValue::Vec3(light.specular));
        ctx.set_uniform(self.constant, UniformValue::Float(light.constant));
        ctx.set_uniform(self.linear, UniformValue::Float(light.linear));
        ctx.set_uniform(self.quadratic, UniformValue::Float(light.quadratic));
    }
}

#[derive(Debug, Clone, Copy)]
struct DirectionalLightUniforms {
    enabled: UniformLocation,
    direction: UniformLocation,
    direction_view_space: UniformLocation,
    ambient: UniformLocation,
    diffuse: UniformLocation,
    specular: UniformLocation,
}

#[derive(Debug, Clone, Copy)]
struct ShadowUniforms {
    enabled: UniformLocation,
    cascade_far_planes: UniformLocation,
    light_space_matrices: UniformLocation,
    cascade_count: UniformLocation,
    soft_shadows: UniformLocation,
    bias_min: UniformLocation,
    light_size: UniformLocation,
    show_cascades: UniformLocation,
    shadow_tex: UniformLocation,
}

#[derive(Debug, Clone, Copy)]
struct MaterialUniforms {
    diffuse_tex: UniformLocation,
    diffuse_tex_enabled: UniformLocation,
    diffuse_color: UniformLocation,
    normal_tex: UniformLocation,
    normal_tex_enabled: UniformLocation,
    specular_power: UniformLocation,
}

/// Shadow data handed from the shadow stage to the scene pass
#[derive(Debug, Clone, Copy)]
pub struct ShadowInput<'f> {
    /// Whether shadows were rendered this frame
    pub enabled: bool,
    /// Shadow map array, bound even when shadows are off
    pub texture: TextureHandle,
    /// Far distance of each cascade
    pub cascade_far_planes: &'f [f32],
    /// Light-space matrix of each cascade
    pub light_space_matrices: &'f [Mat4],
    /// Quality settings
    pub settings: &'f ShadowConfig,
}

/// Frame data consumed by [`ScenePass::execute`]
#[derive(Debug, Clone, Copy)]
pub struct ScenePassInput<'f, 'a> {
    /// Frame content
    pub scene: &'f SceneRenderInfo<'a>,
    /// Camera
    pub view: &'f ViewRenderInfo,
    /// Indices of opaque instances
    pub opaque: &'f [usize],
    /// Indices of transparent instances, drawn after the opaque ones
    pub transparent: &'f [usize],
    /// Shadow data
    pub shadows: ShadowInput<'f>,
}

/// Counts of one scene pass
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ScenePassStats {
    /// Mesh instances drawn
    pub mesh_draws: usize,
    /// Point lights shaded
    pub point_lights: usize,
}

/// Forward lighting pass into the HDR target
#[derive(Debug)]
pub struct ScenePass {
    shader: ShaderHandle,
    projection_matrix: UniformLocation,
    view_matrix: UniformLocation,
    model_matrix: UniformLocation,
    point_light_count: UniformLocation,
    point_lights: Vec<PointLightUniforms>,
    directional: DirectionalLightUniforms,
    shadow: ShadowUniforms,
    material: MaterialUniforms,
    sky_color: Vec3,
}

impl ScenePass {
    /// Build the mesh program and resolve every uniform it is fed
    pub fn new(ctx: &mut dyn GraphicsContext, shaders: &ShaderConfig, config: &ScenePassConfig) -> RenderResult<Self> {
        let shader = build_shader(ctx, LABEL, &shaders.mesh)?;
        let ctx: &dyn GraphicsContext = ctx;
        let uniform = |name: &str| require_uniform(ctx, shader, LABEL, name);

        let point_lights = (0..MAX_POINT_LIGHTS)
            .map(|index| PointLightUniforms::resolve(ctx, shader, index))
            .collect();

        let directional = DirectionalLightUniforms {
            enabled: uniform("directional_light_enabled"),
            direction: uniform("directional_light.direction"),
            direction_view_space: uniform("directional_light.direction_view_space"),
            ambient: uniform("directional_light.ambient"),
            diffuse: uniform("directional_light.diffuse"),
            specular: uniform("directional_light.specular"),
        };

        let shadow = ShadowUniforms {
            enabled: uniform("shadows_enabled"),
            cascade_far_planes: uniform("cascade_far_planes"),
            light_space_matrices: uniform("light_space_matrices"),
            cascade_count: uniform("cascade_count"),
            soft_shadows: uniform("soft_shadows"),
            bias_min: uniform("shadow_bias_min"),
            light_size: uniform("light_size"),
            show_cascades: uniform("show_cascades"),
            shadow_tex: uniform("shadow_tex"),
        };

        let material = MaterialUniforms {
            diffuse_tex: uniform("diffuse_tex"),
            diffuse_tex_enabled: uniform("diffuse_tex_enabled"),
            diffuse_color: uniform("diffuse_color"),
            normal_tex: uniform("normal_tex"),
            normal_tex_enabled: uniform("normal_tex_enabled"),
            specular_power: uniform("specular_power"),
        };

        Ok(Self {
            shader,
            projection_matrix: uniform("projection_matrix"),
            view_matrix: uniform("view_matrix"),
            model_matrix: uniform("model_matrix"),
            point_light_count: uniform("point_light_count"),
            point_lights,
            directional,
            shadow,
            material,
            sky_color: config.sky_color,
        })
    }

    /// Change the clear color
    pub fn set_sky_color(&mut self, color: Vec3) {
        self.sky_color = color;
    }

    /// Release the program
    pub fn release(&self, ctx: &mut dyn GraphicsContext) {
        ctx.release_shader(self.shader);
    }

    /// Draw the frame into `target`
    ///
    /// `target` must already match the view's viewport size; the viewport
    /// offset only applies when tone mapping into the output.
    pub fn execute(
        &self,
        ctx: &mut dyn GraphicsContext,
        target: FramebufferHandle,
        fallback: &FallbackTextures,
        input: &ScenePassInput<'_, '_>,
    ) -> ScenePassStats {
        let viewport = input.view.viewport;
        ctx.bind_framebuffer(Some(target));
        ctx.set_viewport(0, 0, viewport.width.max(1), viewport.height.max(1));
        ctx.set_clear_color(self.sky_color.push(1.0));
        ctx.clear(ClearFlags::COLOR | ClearFlags::DEPTH);

        ctx.bind_shader(Some(self.shader));
        ctx.set_uniform(self.projection_matrix, UniformValue::Mat4(input.view.projection_matrix));
        ctx.set_uniform(self.view_matrix, UniformValue::Mat4(input.view.view_matrix));

        let point_lights = self.apply_point_lights(ctx, input.scene.point_lights());
        self.apply_directional_light(ctx, input.scene.directional_light(), &input.view.view_matrix);
        self.apply_shadows(ctx, &input.shadows);

        ctx.set_uniform(self.material.diffuse_tex, UniformValue::Int(DIFFUSE_TEXTURE_UNIT as i32));
        ctx.set_uniform(self.material.normal_tex, UniformValue::Int(NORMAL_TEXTURE_UNIT as i32));

        let meshes = input.scene.meshes();
        let mut mesh_draws = 0;
        for &index in input.opaque.iter().chain(input.transparent) {
            self.draw_instance(ctx, fallback, &meshes[index]);
            mesh_draws += 1;
        }

        log::trace!("Scene pass: {mesh_draws} meshes, {point_lights} point lights");
        ScenePassStats {
            mesh_draws,
            point_lights,
        }
    }

    fn apply_point_lights(&self, ctx: &mut dyn GraphicsContext, lights: &[PointLight]) -> usize {
        // Lights past the cap are dropped without a warning
        let count = lights.len().min(MAX_POINT_LIGHTS);
        ctx.set_uniform(self.point_light_count, UniformValue::Int(count as i32));
        for (light, uniforms) in lights.iter().zip(&self.point_lights) {
            uniforms.apply(ctx, light);
        }
        count
    }

    fn apply_directional_light(&self, ctx: &mut dyn GraphicsContext, light: Option<&DirectionalLight>, view: &Mat4) {
        let uniforms = &self.directional;
        let Some(light) = light else {
            ctx.set_uniform(uniforms.enabled, UniformValue::Bool(false));
            return;
        };

        let direction = light.direction();
        let direction_view_space = (view * direction.push(0.0))
            .xyz()
            .try_normalize(f32::EPSILON)
            .unwrap_or(direction);

        ctx.set_uniform(uniforms.enabled, UniformValue::Bool(true));
        ctx.set_uniform(uniforms.direction, UniformValue::Vec3(direction));
        ctx.set_uniform(uniforms.direction_view_space, UniformValue::Vec3(direction_view_space));
        ctx.set_uniform(uniforms.ambient, UniformValue::Vec3(light.ambient));
        ctx.set_uniform(uniforms.diffuse, UniformValue::Vec3(light.diffuse));
        ctx.set_uniform(uniforms.specular, UniformValue::Vec3(light.specular));
    }

    fn apply_shadows(&self, ctx: &mut dyn GraphicsContext, shadows: &ShadowInput<'_>) {
        let uniforms = &self.shadow;

        ctx.bind_texture(SHADOW_TEXTURE_UNIT, shadows.texture);
        ctx.set_uniform(uniforms.shadow_tex, UniformValue::Int(SHADOW_TEXTURE_UNIT as i32));
        ctx.set_uniform(uniforms.enabled, UniformValue::Bool(shadows.enabled));
        if !shadows.enabled {
            return;
        }

        ctx.set_uniform(uniforms.cascade_count, UniformValue::Int(shadows.cascade_far_planes.len() as i32));
        ctx.set_uniform(uniforms.cascade_far_planes, UniformValue::FloatArray(shadows.cascade_far_planes));
        ctx.set_uniform(uniforms.light_space_matrices, UniformValue::Mat4Array(shadows.light_space_matrices));
        ctx.set_uniform(uniforms.soft_shadows, UniformValue::Bool(shadows.settings.soft_shadows));
        ctx.set_uniform(uniforms.bias_min, UniformValue::Float(shadows.settings.bias_min));
        ctx.set_uniform(uniforms.light_size, UniformValue::Float(shadows.settings.light_size));
        ctx.set_uniform(uniforms.show_cascades, UniformValue::Bool(shadows.settings.show_cascades));
    }

    fn draw_instance(&self, ctx: &mut dyn GraphicsContext, fallback: &FallbackTextures, instance: &MeshInstance<'_>) {
        let material = &instance.mesh.material;
        let uniforms = &self.material;

        let diffuse = material.diffuse_texture.unwrap_or(fallback.white());
        ctx.bind_texture(DIFFUSE_TEXTURE_UNIT, diffuse);
        ctx.set_uniform(uniforms.diffuse_tex_enabled, UniformValue::Bool(material.diffuse_texture.is_some()));
        ctx.set_uniform(uniforms.diffuse_color, UniformValue::Vec3(material.diffuse_color));

        let normal = material.normal_texture.unwrap_or(fallback.white());
        ctx.bind_texture(NORMAL_TEXTURE_UNIT, normal);
        ctx.set_uniform(uniforms.normal_tex_enabled, UniformValue::Bool(material.normal_texture.is_some()));

        ctx.set_uniform(uniforms.specular_power, UniformValue::Float(material.specular_power));
        ctx.set_uniform(self.model_matrix, UniformValue::Mat4(instance.model_matrix));
        ctx.draw_geometry(instance.mesh.geometry);
    }
}
