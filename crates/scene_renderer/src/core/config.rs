//! # Renderer Configuration
//!
//! All tunables of the frame pipeline live here, grouped by the pass that
//! consumes them. The structures are serde-serializable so a renderer setup
//! can be stored next to a scene as TOML or RON (see [`Config`]).
//!
//! ## Configuration Categories
//!
//! - **Shadows**: cascade count and split blend, shadow map resolution, soft
//!   shadow parameters, debug tinting
//! - **Tonemap**: exposure of the final HDR → display mapping
//! - **Scene**: sky (clear) color of the HDR target
//! - **Shaders**: file paths of every program stage the passes compile

use serde::{Serialize, Deserialize};

use crate::config::{Config, ConfigError};
use crate::foundation::math::Vec3;
use crate::render::systems::shadows::MAX_CASCADES;

/// Stage files of one shader program
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ShaderStages {
    /// Vertex stage source path
    pub vertex: String,
    /// Optional geometry stage source path
    pub geometry: Option<String>,
    /// Fragment stage source path
    pub fragment: String,
}

impl ShaderStages {
    /// Vertex + fragment program
    pub fn new(vertex: impl Into<String>, fragment: impl Into<String>) -> Self {
        Self {
            vertex: vertex.into(),
            geometry: None,
            fragment: fragment.into(),
        }
    }

    /// Vertex + geometry + fragment program
    pub fn with_geometry(
        vertex: impl Into<String>,
        geometry: impl Into<String>,
        fragment: impl Into<String>,
    ) -> Self {
        Self {
            vertex: vertex.into(),
            geometry: Some(geometry.into()),
            fragment: fragment.into(),
        }
    }
}

/// # Shader Configuration
///
/// Paths of every program used by the frame pipeline. Defaults point at the
/// GLSL sources shipped in the crate's `shaders/` directory.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ShaderConfig {
    /// Depth-only cascade shader for opaque casters
    pub shadow_map: ShaderStages,
    /// Alpha-tested cascade shader for transparent casters
    pub shadow_map_transparent: ShaderStages,
    /// Lit mesh shader of the scene pass
    pub mesh: ShaderStages,
    /// Exposure tone mapping shader
    pub tonemap: ShaderStages,
    /// Cascade layer visualisation shader
    pub depth_debug: ShaderStages,
}

impl Default for ShaderConfig {
    fn default() -> Self {
        Self {
            shadow_map: ShaderStages::with_geometry(
                "shaders/shadow_map.vert",
                "shaders/shadow_map.geom",
                "shaders/shadow_map.frag",
            ),
            shadow_map_transparent: ShaderStages::with_geometry(
                "shaders/shadow_map_transparent.vert",
                "shaders/shadow_map_transparent.geom",
                "shaders/shadow_map_transparent.frag",
            ),
            mesh: ShaderStages::new("shaders/mesh.vert", "shaders/mesh.frag"),
            tonemap: ShaderStages::new("shaders/quad.vert", "shaders/hdr.frag"),
            depth_debug: ShaderStages::new("shaders/quad.vert", "shaders/depth_debug.frag"),
        }
    }
}

/// # Shadow Configuration
///
/// Cascaded shadow map parameters. `cascade_count` and `map_size` are baked
/// into the depth texture array when the renderer is created; everything
/// else may be changed between frames.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ShadowConfig {
    /// Frame-level toggle; when off the shadow pass is skipped
    pub enabled: bool,
    /// Width and height of every cascade layer in texels
    pub map_size: u32,
    /// Number of cascades (layers of the depth texture array)
    pub cascade_count: usize,
    /// Blend between logarithmic (1.0) and uniform (0.0) splits
    pub split_lambda: f32,
    /// Light-space depth padding multiplier
    pub z_multiplier: f32,
    /// Percentage-closer soft shadows
    pub soft_shadows: bool,
    /// Minimum depth bias
    pub bias_min: f32,
    /// Light size used for softening
    pub light_size: f32,
    /// Tint fragments by the cascade they sample
    pub show_cascades: bool,
}

impl Default for ShadowConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            map_size: 4096,
            cascade_count: 4,
            split_lambda: 0.75,
            z_multiplier: 10.0,
            soft_shadows: true,
            bias_min: 0.0,
            light_size: 10.25,
            show_cascades: false,
        }
    }
}

impl ShadowConfig {
    /// Validate the shadow settings
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.cascade_count == 0 {
            return Err(ConfigError::Invalid("cascade_count must be at least 1".to_string()));
        }
        if self.cascade_count > MAX_CASCADES {
            return Err(ConfigError::Invalid(format!(
                "cascade_count {} exceeds the shader limit of {MAX_CASCADES}",
                self.cascade_count
            )));
        }
        if self.map_size == 0 {
            return Err(ConfigError::Invalid("shadow map_size must be non-zero".to_string()));
        }
        if !(0.0..=1.0).contains(&self.split_lambda) {
            return Err(ConfigError::Invalid(format!(
                "split_lambda {} outside [0, 1]",
                self.split_lambda
            )));
        }
        if self.z_multiplier < 1.0 {
            return Err(ConfigError::Invalid(format!(
                "z_multiplier {} must be >= 1",
                self.z_multiplier
            )));
        }
        Ok(())
    }
}

/// # Tonemap Configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TonemapConfig {
    /// Exposure scalar applied before the tone curve
    pub exposure: f32,
}

impl Default for TonemapConfig {
    fn default() -> Self {
        Self { exposure: 0.01 }
    }
}

/// # Scene Pass Configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScenePassConfig {
    /// HDR clear color of the scene target
    pub sky_color: Vec3,
}

impl Default for ScenePassConfig {
    fn default() -> Self {
        Self {
            sky_color: Vec3::new(30.0, 81.0, 92.0),
        }
    }
}

/// # Complete Renderer Configuration
///
/// Top-level configuration handed to [`crate::scene::SceneRenderer::new`].
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct RendererConfig {
    /// Cascaded shadow map settings
    pub shadows: ShadowConfig,
    /// Tone mapping settings
    pub tonemap: TonemapConfig,
    /// Scene pass settings
    pub scene: ScenePassConfig,
    /// Shader program paths
    pub shaders: ShaderConfig,
}

impl RendererConfig {
    /// Create the default configuration
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the number of shadow cascades
    pub fn with_cascade_count(mut self, count: usize) -> Self {
        self.shadows.cascade_count = count;
        self
    }

    /// Set the shadow map resolution per cascade
    pub fn with_shadow_map_size(mut self, size: u32) -> Self {
        self.shadows.map_size = size;
        self
    }

    /// Enable or disable the shadow pass
    pub fn with_shadows(mut self, enabled: bool) -> Self {
        self.shadows.enabled = enabled;
        self
    }

    /// Set the tone mapping exposure
    pub fn with_exposure(mut self, exposure: f32) -> Self {
        self.tonemap.exposure = exposure;
        self
    }

    /// Set the HDR sky color
    pub fn with_sky_color(mut self, color: Vec3) -> Self {
        self.scene.sky_color = color;
        self
    }

    /// Validate the entire configuration
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.shadows.validate()?;
        if self.tonemap.exposure <= 0.0 {
            return Err(ConfigError::Invalid(format!(
                "exposure {} must be positive",
                self.tonemap.exposure
            )));
        }
        Ok(())
    }
}

impl Config for RendererConfig {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_is_valid() {
        let config = RendererConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.shadows.cascade_count, 4);
        assert_eq!(config.shadows.map_size, 4096);
        assert!((config.shadows.split_lambda - 0.75).abs() < f32::EPSILON);
    }

    #[test]
    fn test_zero_cascades_rejected() {
        let config = RendererConfig::new().with_cascade_count(0);
        assert!(matches!(config.validate(), Err(ConfigError::Invalid(_))));
    }

    #[test]
    fn test_cascade_count_limited_by_shaders() {
        assert!(RendererConfig::new().with_cascade_count(MAX_CASCADES).validate().is_ok());

        let config = RendererConfig::new().with_cascade_count(MAX_CASCADES + 1);
        assert!(matches!(config.validate(), Err(ConfigError::Invalid(_))));
    }

    #[test]
    fn test_non_positive_exposure_rejected() {
        let config = RendererConfig::new().with_exposure(0.0);
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_toml_round_trip() {
        let config = RendererConfig::new()
            .with_cascade_count(3)
            .with_sky_color(Vec3::new(1.0, 2.0, 3.0));

        let text = config.to_toml_string().expect("serialize toml");
        let parsed = RendererConfig::from_toml_str(&text).expect("parse toml");
        assert_eq!(parsed, config);
    }

    #[test]
    fn test_ron_round_trip() {
        let config = RendererConfig::new().with_shadows(false).with_exposure(0.5);

        let text = config.to_ron_string().expect("serialize ron");
        let parsed = RendererConfig::from_ron_str(&text).expect("parse ron");
        assert_eq!(parsed, config);
    }

    #[test]
    fn test_unsupported_extension() {
        let result = RendererConfig::load_from_file("renderer.yaml");
        // The file does not exist, but IO happens before the format check
        assert!(result.is_err());

        let config = RendererConfig::default();
        let err = config.save_to_file("renderer.yaml").unwrap_err();
        assert!(matches!(err, ConfigError::UnsupportedFormat(_)));
    }
}
