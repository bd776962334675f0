//! Renderable mesh and material descriptions
//!
//! The renderer does not own vertex data or textures. A [`Mesh`] is a pair of
//! a geometry handle (already uploaded by the asset layer) and a [`Material`]
//! describing how the scene and shadow passes shade it.

use crate::foundation::math::Vec3;
use crate::render::api::{GeometryHandle, TextureHandle};

/// Surface description consumed by the scene and shadow passes
#[derive(Debug, Clone, PartialEq)]
pub struct Material {
    /// Flat diffuse color, used when no diffuse texture is present
    pub diffuse_color: Vec3,
    /// Diffuse (albedo) texture
    pub diffuse_texture: Option<TextureHandle>,
    /// Tangent-space normal map
    pub normal_texture: Option<TextureHandle>,
    /// Blinn-Phong specular exponent
    pub specular_power: f32,
    /// Alpha-tested geometry; routed to the transparent bin
    pub transparent: bool,
}

impl Default for Material {
    fn default() -> Self {
        Self {
            diffuse_color: Vec3::new(0.6, 0.6, 0.6),
            diffuse_texture: None,
            normal_texture: None,
            specular_power: 32.0,
            transparent: false,
        }
    }
}

impl Material {
    /// Untextured opaque material with a flat color
    pub fn flat(diffuse_color: Vec3) -> Self {
        Self {
            diffuse_color,
            ..Default::default()
        }
    }

    /// Set the diffuse texture
    pub fn with_diffuse_texture(mut self, texture: TextureHandle) -> Self {
        self.diffuse_texture = Some(texture);
        self
    }

    /// Set the normal map
    pub fn with_normal_texture(mut self, texture: TextureHandle) -> Self {
        self.normal_texture = Some(texture);
        self
    }

    /// Set the specular exponent
    pub fn with_specular_power(mut self, power: f32) -> Self {
        self.specular_power = power;
        self
    }

    /// Mark the material as transparent (alpha tested)
    pub fn with_transparency(mut self, transparent: bool) -> Self {
        self.transparent = transparent;
        self
    }

    /// Whether the material is transparent
    pub fn is_transparent(&self) -> bool {
        self.transparent
    }
}

/// Drawable geometry with its material
#[derive(Debug, Clone, PartialEq)]
pub struct Mesh {
    /// Uploaded vertex/index data
    pub geometry: GeometryHandle,
    /// Surface description
    pub material: Material,
}

impl Mesh {
    /// Create a mesh from geometry and material
    pub fn new(geometry: GeometryHandle, material: Material) -> Self {
        Self { geometry, material }
    }
}
