//! Fallback textures bound in place of missing material textures

use image::{Rgb, RgbImage};

use crate::render::api::{FilterMode, GraphicsContext, TextureDescriptor, TextureFormat, TextureHandle};
use crate::render::RenderResult;

/// 1x1 opaque white texture
///
/// Bound wherever a material has no texture of its own so that every sampler
/// in the scene shader always has a valid binding.
#[derive(Debug, Clone, Copy)]
pub struct FallbackTextures {
    white: TextureHandle,
}

impl FallbackTextures {
    /// Upload the fallback textures
    pub fn create(ctx: &mut dyn GraphicsContext) -> RenderResult<Self> {
        let white = RgbImage::from_pixel(1, 1, Rgb([255, 255, 255]));
        let white = ctx.create_texture(&TextureDescriptor {
            label: "fallback_white",
            width: white.width(),
            height: white.height(),
            format: TextureFormat::Rgb8,
            filter: FilterMode::Nearest,
            data: Some(white.as_raw()),
        })?;

        Ok(Self { white })
    }

    /// The white texture
    pub fn white(&self) -> TextureHandle {
        self.white
    }

    /// Release all fallback textures
    pub fn release(self, ctx: &mut dyn GraphicsContext) {
        ctx.release_texture(self.white);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::render::backends::headless::HeadlessContext;

    #[test]
    fn test_white_texture_is_one_opaque_texel() {
        let mut ctx = HeadlessContext::new();
        let fallback = FallbackTextures::create(&mut ctx).unwrap();

        let info = ctx.texture_info(fallback.white()).unwrap();
        assert_eq!((info.width, info.height), (1, 1));
        assert_eq!(info.format, TextureFormat::Rgb8);
        assert_eq!(info.data.as_deref(), Some(&[255u8, 255, 255][..]));
    }
}
