//! Render targets owned by the renderer
//!
//! [`SizedTarget`] is a framebuffer whose attachments follow a requested size.
//! Asking for the size it already has is a no-op that hands back the same
//! handles; asking for a different size builds a complete new target first and
//! only then releases the superseded one.
//!
//! [`ShadowMaps`] is the fixed-resolution depth texture array the shadow pass
//! renders into, one layer per cascade.

use crate::render::api::{
    FilterMode, FramebufferAttachments, FramebufferHandle, GraphicsContext, TextureArrayDescriptor,
    TextureDescriptor, TextureFormat, TextureHandle,
};
use crate::render::RenderResult;

/// Attachment layout of a [`SizedTarget`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TargetLayout {
    /// Debug label, also used to derive attachment labels
    pub label: &'static str,
    /// Format of the single color attachment
    pub color_format: TextureFormat,
    /// Format of the depth attachment, if any
    pub depth_format: Option<TextureFormat>,
}

impl TargetLayout {
    /// HDR color with depth, the scene pass target
    pub const SCENE: Self = Self {
        label: "scene_hdr",
        color_format: TextureFormat::Rgba16F,
        depth_format: Some(TextureFormat::Depth24),
    };

    /// Display color without depth, the cascade debug view target
    pub const DEBUG_VIEW: Self = Self {
        label: "cascade_debug",
        color_format: TextureFormat::Rgba8,
        depth_format: None,
    };
}

#[derive(Debug, Clone, Copy)]
struct TargetResources {
    framebuffer: FramebufferHandle,
    color: TextureHandle,
    depth: Option<TextureHandle>,
    width: u32,
    height: u32,
}

impl TargetResources {
    fn create(ctx: &mut dyn GraphicsContext, layout: &TargetLayout, width: u32, height: u32) -> RenderResult<Self> {
        let color_label = format!("{}_color", layout.label);
        let color = ctx.create_texture(&TextureDescriptor {
            label: &color_label,
            width,
            height,
            format: layout.color_format,
            filter: FilterMode::Linear,
            data: None,
        })?;

        let depth = match layout.depth_format {
            Some(format) => {
                let depth_label = format!("{}_depth", layout.label);
                let created = ctx.create_texture(&TextureDescriptor {
                    label: &depth_label,
                    width,
                    height,
                    format,
                    filter: FilterMode::Nearest,
                    data: None,
                });
                match created {
                    Ok(texture) => Some(texture),
                    Err(e) => {
                        ctx.release_texture(color);
                        return Err(e);
                    }
                }
            }
            None => None,
        };

        let attachments = FramebufferAttachments {
            color: vec![color],
            depth,
        };
        let framebuffer = match ctx.create_framebuffer(&attachments) {
            Ok(framebuffer) => framebuffer,
            Err(e) => {
                ctx.release_texture(color);
                if let Some(depth) = depth {
                    ctx.release_texture(depth);
                }
                return Err(e);
            }
        };

        Ok(Self {
            framebuffer,
            color,
            depth,
            width,
            height,
        })
    }

    fn release(self, ctx: &mut dyn GraphicsContext) {
        ctx.release_framebuffer(self.framebuffer);
        ctx.release_texture(self.color);
        if let Some(depth) = self.depth {
            ctx.release_texture(depth);
        }
    }
}

/// Framebuffer lazily (re)created to match a requested size
#[derive(Debug)]
pub struct SizedTarget {
    layout: TargetLayout,
    current: Option<TargetResources>,
    recreations: u32,
}

impl SizedTarget {
    /// Create an empty target; nothing is allocated until [`Self::ensure`]
    pub fn new(layout: TargetLayout) -> Self {
        Self {
            layout,
            current: None,
            recreations: 0,
        }
    }

    /// Make sure the target exists at `width` x `height` and return its framebuffer
    ///
    /// Zero dimensions are clamped to one texel. When the cached size already
    /// matches, no graphics call is made.
    pub fn ensure(&mut self, ctx: &mut dyn GraphicsContext, width: u32, height: u32) -> RenderResult<FramebufferHandle> {
        let width = width.max(1);
        let height = height.max(1);

        if let Some(current) = &self.current {
            if current.width == width && current.height == height {
                return Ok(current.framebuffer);
            }
        }

        let created = TargetResources::create(ctx, &self.layout, width, height)?;
        log::debug!("Created {} target {}x{}", self.layout.label, width, height);

        if let Some(previous) = self.current.replace(created) {
            log::debug!(
                "Releasing superseded {} target {}x{}",
                self.layout.label,
                previous.width,
                previous.height
            );
            previous.release(ctx);
        }
        self.recreations += 1;

        Ok(created.framebuffer)
    }

    /// Framebuffer of the current target
    pub fn framebuffer(&self) -> Option<FramebufferHandle> {
        self.current.map(|t| t.framebuffer)
    }

    /// Color attachment of the current target
    pub fn color_texture(&self) -> Option<TextureHandle> {
        self.current.map(|t| t.color)
    }

    /// Depth attachment of the current target
    pub fn depth_texture(&self) -> Option<TextureHandle> {
        self.current.and_then(|t| t.depth)
    }

    /// Cached size
    pub fn size(&self) -> Option<(u32, u32)> {
        self.current.map(|t| (t.width, t.height))
    }

    /// How many times attachments were (re)built
    pub fn recreations(&self) -> u32 {
        self.recreations
    }

    /// Release the current target, if any
    pub fn release(&mut self, ctx: &mut dyn GraphicsContext) {
        if let Some(current) = self.current.take() {
            current.release(ctx);
        }
    }
}

/// Depth texture array for the shadow cascades
#[derive(Debug, Clone, Copy)]
pub struct ShadowMaps {
    texture: TextureHandle,
    framebuffer: FramebufferHandle,
    size: u32,
    layers: u32,
}

impl ShadowMaps {
    /// Allocate a `size` x `size` depth array with `layers` layers
    pub fn create(ctx: &mut dyn GraphicsContext, size: u32, layers: u32) -> RenderResult<Self> {
        assert!(size > 0, "shadow map size must be positive");
        assert!(layers > 0, "shadow map needs at least one layer");

        let texture = ctx.create_texture_array(&TextureArrayDescriptor {
            label: "shadow_cascades",
            width: size,
            height: size,
            layers,
            format: TextureFormat::Depth32F,
            filter: FilterMode::Nearest,
            // Outside the map everything is lit
            border_color: [1.0, 1.0, 1.0, 1.0],
        })?;

        let attachments = FramebufferAttachments {
            color: Vec::new(),
            depth: Some(texture),
        };
        let framebuffer = match ctx.create_framebuffer(&attachments) {
            Ok(framebuffer) => framebuffer,
            Err(e) => {
                ctx.release_texture(texture);
                return Err(e);
            }
        };

        log::debug!("Created shadow map array {size}x{size}, {layers} layers");
        Ok(Self {
            texture,
            framebuffer,
            size,
            layers,
        })
    }

    /// Depth texture array
    pub fn texture(&self) -> TextureHandle {
        self.texture
    }

    /// Framebuffer with the array as layered depth attachment
    pub fn framebuffer(&self) -> FramebufferHandle {
        self.framebuffer
    }

    /// Width and height of each layer
    pub fn size(&self) -> u32 {
        self.size
    }

    /// Number of layers (= cascades)
    pub fn layers(&self) -> u32 {
        self.layers
    }

    /// Release the array and its framebuffer
    pub fn release(self, ctx: &mut dyn GraphicsContext) {
        ctx.release_framebuffer(self.framebuffer);
        ctx.release_texture(self.texture);
    }
}
