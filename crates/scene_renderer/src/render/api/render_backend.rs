//! Graphics context abstraction
//!
//! This module defines the contract the renderer needs from the low-level
//! graphics objects (shader programs, textures, texture arrays, framebuffers).
//! The model is a single immediate-mode context: state is bound, uniforms are
//! set on the bound program, draws are issued in program order.
//!
//! Resources are referred to through opaque handles. The renderer owns the
//! handles it creates and releases them through the context; handles of
//! scene data (mesh geometry, material textures) are borrowed from the caller.

use bitflags::bitflags;

use crate::foundation::math::{Mat4, Vec3, Vec4};
use crate::render::RenderError;

/// Result type for backend operations
pub type BackendResult<T> = Result<T, RenderError>;

/// Handle to a linked shader program
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ShaderHandle(pub u64);

/// Handle to a 2D texture or a 2D texture array
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TextureHandle(pub u64);

/// Handle to a framebuffer object
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct FramebufferHandle(pub u64);

/// Handle to a vertex array object
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct VertexArrayHandle(pub u64);

/// Handle to uploaded mesh geometry owned by the caller's asset layer
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct GeometryHandle(pub u64);

/// Location of a uniform inside a specific program
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct UniformLocation {
    /// Program the location belongs to
    pub shader: ShaderHandle,
    /// Backend-specific location index
    pub index: u32,
}

/// Source files of a shader program
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ShaderSource {
    /// Debug label
    pub label: String,
    /// Vertex stage path
    pub vertex: String,
    /// Optional geometry stage path
    pub geometry: Option<String>,
    /// Fragment stage path
    pub fragment: String,
}

/// Pixel formats the renderer asks for
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TextureFormat {
    /// 8-bit RGB, used for the fallback texture
    Rgb8,
    /// 8-bit RGBA display color
    Rgba8,
    /// Half-float RGBA HDR color
    Rgba16F,
    /// 24-bit depth
    Depth24,
    /// 32-bit float depth
    Depth32F,
}

impl TextureFormat {
    /// Whether the format is a depth format
    pub fn is_depth(self) -> bool {
        matches!(self, Self::Depth24 | Self::Depth32F)
    }
}

/// Sampling filter
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FilterMode {
    /// Nearest texel
    Nearest,
    /// Bilinear
    Linear,
}

/// Description of a 2D texture
#[derive(Debug, Clone)]
pub struct TextureDescriptor<'a> {
    /// Debug label
    pub label: &'a str,
    /// Width in texels
    pub width: u32,
    /// Height in texels
    pub height: u32,
    /// Pixel format
    pub format: TextureFormat,
    /// Minification and magnification filter
    pub filter: FilterMode,
    /// Initial pixel data, tightly packed; `None` leaves the texture uninitialised
    pub data: Option<&'a [u8]>,
}

/// Description of a layered depth texture
#[derive(Debug, Clone)]
pub struct TextureArrayDescriptor<'a> {
    /// Debug label
    pub label: &'a str,
    /// Width of each layer in texels
    pub width: u32,
    /// Height of each layer in texels
    pub height: u32,
    /// Number of layers
    pub layers: u32,
    /// Pixel format
    pub format: TextureFormat,
    /// Minification and magnification filter
    pub filter: FilterMode,
    /// Color returned when sampling outside the texture
    pub border_color: [f32; 4],
}

/// Attachments of a framebuffer
#[derive(Debug, Clone, Default)]
pub struct FramebufferAttachments {
    /// Color attachments in slot order
    pub color: Vec<TextureHandle>,
    /// Depth attachment (may be a texture array for layered rendering)
    pub depth: Option<TextureHandle>,
}

bitflags! {
    /// Buffers cleared by [`GraphicsContext::clear`]
    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    pub struct ClearFlags: u32 {
        /// Color buffer
        const COLOR = 0b01;
        /// Depth buffer
        const DEPTH = 0b10;
    }
}

/// Face culling mode
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CullFace {
    /// Cull front faces
    Front,
    /// Cull back faces
    Back,
}

/// Value passed to a uniform
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum UniformValue<'a> {
    /// Boolean
    Bool(bool),
    /// Signed integer (also used for sampler units)
    Int(i32),
    /// Scalar
    Float(f32),
    /// 3-component vector
    Vec3(Vec3),
    /// 4-component vector
    Vec4(Vec4),
    /// 4x4 matrix
    Mat4(Mat4),
    /// Scalar array starting at the location
    FloatArray(&'a [f32]),
    /// Matrix array starting at the location
    Mat4Array(&'a [Mat4]),
}

/// Immediate-mode graphics context
///
/// Everything the frame pipeline does to the GPU goes through this trait.
/// Creation calls are fallible; state and draw calls are not, matching the
/// fire-and-forget nature of an immediate-mode API.
pub trait GraphicsContext {
    /// Compile and link a shader program
    fn create_shader(&mut self, source: &ShaderSource) -> BackendResult<ShaderHandle>;

    /// Look up a uniform in a program; `None` when the program has no such uniform
    fn uniform_location(&self, shader: ShaderHandle, name: &str) -> Option<UniformLocation>;

    /// Create a 2D texture
    fn create_texture(&mut self, descriptor: &TextureDescriptor<'_>) -> BackendResult<TextureHandle>;

    /// Create a layered texture
    fn create_texture_array(&mut self, descriptor: &TextureArrayDescriptor<'_>) -> BackendResult<TextureHandle>;

    /// Create a framebuffer with the given attachments
    fn create_framebuffer(&mut self, attachments: &FramebufferAttachments) -> BackendResult<FramebufferHandle>;

    /// Create a vertex array with no vertex buffers attached
    fn create_empty_vertex_array(&mut self) -> BackendResult<VertexArrayHandle>;

    /// Release a texture created by this context
    fn release_texture(&mut self, texture: TextureHandle);

    /// Release a framebuffer created by this context
    fn release_framebuffer(&mut self, framebuffer: FramebufferHandle);

    /// Release a program created by this context
    fn release_shader(&mut self, shader: ShaderHandle);

    /// Release a vertex array created by this context
    fn release_vertex_array(&mut self, vertex_array: VertexArrayHandle);

    /// Bind a framebuffer for drawing; `None` binds the default surface
    fn bind_framebuffer(&mut self, framebuffer: Option<FramebufferHandle>);

    /// Set the viewport rectangle
    fn set_viewport(&mut self, x: i32, y: i32, width: u32, height: u32);

    /// Set the color used by subsequent color clears
    fn set_clear_color(&mut self, color: Vec4);

    /// Clear buffers of the bound framebuffer
    fn clear(&mut self, flags: ClearFlags);

    /// Select which faces are culled
    fn set_cull_face(&mut self, face: CullFace);

    /// Bind a program; `None` unbinds
    fn bind_shader(&mut self, shader: Option<ShaderHandle>);

    /// Set a uniform on the currently bound program
    fn set_uniform(&mut self, location: UniformLocation, value: UniformValue<'_>);

    /// Bind a texture to a texture unit
    fn bind_texture(&mut self, unit: u32, texture: TextureHandle);

    /// Draw caller-owned mesh geometry as triangles
    fn draw_geometry(&mut self, geometry: GeometryHandle);

    /// Draw `vertex_count` vertices from a vertex array as triangles, no index buffer
    fn draw_arrays(&mut self, vertex_array: VertexArrayHandle, vertex_count: u32);
}
