//! Recorded graphics commands

use crate::foundation::math::{Mat4, Vec3, Vec4};
use crate::render::api::{
    ClearFlags, CullFace, FramebufferHandle, GeometryHandle, ShaderHandle, TextureHandle, UniformValue,
    VertexArrayHandle,
};

/// Owned copy of a [`UniformValue`]
#[derive(Debug, Clone, PartialEq)]
pub enum RecordedUniform {
    /// Boolean
    Bool(bool),
    /// Signed integer
    Int(i32),
    /// Scalar
    Float(f32),
    /// 3-component vector
    Vec3(Vec3),
    /// 4-component vector
    Vec4(Vec4),
    /// 4x4 matrix
    Mat4(Mat4),
    /// Scalar array
    FloatArray(Vec<f32>),
    /// Matrix array
    Mat4Array(Vec<Mat4>),
}

impl RecordedUniform {
    /// Value as a boolean, if it is one
    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Self::Bool(v) => Some(*v),
            _ => None,
        }
    }

    /// Value as an integer, if it is one
    pub fn as_int(&self) -> Option<i32> {
        match self {
            Self::Int(v) => Some(*v),
            _ => None,
        }
    }

    /// Value as a scalar, if it is one
    pub fn as_float(&self) -> Option<f32> {
        match self {
            Self::Float(v) => Some(*v),
            _ => None,
        }
    }

    /// Value as a vec3, if it is one
    pub fn as_vec3(&self) -> Option<Vec3> {
        match self {
            Self::Vec3(v) => Some(*v),
            _ => None,
        }
    }
}

impl From<UniformValue<'_>> for RecordedUniform {
    fn from(value: UniformValue<'_>) -> Self {
        match value {
            UniformValue::Bool(v) => Self::Bool(v),
            UniformValue::Int(v) => Self::Int(v),
            UniformValue::Float(v) => Self::Float(v),
            UniformValue::Vec3(v) => Self::Vec3(v),
            UniformValue::Vec4(v) => Self::Vec4(v),
            UniformValue::Mat4(v) => Self::Mat4(v),
            UniformValue::FloatArray(v) => Self::FloatArray(v.to_vec()),
            UniformValue::Mat4Array(v) => Self::Mat4Array(v.to_vec()),
        }
    }
}

/// One state change or draw issued to the headless context
///
/// Resource creation and release are tracked in the context's statistics
/// rather than in the trace.
#[derive(Debug, Clone, PartialEq)]
pub enum GraphicsCommand {
    /// Framebuffer bound; `None` is the default surface
    BindFramebuffer(Option<FramebufferHandle>),
    /// Viewport rectangle
    SetViewport {
        /// Left
        x: i32,
        /// Bottom
        y: i32,
        /// Width
        width: u32,
        /// Height
        height: u32,
    },
    /// Clear color
    SetClearColor(Vec4),
    /// Buffers cleared
    Clear(ClearFlags),
    /// Culled faces
    SetCullFace(CullFace),
    /// Program bound; `None` unbinds
    BindShader(Option<ShaderHandle>),
    /// Uniform written on the bound program
    SetUniform {
        /// Program the location belongs to
        shader: ShaderHandle,
        /// Uniform name as resolved by `uniform_location`
        name: String,
        /// Value written
        value: RecordedUniform,
    },
    /// Texture bound to a unit
    BindTexture {
        /// Texture unit
        unit: u32,
        /// Texture
        texture: TextureHandle,
    },
    /// Mesh geometry drawn with the bound program
    DrawGeometry {
        /// Bound program at draw time
        shader: Option<ShaderHandle>,
        /// Geometry
        geometry: GeometryHandle,
    },
    /// Non-indexed draw from a vertex array
    DrawArrays {
        /// Bound program at draw time
        shader: Option<ShaderHandle>,
        /// Vertex array
        vertex_array: VertexArrayHandle,
        /// Vertex count
        vertex_count: u32,
    },
}

impl GraphicsCommand {
    /// Whether the command is a draw
    pub fn is_draw(&self) -> bool {
        matches!(self, Self::DrawGeometry { .. } | Self::DrawArrays { .. })
    }
}
