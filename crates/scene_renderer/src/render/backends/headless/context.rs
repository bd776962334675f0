//! Command-recording graphics context
//!
//! [`HeadlessContext`] implements [`GraphicsContext`] without a GPU. Resources
//! live in generational tables, state changes and draws are appended to a
//! command trace, and the last value written to every uniform is kept so that
//! callers can inspect what a frame would have submitted.
//!
//! Long-running callers either drain the trace every frame with
//! [`HeadlessContext::take_commands`] or switch recording off with
//! [`HeadlessContext::set_command_recording`]; state, uniform values and
//! counters are tracked either way.
//!
//! Misuse that a real driver would report as an API error (binding a released
//! texture, writing a uniform of a program that is not bound, drawing without
//! a program) is logged and counted in [`HeadlessStats::invalid_operations`].

use std::cell::RefCell;
use std::collections::HashMap;

use crate::foundation::collections::{key_to_raw, new_key_type, raw_to_key, HandleMap};
use crate::foundation::math::Vec4;
use crate::render::api::{
    BackendResult, ClearFlags, CullFace, FilterMode, FramebufferAttachments, FramebufferHandle, GeometryHandle,
    GraphicsContext, ShaderHandle, ShaderSource, TextureArrayDescriptor, TextureDescriptor, TextureFormat,
    TextureHandle, UniformLocation, UniformValue, VertexArrayHandle,
};
use crate::render::RenderError;

use super::command::{GraphicsCommand, RecordedUniform};

new_key_type! {
    struct ShaderKey;
    struct TextureKey;
    struct FramebufferKey;
    struct VertexArrayKey;
}

/// Properties of a texture known to the headless context
#[derive(Debug, Clone, PartialEq)]
pub struct TextureInfo {
    /// Debug label
    pub label: String,
    /// Width in texels
    pub width: u32,
    /// Height in texels
    pub height: u32,
    /// Layer count, 1 for plain 2D textures
    pub layers: u32,
    /// Pixel format
    pub format: TextureFormat,
    /// Sampling filter
    pub filter: FilterMode,
    /// Border color of texture arrays
    pub border_color: Option<[f32; 4]>,
    /// Initial pixel data
    pub data: Option<Vec<u8>>,
}

#[derive(Debug)]
struct ShaderEntry {
    source: ShaderSource,
    // Resolved on demand; the index is the location
    uniform_names: RefCell<Vec<String>>,
}

#[derive(Debug, Clone)]
struct FramebufferEntry {
    attachments: FramebufferAttachments,
}

/// Counters kept by the headless context
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct HeadlessStats {
    /// Programs created
    pub shaders_created: usize,
    /// Programs released
    pub shaders_released: usize,
    /// 2D textures and texture arrays created
    pub textures_created: usize,
    /// Textures released
    pub textures_released: usize,
    /// Framebuffers created
    pub framebuffers_created: usize,
    /// Framebuffers released
    pub framebuffers_released: usize,
    /// Vertex arrays created
    pub vertex_arrays_created: usize,
    /// Vertex arrays released
    pub vertex_arrays_released: usize,
    /// Draw calls issued
    pub draw_calls: usize,
    /// Calls a real driver would have rejected
    pub invalid_operations: usize,
}

/// Graphics context that records instead of rendering
#[derive(Debug, Default)]
pub struct HeadlessContext {
    shaders: HandleMap<ShaderKey, ShaderEntry>,
    textures: HandleMap<TextureKey, TextureInfo>,
    framebuffers: HandleMap<FramebufferKey, FramebufferEntry>,
    vertex_arrays: HandleMap<VertexArrayKey, ()>,

    bound_framebuffer: Option<FramebufferHandle>,
    bound_shader: Option<ShaderHandle>,
    viewport: (i32, i32, u32, u32),
    clear_color: Vec4,
    cull_face: Option<CullFace>,
    texture_units: HashMap<u32, TextureHandle>,
    uniform_values: HashMap<UniformLocation, RecordedUniform>,

    commands: Vec<GraphicsCommand>,
    recording_paused: bool,
    stats: HeadlessStats,
    fail_creation: bool,
}

impl HeadlessContext {
    /// Create an empty context
    pub fn new() -> Self {
        Self::default()
    }

    /// Make every following resource creation fail
    ///
    /// Used to exercise error propagation of callers.
    pub fn set_creation_failure(&mut self, fail: bool) {
        self.fail_creation = fail;
    }

    /// Turn the command trace on or off
    ///
    /// Recording is on by default. While it is off nothing is appended to
    /// [`Self::commands`], but bound state, uniform values and
    /// [`HeadlessStats`] keep updating.
    pub fn set_command_recording(&mut self, enabled: bool) {
        self.recording_paused = !enabled;
    }

    /// Whether commands are appended to the trace
    pub fn is_recording_commands(&self) -> bool {
        !self.recording_paused
    }

    /// Recorded commands since creation or the last [`Self::take_commands`]
    pub fn commands(&self) -> &[GraphicsCommand] {
        &self.commands
    }

    /// Drain the command trace
    pub fn take_commands(&mut self) -> Vec<GraphicsCommand> {
        std::mem::take(&mut self.commands)
    }

    /// Counters
    pub fn stats(&self) -> HeadlessStats {
        self.stats
    }

    /// Currently bound framebuffer; `None` is the default surface
    pub fn bound_framebuffer(&self) -> Option<FramebufferHandle> {
        self.bound_framebuffer
    }

    /// Currently bound program
    pub fn bound_shader(&self) -> Option<ShaderHandle> {
        self.bound_shader
    }

    /// Current viewport as `(x, y, width, height)`
    pub fn viewport(&self) -> (i32, i32, u32, u32) {
        self.viewport
    }

    /// Current clear color
    pub fn clear_color(&self) -> Vec4 {
        self.clear_color
    }

    /// Current culling mode; `None` until first set
    pub fn cull_face(&self) -> Option<CullFace> {
        self.cull_face
    }

    /// Texture bound to `unit`
    pub fn texture_at_unit(&self, unit: u32) -> Option<TextureHandle> {
        self.texture_units.get(&unit).copied()
    }

    /// Properties of a live texture
    pub fn texture_info(&self, texture: TextureHandle) -> Option<&TextureInfo> {
        self.textures.get(raw_to_key::<TextureKey>(texture.0))
    }

    /// Attachments of a live framebuffer
    pub fn framebuffer_attachments(&self, framebuffer: FramebufferHandle) -> Option<&FramebufferAttachments> {
        self.framebuffers
            .get(raw_to_key::<FramebufferKey>(framebuffer.0))
            .map(|entry| &entry.attachments)
    }

    /// Whether the texture exists and has not been released
    pub fn is_live_texture(&self, texture: TextureHandle) -> bool {
        self.textures.contains_key(raw_to_key::<TextureKey>(texture.0))
    }

    /// Whether the framebuffer exists and has not been released
    pub fn is_live_framebuffer(&self, framebuffer: FramebufferHandle) -> bool {
        self.framebuffers.contains_key(raw_to_key::<FramebufferKey>(framebuffer.0))
    }

    /// Number of live textures
    pub fn live_textures(&self) -> usize {
        self.textures.len()
    }

    /// Number of live framebuffers
    pub fn live_framebuffers(&self) -> usize {
        self.framebuffers.len()
    }

    /// Number of live programs
    pub fn live_shaders(&self) -> usize {
        self.shaders.len()
    }

    /// Number of live vertex arrays
    pub fn live_vertex_arrays(&self) -> usize {
        self.vertex_arrays.len()
    }

    /// Program created with `label`
    pub fn shader_by_label(&self, label: &str) -> Option<ShaderHandle> {
        self.shaders
            .iter()
            .find(|(_, entry)| entry.source.label == label)
            .map(|(key, _)| ShaderHandle(key_to_raw(key)))
    }

    /// Source the program was created from
    pub fn shader_source(&self, shader: ShaderHandle) -> Option<&ShaderSource> {
        self.shaders.get(raw_to_key::<ShaderKey>(shader.0)).map(|entry| &entry.source)
    }

    /// Last value written to `name` on the program labelled `shader_label`
    pub fn uniform(&self, shader_label: &str, name: &str) -> Option<&RecordedUniform> {
        let shader = self.shader_by_label(shader_label)?;
        let entry = self.shaders.get(raw_to_key::<ShaderKey>(shader.0))?;
        let index = entry.uniform_names.borrow().iter().position(|n| n == name)?;
        self.uniform_values.get(&UniformLocation {
            shader,
            index: u32::try_from(index).ok()?,
        })
    }

    /// Every value written to `name` on the program labelled `shader_label`, in order
    pub fn uniform_history(&self, shader_label: &str, name: &str) -> Vec<&RecordedUniform> {
        let Some(shader) = self.shader_by_label(shader_label) else {
            return Vec::new();
        };
        self.commands
            .iter()
            .filter_map(|command| match command {
                GraphicsCommand::SetUniform {
                    shader: s,
                    name: n,
                    value,
                } if *s == shader && n == name => Some(value),
                _ => None,
            })
            .collect()
    }

    /// Draw commands issued with the program labelled `shader_label`
    pub fn draws_with(&self, shader_label: &str) -> usize {
        let Some(shader) = self.shader_by_label(shader_label) else {
            return 0;
        };
        self.commands
            .iter()
            .filter(|command| match command {
                GraphicsCommand::DrawGeometry { shader: s, .. } | GraphicsCommand::DrawArrays { shader: s, .. } => {
                    *s == Some(shader)
                }
                _ => false,
            })
            .count()
    }

    fn record(&mut self, command: GraphicsCommand) {
        if !self.recording_paused {
            self.commands.push(command);
        }
    }

    fn invalid(&mut self, what: std::fmt::Arguments<'_>) {
        log::warn!("Headless context: {what}");
        self.stats.invalid_operations += 1;
    }

    fn check_creation(&self, label: &str) -> BackendResult<()> {
        if self.fail_creation {
            return Err(RenderError::ResourceCreationFailed(format!(
                "'{label}': creation failure requested"
            )));
        }
        Ok(())
    }

    fn insert_texture(&mut self, info: TextureInfo) -> TextureHandle {
        log::trace!(
            "Created texture '{}' {}x{}x{} {:?}",
            info.label,
            info.width,
            info.height,
            info.layers,
            info.format
        );
        self.stats.textures_created += 1;
        TextureHandle(key_to_raw(self.textures.insert(info)))
    }
}

fn texel_size(format: TextureFormat) -> usize {
    match format {
        TextureFormat::Rgb8 | TextureFormat::Depth24 => 3,
        TextureFormat::Rgba8 | TextureFormat::Depth32F => 4,
        TextureFormat::Rgba16F => 8,
    }
}

impl GraphicsContext for HeadlessContext {
    fn create_shader(&mut self, source: &ShaderSource) -> BackendResult<ShaderHandle> {
        self.check_creation(&source.label)?;
        if source.vertex.is_empty() || source.fragment.is_empty() {
            return Err(RenderError::InitializationFailed(format!(
                "shader '{}' is missing a vertex or fragment stage",
                source.label
            )));
        }

        let key = self.shaders.insert(ShaderEntry {
            source: source.clone(),
            uniform_names: RefCell::new(Vec::new()),
        });
        self.stats.shaders_created += 1;
        log::trace!("Created shader '{}'", source.label);
        Ok(ShaderHandle(key_to_raw(key)))
    }

    fn uniform_location(&self, shader: ShaderHandle, name: &str) -> Option<UniformLocation> {
        let entry = self.shaders.get(raw_to_key::<ShaderKey>(shader.0))?;
        let mut names = entry.uniform_names.borrow_mut();
        let index = match names.iter().position(|n| n == name) {
            Some(index) => index,
            None => {
                names.push(name.to_owned());
                names.len() - 1
            }
        };
        Some(UniformLocation {
            shader,
            index: u32::try_from(index).ok()?,
        })
    }

    fn create_texture(&mut self, descriptor: &TextureDescriptor<'_>) -> BackendResult<TextureHandle> {
        self.check_creation(descriptor.label)?;
        if descriptor.width == 0 || descriptor.height == 0 {
            return Err(RenderError::ResourceCreationFailed(format!(
                "texture '{}' has zero size",
                descriptor.label
            )));
        }
        if let Some(data) = descriptor.data {
            let expected = descriptor.width as usize * descriptor.height as usize * texel_size(descriptor.format);
            if data.len() != expected {
                return Err(RenderError::ResourceCreationFailed(format!(
                    "texture '{}' expects {expected} bytes, got {}",
                    descriptor.label,
                    data.len()
                )));
            }
        }

        Ok(self.insert_texture(TextureInfo {
            label: descriptor.label.to_owned(),
            width: descriptor.width,
            height: descriptor.height,
            layers: 1,
            format: descriptor.format,
            filter: descriptor.filter,
            border_color: None,
            data: descriptor.data.map(<[u8]>::to_vec),
        }))
    }

    fn create_texture_array(&mut self, descriptor: &TextureArrayDescriptor<'_>) -> BackendResult<TextureHandle> {
        self.check_creation(descriptor.label)?;
        if descriptor.width == 0 || descriptor.height == 0 || descriptor.layers == 0 {
            return Err(RenderError::ResourceCreationFailed(format!(
                "texture array '{}' has zero size",
                descriptor.label
            )));
        }

        Ok(self.insert_texture(TextureInfo {
            label: descriptor.label.to_owned(),
            width: descriptor.width,
            height: descriptor.height,
            layers: descriptor.layers,
            format: descriptor.format,
            filter: descriptor.filter,
            border_color: Some(descriptor.border_color),
            data: None,
        }))
    }

    fn create_framebuffer(&mut self, attachments: &FramebufferAttachments) -> BackendResult<FramebufferHandle> {
        self.check_creation("framebuffer")?;
        if attachments.color.is_empty() && attachments.depth.is_none() {
            return Err(RenderError::ResourceCreationFailed(
                "framebuffer has no attachments".to_string(),
            ));
        }
        for texture in attachments.color.iter().chain(attachments.depth.iter()) {
            if !self.is_live_texture(*texture) {
                return Err(RenderError::InvalidHandle(format!(
                    "framebuffer attachment {texture:?} is not a live texture"
                )));
            }
        }
        if let Some(depth) = attachments.depth {
            let is_depth = self.texture_info(depth).is_some_and(|info| info.format.is_depth());
            if !is_depth {
                return Err(RenderError::ResourceCreationFailed(format!(
                    "depth attachment {depth:?} does not have a depth format"
                )));
            }
        }

        let key = self.framebuffers.insert(FramebufferEntry {
            attachments: attachments.clone(),
        });
        self.stats.framebuffers_created += 1;
        Ok(FramebufferHandle(key_to_raw(key)))
    }

    fn create_empty_vertex_array(&mut self) -> BackendResult<VertexArrayHandle> {
        self.check_creation("vertex_array")?;
        self.stats.vertex_arrays_created += 1;
        Ok(VertexArrayHandle(key_to_raw(self.vertex_arrays.insert(()))))
    }

    fn release_texture(&mut self, texture: TextureHandle) {
        if self.textures.remove(raw_to_key::<TextureKey>(texture.0)).is_some() {
            self.stats.textures_released += 1;
            self.texture_units.retain(|_, bound| *bound != texture);
        } else {
            self.invalid(format_args!("release of unknown texture {texture:?}"));
        }
    }

    fn release_framebuffer(&mut self, framebuffer: FramebufferHandle) {
        if self.framebuffers.remove(raw_to_key::<FramebufferKey>(framebuffer.0)).is_some() {
            self.stats.framebuffers_released += 1;
            if self.bound_framebuffer == Some(framebuffer) {
                self.bound_framebuffer = None;
            }
        } else {
            self.invalid(format_args!("release of unknown framebuffer {framebuffer:?}"));
        }
    }

    fn release_shader(&mut self, shader: ShaderHandle) {
        if self.shaders.remove(raw_to_key::<ShaderKey>(shader.0)).is_some() {
            self.stats.shaders_released += 1;
            self.uniform_values.retain(|location, _| location.shader != shader);
            if self.bound_shader == Some(shader) {
                self.bound_shader = None;
            }
        } else {
            self.invalid(format_args!("release of unknown shader {shader:?}"));
        }
    }

    fn release_vertex_array(&mut self, vertex_array: VertexArrayHandle) {
        if self.vertex_arrays.remove(raw_to_key::<VertexArrayKey>(vertex_array.0)).is_some() {
            self.stats.vertex_arrays_released += 1;
        } else {
            self.invalid(format_args!("release of unknown vertex array {vertex_array:?}"));
        }
    }

    fn bind_framebuffer(&mut self, framebuffer: Option<FramebufferHandle>) {
        if let Some(handle) = framebuffer {
            if !self.is_live_framebuffer(handle) {
                self.invalid(format_args!("bind of released framebuffer {handle:?}"));
                return;
            }
        }
        self.bound_framebuffer = framebuffer;
        self.record(GraphicsCommand::BindFramebuffer(framebuffer));
    }

    fn set_viewport(&mut self, x: i32, y: i32, width: u32, height: u32) {
        self.viewport = (x, y, width, height);
        self.record(GraphicsCommand::SetViewport { x, y, width, height });
    }

    fn set_clear_color(&mut self, color: Vec4) {
        self.clear_color = color;
        self.record(GraphicsCommand::SetClearColor(color));
    }

    fn clear(&mut self, flags: ClearFlags) {
        self.record(GraphicsCommand::Clear(flags));
    }

    fn set_cull_face(&mut self, face: CullFace) {
        self.cull_face = Some(face);
        self.record(GraphicsCommand::SetCullFace(face));
    }

    fn bind_shader(&mut self, shader: Option<ShaderHandle>) {
        if let Some(handle) = shader {
            if !self.shaders.contains_key(raw_to_key::<ShaderKey>(handle.0)) {
                self.invalid(format_args!("bind of unknown shader {handle:?}"));
                return;
            }
        }
        self.bound_shader = shader;
        self.record(GraphicsCommand::BindShader(shader));
    }

    fn set_uniform(&mut self, location: UniformLocation, value: UniformValue<'_>) {
        let bound = self.bound_shader;
        if bound != Some(location.shader) {
            self.invalid(format_args!("uniform {} written while {bound:?} is bound", location.index));
            return;
        }
        let name = self
            .shaders
            .get(raw_to_key::<ShaderKey>(location.shader.0))
            .and_then(|entry| entry.uniform_names.borrow().get(location.index as usize).cloned());
        let Some(name) = name else {
            self.invalid(format_args!("unknown uniform location {location:?}"));
            return;
        };

        let value = RecordedUniform::from(value);
        self.uniform_values.insert(location, value.clone());
        self.record(GraphicsCommand::SetUniform {
            shader: location.shader,
            name,
            value,
        });
    }

    fn bind_texture(&mut self, unit: u32, texture: TextureHandle) {
        if !self.is_live_texture(texture) {
            self.invalid(format_args!("bind of unknown or released texture {texture:?}"));
            return;
        }
        self.texture_units.insert(unit, texture);
        self.record(GraphicsCommand::BindTexture { unit, texture });
    }

    fn draw_geometry(&mut self, geometry: GeometryHandle) {
        if self.bound_shader.is_none() {
            self.invalid(format_args!("draw of {geometry:?} without a bound shader"));
        }
        self.stats.draw_calls += 1;
        self.record(GraphicsCommand::DrawGeometry {
            shader: self.bound_shader,
            geometry,
        });
    }

    fn draw_arrays(&mut self, vertex_array: VertexArrayHandle, vertex_count: u32) {
        if !self.vertex_arrays.contains_key(raw_to_key::<VertexArrayKey>(vertex_array.0)) {
            self.invalid(format_args!("draw from unknown vertex array {vertex_array:?}"));
            return;
        }
        if self.bound_shader.is_none() {
            self.invalid(format_args!("draw of {vertex_count} vertices without a bound shader"));
        }
        self.stats.draw_calls += 1;
        self.record(GraphicsCommand::DrawArrays {
            shader: self.bound_shader,
            vertex_array,
            vertex_count,
        });
    }
}
