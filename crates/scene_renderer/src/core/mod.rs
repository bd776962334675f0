//! # Core Module
//!
//! Shared configuration types used by every pass of the renderer.

pub mod config;

pub use config::{
    RendererConfig,
    ShadowConfig,
    TonemapConfig,
    ScenePassConfig,
    ShaderConfig,
    ShaderStages,
};
pub use crate::config::{Config, ConfigError};
