//! Resource management
//!
//! GPU resources the renderer owns itself: the shadow map array, the
//! size-keyed scene and debug targets, and fallback textures.

pub mod fallback;
pub mod targets;

pub use fallback::FallbackTextures;
pub use targets::{ShadowMaps, SizedTarget, TargetLayout};
