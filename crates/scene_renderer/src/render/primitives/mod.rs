//! Core primitive types for rendering
//!
//! Meshes and materials as seen by the frame pipeline.

pub mod mesh;

// Re-export commonly used types
pub use mesh::{Material, Mesh};
