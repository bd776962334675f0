//! Rendering systems
//!
//! Light sources and the shadow cascade math shared by the render passes.

pub mod lighting;
pub mod shadows;
