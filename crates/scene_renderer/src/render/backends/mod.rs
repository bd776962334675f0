//! Backend implementations for the render module
//!
//! Only the command-recording headless backend ships with the crate; GPU
//! backends implement [`GraphicsContext`](crate::render::api::GraphicsContext)
//! on their side.

/// Headless command-recording backend
pub mod headless;
