//! Headless backend
//!
//! A [`GraphicsContext`](crate::render::api::GraphicsContext) that records
//! commands instead of talking to a GPU. Used by the test suite and by tools
//! that want to inspect what a frame submits.

pub mod command;
pub mod context;

pub use command::{GraphicsCommand, RecordedUniform};
pub use context::{HeadlessContext, HeadlessStats, TextureInfo};
