//! Scene-level rendering
//!
//! Turns scene content into frames: [`collector`] gathers a frame from a
//! [`SceneSource`], [`geometry_classifier`] bins its meshes and
//! [`scene_renderer`] runs the passes.

pub mod collector;
pub mod geometry_classifier;
pub mod scene_renderer;

pub use collector::{collect_frame, SceneObject, SceneSource, SimpleScene};
pub use geometry_classifier::GeometryClassifier;
pub use scene_renderer::{FrameStats, SceneRenderer};
