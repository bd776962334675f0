//! Lighting system module

pub mod lighting;

pub use lighting::{DirectionalLight, PointLight, MAX_POINT_LIGHTS};
