//! # Scene Renderer
//!
//! A per-frame forward renderer with cascaded shadow maps and HDR tone
//! mapping, written against a small immediate-mode graphics contract.
//!
//! ## Features
//!
//! - **Cascaded Shadow Maps**: practical log/uniform split scheme, tightly
//!   fitted light-space volumes, alpha-tested shadow casters
//! - **Blinn-Phong Lighting**: up to five point lights and one directional light
//! - **HDR Pipeline**: half-float scene target, exposure tone mapping
//! - **Lazy Render Targets**: recreated only when the viewport size changes
//! - **Headless Backend**: command-recording context for tests and tools
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use scene_renderer::prelude::*;
//!
//! fn main() -> Result<(), RenderError> {
//!     let mut ctx = HeadlessContext::new();
//!     let mut renderer = SceneRenderer::new(&mut ctx, RendererConfig::default())?;
//!
//!     let mut scene = SimpleScene::new();
//!     scene.add_object(Mat4::identity(), Mesh::new(GeometryHandle(1), Material::default()));
//!     scene.add_directional_light(DirectionalLight::new(Vec3::new(-1.0, -1.0, -0.5)));
//!
//!     let view = ViewRenderInfo::perspective(
//!         Mat4::look_at(Vec3::new(0.0, 3.0, 8.0), Vec3::zeros(), Vec3::y()),
//!         ViewportInfo::new(1280, 720),
//!         std::f32::consts::FRAC_PI_3,
//!         0.1,
//!         100.0,
//!     );
//!
//!     let frame = collect_frame(Some(&scene));
//!     renderer.render(&mut ctx, &frame, &view, None)?;
//!     Ok(())
//! }
//! ```

#![warn(missing_docs)]
#![warn(clippy::all, clippy::pedantic, clippy::nursery)]
#![allow(clippy::module_name_repetitions, clippy::similar_names, clippy::too_many_arguments)]

// Shared configuration
pub mod config;
pub mod core;

// Math, collections and logging
pub mod foundation;

// Graphics contract, passes and resources
pub mod render;

// Frame collection and orchestration
pub mod scene;

/// Common imports for renderer users
pub mod prelude {
    pub use crate::{
        core::{Config, RendererConfig, ShadowConfig, TonemapConfig},
        foundation::math::{Mat4, Mat4Ext, Vec3, Vec4},
        render::{
            backends::headless::HeadlessContext,
            api::{GraphicsContext, MeshInstance, SceneRenderInfo, ViewRenderInfo, ViewportInfo},
            DirectionalLight, GeometryHandle, Material, Mesh, PointLight, RenderError, RenderResult, TextureHandle,
        },
        scene::{collect_frame, FrameStats, SceneRenderer, SceneSource, SimpleScene},
    };
}
