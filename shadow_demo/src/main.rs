//! Cascaded shadow demo
//!
//! Builds a randomized scene of crates, foliage cards and colored lights,
//! then drives the renderer on the headless context for a number of frames.
//! The sun orbits the scene, the viewport is resized halfway through and a
//! cascade debug image is rendered at the end. The command trace is drained
//! after every frame so memory stays flat however many frames are run.
//!
//! ```text
//! shadow_demo [config.toml|config.ron] [frames]
//! ```

use rand::prelude::*;
use scene_renderer::prelude::*;
use scene_renderer::render::api::{FilterMode, TextureDescriptor, TextureFormat};
use scene_renderer::core::ConfigError;

const DEFAULT_FRAMES: usize = 120;
const CRATE_COUNT: usize = 24;
const FOLIAGE_COUNT: usize = 12;
const LIGHT_COUNT: usize = 8;

#[derive(Debug, thiserror::Error)]
enum DemoError {
    #[error("renderer error: {0}")]
    Render(#[from] RenderError),

    #[error("config error: {0}")]
    Config(#[from] ConfigError),

    #[error("invalid frame count '{0}'")]
    FrameCount(String),
}

struct DemoArgs {
    config: RendererConfig,
    frames: usize,
}

impl DemoArgs {
    fn parse() -> Result<Self, DemoError> {
        let mut args = std::env::args().skip(1);

        let config = match args.next() {
            Some(path) => {
                log::info!("Loading renderer config from {path}");
                RendererConfig::load_from_file(&path)?
            }
            None => RendererConfig::default().with_shadow_map_size(1024),
        };

        let frames = match args.next() {
            Some(text) => text.parse().map_err(|_| DemoError::FrameCount(text))?,
            None => DEFAULT_FRAMES,
        };

        Ok(Self { config, frames })
    }
}

fn foliage_texture(ctx: &mut HeadlessContext) -> Result<TextureHandle, DemoError> {
    // Checkerboard of opaque and cut-out texels
    let data: Vec<u8> = (0..16u8)
        .flat_map(|i| {
            let alpha = if (i + i / 4) % 2 == 0 { 255 } else { 0 };
            [40, 160, 60, alpha]
        })
        .collect();

    let texture = ctx.create_texture(&TextureDescriptor {
        label: "foliage",
        width: 4,
        height: 4,
        format: TextureFormat::Rgba8,
        filter: FilterMode::Nearest,
        data: Some(data.as_slice()),
    })?;
    Ok(texture)
}

fn build_scene(ctx: &mut HeadlessContext, rng: &mut impl Rng) -> Result<SimpleScene, DemoError> {
    let mut scene = SimpleScene::new();
    let ground = GeometryHandle(1);
    let crate_geometry = GeometryHandle(2);
    let card = GeometryHandle(3);

    scene.add_object(
        Mat4::new_nonuniform_scaling(&Vec3::new(50.0, 1.0, 50.0)),
        Mesh::new(ground, Material::flat(Vec3::new(0.5, 0.45, 0.4))),
    );

    for _ in 0..CRATE_COUNT {
        let position = Vec3::new(rng.gen_range(-20.0..20.0), 0.5, rng.gen_range(-20.0..20.0));
        let color = Vec3::new(rng.gen_range(0.3..0.9), rng.gen_range(0.3..0.9), rng.gen_range(0.3..0.9));
        let material = Material::flat(color).with_specular_power(rng.gen_range(8.0..64.0));
        scene.add_object(Mat4::new_translation(&position), Mesh::new(crate_geometry, material));
    }

    let leaves = foliage_texture(ctx)?;
    for _ in 0..FOLIAGE_COUNT {
        let position = Vec3::new(rng.gen_range(-15.0..15.0), 1.0, rng.gen_range(-15.0..15.0));
        let material = Material::default()
            .with_diffuse_texture(leaves)
            .with_transparency(true);
        scene.add_object(Mat4::new_translation(&position), Mesh::new(card, material));
    }

    for _ in 0..LIGHT_COUNT {
        let position = Vec3::new(rng.gen_range(-15.0..15.0), rng.gen_range(2.0..6.0), rng.gen_range(-15.0..15.0));
        let color = Vec3::new(rng.gen_range(0.2..1.0), rng.gen_range(0.2..1.0), rng.gen_range(0.2..1.0));
        scene.add_point_light(
            PointLight::at(position)
                .with_colors(color * 0.05, color, color)
                .with_attenuation(1.0, 0.09, 0.032),
        );
    }

    scene.add_directional_light(DirectionalLight::new(Vec3::new(-0.4, -1.0, -0.3)));
    Ok(scene)
}

fn camera(viewport: ViewportInfo) -> ViewRenderInfo {
    ViewRenderInfo::perspective(
        Mat4::look_at(Vec3::new(0.0, 8.0, 24.0), Vec3::zeros(), Vec3::y()),
        viewport,
        std::f32::consts::FRAC_PI_3,
        0.1,
        150.0,
    )
}

fn run(args: DemoArgs) -> Result<(), DemoError> {
    let mut ctx = HeadlessContext::new();
    let mut renderer = SceneRenderer::new(&mut ctx, args.config)?;
    let mut rng = thread_rng();
    let mut scene = build_scene(&mut ctx, &mut rng)?;

    log::info!(
        "Scene has {} objects and {} point lights",
        scene.objects().len(),
        LIGHT_COUNT
    );

    let mut viewport = ViewportInfo::new(1280, 720);
    for frame in 0..args.frames {
        if frame == args.frames / 2 {
            viewport = ViewportInfo::new(1920, 1080);
            log::info!("Resizing viewport to {}x{}", viewport.width, viewport.height);
        }

        // Sun circles the scene once over the run
        let angle = std::f32::consts::TAU * frame as f32 / args.frames.max(1) as f32;
        if let Some(sun) = scene.directional_lights_mut().first_mut() {
            sun.set_direction(Vec3::new(angle.cos(), -1.0, angle.sin()));
        }

        let info = collect_frame(Some(&scene));
        let stats = renderer.render(&mut ctx, &info, &camera(viewport), None)?;
        let submitted = ctx.take_commands().len();

        if frame % 30 == 0 {
            log::info!("Frame {frame}: {submitted} commands, {stats:?}");
        }
        if stats.scene_target_recreated {
            log::debug!("Frame {frame} recreated the scene target");
        }
    }

    for split in renderer.cascade_splits() {
        log::info!("Cascade {:.2} .. {:.2}", split.near, split.far);
    }

    let debug = renderer.render_cascade_debug(&mut ctx, 512, 512, 0)?;
    log::info!(
        "Cascade debug view rendered into {debug:?} with {} commands",
        ctx.take_commands().len()
    );

    let headless = ctx.stats();
    log::info!(
        "{} draw calls, {} invalid operations",
        headless.draw_calls,
        headless.invalid_operations
    );

    renderer.destroy(&mut ctx);
    Ok(())
}

fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info"))
        .format_timestamp_millis()
        .init();

    log::info!("Starting cascaded shadow demo");

    let result = DemoArgs::parse().and_then(run);
    if let Err(e) = result {
        log::error!("Demo failed: {e}");
        std::process::exit(1);
    }

    log::info!("Demo finished");
}
