//! # Frame Collector
//!
//! Gathers one frame's meshes and lights from whatever holds the scene. The
//! scene side only has to implement [`SceneSource`]; [`collect_frame`] applies
//! the frame policies:
//!
//! - no scene: a warning and an empty frame, rendering continues
//! - several directional lights: the first one is used, the rest are counted
//!   and reported once per frame

use crate::foundation::math::Mat4;
use crate::render::api::{MeshInstance, SceneRenderInfo};
use crate::render::primitives::Mesh;
use crate::render::systems::lighting::{DirectionalLight, PointLight};

/// Read access to a scene's renderable content
pub trait SceneSource {
    /// Mesh instances in draw submission order
    fn mesh_instances(&self) -> Box<dyn Iterator<Item = MeshInstance<'_>> + '_>;

    /// Point lights in priority order; only the first few are shaded
    fn point_lights(&self) -> Box<dyn Iterator<Item = PointLight> + '_>;

    /// Directional lights; only the first one is honored
    fn directional_lights(&self) -> Box<dyn Iterator<Item = DirectionalLight> + '_>;
}

/// Build the frame data for `scene`
///
/// A missing scene (dropped, not loaded yet) is not an error: the frame is
/// simply empty.
pub fn collect_frame<S: SceneSource + ?Sized>(scene: Option<&S>) -> SceneRenderInfo<'_> {
    let mut frame = SceneRenderInfo::new();
    let Some(scene) = scene else {
        log::warn!("No scene to render, submitting an empty frame");
        return frame;
    };

    for instance in scene.mesh_instances() {
        frame.add_mesh(instance);
    }
    for light in scene.point_lights() {
        frame.add_point_light(light);
    }
    for light in scene.directional_lights() {
        frame.offer_directional_light(light);
    }

    if frame.ignored_directional_lights() > 0 {
        log::warn!(
            "Scene has {} directional lights, only the first one is used",
            frame.ignored_directional_lights() + 1
        );
    }

    frame
}

/// One placed mesh of a [`SimpleScene`]
#[derive(Debug, Clone)]
pub struct SceneObject {
    /// Model transform
    pub transform: Mat4,
    /// Geometry and material
    pub mesh: Mesh,
    /// Hidden objects are not collected
    pub visible: bool,
}

/// Flat list scene, enough for tools, tests and small demos
#[derive(Debug, Clone, Default)]
pub struct SimpleScene {
    objects: Vec<SceneObject>,
    point_lights: Vec<PointLight>,
    directional_lights: Vec<DirectionalLight>,
}

impl SimpleScene {
    /// Create an empty scene
    pub fn new() -> Self {
        Self::default()
    }

    /// Place a mesh; returns its index
    pub fn add_object(&mut self, transform: Mat4, mesh: Mesh) -> usize {
        self.objects.push(SceneObject {
            transform,
            mesh,
            visible: true,
        });
        self.objects.len() - 1
    }

    /// Add a point light
    pub fn add_point_light(&mut self, light: PointLight) {
        self.point_lights.push(light);
    }

    /// Add a directional light
    pub fn add_directional_light(&mut self, light: DirectionalLight) {
        self.directional_lights.push(light);
    }

    /// Placed objects
    pub fn objects(&self) -> &[SceneObject] {
        &self.objects
    }

    /// Placed objects, mutable for animation
    pub fn objects_mut(&mut self) -> &mut [SceneObject] {
        &mut self.objects
    }

    /// Point lights, mutable for animation
    pub fn point_lights_mut(&mut self) -> &mut [PointLight] {
        &mut self.point_lights
    }

    /// Directional lights, mutable for animation
    pub fn directional_lights_mut(&mut self) -> &mut [DirectionalLight] {
        &mut self.directional_lights
    }
}

impl SceneSource for SimpleScene {
    fn mesh_instances(&self) -> Box<dyn Iterator<Item = MeshInstance<'_>> + '_> {
        Box::new(
            self.objects
                .iter()
                .filter(|object| object.visible)
                .map(|object| MeshInstance::new(object.transform, &object.mesh)),
        )
    }

    fn point_lights(&self) -> Box<dyn Iterator<Item = PointLight> + '_> {
        Box::new(self.point_lights.iter().copied())
    }

    fn directional_lights(&self) -> Box<dyn Iterator<Item = DirectionalLight> + '_> {
        Box::new(self.directional_lights.iter().copied())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::foundation::math::Vec3;
    use crate::render::api::GeometryHandle;
    use crate::render::primitives::Material;

    #[test]
    fn test_missing_scene_gives_empty_frame() {
        let frame = collect_frame::<SimpleScene>(None);
        assert!(frame.is_empty());
        assert_eq!(frame.ignored_directional_lights(), 0);
    }

    #[test]
    fn test_first_directional_light_is_used() {
        let mut scene = SimpleScene::new();
        let sun = DirectionalLight::new(Vec3::new(1.0, -1.0, 0.0));
        scene.add_directional_light(sun);
        scene.add_directional_light(DirectionalLight::new(Vec3::new(0.0, -1.0, 1.0)));
        scene.add_directional_light(DirectionalLight::new(Vec3::new(0.0, 1.0, 0.0)));

        let frame = collect_frame(Some(&scene));

        assert_eq!(frame.directional_light(), Some(&sun));
        assert_eq!(frame.ignored_directional_lights(), 2);
    }

    #[test]
    fn test_extra_directional_lights_warn_once() {
        crate::foundation::logging::capture::install();
        let mut scene = SimpleScene::new();
        scene.add_directional_light(DirectionalLight::new(Vec3::new(1.0, -1.0, 0.0)));
        scene.add_directional_light(DirectionalLight::new(Vec3::new(0.0, -1.0, 1.0)));

        collect_frame(Some(&scene));

        let warnings = crate::foundation::logging::capture::take_warnings();
        assert_eq!(warnings.len(), 1, "{warnings:?}");
        assert!(warnings[0].contains("2 directional lights"), "{warnings:?}");
    }

    #[test]
    fn test_single_directional_light_does_not_warn() {
        crate::foundation::logging::capture::install();
        let mut scene = SimpleScene::new();
        scene.add_directional_light(DirectionalLight::new(Vec3::new(1.0, -1.0, 0.0)));

        collect_frame(Some(&scene));

        assert!(crate::foundation::logging::capture::take_warnings().is_empty());
    }

    #[test]
    fn test_hidden_objects_are_not_collected() {
        let mut scene = SimpleScene::new();
        scene.add_object(Mat4::identity(), Mesh::new(GeometryHandle(1), Material::default()));
        let hidden = scene.add_object(Mat4::identity(), Mesh::new(GeometryHandle(2), Material::default()));
        scene.objects_mut()[hidden].visible = false;
        scene.add_point_light(PointLight::default());

        let frame = collect_frame(Some(&scene));

        assert_eq!(frame.meshes().len(), 1);
        assert_eq!(frame.meshes()[0].mesh.geometry, GeometryHandle(1));
        assert_eq!(frame.point_lights().len(), 1);
    }

    #[test]
    fn test_trait_object_source() {
        let mut scene = SimpleScene::new();
        scene.add_point_light(PointLight::default());
        let source: &dyn SceneSource = &scene;

        let frame = collect_frame(Some(source));
        assert_eq!(frame.point_lights().len(), 1);
    }
}
