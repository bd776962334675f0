//! Frame Rendering Data Structures
//!
//! This module defines what an application hands the renderer once per frame:
//! the scene content ([`SceneRenderInfo`]) and the view it is seen through
//! ([`ViewRenderInfo`]). Both are plain data; the renderer never keeps them
//! beyond the call they are passed to.

use crate::foundation::math::{Mat4, Mat4Ext};
use crate::render::primitives::Mesh;
use crate::render::systems::lighting::{DirectionalLight, PointLight};

/// One mesh drawn with one model transform
///
/// The mesh is borrowed from the caller's scene for the duration of the frame.
#[derive(Debug, Clone, Copy)]
pub struct MeshInstance<'a> {
    /// Model (object → world) transform
    pub model_matrix: Mat4,
    /// Geometry and material
    pub mesh: &'a Mesh,
}

impl<'a> MeshInstance<'a> {
    /// Create a mesh instance
    pub fn new(model_matrix: Mat4, mesh: &'a Mesh) -> Self {
        Self { model_matrix, mesh }
    }

    /// Whether the instance belongs to the transparent bin
    pub fn is_transparent(&self) -> bool {
        self.mesh.material.is_transparent()
    }
}

/// Scene content of one frame
///
/// Meshes and point lights keep submission order. Only one directional light
/// is honored: the first one set wins and later ones are counted as ignored.
#[derive(Debug, Clone, Default)]
pub struct SceneRenderInfo<'a> {
    meshes: Vec<MeshInstance<'a>>,
    point_lights: Vec<PointLight>,
    directional_light: Option<DirectionalLight>,
    ignored_directional_lights: usize,
}

impl<'a> SceneRenderInfo<'a> {
    /// Create an empty frame
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a mesh instance
    pub fn add_mesh(&mut self, instance: MeshInstance<'a>) {
        self.meshes.push(instance);
    }

    /// Append a point light
    pub fn add_point_light(&mut self, light: PointLight) {
        self.point_lights.push(light);
    }

    /// Set the frame's directional light
    ///
    /// Returns `false` and logs a warning when a directional light was already
    /// set this frame; the earlier light is kept.
    pub fn set_directional_light(&mut self, light: DirectionalLight) -> bool {
        let accepted = self.offer_directional_light(light);
        if !accepted {
            log::warn!("More than one directional light is not supported, keeping the first");
        }
        accepted
    }

    /// First-wins directional light assignment without logging
    pub(crate) fn offer_directional_light(&mut self, light: DirectionalLight) -> bool {
        if self.directional_light.is_some() {
            self.ignored_directional_lights += 1;
            return false;
        }
        self.directional_light = Some(light);
        true
    }

    /// Mesh instances in submission order
    pub fn meshes(&self) -> &[MeshInstance<'a>] {
        &self.meshes
    }

    /// Point lights in submission order
    pub fn point_lights(&self) -> &[PointLight] {
        &self.point_lights
    }

    /// The honored directional light, if any
    pub fn directional_light(&self) -> Option<&DirectionalLight> {
        self.directional_light.as_ref()
    }

    /// Directional lights submitted after the first one
    pub fn ignored_directional_lights(&self) -> usize {
        self.ignored_directional_lights
    }

    /// Whether the frame has no meshes and no lights
    pub fn is_empty(&self) -> bool {
        self.meshes.is_empty() && self.point_lights.is_empty() && self.directional_light.is_none()
    }
}

/// Render target region in pixels
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ViewportInfo {
    /// Left edge
    pub x: i32,
    /// Bottom edge
    pub y: i32,
    /// Width
    pub width: u32,
    /// Height
    pub height: u32,
}

impl ViewportInfo {
    /// Viewport at the origin
    pub fn new(width: u32, height: u32) -> Self {
        Self { x: 0, y: 0, width, height }
    }

    /// Width / height, 1.0 for a degenerate viewport
    pub fn aspect_ratio(&self) -> f32 {
        if self.height == 0 {
            1.0
        } else {
            self.width as f32 / self.height as f32
        }
    }
}

/// Camera snapshot of one frame
#[derive(Debug, Clone, PartialEq)]
pub struct ViewRenderInfo {
    /// World → view transform
    pub view_matrix: Mat4,
    /// View → clip transform
    pub projection_matrix: Mat4,
    /// Target region
    pub viewport: ViewportInfo,
    /// Width / height used for projections
    pub aspect_ratio: f32,
    /// Near plane distance
    pub near_plane: f32,
    /// Far plane distance
    pub far_plane: f32,
    /// Vertical field of view in radians
    pub fov: f32,
}

impl ViewRenderInfo {
    /// Build a view snapshot from a view matrix and perspective parameters
    ///
    /// The projection matrix and aspect ratio are derived from the arguments
    /// so that all fields are consistent.
    pub fn perspective(view_matrix: Mat4, viewport: ViewportInfo, fov: f32, near_plane: f32, far_plane: f32) -> Self {
        let aspect_ratio = viewport.aspect_ratio();
        Self {
            view_matrix,
            projection_matrix: Mat4::perspective(fov, aspect_ratio, near_plane, far_plane),
            viewport,
            aspect_ratio,
            near_plane,
            far_plane,
            fov,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::foundation::math::Vec3;
    use crate::render::api::GeometryHandle;
    use crate::render::primitives::Material;

    #[test]
    fn test_first_directional_light_wins() {
        crate::foundation::logging::capture::install();
        let mut frame = SceneRenderInfo::new();
        let first = DirectionalLight::new(Vec3::new(1.0, -1.0, 0.0));
        let second = DirectionalLight::new(Vec3::new(0.0, -1.0, 1.0));

        assert!(frame.set_directional_light(first));
        assert!(!frame.set_directional_light(second));

        assert_eq!(frame.directional_light(), Some(&first));
        assert_eq!(frame.ignored_directional_lights(), 1);

        let warnings = crate::foundation::logging::capture::take_warnings();
        assert_eq!(warnings.len(), 1);
        assert!(warnings[0].contains("directional light"));
    }

    #[test]
    fn test_submission_order_is_kept() {
        let meshes: Vec<Mesh> = (0..3)
            .map(|i| Mesh::new(GeometryHandle(i), Material::default()))
            .collect();

        let mut frame = SceneRenderInfo::new();
        for mesh in &meshes {
            frame.add_mesh(MeshInstance::new(Mat4::identity(), mesh));
        }

        let order: Vec<u64> = frame.meshes().iter().map(|m| m.mesh.geometry.0).collect();
        assert_eq!(order, vec![0, 1, 2]);
        assert!(!frame.is_empty());
    }

    #[test]
    fn test_viewport_aspect_ratio() {
        assert!((ViewportInfo::new(1920, 1080).aspect_ratio() - 16.0 / 9.0).abs() < 1e-6);
        assert!((ViewportInfo::new(10, 0).aspect_ratio() - 1.0).abs() < f32::EPSILON);
    }
}
