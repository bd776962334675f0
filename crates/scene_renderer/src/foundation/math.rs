//! Math utilities and types
//!
//! Provides the fundamental math types used by the renderer. All projection
//! helpers follow the OpenGL clip-space convention: right-handed view space
//! looking down -Z, normalized device depth in [-1, 1].

pub use nalgebra::{Matrix4, Vector3, Vector4};

/// 3D vector type
pub type Vec3 = Vector3<f32>;

/// 4D vector type
pub type Vec4 = Vector4<f32>;

/// 4x4 matrix type
pub type Mat4 = Matrix4<f32>;

/// 3D point type
pub type Point3 = nalgebra::Point3<f32>;

/// Extension trait for Mat4 with the projection and view builders the
/// renderer needs.
pub trait Mat4Ext {
    /// Right-handed perspective projection, depth mapped to [-1, 1]
    ///
    /// # Arguments
    /// * `fov_y` - Vertical field of view in radians
    /// * `aspect` - Viewport width / height
    /// * `near` - Distance to the near plane (> 0)
    /// * `far` - Distance to the far plane (> near)
    fn perspective(fov_y: f32, aspect: f32, near: f32, far: f32) -> Mat4;

    /// Right-handed orthographic projection, depth mapped to [-1, 1]
    fn orthographic(left: f32, right: f32, bottom: f32, top: f32, near: f32, far: f32) -> Mat4;

    /// Right-handed look-at view matrix
    fn look_at(eye: Vec3, target: Vec3, up: Vec3) -> Mat4;

    /// Transform a point by this matrix and divide by the resulting w
    fn project_point(&self, point: &Vec4) -> Vec4;
}

impl Mat4Ext for Mat4 {
    fn perspective(fov_y: f32, aspect: f32, near: f32, far: f32) -> Mat4 {
        Mat4::new_perspective(aspect, fov_y, near, far)
    }

    fn orthographic(left: f32, right: f32, bottom: f32, top: f32, near: f32, far: f32) -> Mat4 {
        Mat4::new_orthographic(left, right, bottom, top, near, far)
    }

    fn look_at(eye: Vec3, target: Vec3, up: Vec3) -> Mat4 {
        Mat4::look_at_rh(&Point3::from(eye), &Point3::from(target), &up)
    }

    fn project_point(&self, point: &Vec4) -> Vec4 {
        let transformed = self * point;
        transformed / transformed.w
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_perspective_maps_near_and_far_to_clip_bounds() {
        let projection = Mat4::perspective(60.0_f32.to_radians(), 1.5, 0.5, 40.0);

        let near = projection.project_point(&Vec4::new(0.0, 0.0, -0.5, 1.0));
        let far = projection.project_point(&Vec4::new(0.0, 0.0, -40.0, 1.0));

        assert_relative_eq!(near.z, -1.0, epsilon = 1e-4);
        assert_relative_eq!(far.z, 1.0, epsilon = 1e-4);
    }

    #[test]
    fn test_look_at_moves_target_onto_negative_z() {
        let eye = Vec3::new(3.0, 4.0, 5.0);
        let view = Mat4::look_at(eye, Vec3::zeros(), Vec3::y());

        let target = view.project_point(&Vec4::new(0.0, 0.0, 0.0, 1.0));
        assert_relative_eq!(target.x, 0.0, epsilon = 1e-5);
        assert_relative_eq!(target.y, 0.0, epsilon = 1e-5);
        assert_relative_eq!(target.z, -eye.norm(), epsilon = 1e-5);
    }

    #[test]
    fn test_orthographic_maps_box_corners() {
        let projection = Mat4::orthographic(-2.0, 2.0, -1.0, 1.0, 1.0, 9.0);
        let corner = projection.project_point(&Vec4::new(2.0, -1.0, -9.0, 1.0));

        assert_relative_eq!(corner.x, 1.0, epsilon = 1e-5);
        assert_relative_eq!(corner.y, -1.0, epsilon = 1e-5);
        assert_relative_eq!(corner.z, 1.0, epsilon = 1e-5);
    }
}
