//! Light-space matrices for shadow cascades
//!
//! Each cascade is rendered with an orthographic projection that tightly
//! encloses the slice of the camera frustum it covers, as seen from the
//! directional light. The box is fitted in light view space and then widened
//! along the light direction so that casters outside the slice, but between
//! it and the light, still land in the depth map.

use crate::foundation::math::{Mat4, Mat4Ext, Vec3, Vec4};

use super::cascades::CascadeSplit;

/// Factor by which the light-space depth range is widened on both sides
pub const DEFAULT_Z_MULTIPLIER: f32 = 10.0;

/// Below this, the light direction is treated as parallel to the world up axis
const PARALLEL_EPSILON: f32 = 1e-4;

/// Camera parameters needed to rebuild each cascade's sub-frustum
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CascadeFrustum {
    /// World → view transform of the camera
    pub view_matrix: Mat4,
    /// Vertical field of view in radians
    pub fov: f32,
    /// Width / height
    pub aspect_ratio: f32,
}

/// World-space corners of the frustum described by `projection * view`
///
/// The eight NDC cube corners are unprojected through the inverse matrix with
/// a perspective divide. A singular matrix yields `None`.
pub fn frustum_corners_world_space(projection: &Mat4, view: &Mat4) -> Option<[Vec3; 8]> {
    let inverse = (projection * view).try_inverse()?;

    let mut corners = [Vec3::zeros(); 8];
    let mut index = 0;
    for x in [-1.0, 1.0] {
        for y in [-1.0, 1.0] {
            for z in [-1.0, 1.0] {
                let point = inverse.project_point(&Vec4::new(x, y, z, 1.0));
                corners[index] = point.xyz();
                index += 1;
            }
        }
    }
    Some(corners)
}

/// Up vector for the light's look-at
///
/// World up is used unless the light shines (almost) straight along it, in
/// which case +Z is used instead.
fn light_up_vector(direction: &Vec3) -> Vec3 {
    let up = Vec3::y();
    if (up.dot(direction).abs() - 1.0).abs() < PARALLEL_EPSILON {
        Vec3::z()
    } else {
        up
    }
}

/// Widen a light-space depth range away from zero
///
/// Negative bounds and positive bounds move in opposite directions, so the
/// range always grows.
fn widen_depth_range(min_z: f32, max_z: f32, multiplier: f32) -> (f32, f32) {
    let min_z = if min_z < 0.0 { min_z * multiplier } else { min_z / multiplier };
    let max_z = if max_z < 0.0 { max_z / multiplier } else { max_z * multiplier };
    (min_z, max_z)
}

/// Light-space matrix for one cascade
///
/// `light_direction` must be normalized. Returns `None` when the cascade
/// frustum cannot be inverted (degenerate camera parameters).
pub fn light_space_matrix(
    frustum: &CascadeFrustum,
    split: CascadeSplit,
    light_direction: &Vec3,
    z_multiplier: f32,
) -> Option<Mat4> {
    let projection = Mat4::perspective(frustum.fov, frustum.aspect_ratio, split.near, split.far);
    let corners = frustum_corners_world_space(&projection, &frustum.view_matrix)?;

    let center = corners.iter().fold(Vec3::zeros(), |sum, c| sum + c) / corners.len() as f32;
    let light_view = Mat4::look_at(center - light_direction, center, light_up_vector(light_direction));

    let mut min = Vec3::repeat(f32::INFINITY);
    let mut max = Vec3::repeat(f32::NEG_INFINITY);
    for corner in &corners {
        let p = (light_view * corner.push(1.0)).xyz();
        min = min.inf(&p);
        max = max.sup(&p);
    }

    let (min_z, max_z) = widen_depth_range(min.z, max.z, z_multiplier);
    let light_projection = Mat4::orthographic(min.x, max.x, min.y, max.y, min_z, max_z);

    Some(light_projection * light_view)
}

/// Light-space matrices for all cascades, written into `matrices`
///
/// A cascade whose frustum cannot be built falls back to the identity matrix
/// with a warning, so the output always has one entry per split.
pub fn light_space_matrices_into(
    frustum: &CascadeFrustum,
    splits: &[CascadeSplit],
    light_direction: &Vec3,
    z_multiplier: f32,
    matrices: &mut Vec<Mat4>,
) {
    matrices.clear();
    matrices.extend(splits.iter().enumerate().map(|(index, split)| {
        light_space_matrix(frustum, *split, light_direction, z_multiplier).unwrap_or_else(|| {
            log::warn!("Cascade {index} frustum is degenerate ({split:?}), using identity light matrix");
            Mat4::identity()
        })
    }));
}

/// Light-space matrices for all cascades
pub fn light_space_matrices(
    frustum: &CascadeFrustum,
    splits: &[CascadeSplit],
    light_direction: &Vec3,
    z_multiplier: f32,
) -> Vec<Mat4> {
    let mut matrices = Vec::with_capacity(splits.len());
    light_space_matrices_into(frustum, splits, light_direction, z_multiplier, &mut matrices);
    matrices
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::render::systems::shadows::cascades::compute_cascade_splits;
    use approx::assert_relative_eq;

    fn camera() -> CascadeFrustum {
        CascadeFrustum {
            view_matrix: Mat4::look_at(Vec3::new(0.0, 2.0, 10.0), Vec3::zeros(), Vec3::y()),
            fov: 60.0_f32.to_radians(),
            aspect_ratio: 16.0 / 9.0,
        }
    }

    #[test]
    fn test_frustum_corners_of_identity_are_ndc_cube() {
        let corners = frustum_corners_world_space(&Mat4::identity(), &Mat4::identity()).unwrap();
        for corner in &corners {
            assert_relative_eq!(corner.x.abs(), 1.0);
            assert_relative_eq!(corner.y.abs(), 1.0);
            assert_relative_eq!(corner.z.abs(), 1.0);
        }
        assert_eq!(corners[0], Vec3::new(-1.0, -1.0, -1.0));
        assert_eq!(corners[7], Vec3::new(1.0, 1.0, 1.0));
    }

    #[test]
    fn test_frustum_corners_lie_on_near_and_far_planes() {
        let projection = Mat4::perspective(std::f32::consts::FRAC_PI_2, 1.0, 1.0, 5.0);
        let corners = frustum_corners_world_space(&projection, &Mat4::identity()).unwrap();

        // z = -1 in NDC is the near plane, z = +1 the far plane
        for (i, corner) in corners.iter().enumerate() {
            let expected_depth = if i % 2 == 0 { -1.0 } else { -5.0 };
            assert_relative_eq!(corner.z, expected_depth, epsilon = 1e-4);
            // 90 degree fov: half extent equals the distance
            assert_relative_eq!(corner.x.abs(), -corner.z, epsilon = 1e-4);
        }
    }

    #[test]
    fn test_singular_matrix_has_no_corners() {
        assert!(frustum_corners_world_space(&Mat4::zeros(), &Mat4::identity()).is_none());
    }

    #[test]
    fn test_cascade_corners_map_inside_light_clip_volume() {
        let frustum = camera();
        let direction = Vec3::new(-0.3, -1.0, -0.2).normalize();
        let split = CascadeSplit { near: 0.5, far: 20.0 };

        let matrix = light_space_matrix(&frustum, split, &direction, DEFAULT_Z_MULTIPLIER).unwrap();

        let projection = Mat4::perspective(frustum.fov, frustum.aspect_ratio, split.near, split.far);
        let corners = frustum_corners_world_space(&projection, &frustum.view_matrix).unwrap();
        for corner in &corners {
            let clip = matrix.project_point(&corner.push(1.0));
            assert!(clip.x.abs() <= 1.0 + 1e-4, "x out of range: {clip:?}");
            assert!(clip.y.abs() <= 1.0 + 1e-4, "y out of range: {clip:?}");
            assert!(clip.z.abs() <= 1.0 + 1e-4, "z out of range: {clip:?}");
        }
    }

    #[test]
    fn test_fit_is_tight_in_x_and_y() {
        let frustum = camera();
        let direction = Vec3::new(0.4, -1.0, 0.1).normalize();
        let split = CascadeSplit { near: 1.0, far: 8.0 };

        let matrix = light_space_matrix(&frustum, split, &direction, DEFAULT_Z_MULTIPLIER).unwrap();
        let projection = Mat4::perspective(frustum.fov, frustum.aspect_ratio, split.near, split.far);
        let corners = frustum_corners_world_space(&projection, &frustum.view_matrix).unwrap();

        let max_x = corners
            .iter()
            .map(|c| matrix.project_point(&c.push(1.0)).x)
            .fold(f32::NEG_INFINITY, f32::max);
        let min_y = corners
            .iter()
            .map(|c| matrix.project_point(&c.push(1.0)).y)
            .fold(f32::INFINITY, f32::min);
        assert_relative_eq!(max_x, 1.0, epsilon = 1e-3);
        assert_relative_eq!(min_y, -1.0, epsilon = 1e-3);
    }

    #[test]
    fn test_straight_down_light_uses_fallback_up() {
        assert_eq!(light_up_vector(&Vec3::new(0.0, -1.0, 0.0)), Vec3::z());
        assert_eq!(light_up_vector(&Vec3::new(0.0, 1.0, 0.0)), Vec3::z());
        assert_eq!(light_up_vector(&Vec3::new(1.0, -1.0, 0.0).normalize()), Vec3::y());

        let matrix = light_space_matrix(
            &camera(),
            CascadeSplit { near: 0.1, far: 10.0 },
            &Vec3::new(0.0, -1.0, 0.0),
            DEFAULT_Z_MULTIPLIER,
        )
        .unwrap();
        assert!(matrix.iter().all(|v| v.is_finite()));
    }

    #[test]
    fn test_depth_range_always_grows() {
        assert_eq!(widen_depth_range(-2.0, 4.0, 10.0), (-20.0, 40.0));
        assert_eq!(widen_depth_range(2.0, 4.0, 10.0), (0.2, 40.0));
        assert_eq!(widen_depth_range(-8.0, -2.0, 10.0), (-80.0, -0.2));
    }

    #[test]
    fn test_one_matrix_per_cascade() {
        let splits = compute_cascade_splits(0.1, 100.0, 4, 0.75);
        let matrices = light_space_matrices(&camera(), &splits, &Vec3::new(-1.0, -1.0, 0.0).normalize(), 10.0);

        assert_eq!(matrices.len(), 4);
        assert!(matrices.iter().all(|m| m.iter().all(|v| v.is_finite())));

        // Farther cascades cover a larger world-space footprint
        let areas: Vec<f32> = matrices.iter().map(footprint_area).collect();
        for pair in areas.windows(2) {
            assert!(pair[1] > pair[0], "footprints not growing: {areas:?}");
        }
    }

    #[test]
    fn test_footprint_is_independent_of_light_axis() {
        // Rows 0 and 1 of the view-projection carry the scale along the
        // light's right and up axes, whatever world axes those happen to be
        let splits = compute_cascade_splits(0.1, 100.0, 4, 0.75);
        for direction in [
            Vec3::new(-1.0, -1.0, 0.0),
            Vec3::new(0.0, -1.0, -1.0),
            Vec3::new(0.3, -0.2, 0.9),
        ] {
            let matrices = light_space_matrices(&camera(), &splits, &direction.normalize(), 10.0);
            let near = footprint_area(&matrices[0]);
            let far = footprint_area(&matrices[3]);
            assert!(near > 0.0);
            assert!(far > near, "direction {direction:?}: {near} >= {far}");
        }
    }

    #[test]
    fn test_corners_round_trip_through_projection_view() {
        let view = Mat4::look_at(Vec3::new(3.0, 2.0, 10.0), Vec3::new(0.5, 0.0, 0.0), Vec3::y());
        let projection = Mat4::perspective(1.1, 1.6, 0.3, 42.0);
        let view_projection = projection * view;

        let corners = frustum_corners_world_space(&projection, &view).unwrap();
        for (i, corner) in corners.iter().enumerate() {
            let sign = |bit: bool| if bit { 1.0 } else { -1.0 };
            let expected = Vec3::new(sign(i / 4 == 1), sign((i / 2) % 2 == 1), sign(i % 2 == 1));

            let ndc = view_projection.project_point(&corner.push(1.0));
            assert_relative_eq!(ndc.x, expected.x, epsilon = 1e-3);
            assert_relative_eq!(ndc.y, expected.y, epsilon = 1e-3);
            assert_relative_eq!(ndc.z, expected.z, epsilon = 1e-3);
        }
    }

    /// World-space width times height covered by an orthographic light matrix
    fn footprint_area(matrix: &Mat4) -> f32 {
        let x_scale = Vec3::new(matrix[(0, 0)], matrix[(0, 1)], matrix[(0, 2)]).norm();
        let y_scale = Vec3::new(matrix[(1, 0)], matrix[(1, 1)], matrix[(1, 2)]).norm();
        (2.0 / x_scale) * (2.0 / y_scale)
    }
}
