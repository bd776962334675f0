//! Light sources of the frame pipeline
//!
//! Two light types are supported: point lights with constant/linear/quadratic
//! attenuation, and a single directional light that also drives the shadow
//! cascades. Both use separate ambient, diffuse and specular colors for the
//! Blinn-Phong model of the scene shader. Colors are HDR values; the tonemap
//! exposure brings them back into display range.

use serde::{Deserialize, Serialize};

use crate::foundation::math::Vec3;

/// Maximum number of point lights the scene pass shades per frame
pub const MAX_POINT_LIGHTS: usize = 5;

/// Omnidirectional light with distance attenuation
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PointLight {
    /// World-space position
    pub position: Vec3,
    /// Ambient color
    pub ambient: Vec3,
    /// Diffuse color
    pub diffuse: Vec3,
    /// Specular color
    pub specular: Vec3,
    /// Constant attenuation term
    pub constant: f32,
    /// Linear attenuation term
    pub linear: f32,
    /// Quadratic attenuation term
    pub quadratic: f32,
}

impl Default for PointLight {
    fn default() -> Self {
        Self {
            position: Vec3::zeros(),
            ambient: Vec3::repeat(5.0),
            diffuse: Vec3::repeat(10.0),
            specular: Vec3::repeat(20.0),
            constant: 1.0,
            linear: 0.9,
            quadratic: 1.8,
        }
    }
}

impl PointLight {
    /// Point light at `position` with default colors and attenuation
    pub fn at(position: Vec3) -> Self {
        Self {
            position,
            ..Default::default()
        }
    }

    /// Set ambient, diffuse and specular colors
    pub fn with_colors(mut self, ambient: Vec3, diffuse: Vec3, specular: Vec3) -> Self {
        self.ambient = ambient;
        self.diffuse = diffuse;
        self.specular = specular;
        self
    }

    /// Set the attenuation terms
    pub fn with_attenuation(mut self, constant: f32, linear: f32, quadratic: f32) -> Self {
        self.constant = constant;
        self.linear = linear;
        self.quadratic = quadratic;
        self
    }

    /// Attenuation factor at `distance`
    pub fn attenuation(&self, distance: f32) -> f32 {
        1.0 / (self.constant + self.linear * distance + self.quadratic * distance * distance)
    }
}

/// Parallel light (sun) that casts the cascaded shadows
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DirectionalLight {
    direction: Vec3,
    /// Ambient color
    pub ambient: Vec3,
    /// Diffuse color
    pub diffuse: Vec3,
    /// Specular color
    pub specular: Vec3,
}

impl Default for DirectionalLight {
    fn default() -> Self {
        Self {
            direction: -Vec3::y(),
            ambient: Vec3::repeat(1.0),
            diffuse: Vec3::repeat(15.0),
            specular: Vec3::repeat(50.0),
        }
    }
}

impl DirectionalLight {
    /// Directional light shining along `direction` with default colors
    pub fn new(direction: Vec3) -> Self {
        Self {
            direction,
            ..Default::default()
        }
    }

    /// Set ambient, diffuse and specular colors
    pub fn with_colors(mut self, ambient: Vec3, diffuse: Vec3, specular: Vec3) -> Self {
        self.ambient = ambient;
        self.diffuse = diffuse;
        self.specular = specular;
        self
    }

    /// Change the light direction
    pub fn set_direction(&mut self, direction: Vec3) {
        self.direction = direction;
    }

    /// Normalized direction the light travels in
    ///
    /// A zero-length direction reads as straight down.
    pub fn direction(&self) -> Vec3 {
        self.direction
            .try_normalize(f32::EPSILON)
            .unwrap_or_else(|| -Vec3::y())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_direction_is_normalized_on_read() {
        let light = DirectionalLight::new(Vec3::new(0.0, -4.0, 3.0));
        let direction = light.direction();

        assert_relative_eq!(direction.norm(), 1.0, epsilon = 1e-6);
        assert_relative_eq!(direction.y, -0.8, epsilon = 1e-6);
        assert_relative_eq!(direction.z, 0.6, epsilon = 1e-6);
    }

    #[test]
    fn test_zero_direction_points_down() {
        let light = DirectionalLight::new(Vec3::zeros());
        assert_eq!(light.direction(), Vec3::new(0.0, -1.0, 0.0));
    }

    #[test]
    fn test_point_light_defaults() {
        let light = PointLight::at(Vec3::new(1.0, 2.0, 3.0));
        assert_eq!(light.position, Vec3::new(1.0, 2.0, 3.0));
        assert_relative_eq!(light.constant, 1.0);
        assert_relative_eq!(light.linear, 0.9);
        assert_relative_eq!(light.quadratic, 1.8);
        assert_relative_eq!(light.attenuation(0.0), 1.0);
    }

    #[test]
    fn test_attenuation_decreases_with_distance() {
        let light = PointLight::default().with_attenuation(1.0, 0.1, 0.01);
        assert!(light.attenuation(1.0) > light.attenuation(10.0));
    }
}
