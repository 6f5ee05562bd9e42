//! Scene lights: one directional light plus bounded point and spot lists
//!
//! The lists keep insertion order; the shader loops over them by index with
//! the counts `pn` and `sn`. All lighting maths lives in `shade` in
//! `common.wgsl`.

use cgmath::{InnerSpace, Point3, Vector3};

use crate::error::SceneError;

pub const MAX_POINT_LIGHTS: usize = 4;
pub const MAX_SPOT_LIGHTS: usize = 4;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DirectionalLight {
    pub ambient: [f32; 4],
    pub diffuse: [f32; 4],
    /// Direction the light travels, normalised on construction.
    pub direction: Vector3<f32>,
}

impl DirectionalLight {
    pub fn new(ambient: [f32; 4], diffuse: [f32; 4], direction: Vector3<f32>) -> Self {
        Self {
            ambient,
            diffuse,
            direction: direction.normalize(),
        }
    }
}

impl Default for DirectionalLight {
    fn default() -> Self {
        Self::new(
            [0.1, 0.1, 0.1, 1.0],
            [1.0, 1.0, 1.0, 1.0],
            Vector3::new(0.6, -1.0, 0.3),
        )
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PointLight {
    pub colour: [f32; 4],
    pub position: Point3<f32>,
    pub constant: f32,
    pub linear: f32,
    pub quadratic: f32,
}

impl PointLight {
    pub fn new(colour: [f32; 4], position: Point3<f32>, constant: f32, linear: f32, quadratic: f32) -> Self {
        Self {
            colour,
            position,
            constant,
            linear,
            quadratic,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SpotLight {
    pub colour: [f32; 4],
    pub position: Point3<f32>,
    /// Normalised on construction.
    pub direction: Vector3<f32>,
    pub constant: f32,
    pub linear: f32,
    pub quadratic: f32,
    /// Cone falloff exponent applied to `cos(angle to axis)`.
    pub power: f32,
}

impl SpotLight {
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        colour: [f32; 4],
        position: Point3<f32>,
        direction: Vector3<f32>,
        constant: f32,
        linear: f32,
        quadratic: f32,
        power: f32,
    ) -> Self {
        Self {
            colour,
            position,
            direction: direction.normalize(),
            constant,
            linear,
            quadratic,
            power,
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct LightSet {
    pub directional: DirectionalLight,
    points: Vec<PointLight>,
    spots: Vec<SpotLight>,
}

impl LightSet {
    pub fn new(directional: DirectionalLight) -> Self {
        Self {
            directional,
            points: Vec::new(),
            spots: Vec::new(),
        }
    }

    pub fn add_point(&mut self, light: PointLight) -> Result<usize, SceneError> {
        if self.points.len() >= MAX_POINT_LIGHTS {
            return Err(SceneError::TooManyLights {
                kind: "point",
                limit: MAX_POINT_LIGHTS,
            });
        }
        self.points.push(light);
        Ok(self.points.len() - 1)
    }

    pub fn add_spot(&mut self, light: SpotLight) -> Result<usize, SceneError> {
        if self.spots.len() >= MAX_SPOT_LIGHTS {
            return Err(SceneError::TooManyLights {
                kind: "spot",
                limit: MAX_SPOT_LIGHTS,
            });
        }
        self.spots.push(light);
        Ok(self.spots.len() - 1)
    }

    pub fn points(&self) -> &[PointLight] {
        &self.points
    }

    pub fn spots(&self) -> &[SpotLight] {
        &self.spots
    }

    pub fn spot_mut(&mut self, index: usize) -> Option<&mut SpotLight> {
        self.spots.get_mut(index)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::gfx::rendering::shaders;
    use crate::gfx::scene::transform::Transform;

    // CPU mirrors of the terms in `shade` (common.wgsl). Each WGSL line they
    // mirror is listed in SHADE_TERMS and checked against the shader source.

    const SHADE_TERMS: [&str; 5] = [
        "let sun_lambert = max(dot(n, to_sun), 0.0);",
        "var diffuse = frame.light_ambient * material.ambient + frame.light_diffuse * material.diffuse * sun_lambert;",
        "let attenuation = 1.0 / max(light.falloff.x + light.falloff.y * d + light.falloff.z * d * d, 1e-4);",
        "let cone = pow(max(dot(-to_light, normalize(light.direction.xyz)), 0.0), light.falloff.w);",
        "let to_sun = -normalize(frame.light_dir.xyz);",
    ];

    fn lambert(light: &DirectionalLight, normal: Vector3<f32>) -> f32 {
        normal.dot(-light.direction).max(0.0)
    }

    fn shade_directional(
        light: &DirectionalLight,
        ambient_reflectance: [f32; 4],
        diffuse_reflectance: [f32; 4],
        normal: Vector3<f32>,
    ) -> [f32; 3] {
        let k = lambert(light, normal);
        std::array::from_fn(|i| {
            light.ambient[i] * ambient_reflectance[i] + light.diffuse[i] * diffuse_reflectance[i] * k
        })
    }

    fn attenuation(constant: f32, linear: f32, quadratic: f32, d: f32) -> f32 {
        1.0 / (constant + linear * d + quadratic * d * d).max(1e-4)
    }

    fn spot_intensity(spot: &SpotLight, point: Point3<f32>) -> f32 {
        let offset = spot.position - point;
        let d = offset.magnitude();
        let to_light = offset / d.max(1e-4);
        let cone = (-to_light).dot(spot.direction).max(0.0).powf(spot.power);
        cone * attenuation(spot.constant, spot.linear, spot.quadratic, d)
    }

    fn shade_body() -> &'static str {
        let start = shaders::COMMON.find("fn shade(").expect("common.wgsl defines shade");
        &shaders::COMMON[start..]
    }

    #[test]
    fn reference_terms_match_shader() {
        let body = shade_body();
        for term in SHADE_TERMS {
            assert!(body.contains(term), "`shade` no longer contains `{term}`");
        }
        // point and spot lights share the attenuation line
        assert_eq!(body.matches(SHADE_TERMS[2]).count(), 2);
    }

    #[test]
    fn fifth_light_of_a_kind_is_rejected() {
        let mut lights = LightSet::default();
        let point = PointLight::new([1.0; 4], Point3::new(0.0, 0.0, 0.0), 1.0, 0.0, 0.0);
        for i in 0..MAX_POINT_LIGHTS {
            assert_eq!(lights.add_point(point), Ok(i));
        }
        assert_eq!(
            lights.add_point(point),
            Err(SceneError::TooManyLights { kind: "point", limit: 4 })
        );

        let spot = SpotLight::new(
            [1.0; 4],
            Point3::new(0.0, 5.0, 0.0),
            Vector3::new(0.0, -1.0, 0.0),
            1.0,
            0.0,
            0.0,
            10.0,
        );
        for _ in 0..MAX_SPOT_LIGHTS {
            lights.add_spot(spot).unwrap();
        }
        assert!(lights.add_spot(spot).is_err());
        assert_eq!(lights.spots().len(), MAX_SPOT_LIGHTS);
    }

    #[test]
    fn directional_diffuse_follows_lambert_on_camera_facing_plane() {
        // Camera at the origin looking down -Z sees a plane whose normal is +Z.
        let plane = Transform::from_position(0.0, 0.0, -5.0);
        let normal = (plane.normal_matrix() * Vector3::unit_z()).normalize();
        let white = [1.0; 4];

        for direction in [
            Vector3::new(0.0, 0.0, -1.0),
            Vector3::new(0.0, -1.0, -1.0),
            Vector3::new(1.0, 0.0, -0.2),
            Vector3::new(0.0, 0.0, 1.0),
        ] {
            let light = DirectionalLight::new([0.0, 0.0, 0.0, 1.0], white, direction);
            let expected = normal.dot(-direction.normalize()).max(0.0);
            let shaded = shade_directional(&light, white, white, normal);
            for channel in shaded {
                assert!((channel - expected).abs() < 1e-5);
            }
        }
    }

    #[test]
    fn light_from_behind_contributes_nothing() {
        let light = DirectionalLight::new([0.0; 4], [1.0; 4], Vector3::new(0.0, 0.0, 1.0));
        assert_eq!(lambert(&light, Vector3::unit_z()), 0.0);
    }

    #[test]
    fn spot_cone_falls_off_away_from_axis() {
        let spot = SpotLight::new(
            [1.0; 4],
            Point3::new(0.0, 10.0, 0.0),
            Vector3::new(0.0, -1.0, 0.0),
            1.0,
            0.0,
            0.0,
            10.0,
        );
        let below = spot_intensity(&spot, Point3::new(0.0, 0.0, 0.0));
        let aside = spot_intensity(&spot, Point3::new(5.0, 0.0, 0.0));
        let above = spot_intensity(&spot, Point3::new(0.0, 20.0, 0.0));
        assert!((below - 1.0).abs() < 1e-5);
        assert!(aside < below);
        assert_eq!(above, 0.0);
    }

    #[test]
    fn point_attenuation_decreases_with_distance() {
        let point = PointLight::new([1.0; 4], Point3::new(0.0, 0.0, 0.0), 0.0, 0.01, 0.01);
        let at = |d| attenuation(point.constant, point.linear, point.quadratic, d);
        assert!(at(1.0) > at(10.0));
        // a zero denominator is clamped rather than dividing by zero
        assert!((attenuation(0.0, 0.0, 0.0, 0.0) - 1e4).abs() < 1.0);
    }
}
