//! Spot-light shadow map entries
//!
//! Entry `i` mirrors spot light `i` and renders into layer `i` of the shadow
//! texture array. Layers are sized to the screen, so the light projection
//! uses the screen aspect. The GPU side lives in the shadow pass; this module
//! only holds light poses and builds their matrices.

use cgmath::{perspective, Deg, Matrix4, Point3, Vector3};

use crate::gfx::math::{up_for_direction, OPENGL_TO_WGPU_MATRIX};
use crate::gfx::scene::light::SpotLight;

pub const SHADOW_FOVY: Deg<f32> = Deg(90.0);
pub const SHADOW_NEAR: f32 = 0.1;
pub const SHADOW_FAR: f32 = 1000.0;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ShadowMapEntry {
    pub light_position: Point3<f32>,
    pub light_dir: Vector3<f32>,
}

impl ShadowMapEntry {
    pub fn from_spot(spot: &SpotLight) -> Self {
        Self {
            light_position: spot.position,
            light_dir: spot.direction,
        }
    }

    pub fn view(&self) -> Matrix4<f32> {
        Matrix4::look_to_rh(self.light_position, self.light_dir, up_for_direction(self.light_dir))
    }

    pub fn projection(aspect: f32) -> Matrix4<f32> {
        OPENGL_TO_WGPU_MATRIX * perspective(SHADOW_FOVY, aspect, SHADOW_NEAR, SHADOW_FAR)
    }

    /// `P_light · V_light`; callers append the model matrix to get `lMVP`.
    pub fn view_projection(&self, aspect: f32) -> Matrix4<f32> {
        Self::projection(aspect) * self.view()
    }
}

/// Layer extent for a `width` x `height` screen, scaled down uniformly so
/// neither edge exceeds `max_size`.
pub fn layer_size(width: u32, height: u32, max_size: u32) -> (u32, u32) {
    let (width, height) = (width.max(1), height.max(1));
    let longest = width.max(height);
    if longest <= max_size {
        return (width, height);
    }
    let scale = max_size as f64 / longest as f64;
    let shrink = |edge: u32| ((edge as f64 * scale).round() as u32).clamp(1, max_size);
    (shrink(width), shrink(height))
}

/// One entry per spot light, kept index-aligned.
#[derive(Debug, Clone)]
pub struct ShadowMaps {
    entries: Vec<ShadowMapEntry>,
    /// Width over height of the screen-sized layers.
    aspect: f32,
}

impl Default for ShadowMaps {
    fn default() -> Self {
        Self {
            entries: Vec::new(),
            aspect: 1.0,
        }
    }
}

impl ShadowMaps {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn aspect(&self) -> f32 {
        self.aspect
    }

    /// Follows the screen size; zero-sized windows keep the last aspect.
    pub fn resize(&mut self, width: u32, height: u32) {
        if width == 0 || height == 0 {
            return;
        }
        self.aspect = width as f32 / height as f32;
    }

    /// `P_light · V_light` for every entry, in entry order.
    pub fn view_projections(&self) -> Vec<Matrix4<f32>> {
        self.entries
            .iter()
            .map(|entry| entry.view_projection(self.aspect))
            .collect()
    }

    pub fn entries(&self) -> &[ShadowMapEntry] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Copies every spot light's pose into its entry, growing or shrinking the
    /// list to match.
    pub fn sync(&mut self, spots: &[SpotLight]) {
        if self.entries.len() != spots.len() {
            log::debug!("shadow entries {} -> {}", self.entries.len(), spots.len());
        }
        self.entries.clear();
        self.entries.extend(spots.iter().map(ShadowMapEntry::from_spot));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::gfx::math::transform_point;
    use cgmath::Vector4;

    fn spot(position: Point3<f32>, direction: Vector3<f32>) -> SpotLight {
        SpotLight::new([1.0; 4], position, direction, 0.0, 0.05, 0.005, 10.0)
    }

    #[test]
    fn sync_keeps_entries_index_aligned() {
        let spots = [
            spot(Point3::new(-16.5, 14.3, 5.0), Vector3::new(0.0, -1.0, 0.0)),
            spot(Point3::new(0.0, 0.4, -1.0), Vector3::new(0.0, 0.0, -1.0)),
        ];
        let mut shadows = ShadowMaps::new();
        shadows.sync(&spots);
        assert_eq!(shadows.len(), 2);
        for (entry, spot) in shadows.entries().iter().zip(&spots) {
            assert_eq!(entry.light_position, spot.position);
            assert_eq!(entry.light_dir, spot.direction);
        }

        shadows.sync(&spots[..1]);
        assert_eq!(shadows.len(), 1);
    }

    #[test]
    fn downward_light_sees_point_below_it() {
        let entry = ShadowMapEntry::from_spot(&spot(Point3::new(-16.5, 14.3, 5.0), Vector3::new(0.0, -1.0, 0.0)));
        let clip = entry.view_projection(1.0) * Vector4::new(-16.5, 0.0, 5.0, 1.0);
        let ndc = clip.truncate() / clip.w;
        assert!(ndc.x.abs() < 1e-4 && ndc.y.abs() < 1e-4);
        assert!(ndc.z > 0.0 && ndc.z < 1.0);
    }

    #[test]
    fn view_puts_light_at_origin() {
        let entry = ShadowMapEntry::from_spot(&spot(Point3::new(3.0, 4.0, 5.0), Vector3::new(1.0, -1.0, 0.0)));
        let p = transform_point(&entry.view(), entry.light_position);
        assert!(p.x.abs() < 1e-4 && p.y.abs() < 1e-4 && p.z.abs() < 1e-4);
    }

    #[test]
    fn view_projections_use_screen_aspect() {
        let mut shadows = ShadowMaps::new();
        shadows.sync(&[spot(Point3::new(0.0, 10.0, 0.0), Vector3::new(0.0, -1.0, 0.0))]);
        assert_eq!(shadows.aspect(), 1.0);

        shadows.resize(1280, 720);
        let expected = shadows.entries()[0].view_projection(1280.0 / 720.0);
        assert_eq!(shadows.view_projections(), vec![expected]);

        shadows.resize(0, 720);
        assert_eq!(shadows.aspect(), 1280.0 / 720.0);
    }

    #[test]
    fn wide_screen_widens_light_frustum() {
        let mut shadows = ShadowMaps::new();
        shadows.sync(&[spot(Point3::new(0.0, 10.0, 0.0), Vector3::new(0.0, -1.0, 0.0))]);
        // 9 units off-axis, 10 units below the light
        let off_axis = Vector4::new(9.0, 0.0, 0.0, 1.0);
        let ndc_x = |shadows: &ShadowMaps| {
            let clip = shadows.view_projections()[0] * off_axis;
            clip.x / clip.w
        };
        let square = ndc_x(&shadows);
        shadows.resize(1600, 900);
        let wide = ndc_x(&shadows);
        assert!((square.abs() - 0.9).abs() < 1e-3);
        assert!(wide.abs() < square.abs());
    }

    #[test]
    fn layer_size_matches_screen_under_cap() {
        assert_eq!(layer_size(1280, 720, 4096), (1280, 720));
        assert_eq!(layer_size(0, 0, 4096), (1, 1));
        assert_eq!(layer_size(8192, 4096, 4096), (4096, 2048));
    }
}
