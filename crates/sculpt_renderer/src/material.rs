//! Diffuse surface response for SDF hits.

use rand::{Rng, RngCore};
use sculpt_core::Material;
use sculpt_math::Vec3;

/// Color type alias (RGB values typically 0-1)
pub type Color = Vec3;

/// Light arriving from a distant directional source.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DirectionalLight {
    /// Unit vector towards the light
    pub direction: Vec3,
    pub radiance: Color,
}

/// True if the surface absorbs everything that reaches it.
#[inline]
pub fn absorbs(material: &Material) -> bool {
    material.albedo.max_element() <= 0.0
}

/// Lambertian reflection of a directional light; zero below the horizon.
pub fn lambert(material: &Material, normal: Vec3, light: &DirectionalLight) -> Color {
    let cos_theta = normal.dot(light.direction);
    if cos_theta <= 0.0 {
        return Color::ZERO;
    }
    material.albedo * light.radiance * (cos_theta * std::f32::consts::FRAC_1_PI)
}

/// Cosine-weighted direction in the hemisphere around `normal`.
///
/// With this pdf the Lambertian bounce weight reduces to the albedo.
pub fn cosine_direction(normal: Vec3, rng: &mut dyn RngCore) -> Vec3 {
    let r1: f32 = rng.gen();
    let r2: f32 = rng.gen();
    let phi = 2.0 * std::f32::consts::PI * r1;
    let radius = r2.sqrt();

    let (tangent, bitangent) = normal.any_orthonormal_pair();
    let direction = tangent * (phi.cos() * radius)
        + bitangent * (phi.sin() * radius)
        + normal * (1.0 - r2).max(0.0).sqrt();

    // Catch degenerate scatter direction
    if direction.length_squared() < 1e-8 {
        normal
    } else {
        direction.normalize()
    }
}
