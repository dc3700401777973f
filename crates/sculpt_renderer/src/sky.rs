//! Procedural sky: a blue dome with a warm horizon and a sun glow.

use serde::{Deserialize, Serialize};

use crate::material::Color;
use sculpt_math::Vec3;

/// Sun and sky colors of the default sky.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SkyConfig {
    /// Direction towards the sun (normalized on use)
    pub sun_direction: Vec3,
    pub sun_color: Color,
    /// Scale of the direct sun term on surfaces
    pub sun_strength: f32,
    /// Zenith color
    pub sky_color: Color,
    pub horizon_color: Color,
}

impl Default for SkyConfig {
    fn default() -> Self {
        Self {
            sun_direction: Vec3::new(0.243, 0.075, 0.512),
            sun_color: Color::splat(0.966),
            sun_strength: 5.0,
            sky_color: Color::new(0.38, 0.6, 1.0),
            horizon_color: Color::new(0.852, 0.591, 0.367),
        }
    }
}

impl SkyConfig {
    /// Unit vector towards the sun, or +Y if the configured one is zero.
    pub fn sun(&self) -> Vec3 {
        self.sun_direction.try_normalize().unwrap_or(Vec3::Y)
    }

    /// Radiance seen along a unit direction.
    pub fn radiance(&self, direction: Vec3) -> Color {
        let sun = direction.dot(self.sun()).max(0.0);
        let horizon = (1.0 - direction.y.max(0.0)).powi(3);

        let mut color = self.sky_color.lerp(self.sun_color, sun * 0.5);
        color = color.lerp(self.horizon_color, horizon);

        let glow = sun.powi(5);
        color += 0.25 * Color::new(1.0, 0.7, 0.4) * glow;
        color += 0.25 * Color::new(1.0, 0.8, 0.6) * glow;
        color += 0.15 * Color::new(1.0, 0.9, 0.7) * sun.powi(512).max(0.25);
        color
    }
}
