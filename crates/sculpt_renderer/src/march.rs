//! Sphere tracing against the combined scene field.
//!
//! The ray advances by exactly the unsigned distance reported by the field.
//! Because every primitive's distance is conservative, a step never passes
//! through a surface.

use serde::{Deserialize, Serialize};

use sculpt_core::{CameraFrame, Scene};
use sculpt_math::{Interval, Ray, Vec3};

/// Step controls for [`march`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MarchSettings {
    /// A step whose distance falls below this is a hit
    pub epsilon: f32,
    /// Step budget per ray; running out counts as a miss
    pub max_steps: u32,
    /// Farthest travelled distance before the ray is abandoned
    pub max_distance: f32,
}

impl Default for MarchSettings {
    fn default() -> Self {
        Self {
            epsilon: 1e-3,
            max_steps: 256,
            max_distance: 100.0,
        }
    }
}

/// Result of marching one ray.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum MarchOutcome {
    Hit { t: f32, point: Vec3, steps: u32 },
    /// `t` is the farthest distance the ray was allowed to reach.
    Miss { t: f32 },
}

impl MarchOutcome {
    pub fn is_hit(&self) -> bool {
        matches!(self, MarchOutcome::Hit { .. })
    }
}

/// Horizontal plane intersected analytically, outside the scene field.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GroundPlane {
    /// World-space y of the plane
    pub height: f32,
    pub albedo: Vec3,
}

impl Default for GroundPlane {
    fn default() -> Self {
        Self {
            height: 0.0,
            albedo: Vec3::splat(0.5),
        }
    }
}

impl GroundPlane {
    /// Distance along `ray` to the plane, if it lies ahead and inside `range`.
    pub fn hit_distance(&self, ray: &Ray, range: Interval) -> Option<f32> {
        if ray.direction.y.abs() < 1e-8 {
            return None;
        }
        let t = (self.height - ray.origin.y) / ray.direction.y;
        (t > 0.0 && range.contains(t)).then_some(t)
    }

    /// Plane normal facing the incoming ray.
    pub fn normal_towards(&self, ray: &Ray) -> Vec3 {
        if ray.direction.y > 0.0 {
            Vec3::NEG_Y
        } else {
            Vec3::Y
        }
    }
}

/// March `ray` through `scene` over the parameter range `range`.
pub fn march(scene: &Scene, ray: &Ray, settings: &MarchSettings, range: Interval) -> MarchOutcome {
    let mut t = range.min;

    for step in 0..settings.max_steps {
        if t > range.max {
            break;
        }
        let point = ray.at(t);
        let d = scene.evaluate(point).abs();
        if d < settings.epsilon {
            return MarchOutcome::Hit {
                t,
                point,
                steps: step + 1,
            };
        }
        t += d;
    }

    MarchOutcome::Miss { t: range.max }
}

/// March `ray` within `[0, max_distance]`, first clipped by the frame bounds.
///
/// A ray the bounds reject misses without evaluating the field.
pub fn march_in_frame(scene: &Scene, frame: &CameraFrame, ray: &Ray, settings: &MarchSettings) -> MarchOutcome {
    let full = Interval::new(0.0, settings.max_distance);
    match frame.clip(ray, full) {
        Some(range) => march(scene, ray, settings, range),
        None => MarchOutcome::Miss { t: settings.max_distance },
    }
}

/// Surface normal from the central-difference gradient of the field.
///
/// Returns `None` where the gradient vanishes (e.g. the center of a sphere).
pub fn normal(scene: &Scene, point: Vec3, h: f32) -> Option<Vec3> {
    let dx = Vec3::new(h, 0.0, 0.0);
    let dy = Vec3::new(0.0, h, 0.0);
    let dz = Vec3::new(0.0, 0.0, h);
    let gradient = Vec3::new(
        scene.evaluate(point + dx) - scene.evaluate(point - dx),
        scene.evaluate(point + dy) - scene.evaluate(point - dy),
        scene.evaluate(point + dz) - scene.evaluate(point - dz),
    );
    gradient.try_normalize()
}
