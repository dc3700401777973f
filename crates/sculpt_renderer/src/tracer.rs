//! Path tracing over the SDF scene.
//!
//! Bounces are an explicit loop with a depth counter. Every path ends in one
//! of three terminal states, see [`Termination`].

use rand::rngs::StdRng;
use rand::{RngCore, SeedableRng};
use sculpt_core::{CameraFrame, Material, NodeId, Scene, TraceParams};
use sculpt_math::{Interval, Ray, Vec2, Vec3};

use crate::camera::PinholeCamera;
use crate::march::{march_in_frame, normal, GroundPlane, MarchOutcome, MarchSettings};
use crate::material::{absorbs, cosine_direction, lambert, Color, DirectionalLight};
use crate::renderer::RenderSettings;

/// How a path ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Termination {
    /// Escaped the scene; the sky or background was added.
    Miss,
    /// Absorbed by a surface that reflects nothing.
    Hit,
    /// The bounce budget ran out; the radiance gathered so far is kept.
    DepthExceeded,
}

/// A point where a ray met the combined field.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SurfaceHit {
    pub point: Vec3,
    pub normal: Vec3,
    /// Distance along the ray
    pub t: f32,
    /// Closest active node at the hit point
    pub node: Option<NodeId>,
    /// The ray landed on the ground plane
    pub ground: bool,
}

/// Radiance carried back along one path.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PathResult {
    pub color: Color,
    pub termination: Termination,
    /// Surface interactions along the path
    pub bounces: u32,
    pub first_hit: Option<SurfaceHit>,
}

impl PathResult {
    fn new(color: Color, termination: Termination, bounces: u32, first_hit: Option<SurfaceHit>) -> Self {
        Self {
            color,
            termination,
            bounces,
            first_hit,
        }
    }
}

/// March `ray` and resolve the hit into a surface point.
///
/// With a ground plane the march stops at the plane, which is hit when
/// nothing in the scene is closer.
pub fn intersect(
    scene: &Scene,
    frame: &CameraFrame,
    ray: &Ray,
    settings: &MarchSettings,
    ground: Option<&GroundPlane>,
) -> Option<SurfaceHit> {
    let ground_t = ground.and_then(|plane| plane.hit_distance(ray, Interval::new(0.0, settings.max_distance)));
    let limited = MarchSettings {
        max_distance: ground_t.unwrap_or(settings.max_distance),
        ..*settings
    };

    match march_in_frame(scene, frame, ray, &limited) {
        MarchOutcome::Hit { t, point, .. } => {
            let normal = normal(scene, point, settings.epsilon).unwrap_or(-ray.direction);
            Some(SurfaceHit {
                point,
                normal,
                t,
                node: scene.closest(point).map(|(id, _)| id),
                ground: false,
            })
        }
        MarchOutcome::Miss { .. } => {
            let plane = ground?;
            let t = ground_t?;
            Some(SurfaceHit {
                point: ray.at(t),
                normal: plane.normal_towards(ray),
                t,
                node: None,
                ground: true,
            })
        }
    }
}

/// Color seen along a ray that left the scene.
pub fn background(direction: Vec3, settings: &RenderSettings) -> Color {
    if settings.use_sky {
        settings.sky.radiance(direction)
    } else {
        settings.background
    }
}

/// Trace one path starting at `params.depth`.
pub fn trace_path(
    ray: Ray,
    scene: &Scene,
    frame: &CameraFrame,
    params: &TraceParams,
    settings: &RenderSettings,
    rng: &mut dyn RngCore,
) -> PathResult {
    if params.depth_exhausted() {
        return PathResult::new(Color::ZERO, Termination::DepthExceeded, 0, None);
    }

    let march = settings.march_settings(params.max_distance);
    let sun = DirectionalLight {
        direction: settings.sky.sun(),
        radiance: settings.sky.sun_color * settings.sky.sun_strength,
    };
    let sun_lit = settings.sky.sun_strength > 0.0;

    let mut ray = ray;
    let mut radiance = Color::ZERO;
    let mut throughput = Color::ONE;
    let mut depth = params.depth;
    let mut bounces = 0;
    let mut first_hit = None;

    loop {
        let hit = match intersect(scene, frame, &ray, &march, settings.ground.as_ref()) {
            Some(hit) => hit,
            None => {
                radiance += throughput * background(ray.direction, settings);
                return PathResult::new(radiance, Termination::Miss, bounces, first_hit);
            }
        };
        first_hit.get_or_insert(hit);
        bounces += 1;

        let material = surface_material(scene, &hit, settings);
        radiance += throughput * material.emission;
        if absorbs(&material) {
            return PathResult::new(radiance, Termination::Hit, bounces, first_hit);
        }

        let origin = hit.point + hit.normal * (2.0 * march.epsilon);
        if sun_lit && sun_visible(scene, frame, origin, hit.normal, &sun, &march, settings.shadows) {
            radiance += throughput * lambert(&material, hit.normal, &sun);
        }

        throughput *= material.albedo;
        depth += 1;
        if depth >= params.max_depth {
            return PathResult::new(radiance, Termination::DepthExceeded, bounces, first_hit);
        }

        ray = Ray::new(origin, cosine_direction(hit.normal, rng));
    }
}

fn surface_material(scene: &Scene, hit: &SurfaceHit, settings: &RenderSettings) -> Material {
    if hit.ground {
        return Material::diffuse(settings.ground.map(|plane| plane.albedo).unwrap_or_default());
    }
    hit.node
        .and_then(|id| scene.get(id))
        .map(|node| node.material)
        .unwrap_or_default()
}

fn sun_visible(
    scene: &Scene,
    frame: &CameraFrame,
    origin: Vec3,
    normal: Vec3,
    sun: &DirectionalLight,
    march: &MarchSettings,
    shadows: bool,
) -> bool {
    if normal.dot(sun.direction) <= 0.0 {
        return false;
    }
    if !shadows {
        return true;
    }
    let shadow_ray = Ray::new(origin, sun.direction);
    !march_in_frame(scene, frame, &shadow_ray, march).is_hit()
}

/// Deterministic generator for one sample of one pixel.
///
/// The per-frame random vector is the only entropy; the same inputs always
/// produce the same sequence.
pub fn sample_rng(random_vector: Vec3, x: u32, y: u32, sample: u32) -> StdRng {
    let words = [
        random_vector.x.to_bits() as u64,
        random_vector.y.to_bits() as u64,
        random_vector.z.to_bits() as u64,
        x as u64,
        y as u64,
        sample as u64,
    ];
    let seed = words.iter().fold(0u64, |h, &w| splitmix64(h ^ w));
    StdRng::seed_from_u64(seed)
}

#[inline]
fn splitmix64(mut z: u64) -> u64 {
    z = z.wrapping_add(0x9E37_79B9_7F4A_7C15);
    z = (z ^ (z >> 30)).wrapping_mul(0xBF58_476D_1CE4_E5B9);
    z = (z ^ (z >> 27)).wrapping_mul(0x94D0_49BB_1331_11EB);
    z ^ (z >> 31)
}

/// Render a single pixel, averaging `params.samples` samples.
pub fn render_pixel(
    camera: &PinholeCamera,
    scene: &Scene,
    x: u32,
    y: u32,
    params: &TraceParams,
    settings: &RenderSettings,
) -> Color {
    let samples = params.samples.max(1);
    let mut pixel_color = Color::ZERO;

    for sample in 0..samples {
        let mut rng = sample_rng(params.random_vector, x, y, sample);
        let ray = camera.get_ray(x, y, &mut rng);
        pixel_color += trace_path(ray, scene, camera.frame(), params, settings, &mut rng).color;
    }

    pixel_color / samples as f32
}

/// Surface under a normalized screen position, for selecting nodes.
pub fn pick(scene: &Scene, camera: &PinholeCamera, uv: Vec2, settings: &RenderSettings) -> Option<SurfaceHit> {
    let ray = camera.ray_for_uv(uv);
    intersect(
        scene,
        camera.frame(),
        &ray,
        &settings.march_settings(settings.max_distance),
        settings.ground.as_ref(),
    )
}
