//! Frame rendering and image output.
//!
//! Implements one progressive frame with:
//! - Parallel row-major buckets on the rayon pool
//! - Per-frame cancellation between buckets
//! - Gamma correction on output

use std::path::Path;

use image::error::{ParameterError, ParameterErrorKind};
use image::{ImageError, ImageResult, RgbaImage};
use rayon::prelude::*;
use serde::{Deserialize, Serialize};

use sculpt_core::{ConfigResult, Scene, TraceParams};
use sculpt_math::Vec3;

use crate::bucket::{generate_buckets, render_bucket, BucketResult, DEFAULT_BUCKET_SIZE};
use crate::camera::PinholeCamera;
use crate::march::{GroundPlane, MarchSettings};
use crate::material::Color;
use crate::sampler::CancelToken;
use crate::sky::SkyConfig;

/// Render settings.
///
/// Every field has a default, so a settings file only needs the values it
/// changes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RenderSettings {
    pub width: u32,
    pub height: u32,
    /// Horizontal field of view in degrees
    pub fov: f32,
    /// Samples per pixel in each frame
    pub samples_per_pixel: u32,
    /// Maximum ray bounce depth
    pub max_depth: u32,
    /// Rays are abandoned past this distance
    pub max_distance: f32,
    /// Hit threshold of the sphere tracer
    pub epsilon: f32,
    /// Step budget per ray
    pub max_steps: u32,
    /// Frames accumulated before the image counts as converged (0 = never)
    pub max_frames: u32,
    pub bucket_size: u32,
    /// March a shadow ray towards the sun
    pub shadows: bool,
    /// Escaping rays see the sky model instead of the flat background.
    /// The sun lights surfaces either way while `sky.sun_strength > 0`.
    pub use_sky: bool,
    /// Background color when the sky is off
    pub background: Color,
    pub sky: SkyConfig,
    /// Optional analytic ground below the scene
    pub ground: Option<GroundPlane>,
}

impl Default for RenderSettings {
    fn default() -> Self {
        Self {
            width: 800,
            height: 450,
            fov: PinholeCamera::DEFAULT_FOV,
            samples_per_pixel: 1,
            max_depth: 4,
            max_distance: 100.0,
            epsilon: 1e-3,
            max_steps: 256,
            max_frames: 200,
            bucket_size: DEFAULT_BUCKET_SIZE,
            shadows: true,
            use_sky: true,
            background: Color::splat(0.02),
            sky: SkyConfig::default(),
            ground: None,
        }
    }
}

impl RenderSettings {
    /// Set the output resolution.
    pub fn with_resolution(mut self, width: u32, height: u32) -> Self {
        self.width = width;
        self.height = height;
        self
    }

    /// Set samples per pixel and bounce depth.
    pub fn with_quality(mut self, samples_per_pixel: u32, max_depth: u32) -> Self {
        self.samples_per_pixel = samples_per_pixel;
        self.max_depth = max_depth;
        self
    }

    /// Set the accumulation limit.
    pub fn with_max_frames(mut self, max_frames: u32) -> Self {
        self.max_frames = max_frames;
        self
    }

    /// Sphere tracer controls, with the given distance limit.
    pub fn march_settings(&self, max_distance: f32) -> MarchSettings {
        MarchSettings {
            epsilon: self.epsilon,
            max_steps: self.max_steps,
            max_distance,
        }
    }

    /// Validated per-frame parameters for the given seed.
    pub fn trace_params(&self, random_vector: Vec3) -> ConfigResult<TraceParams> {
        TraceParams::new(self.samples_per_pixel, self.max_depth, self.max_distance, random_vector)
    }
}

/// Display encoding with gamma 2.2.
#[inline]
pub fn linear_to_gamma(linear: f32) -> f32 {
    if linear > 0.0 {
        linear.powf(1.0 / 2.2)
    } else {
        0.0
    }
}

/// Clamp a value to [0, 1] range.
#[inline]
pub fn clamp_01(x: f32) -> f32 {
    x.clamp(0.0, 1.0)
}

/// Convert a color to 8-bit RGBA.
pub fn color_to_rgba(color: Color) -> [u8; 4] {
    // Apply gamma correction and convert to 0-255
    let r = (255.0 * clamp_01(linear_to_gamma(color.x))) as u8;
    let g = (255.0 * clamp_01(linear_to_gamma(color.y))) as u8;
    let b = (255.0 * clamp_01(linear_to_gamma(color.z))) as u8;
    [r, g, b, 255]
}

/// Image buffer of linear colors, row-major with row 0 at the top.
#[derive(Debug, Clone, PartialEq)]
pub struct ImageBuffer {
    pub width: u32,
    pub height: u32,
    pub pixels: Vec<Color>,
}

impl ImageBuffer {
    /// Create a new image buffer filled with black.
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            width,
            height,
            pixels: vec![Color::ZERO; (width * height) as usize],
        }
    }

    /// Get the pixel at (x, y).
    pub fn get(&self, x: u32, y: u32) -> Color {
        self.pixels[(y * self.width + x) as usize]
    }

    /// Set the pixel at (x, y).
    pub fn set(&mut self, x: u32, y: u32, color: Color) {
        self.pixels[(y * self.width + x) as usize] = color;
    }

    /// Copy a rendered bucket into place.
    pub fn write_bucket(&mut self, result: &BucketResult) {
        let bucket = &result.bucket;
        for (i, color) in result.pixels.iter().enumerate() {
            let local_x = i as u32 % bucket.width;
            let local_y = i as u32 / bucket.width;
            self.set(bucket.x + local_x, bucket.y + local_y, *color);
        }
    }

    /// Convert to RGBA bytes (for display or saving).
    pub fn to_rgba(&self) -> Vec<u8> {
        let mut bytes = Vec::with_capacity((self.width * self.height * 4) as usize);
        for color in &self.pixels {
            let rgba = color_to_rgba(*color);
            bytes.extend_from_slice(&rgba);
        }
        bytes
    }

    /// Write the gamma-corrected image; the format follows the extension.
    pub fn save(&self, path: impl AsRef<Path>) -> ImageResult<()> {
        let image = RgbaImage::from_raw(self.width, self.height, self.to_rgba()).ok_or_else(|| {
            ImageError::Parameter(ParameterError::from_kind(ParameterErrorKind::DimensionMismatch))
        })?;
        image.save(path)
    }
}

/// Render one frame of the scene, buckets in parallel.
///
/// Returns `None` if `cancel` fires before every bucket is done; a
/// cancelled frame yields no partial image.
pub fn render_frame(
    camera: &PinholeCamera,
    scene: &Scene,
    params: &TraceParams,
    settings: &RenderSettings,
    cancel: &CancelToken,
) -> Option<ImageBuffer> {
    let buckets = generate_buckets(camera.image_width, camera.image_height, settings.bucket_size);

    let results: Option<Vec<BucketResult>> = buckets
        .par_iter()
        .map(|bucket| {
            if cancel.is_cancelled() {
                return None;
            }
            let pixels = render_bucket(bucket, camera, scene, params, settings);
            Some(BucketResult::new(*bucket, pixels))
        })
        .collect();

    let results = results?;
    if cancel.is_cancelled() {
        return None;
    }

    let mut image = ImageBuffer::new(camera.image_width, camera.image_height);
    for result in &results {
        image.write_bucket(result);
    }
    Some(image)
}
