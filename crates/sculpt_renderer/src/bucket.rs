//! Square tiles of the image, rendered independently on the rayon pool.
//!
//! Frames are committed whole, so tiles are plain row-major.

use sculpt_core::{Scene, TraceParams};

use crate::camera::PinholeCamera;
use crate::material::Color;
use crate::renderer::RenderSettings;
use crate::tracer::render_pixel;

/// A rectangular region of the image; edge tiles are clipped to the image.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Bucket {
    pub x: u32,
    pub y: u32,
    pub width: u32,
    pub height: u32,
}

impl Bucket {
    pub fn new(x: u32, y: u32, width: u32, height: u32) -> Self {
        Self { x, y, width, height }
    }
}

/// Default bucket size in pixels.
pub const DEFAULT_BUCKET_SIZE: u32 = 64;

/// Tile a `width` x `height` image row by row. A zero `bucket_size` is
/// treated as one pixel.
pub fn generate_buckets(width: u32, height: u32, bucket_size: u32) -> Vec<Bucket> {
    let size = bucket_size.max(1);
    (0..height)
        .step_by(size as usize)
        .flat_map(|y| {
            (0..width)
                .step_by(size as usize)
                .map(move |x| Bucket::new(x, y, size.min(width - x), size.min(height - y)))
        })
        .collect()
}

/// Render one bucket; pixels come back row-major within the bucket.
pub fn render_bucket(
    bucket: &Bucket,
    camera: &PinholeCamera,
    scene: &Scene,
    params: &TraceParams,
    settings: &RenderSettings,
) -> Vec<Color> {
    (bucket.y..bucket.y + bucket.height)
        .flat_map(|y| (bucket.x..bucket.x + bucket.width).map(move |x| (x, y)))
        .map(|(x, y)| render_pixel(camera, scene, x, y, params, settings))
        .collect()
}

/// A rendered bucket waiting to be copied into the frame.
#[derive(Debug, Clone)]
pub struct BucketResult {
    pub bucket: Bucket,
    pub pixels: Vec<Color>,
}

impl BucketResult {
    pub fn new(bucket: Bucket, pixels: Vec<Color>) -> Self {
        Self { bucket, pixels }
    }
}
