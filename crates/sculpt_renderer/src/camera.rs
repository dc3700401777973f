//! Pinhole camera for primary ray generation.

use rand::{Rng, RngCore};
use sculpt_core::{CameraFrame, ConfigResult};
use sculpt_math::{Ray, Vec2, Vec3};

/// Pinhole camera built on a [`CameraFrame`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PinholeCamera {
    frame: CameraFrame,
    pub image_width: u32,
    pub image_height: u32,
    /// Horizontal field of view in degrees
    fov: f32,

    // Cached computed values
    half_height: f32,
    half_width: f32,
}

impl PinholeCamera {
    /// Default field of view of the modeler camera.
    pub const DEFAULT_FOV: f32 = 80.0;

    /// Create a camera looking from `origin` at `look_at`.
    pub fn new(origin: Vec3, look_at: Vec3, width: u32, height: u32) -> ConfigResult<Self> {
        let frame = CameraFrame::build(origin, look_at)?;
        Ok(Self::from_frame(frame, width, height))
    }

    /// Create a camera from an already built frame.
    pub fn from_frame(frame: CameraFrame, width: u32, height: u32) -> Self {
        let mut camera = Self {
            frame,
            image_width: width.max(1),
            image_height: height.max(1),
            fov: Self::DEFAULT_FOV,
            half_height: 0.0,
            half_width: 0.0,
        };
        camera.initialize();
        camera
    }

    /// Set the horizontal field of view in degrees.
    pub fn with_fov(mut self, fov: f32) -> Self {
        self.fov = fov.clamp(1.0, 179.0);
        self.initialize();
        self
    }

    /// Replace the frame (e.g. after adding bounds).
    pub fn with_frame(mut self, frame: CameraFrame) -> Self {
        self.frame = frame;
        self
    }

    fn initialize(&mut self) {
        let aspect = self.image_width as f32 / self.image_height as f32;
        self.half_width = (self.fov.to_radians() / 2.0).tan();
        self.half_height = self.half_width / aspect;
    }

    pub fn frame(&self) -> &CameraFrame {
        &self.frame
    }

    pub fn fov(&self) -> f32 {
        self.fov
    }

    /// Ray through a normalized screen position; (0, 0) is the top-left
    /// corner and (1, 1) the bottom-right.
    pub fn ray_for_uv(&self, uv: Vec2) -> Ray {
        let ndc_x = uv.x * 2.0 - 1.0;
        let ndc_y = 1.0 - uv.y * 2.0;
        let direction = self.frame.forward()
            + self.frame.right() * (ndc_x * self.half_width)
            + self.frame.up() * (ndc_y * self.half_height);
        Ray::new(self.frame.origin(), direction)
    }

    /// Ray through pixel (i, j) with a random offset inside the pixel.
    pub fn get_ray(&self, i: u32, j: u32, rng: &mut dyn RngCore) -> Ray {
        let offset = sample_square(rng);
        let uv = Vec2::new(
            (i as f32 + 0.5 + offset.x) / self.image_width as f32,
            (j as f32 + 0.5 + offset.y) / self.image_height as f32,
        );
        self.ray_for_uv(uv)
    }
}

/// Sample a random point in the unit square [-0.5, 0.5] x [-0.5, 0.5].
fn sample_square(rng: &mut dyn RngCore) -> Vec2 {
    Vec2::new(rng.gen::<f32>() - 0.5, rng.gen::<f32>() - 0.5)
}
