//! Sculpt Renderer - CPU sphere tracing and progressive path tracing.
//!
//! Renders a [`sculpt_core::Scene`] by marching rays through its combined
//! distance field. Frames are split into buckets rendered in parallel with
//! rayon and blended into a running mean by the [`ProgressiveSampler`].

mod bucket;
mod camera;
mod march;
mod material;
mod renderer;
mod sampler;
mod sky;
mod tracer;

pub use bucket::{generate_buckets, render_bucket, Bucket, BucketResult, DEFAULT_BUCKET_SIZE};
pub use camera::PinholeCamera;
pub use march::{march, march_in_frame, normal, GroundPlane, MarchOutcome, MarchSettings};
pub use material::{absorbs, cosine_direction, lambert, Color, DirectionalLight};
pub use renderer::{clamp_01, color_to_rgba, linear_to_gamma, render_frame, ImageBuffer, RenderSettings};
pub use sampler::{blend_mean, Accumulator, CancelToken, ProgressiveSampler, ResetReason, SamplerEvent};
pub use sky::SkyConfig;
pub use tracer::{background, intersect, pick, render_pixel, sample_rng, trace_path, PathResult, SurfaceHit, Termination};

/// Re-export Vec3 and common math types from sculpt_math
pub use sculpt_math::{Interval, Ray, Vec2, Vec3};
