//! Configuration errors raised at the scene-edit and setup boundary.
//!
//! Evaluation itself never fails: everything that could make the distance
//! field or the camera ill-defined is rejected here, before it reaches the
//! scene graph or a dispatch.

use sculpt_math::Vec3;
use thiserror::Error;

use crate::scene::NodeId;

/// Errors for invalid primitives, cameras, or trace parameters.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ConfigError {
    #[error("Degenerate camera: origin and look-at coincide")]
    DegenerateCamera,

    #[error("Invalid sphere radius: {0} (must be finite and > 0)")]
    InvalidRadius(f32),

    #[error("Invalid box half-extents: {0} (components must be finite and > 0)")]
    InvalidExtents(Vec3),

    #[error("Invalid box rounding: {rounding} (must be in [0, {max}])")]
    InvalidRounding { rounding: f32, max: f32 },

    #[error("Non-finite value for {0}")]
    NonFinite(&'static str),

    #[error("Unknown scene node: {0}")]
    UnknownNode(NodeId),

    #[error("Samples per pixel must be at least 1")]
    InvalidSamples,

    #[error("Invalid max distance: {0} (must be finite and > 0)")]
    InvalidMaxDistance(f32),
}

pub type ConfigResult<T> = Result<T, ConfigError>;
