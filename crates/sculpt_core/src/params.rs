//! Per-frame trace parameters and frame state supplied by the host.

use sculpt_math::Vec3;

use crate::error::{ConfigError, ConfigResult};

/// Parameters for one dispatch of the evaluator.
///
/// Rebuilt every frame. The random vector is the only source of
/// randomness the evaluator sees; the host reseeds it each frame.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TraceParams {
    /// Samples per pixel for this frame (>= 1)
    pub samples: u32,
    /// Bounce depth the trace starts at
    pub depth: u32,
    /// Tracing stops once depth reaches this
    pub max_depth: u32,
    /// Rays are abandoned past this travelled distance
    pub max_distance: f32,
    /// Per-frame seed, components in [0, 1)
    pub random_vector: Vec3,
}

impl Default for TraceParams {
    fn default() -> Self {
        Self {
            samples: 1,
            depth: 0,
            max_depth: 4,
            max_distance: 100.0,
            random_vector: Vec3::splat(0.5),
        }
    }
}

impl TraceParams {
    /// Create validated parameters starting at depth 0.
    pub fn new(samples: u32, max_depth: u32, max_distance: f32, random_vector: Vec3) -> ConfigResult<Self> {
        let params = Self {
            samples,
            depth: 0,
            max_depth,
            max_distance,
            random_vector,
        };
        params.validate()?;
        Ok(params)
    }

    pub fn validate(&self) -> ConfigResult<()> {
        if self.samples == 0 {
            return Err(ConfigError::InvalidSamples);
        }
        if !self.max_distance.is_finite() || self.max_distance <= 0.0 {
            return Err(ConfigError::InvalidMaxDistance(self.max_distance));
        }
        if !self.random_vector.is_finite() {
            return Err(ConfigError::NonFinite("random vector"));
        }
        Ok(())
    }

    /// Same parameters with a fresh per-frame seed.
    pub fn reseeded(mut self, random_vector: Vec3) -> Self {
        self.random_vector = random_vector;
        self
    }

    /// True once no further bounce may be traced.
    #[inline]
    pub fn depth_exhausted(&self) -> bool {
        self.depth >= self.max_depth
    }
}

/// Time and frame counter of the host loop.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct FrameState {
    /// Elapsed time in seconds
    pub time: f32,
    /// Monotonically increasing frame index
    pub frame: u32,
}

impl FrameState {
    pub fn new(time: f32, frame: u32) -> Self {
        Self { time, frame }
    }

    /// Next frame, `dt` seconds later.
    pub fn advance(&self, dt: f32) -> Self {
        Self {
            time: self.time + dt,
            frame: self.frame.wrapping_add(1),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_params_validation() {
        assert!(TraceParams::new(4, 4, 50.0, Vec3::splat(0.25)).is_ok());
        assert_eq!(
            TraceParams::new(0, 4, 50.0, Vec3::ZERO),
            Err(ConfigError::InvalidSamples)
        );
        assert_eq!(
            TraceParams::new(1, 4, 0.0, Vec3::ZERO),
            Err(ConfigError::InvalidMaxDistance(0.0))
        );
        assert!(TraceParams::new(1, 4, f32::INFINITY, Vec3::ZERO).is_err());
    }

    #[test]
    fn test_depth_exhausted() {
        let mut params = TraceParams::new(1, 2, 10.0, Vec3::ZERO).unwrap();
        assert!(!params.depth_exhausted());
        params.depth = 2;
        assert!(params.depth_exhausted());

        let zero = TraceParams::new(1, 0, 10.0, Vec3::ZERO).unwrap();
        assert!(zero.depth_exhausted());
    }

    #[test]
    fn test_reseed_keeps_everything_else() {
        let params = TraceParams::default();
        let reseeded = params.reseeded(Vec3::new(0.1, 0.2, 0.3));
        assert_eq!(reseeded.random_vector, Vec3::new(0.1, 0.2, 0.3));
        assert_eq!(reseeded.samples, params.samples);
        assert_eq!(reseeded.max_depth, params.max_depth);
    }

    #[test]
    fn test_frame_state_advance() {
        let frame = FrameState::default().advance(0.5).advance(0.25);
        assert_eq!(frame.frame, 2);
        assert_eq!(frame.time, 0.75);
    }
}
