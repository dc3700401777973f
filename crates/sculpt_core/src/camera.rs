//! Camera frame: orthonormal viewing basis and a bounding interval.

use sculpt_math::{Aabb, Interval, Mat3, Ray, Vec3};

use crate::error::{ConfigError, ConfigResult};

/// Below this origin/look-at separation the forward axis is undefined.
const MIN_VIEW_DISTANCE: f32 = 1e-6;

/// When |forward . up| exceeds this, world-up is too close to forward.
const PARALLEL_THRESHOLD: f32 = 0.999;

/// Viewing basis derived from an origin and look-at point.
///
/// The basis columns are `[right, up, forward]`. `P`/`L` optionally bound
/// the scene's working volume in basis space; rays that miss it are
/// rejected before marching.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CameraFrame {
    origin: Vec3,
    look_at: Vec3,
    basis: Mat3,
    bounds: Option<Aabb>,
}

impl CameraFrame {
    /// Build the frame. Fails when origin and look-at coincide.
    pub fn build(origin: Vec3, look_at: Vec3) -> ConfigResult<Self> {
        if !origin.is_finite() || !look_at.is_finite() {
            return Err(ConfigError::NonFinite("camera position"));
        }
        let view = look_at - origin;
        if view.length() < MIN_VIEW_DISTANCE {
            return Err(ConfigError::DegenerateCamera);
        }
        let forward = view.normalize();

        // Fall back to +Z so the cross product never degenerates
        let up_reference = if forward.dot(Vec3::Y).abs() > PARALLEL_THRESHOLD {
            Vec3::Z
        } else {
            Vec3::Y
        };
        let right = forward.cross(up_reference).normalize();
        let up = right.cross(forward);

        Ok(Self {
            origin,
            look_at,
            basis: Mat3::from_cols(right, up, forward),
            bounds: None,
        })
    }

    /// Set the bounding interval directly in basis space.
    pub fn with_bounds(mut self, p: Vec3, l: Vec3) -> Self {
        self.bounds = Some(Aabb::from_points(p, l));
        self
    }

    /// Bound the working volume by a world-space box.
    pub fn with_world_bounds(mut self, world: &Aabb) -> Self {
        self.bounds = if world.is_empty() {
            Some(Aabb::EMPTY)
        } else {
            let inverse = self.basis.transpose();
            Some(Aabb::enclosing(world.corners().map(|c| inverse * c)))
        };
        self
    }

    /// Remove the bounding interval (no early rejection).
    pub fn without_bounds(mut self) -> Self {
        self.bounds = None;
        self
    }

    pub fn origin(&self) -> Vec3 {
        self.origin
    }

    pub fn look_at(&self) -> Vec3 {
        self.look_at
    }

    pub fn basis(&self) -> Mat3 {
        self.basis
    }

    pub fn right(&self) -> Vec3 {
        self.basis.x_axis
    }

    pub fn up(&self) -> Vec3 {
        self.basis.y_axis
    }

    pub fn forward(&self) -> Vec3 {
        self.basis.z_axis
    }

    /// Lower (`P`) and upper (`L`) corners of the bounds in basis space.
    pub fn bounds(&self) -> Option<(Vec3, Vec3)> {
        self.bounds.map(|b| (b.min(), b.max()))
    }

    /// Clip a world-space ray's parameter range against the bounds.
    ///
    /// Returns `ray_t` unchanged when no bounds are set, and `None` when the
    /// ray cannot reach the working volume.
    pub fn clip(&self, ray: &Ray, ray_t: Interval) -> Option<Interval> {
        match &self.bounds {
            None => Some(ray_t),
            Some(bounds) => bounds.clip(&ray.to_basis(&self.basis), ray_t),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn assert_orthonormal(frame: &CameraFrame) {
        let (r, u, f) = (frame.right(), frame.up(), frame.forward());
        for v in [r, u, f] {
            assert!((v.length() - 1.0).abs() < 1e-5, "not unit: {v:?}");
        }
        assert!(r.dot(u).abs() < 1e-5);
        assert!(r.dot(f).abs() < 1e-5);
        assert!(u.dot(f).abs() < 1e-5);
    }

    #[test]
    fn test_basis_is_orthonormal() {
        let cases = [
            (Vec3::new(0.0, 0.0, 5.0), Vec3::ZERO),
            (Vec3::new(3.0, 2.0, -1.0), Vec3::new(0.0, 0.5, 0.0)),
            (Vec3::new(0.0, 10.0, 0.0), Vec3::ZERO),
            (Vec3::new(0.0, -10.0, 0.0), Vec3::ZERO),
            (Vec3::new(1e-3, 10.0, 0.0), Vec3::ZERO),
        ];
        for (origin, look_at) in cases {
            let frame = CameraFrame::build(origin, look_at).unwrap();
            assert_orthonormal(&frame);
            assert!((frame.forward() - (look_at - origin).normalize()).length() < 1e-5);
        }
    }

    #[test]
    fn test_up_points_up() {
        let frame = CameraFrame::build(Vec3::new(0.0, 0.0, -5.0), Vec3::ZERO).unwrap();
        assert!((frame.up() - Vec3::Y).length() < 1e-6);
        assert!((frame.forward() - Vec3::Z).length() < 1e-6);
    }

    #[test]
    fn test_degenerate_camera() {
        let p = Vec3::new(1.0, 2.0, 3.0);
        assert_eq!(CameraFrame::build(p, p), Err(ConfigError::DegenerateCamera));
        assert_eq!(
            CameraFrame::build(Vec3::ZERO, Vec3::splat(1e-8)),
            Err(ConfigError::DegenerateCamera)
        );
    }

    #[test]
    fn test_world_bounds_clip() {
        let world = Aabb::from_points(Vec3::splat(-1.0), Vec3::splat(1.0));
        let frame = CameraFrame::build(Vec3::new(3.0, 2.0, 5.0), Vec3::ZERO)
            .unwrap()
            .with_world_bounds(&world);

        // Straight at the center: enters the volume
        let toward = Ray::new(frame.origin(), frame.forward());
        let clipped = frame.clip(&toward, Interval::new(0.0, 100.0)).unwrap();
        assert!(clipped.min > 0.0);

        // Straight away: rejected
        let away = Ray::new(frame.origin(), -frame.forward());
        assert!(frame.clip(&away, Interval::new(0.0, 100.0)).is_none());

        let (p, l) = frame.bounds().unwrap();
        assert!(p.cmple(l).all());
    }

    #[test]
    fn test_empty_world_bounds_reject_all() {
        let frame = CameraFrame::build(Vec3::new(0.0, 0.0, 5.0), Vec3::ZERO)
            .unwrap()
            .with_world_bounds(&Aabb::EMPTY);
        let ray = Ray::new(frame.origin(), frame.forward());
        assert!(frame.clip(&ray, Interval::new(0.0, 10.0)).is_none());

        let unbounded = frame.without_bounds();
        assert_eq!(
            unbounded.clip(&ray, Interval::new(0.0, 10.0)),
            Some(Interval::new(0.0, 10.0))
        );
    }
}
