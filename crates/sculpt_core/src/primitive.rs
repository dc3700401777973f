//! Signed distance primitives.
//!
//! Every distance function here is negative inside, zero on the surface and
//! positive outside, and never overestimates the true distance, so a ray
//! marcher can step by the returned value without tunneling through thin
//! geometry.

use sculpt_math::{Aabb, EulerRot, Mat3, Quat, Vec3};

use crate::error::{ConfigError, ConfigResult};

/// A sphere primitive.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Sphere {
    pub center: Vec3,
    pub radius: f32,
}

impl Sphere {
    /// Create a new sphere. Validation happens when it enters a scene.
    pub fn new(center: Vec3, radius: f32) -> Self {
        Self { center, radius }
    }

    #[inline]
    pub fn distance(&self, p: Vec3) -> f32 {
        (p - self.center).length() - self.radius
    }

    pub fn bounds(&self) -> Aabb {
        let rvec = Vec3::splat(self.radius);
        Aabb::from_points(self.center - rvec, self.center + rvec)
    }

    fn validate(&self) -> ConfigResult<()> {
        if !self.center.is_finite() {
            return Err(ConfigError::NonFinite("sphere center"));
        }
        if !self.radius.is_finite() || self.radius <= 0.0 {
            return Err(ConfigError::InvalidRadius(self.radius));
        }
        Ok(())
    }
}

/// An oriented box with rounded edges.
///
/// `half_extents` is the outer size of the box. Rounding is carved out of
/// it, so the flat core spans `half_extents - rounding` and the overall
/// footprint never grows with rounding.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RoundedBox {
    center: Vec3,
    /// XYZ Euler angles in radians
    rotation: Vec3,
    half_extents: Vec3,
    rounding: f32,
    inverse_rotation: Quat,
}

impl RoundedBox {
    /// Create a new box. Validation happens when it enters a scene.
    pub fn new(center: Vec3, rotation: Vec3, half_extents: Vec3, rounding: f32) -> Self {
        let orientation = Quat::from_euler(EulerRot::XYZ, rotation.x, rotation.y, rotation.z);
        Self {
            center,
            rotation,
            half_extents,
            rounding,
            inverse_rotation: orientation.inverse(),
        }
    }

    /// Axis-aligned box without rounding.
    pub fn axis_aligned(center: Vec3, half_extents: Vec3) -> Self {
        Self::new(center, Vec3::ZERO, half_extents, 0.0)
    }

    pub fn center(&self) -> Vec3 {
        self.center
    }

    pub fn rotation(&self) -> Vec3 {
        self.rotation
    }

    pub fn half_extents(&self) -> Vec3 {
        self.half_extents
    }

    pub fn rounding(&self) -> f32 {
        self.rounding
    }

    /// Transform a world-space point into box-local space.
    #[inline]
    pub fn to_local(&self, p: Vec3) -> Vec3 {
        self.inverse_rotation * (p - self.center)
    }

    #[inline]
    pub fn distance(&self, p: Vec3) -> f32 {
        let local = self.to_local(p);
        let q = local.abs() - (self.half_extents - Vec3::splat(self.rounding));
        // Interior term keeps points inside the core correctly negative
        q.max(Vec3::ZERO).length() + q.max_element().min(0.0) - self.rounding
    }

    /// World-space bounds of the rotated box.
    pub fn bounds(&self) -> Aabb {
        let m = Mat3::from_quat(self.inverse_rotation.inverse());
        let extent = m.x_axis.abs() * self.half_extents.x
            + m.y_axis.abs() * self.half_extents.y
            + m.z_axis.abs() * self.half_extents.z;
        Aabb::from_points(self.center - extent, self.center + extent)
    }

    fn validate(&self) -> ConfigResult<()> {
        if !self.center.is_finite() {
            return Err(ConfigError::NonFinite("box center"));
        }
        if !self.rotation.is_finite() {
            return Err(ConfigError::NonFinite("box rotation"));
        }
        if !self.half_extents.is_finite() || self.half_extents.min_element() <= 0.0 {
            return Err(ConfigError::InvalidExtents(self.half_extents));
        }
        let max = self.half_extents.min_element();
        if !self.rounding.is_finite() || self.rounding < 0.0 || self.rounding > max {
            return Err(ConfigError::InvalidRounding {
                rounding: self.rounding,
                max,
            });
        }
        Ok(())
    }
}

/// A shape the modeler can place in a scene.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Primitive {
    Sphere(Sphere),
    Box(RoundedBox),
}

impl Primitive {
    /// Shader-side code for a sphere.
    pub const SPHERE_CODE: i32 = 0;
    /// Shader-side code for a box.
    pub const BOX_CODE: i32 = 1;

    /// Create a validated sphere.
    pub fn sphere(center: Vec3, radius: f32) -> ConfigResult<Self> {
        let primitive = Primitive::Sphere(Sphere::new(center, radius));
        primitive.validate()?;
        Ok(primitive)
    }

    /// Create a validated, possibly rotated and rounded box.
    pub fn rounded_box(
        center: Vec3,
        rotation: Vec3,
        half_extents: Vec3,
        rounding: f32,
    ) -> ConfigResult<Self> {
        let primitive = Primitive::Box(RoundedBox::new(center, rotation, half_extents, rounding));
        primitive.validate()?;
        Ok(primitive)
    }

    /// Signed distance from `p` to the surface.
    #[inline]
    pub fn distance(&self, p: Vec3) -> f32 {
        match self {
            Primitive::Sphere(sphere) => sphere.distance(p),
            Primitive::Box(b) => b.distance(p),
        }
    }

    /// Conservative world-space bounds.
    pub fn bounds(&self) -> Aabb {
        match self {
            Primitive::Sphere(sphere) => sphere.bounds(),
            Primitive::Box(b) => b.bounds(),
        }
    }

    /// Check radius, extents and rounding.
    pub fn validate(&self) -> ConfigResult<()> {
        match self {
            Primitive::Sphere(sphere) => sphere.validate(),
            Primitive::Box(b) => b.validate(),
        }
    }

    pub fn type_code(&self) -> i32 {
        match self {
            Primitive::Sphere(_) => Self::SPHERE_CODE,
            Primitive::Box(_) => Self::BOX_CODE,
        }
    }

    pub fn center(&self) -> Vec3 {
        match self {
            Primitive::Sphere(sphere) => sphere.center,
            Primitive::Box(b) => b.center,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::{Rng, SeedableRng};

    fn random_vec3(rng: &mut StdRng, lo: f32, hi: f32) -> Vec3 {
        Vec3::new(rng.gen_range(lo..hi), rng.gen_range(lo..hi), rng.gen_range(lo..hi))
    }

    #[test]
    fn test_sphere_distance_at_center_is_negative_radius() {
        let mut rng = StdRng::seed_from_u64(42);
        for _ in 0..200 {
            let center = random_vec3(&mut rng, -50.0, 50.0);
            let radius = rng.gen_range(0.001..20.0);
            let sphere = Sphere::new(center, radius);
            assert_eq!(sphere.distance(center), -radius);
        }
    }

    #[test]
    fn test_sphere_distance_signs() {
        let sphere = Sphere::new(Vec3::ZERO, 1.0);
        assert!(sphere.distance(Vec3::new(0.5, 0.0, 0.0)) < 0.0);
        assert_eq!(sphere.distance(Vec3::new(0.0, 1.0, 0.0)), 0.0);
        assert!((sphere.distance(Vec3::new(0.0, 0.0, 3.0)) - 2.0).abs() < 1e-6);
    }

    #[test]
    fn test_box_positive_outside_along_one_axis() {
        let mut rng = StdRng::seed_from_u64(7);
        for _ in 0..200 {
            let center = random_vec3(&mut rng, -10.0, 10.0);
            let rotation = random_vec3(&mut rng, -3.0, 3.0);
            let half_extents = random_vec3(&mut rng, 0.1, 3.0);
            let rounding = rng.gen_range(0.0..half_extents.min_element());
            let b = RoundedBox::new(center, rotation, half_extents, rounding);

            let axis = rng.gen_range(0..3);
            // Inside on the other two axes, beyond the extent on this one
            let mut local = Vec3::new(
                rng.gen_range(-1.0..1.0) * half_extents.x,
                rng.gen_range(-1.0..1.0) * half_extents.y,
                rng.gen_range(-1.0..1.0) * half_extents.z,
            );
            let sign = if rng.gen_bool(0.5) { 1.0 } else { -1.0 };
            local[axis] = sign * (half_extents[axis] + rng.gen_range(0.01..5.0));

            let orientation = Quat::from_euler(EulerRot::XYZ, rotation.x, rotation.y, rotation.z);
            let world = center + orientation * local;
            assert!(b.distance(world) > 0.0, "local={local:?} d={}", b.distance(world));
        }
    }

    #[test]
    fn test_box_interior_is_negative() {
        let b = RoundedBox::axis_aligned(Vec3::ZERO, Vec3::new(1.0, 2.0, 3.0));
        assert!((b.distance(Vec3::ZERO) + 1.0).abs() < 1e-6);
        assert!((b.distance(Vec3::new(0.0, 1.5, 0.0)) + 0.5).abs() < 1e-6);
    }

    #[test]
    fn test_box_surface_and_outside() {
        let b = RoundedBox::axis_aligned(Vec3::new(1.0, 0.0, 0.0), Vec3::splat(0.5));
        assert!(b.distance(Vec3::new(1.5, 0.0, 0.0)).abs() < 1e-6);
        assert!((b.distance(Vec3::new(3.0, 0.0, 0.0)) - 1.5).abs() < 1e-6);

        // Outside a corner the distance is Euclidean
        let d = b.distance(Vec3::new(2.5, 1.5, 0.0));
        assert!((d - 2.0_f32.sqrt()).abs() < 1e-5);
    }

    #[test]
    fn test_rounding_keeps_footprint() {
        let b = RoundedBox::new(Vec3::ZERO, Vec3::ZERO, Vec3::splat(1.0), 0.25);
        // Face centers are still on the surface
        assert!(b.distance(Vec3::new(1.0, 0.0, 0.0)).abs() < 1e-6);
        // Corners are carved away
        assert!(b.distance(Vec3::splat(1.0)) > 0.0);
    }

    #[test]
    fn test_rotated_box() {
        let b = RoundedBox::new(
            Vec3::ZERO,
            Vec3::new(0.0, 0.0, std::f32::consts::FRAC_PI_2),
            Vec3::new(2.0, 0.5, 0.5),
            0.0,
        );
        // Long axis now points along world Y
        assert!(b.distance(Vec3::new(0.0, 1.9, 0.0)) < 0.0);
        assert!(b.distance(Vec3::new(1.9, 0.0, 0.0)) > 0.0);

        let bounds = b.bounds();
        assert!((bounds.y.max - 2.0).abs() < 1e-4);
        assert!((bounds.x.max - 0.5).abs() < 1e-4);
    }

    #[test]
    fn test_validation() {
        assert!(Primitive::sphere(Vec3::ZERO, 1.0).is_ok());
        assert_eq!(
            Primitive::sphere(Vec3::ZERO, 0.0),
            Err(ConfigError::InvalidRadius(0.0))
        );
        assert!(matches!(
            Primitive::sphere(Vec3::ZERO, -1.0),
            Err(ConfigError::InvalidRadius(_))
        ));
        assert_eq!(
            Primitive::sphere(Vec3::new(f32::NAN, 0.0, 0.0), 1.0),
            Err(ConfigError::NonFinite("sphere center"))
        );

        assert!(matches!(
            Primitive::rounded_box(Vec3::ZERO, Vec3::ZERO, Vec3::new(1.0, 0.0, 1.0), 0.0),
            Err(ConfigError::InvalidExtents(_))
        ));
        assert_eq!(
            Primitive::rounded_box(Vec3::ZERO, Vec3::ZERO, Vec3::new(1.0, 0.5, 1.0), 0.75),
            Err(ConfigError::InvalidRounding {
                rounding: 0.75,
                max: 0.5
            })
        );
        assert!(Primitive::rounded_box(Vec3::ZERO, Vec3::ZERO, Vec3::splat(0.5), 0.5).is_ok());
    }

    #[test]
    fn test_bounds_enclose_surface() {
        let mut rng = StdRng::seed_from_u64(3);
        let b = Primitive::rounded_box(
            Vec3::new(1.0, 2.0, 3.0),
            Vec3::new(0.3, 0.7, -0.2),
            Vec3::new(1.0, 0.5, 0.25),
            0.1,
        )
        .unwrap();
        let bounds = b.bounds();
        for _ in 0..500 {
            let p = bounds.centroid() + random_vec3(&mut rng, -3.0, 3.0);
            let inside_bounds = bounds.x.contains(p.x) && bounds.y.contains(p.y) && bounds.z.contains(p.z);
            if b.distance(p) < 0.0 {
                assert!(inside_bounds);
            }
        }
    }

    #[test]
    fn test_type_codes() {
        let sphere = Primitive::sphere(Vec3::ZERO, 1.0).unwrap();
        let b = Primitive::rounded_box(Vec3::ZERO, Vec3::ZERO, Vec3::ONE, 0.0).unwrap();
        assert_eq!(sphere.type_code(), Primitive::SPHERE_CODE);
        assert_eq!(b.type_code(), Primitive::BOX_CODE);
    }
}
