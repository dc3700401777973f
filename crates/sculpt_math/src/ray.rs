use crate::{Mat3, Vec3};

/// A ray in 3D space with an origin and a unit-length direction.
///
/// Sphere tracing steps along the ray by distances reported by the field,
/// so the direction is always normalized: `t` is then a world-space length.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct Ray {
    pub origin: Vec3,
    pub direction: Vec3,
}

impl Ray {
    /// Create a new ray. The direction is normalized.
    ///
    /// A zero direction yields a zero direction (no NaNs), which marches nowhere.
    pub fn new(origin: Vec3, direction: Vec3) -> Self {
        Self {
            origin,
            direction: direction.normalize_or_zero(),
        }
    }

    /// Get the origin point of the ray.
    #[inline]
    pub fn origin(&self) -> Vec3 {
        self.origin
    }

    /// Get the unit direction of the ray.
    #[inline]
    pub fn direction(&self) -> Vec3 {
        self.direction
    }

    /// Get the point along the ray at distance t.
    ///
    /// Returns: origin + t * direction
    #[inline]
    pub fn at(&self, t: f32) -> Vec3 {
        self.origin + self.direction * t
    }

    /// Express this ray in the frame spanned by the columns of `basis`.
    ///
    /// `basis` must be orthonormal; distances along the ray are preserved.
    pub fn to_basis(&self, basis: &Mat3) -> Ray {
        let inverse = basis.transpose();
        Ray {
            origin: inverse * self.origin,
            direction: inverse * self.direction,
        }
    }
}
