//! Ray type for the tracer.
//!
//! A ray is defined by an origin point, a unit direction, the number of
//! bounces that produced it and the surface it was cast from.

use std::sync::atomic::{AtomicU64, Ordering};

use lumen_math::Vec3;
use thiserror::Error;

use crate::PrimitiveId;

/// Process-wide ray counter, diagnostic only.
static NEXT_RAY_ID: AtomicU64 = AtomicU64::new(0);

/// Errors raised when constructing geometric values.
#[derive(Error, Debug, Clone, Copy, PartialEq)]
pub enum GeometryError {
    #[error("ray direction must be finite and non-zero, got {0}")]
    InvalidDirection(Vec3),
}

/// A ray with origin, unit direction, bounce depth and originating surface.
#[derive(Debug, Clone, Copy)]
pub struct Ray {
    origin: Vec3,
    direction: Vec3,
    depth: u32,
    id: u64,
    primitive: Option<PrimitiveId>,
}

impl Ray {
    /// Create a new ray.
    ///
    /// The direction is normalized. Zero, NaN and infinite directions are
    /// rejected.
    pub fn new(
        origin: Vec3,
        direction: Vec3,
        depth: u32,
        primitive: Option<PrimitiveId>,
    ) -> Result<Self, GeometryError> {
        let largest = direction.abs().max_element();
        if !direction.is_finite() || largest == 0.0 {
            return Err(GeometryError::InvalidDirection(direction));
        }
        // Rescale first so huge or tiny components don't overflow the length
        let direction = (direction / largest).normalize();

        Ok(Self {
            origin,
            direction,
            depth,
            id: NEXT_RAY_ID.fetch_add(1, Ordering::Relaxed),
            primitive,
        })
    }

    /// Create a primary ray (depth 0, not cast from any surface).
    #[inline]
    pub fn primary(origin: Vec3, direction: Vec3) -> Result<Self, GeometryError> {
        Self::new(origin, direction, 0, None)
    }

    /// Get the ray's origin point.
    #[inline]
    pub fn origin(&self) -> Vec3 {
        self.origin
    }

    /// Get the ray's unit direction.
    #[inline]
    pub fn direction(&self) -> Vec3 {
        self.direction
    }

    /// Number of bounces that led to this ray.
    #[inline]
    pub fn depth(&self) -> u32 {
        self.depth
    }

    /// Diagnostic identifier, unique within the process.
    #[inline]
    pub fn id(&self) -> u64 {
        self.id
    }

    /// The surface this ray was cast from, if any.
    #[inline]
    pub fn primitive(&self) -> Option<PrimitiveId> {
        self.primitive
    }

    /// Compute a point along the ray at parameter t.
    /// P(t) = origin + t * direction
    #[inline]
    pub fn at(&self, t: f32) -> Vec3 {
        self.origin + t * self.direction
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ray_at() {
        let ray = Ray::primary(Vec3::ZERO, Vec3::new(2.0, 0.0, 0.0)).unwrap();

        assert_eq!(ray.at(0.0), Vec3::ZERO);
        assert_eq!(ray.at(1.0), Vec3::X);
        assert_eq!(ray.at(2.5), Vec3::new(2.5, 0.0, 0.0));
    }

    #[test]
    fn test_ray_direction_is_unit() {
        let directions = [
            Vec3::new(1.0, 2.0, 3.0),
            Vec3::new(-1.0e-3, 0.0, 0.0),
            Vec3::new(1.0e6, -1.0e6, 4.0),
            Vec3::new(0.0, 0.0, -7.0),
        ];
        for d in directions {
            let ray = Ray::primary(Vec3::ONE, d).unwrap();
            assert!(ray.direction().is_finite());
            assert!((ray.direction().length() - 1.0).abs() < 1.0e-5);
        }
    }

    #[test]
    fn test_ray_rejects_invalid_direction() {
        let invalid = [
            Vec3::ZERO,
            Vec3::new(f32::NAN, 0.0, 1.0),
            Vec3::new(0.0, f32::INFINITY, 0.0),
            Vec3::splat(f32::NEG_INFINITY),
        ];
        for d in invalid {
            assert!(Ray::primary(Vec3::ZERO, d).is_err(), "accepted {d}");
        }
    }

    #[test]
    fn test_ray_ids_increase() {
        let a = Ray::primary(Vec3::ZERO, Vec3::Z).unwrap();
        let b = Ray::primary(Vec3::ZERO, Vec3::Z).unwrap();
        assert!(b.id() > a.id());
    }

    #[test]
    fn test_ray_accessors() {
        let origin = Vec3::new(1.0, 2.0, 3.0);
        let ray = Ray::new(origin, Vec3::Y, 3, Some(PrimitiveId::Shape(4))).unwrap();

        assert_eq!(ray.origin(), origin);
        assert_eq!(ray.direction(), Vec3::Y);
        assert_eq!(ray.depth(), 3);
        assert_eq!(ray.primitive(), Some(PrimitiveId::Shape(4)));
    }
}
