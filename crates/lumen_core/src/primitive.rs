//! Closed set of scene primitives and the ids that refer to them.

use lumen_math::Aabb;

use crate::{Intersection, Plane, Ray, Sphere, Triangle};

/// Reference to a surface stored in a [`Scene`](crate::Scene).
///
/// Indices are stable for the lifetime of the scene since geometry is only
/// appended during loading.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PrimitiveId {
    /// Index into the scene's primitives
    Shape(usize),
    /// Index into the scene's lights
    Light(usize),
}

/// A geometric primitive.
///
/// Dispatch is a `match` over a fixed variant set rather than a trait object.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Primitive {
    Sphere(Sphere),
    Plane(Plane),
    Triangle(Triangle),
}

impl Primitive {
    /// Intersect a ray, updating `hit` only if the hit is strictly closer.
    #[inline]
    pub fn intersect(&self, ray: &Ray, hit: &mut Intersection) -> bool {
        match self {
            Primitive::Sphere(s) => s.intersect(ray, hit),
            Primitive::Plane(p) => p.intersect(ray, hit),
            Primitive::Triangle(t) => t.intersect(ray, hit),
        }
    }

    /// Returns true if the primitive overlaps the box.
    pub fn intersect_box(&self, bbox: &Aabb) -> bool {
        match self {
            Primitive::Sphere(s) => s.intersect_box(bbox),
            Primitive::Plane(p) => p.intersect_box(bbox),
            Primitive::Triangle(t) => t.intersect_box(bbox),
        }
    }

    pub fn bounding_box(&self) -> Aabb {
        match self {
            Primitive::Sphere(s) => s.bounding_box(),
            Primitive::Plane(p) => p.bounding_box(),
            Primitive::Triangle(t) => t.bounding_box(),
        }
    }

    pub fn material(&self) -> usize {
        match self {
            Primitive::Sphere(s) => s.material(),
            Primitive::Plane(p) => p.material(),
            Primitive::Triangle(t) => t.material(),
        }
    }

    /// Whether the primitive has finite extent (planes don't).
    pub fn is_bounded(&self) -> bool {
        !matches!(self, Primitive::Plane(_))
    }

    /// Flat surfaces can never be hit again by a ray leaving them.
    pub fn is_flat(&self) -> bool {
        matches!(self, Primitive::Plane(_) | Primitive::Triangle(_))
    }
}

impl From<Sphere> for Primitive {
    fn from(s: Sphere) -> Self {
        Primitive::Sphere(s)
    }
}

impl From<Plane> for Primitive {
    fn from(p: Plane) -> Self {
        Primitive::Plane(p)
    }
}

impl From<Triangle> for Primitive {
    fn from(t: Triangle) -> Self {
        Primitive::Triangle(t)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use lumen_math::Vec3;

    #[test]
    fn test_dispatch_keeps_closest() {
        let near: Primitive = Sphere::new(Vec3::new(0.0, 0.0, -3.0), 1.0, 0).into();
        let far: Primitive = Plane::new(Vec3::new(0.0, 0.0, -10.0), Vec3::Z, 1).into();
        let ray = Ray::primary(Vec3::ZERO, Vec3::new(0.0, 0.0, -1.0)).unwrap();

        let mut hit = Intersection::default();
        assert!(near.intersect(&ray, &mut hit));
        assert!(!far.intersect(&ray, &mut hit));
        assert_eq!(hit.material, Some(0));
        assert!((hit.length - 2.0).abs() < 1.0e-5);
    }

    #[test]
    fn test_flags() {
        let tri: Primitive = Triangle::new(Vec3::ZERO, Vec3::X, Vec3::Y, 0).into();
        let plane: Primitive = Plane::new(Vec3::ZERO, Vec3::Y, 0).into();
        let sphere: Primitive = Sphere::new(Vec3::ZERO, 1.0, 0).into();

        assert!(tri.is_bounded() && tri.is_flat());
        assert!(!plane.is_bounded() && plane.is_flat());
        assert!(sphere.is_bounded() && !sphere.is_flat());
    }
}
