//! Infinite plane primitive.

use lumen_math::{equal, Aabb, Vec3, EPSILON, EPSILON_LARGE, RAY_LENGTH_MAX};

use crate::{Intersection, Ray};

/// An infinite plane through `point` with unit `normal`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Plane {
    point: Vec3,
    normal: Vec3,
    material: usize,
}

impl Plane {
    /// Create a new plane. The normal is normalized.
    pub fn new(point: Vec3, normal: Vec3, material: usize) -> Self {
        Self {
            point,
            normal: normal.normalize(),
            material,
        }
    }

    pub fn point(&self) -> Vec3 {
        self.point
    }

    pub fn normal(&self) -> Vec3 {
        self.normal
    }

    pub fn material(&self) -> usize {
        self.material
    }

    /// Signed distance from a point to the plane.
    #[inline]
    pub fn distance(&self, p: Vec3) -> f32 {
        (p - self.point).dot(self.normal)
    }

    /// Intersect a ray with this plane, updating `hit` if strictly closer.
    pub fn intersect(&self, ray: &Ray, hit: &mut Intersection) -> bool {
        let denom = self.normal.dot(ray.direction());
        // Ray is parallel to the plane
        if denom.abs() < EPSILON {
            return false;
        }

        let distance = (self.point - ray.origin()).dot(self.normal) / denom;
        if distance < EPSILON_LARGE || distance >= hit.length {
            return false;
        }

        hit.record(ray.at(distance), distance, self.normal, Some(self.material));
        true
    }

    /// Returns true if the box has corners on both sides of (or on) the plane.
    pub fn intersect_box(&self, bbox: &Aabb) -> bool {
        let mut below = false;
        let mut above = false;
        for corner in bbox.corners() {
            let d = self.distance(corner);
            if equal(d, 0.0) {
                return true;
            }
            below |= d < 0.0;
            above |= d > 0.0;
        }
        below && above
    }

    /// Bounding box of the plane.
    ///
    /// Thin on the axis an axis-aligned normal points along, unbounded on
    /// every other axis.
    pub fn bounding_box(&self) -> Aabb {
        let mut min = Vec3::splat(-RAY_LENGTH_MAX);
        let mut max = Vec3::splat(RAY_LENGTH_MAX);
        for axis in 0..3 {
            if equal(self.normal[axis].abs(), 1.0) {
                min[axis] = self.point[axis] - EPSILON_LARGE;
                max[axis] = self.point[axis] + EPSILON_LARGE;
            }
        }
        Aabb::new(min, max)
    }
}
