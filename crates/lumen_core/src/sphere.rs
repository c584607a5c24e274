//! Sphere primitive.

use lumen_math::{equal, Aabb, Vec3, EPSILON_LARGE};

use crate::{Intersection, Ray};

/// A sphere, storing its squared radius to avoid repeated square roots.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Sphere {
    center: Vec3,
    sq_radius: f32,
    material: usize,
}

impl Sphere {
    /// Create a new sphere.
    pub fn new(center: Vec3, radius: f32, material: usize) -> Self {
        Self {
            center,
            sq_radius: radius * radius,
            material,
        }
    }

    pub fn center(&self) -> Vec3 {
        self.center
    }

    pub fn radius(&self) -> f32 {
        self.sq_radius.sqrt()
    }

    pub fn material(&self) -> usize {
        self.material
    }

    /// Intersect a ray with this sphere, updating `hit` if strictly closer.
    ///
    /// Solves `a*t^2 + b*t + c = 0` with `a = d.d`, `b = -2 * (oc.d)` and
    /// `c = |oc|^2 - r^2`. Tangent rays (discriminant ~ 0) count as misses.
    pub fn intersect(&self, ray: &Ray, hit: &mut Intersection) -> bool {
        let origin_to_center = self.center - ray.origin();
        let projection = origin_to_center.dot(ray.direction());

        let a = ray.direction().length_squared();
        let b = -2.0 * projection;
        let c = origin_to_center.length_squared() - self.sq_radius;

        let discriminant = b * b - 4.0 * a * c;
        if discriminant < 0.0 || equal(discriminant, 0.0) {
            return false;
        }

        // The smaller root is the closer intersection
        let root = discriminant.sqrt();
        let distance = (-b - root).min(-b + root) / (2.0 * a);

        if distance < EPSILON_LARGE || distance >= hit.length {
            return false;
        }

        let point = ray.at(distance);
        let normal = (point - self.center).normalize();
        hit.record(point, distance, normal, Some(self.material));

        true
    }

    /// Exact closest-point test between the sphere and a box.
    pub fn intersect_box(&self, bbox: &Aabb) -> bool {
        let mut dist_sq = 0.0f32;
        for axis in 0..3 {
            let c = self.center[axis];
            if c < bbox.min[axis] {
                dist_sq += (c - bbox.min[axis]) * (c - bbox.min[axis]);
            } else if c > bbox.max[axis] {
                dist_sq += (c - bbox.max[axis]) * (c - bbox.max[axis]);
            }
        }
        dist_sq <= self.sq_radius
    }

    pub fn bounding_box(&self) -> Aabb {
        let r = Vec3::splat(self.radius());
        Aabb::new(self.center - r, self.center + r)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sphere() -> Sphere {
        Sphere::new(Vec3::new(0.0, 0.0, -5.0), 1.0, 3)
    }

    #[test]
    fn test_sphere_hit_through_center() {
        let ray = Ray::primary(Vec3::ZERO, Vec3::new(0.0, 0.0, -1.0)).unwrap();
        let mut hit = Intersection::default();

        assert!(sphere().intersect(&ray, &mut hit));
        assert!((hit.length - 4.0).abs() < 1.0e-5);
        assert!(((hit.point - sphere().center()).length() - 1.0).abs() < 1.0e-5);
        assert!((hit.normal - Vec3::Z).length() < 1.0e-5);
        assert_eq!(hit.material, Some(3));
        assert_eq!(hit.primitive, None);
    }

    #[test]
    fn test_sphere_miss_leaves_record_unchanged() {
        let ray = Ray::primary(Vec3::ZERO, Vec3::Y).unwrap();
        let mut hit = Intersection::default();
        let before = hit;

        assert!(!sphere().intersect(&ray, &mut hit));
        assert_eq!(hit, before);
    }

    #[test]
    fn test_sphere_tangent_is_miss() {
        // Grazes the sphere at (1, 0, -5)
        let ray = Ray::primary(Vec3::new(1.0, 0.0, 0.0), Vec3::new(0.0, 0.0, -1.0)).unwrap();
        let mut hit = Intersection::default();
        let before = hit;

        assert!(!sphere().intersect(&ray, &mut hit));
        assert_eq!(hit, before);
    }

    #[test]
    fn test_sphere_behind_ray() {
        let ray = Ray::primary(Vec3::ZERO, Vec3::Z).unwrap();
        let mut hit = Intersection::default();
        assert!(!sphere().intersect(&ray, &mut hit));
    }

    #[test]
    fn test_sphere_only_closer_hits() {
        let ray = Ray::primary(Vec3::ZERO, Vec3::new(0.0, 0.0, -1.0)).unwrap();
        let mut hit = Intersection::new(2.0);
        assert!(!sphere().intersect(&ray, &mut hit));
        assert_eq!(hit.length, 2.0);
    }

    #[test]
    fn test_sphere_box_overlap() {
        let s = sphere();
        // Box containing the center
        assert!(s.intersect_box(&Aabb::new(Vec3::new(-1.0, -1.0, -6.0), Vec3::new(1.0, 1.0, -4.0))));
        // Box touching the surface at x = 1
        assert!(s.intersect_box(&Aabb::new(Vec3::new(1.0, -1.0, -6.0), Vec3::new(2.0, 1.0, -4.0))));
        // Box beyond the surface
        assert!(!s.intersect_box(&Aabb::new(Vec3::new(1.1, -1.0, -6.0), Vec3::new(2.0, 1.0, -4.0))));
        // Near a corner: within the bounding box but outside the sphere
        assert!(!s.intersect_box(&Aabb::new(Vec3::new(0.8, 0.8, -4.2), Vec3::new(2.0, 2.0, -3.0))));
    }

    #[test]
    fn test_sphere_bounding_box() {
        let bbox = sphere().bounding_box();
        assert_eq!(bbox.min, Vec3::new(-1.0, -1.0, -6.0));
        assert_eq!(bbox.max, Vec3::new(1.0, 1.0, -4.0));
    }
}
