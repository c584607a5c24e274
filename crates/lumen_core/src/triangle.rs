//! Triangle primitive.
//!
//! Uses the Möller-Trumbore algorithm for ray-triangle intersection.

use lumen_math::{Aabb, Vec2, Vec3, EPSILON, EPSILON_LARGE};

use crate::{Intersection, Ray};

/// A triangle primitive.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Triangle {
    /// First vertex and the two edges leaving it
    point_a: Vec3,
    ab: Vec3,
    ac: Vec3,
    /// Pre-computed face normal (unit length, zero if degenerate)
    normal: Vec3,
    /// Optional per-vertex texture coordinates
    tex_coords: Option<[Vec2; 3]>,
    material: usize,
}

impl Triangle {
    /// Create a new triangle from three vertices, counter-clockwise.
    pub fn new(a: Vec3, b: Vec3, c: Vec3, material: usize) -> Self {
        let ab = b - a;
        let ac = c - a;

        Self {
            point_a: a,
            ab,
            ac,
            normal: ab.cross(ac).normalize_or_zero(),
            tex_coords: None,
            material,
        }
    }

    /// Attach per-vertex texture coordinates.
    pub fn with_tex_coords(mut self, tex_coords: [Vec2; 3]) -> Self {
        self.tex_coords = Some(tex_coords);
        self
    }

    pub fn vertices(&self) -> [Vec3; 3] {
        [self.point_a, self.point_a + self.ab, self.point_a + self.ac]
    }

    pub fn normal(&self) -> Vec3 {
        self.normal
    }

    pub fn material(&self) -> usize {
        self.material
    }

    /// Surface area of the triangle.
    pub fn area(&self) -> f32 {
        self.ab.cross(self.ac).length() * 0.5
    }

    /// Map two values in [0,1) to a uniformly distributed point on the
    /// triangle.
    pub fn sample_point(&self, mut u: f32, mut v: f32) -> Vec3 {
        if u + v > 1.0 {
            u = 1.0 - u;
            v = 1.0 - v;
        }
        self.point_a + u * self.ab + v * self.ac
    }

    /// Möller-Trumbore intersection, updating `hit` if strictly closer.
    pub fn intersect(&self, ray: &Ray, hit: &mut Intersection) -> bool {
        let p = ray.direction().cross(self.ac);
        let det = self.ab.dot(p);

        // Ray is parallel to the triangle (or the triangle is degenerate)
        if det.abs() < EPSILON {
            return false;
        }

        let inv_det = 1.0 / det;
        let s = ray.origin() - self.point_a;
        let u = inv_det * s.dot(p);
        if !(0.0..=1.0).contains(&u) {
            return false;
        }

        let q = s.cross(self.ab);
        let v = inv_det * ray.direction().dot(q);
        if v < 0.0 || u + v > 1.0 {
            return false;
        }

        let distance = inv_det * self.ac.dot(q);
        if distance < EPSILON_LARGE || distance >= hit.length {
            return false;
        }

        hit.record(ray.at(distance), distance, self.normal, Some(self.material));
        if let Some([ta, tb, tc]) = self.tex_coords {
            hit.tex_coords = Some(ta * (1.0 - u - v) + tb * u + tc * v);
        }

        true
    }

    /// Separating-axis test between the triangle and a box.
    ///
    /// Candidate axes are the three box axes, the triangle normal and the
    /// nine cross products of box axes with triangle edges.
    pub fn intersect_box(&self, bbox: &Aabb) -> bool {
        let center = bbox.centroid();
        let half = bbox.extent() * 0.5;
        let verts = self.vertices().map(|v| v - center);
        let edges = [verts[1] - verts[0], verts[2] - verts[1], verts[0] - verts[2]];

        let mut axes = Vec::with_capacity(13);
        axes.extend([Vec3::X, Vec3::Y, Vec3::Z, self.normal]);
        for unit in [Vec3::X, Vec3::Y, Vec3::Z] {
            for edge in edges {
                axes.push(unit.cross(edge));
            }
        }

        axes.into_iter()
            .filter(|axis| axis.length_squared() > EPSILON * EPSILON)
            .all(|axis| {
                let projections = verts.map(|v| v.dot(axis));
                let min = projections[0].min(projections[1]).min(projections[2]);
                let max = projections[0].max(projections[1]).max(projections[2]);
                let radius = half.dot(axis.abs());
                min <= radius && max >= -radius
            })
    }

    pub fn bounding_box(&self) -> Aabb {
        let [a, b, c] = self.vertices();
        Aabb::new(a.min(b).min(c), a.max(b).max(c))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Triangle in the XY plane at z=-1
    fn triangle() -> Triangle {
        Triangle::new(
            Vec3::new(-1.0, -1.0, -1.0),
            Vec3::new(1.0, -1.0, -1.0),
            Vec3::new(0.0, 1.0, -1.0),
            2,
        )
    }

    #[test]
    fn test_triangle_hit() {
        let ray = Ray::primary(Vec3::ZERO, Vec3::new(0.0, 0.0, -1.0)).unwrap();
        let mut hit = Intersection::default();

        assert!(triangle().intersect(&ray, &mut hit));
        assert!((hit.length - 1.0).abs() < 1.0e-5);
        assert_eq!(hit.normal, Vec3::Z);
        assert_eq!(hit.material, Some(2));
    }

    #[test]
    fn test_triangle_miss() {
        let mut hit = Intersection::default();

        // Ray pointing away
        let away = Ray::primary(Vec3::ZERO, Vec3::Z).unwrap();
        assert!(!triangle().intersect(&away, &mut hit));

        // Ray passing beside the triangle
        let beside = Ray::primary(Vec3::new(3.0, 0.0, 0.0), Vec3::new(0.0, 0.0, -1.0)).unwrap();
        assert!(!triangle().intersect(&beside, &mut hit));

        assert_eq!(hit, Intersection::default());
    }

    #[test]
    fn test_triangle_tex_coords() {
        let tri = triangle().with_tex_coords([Vec2::ZERO, Vec2::X, Vec2::Y]);
        let ray = Ray::primary(Vec3::new(-1.0, -1.0, 0.0), Vec3::new(0.0, 0.0, -1.0)).unwrap();
        let mut hit = Intersection::default();

        // Hits exactly at vertex a
        assert!(tri.intersect(&ray, &mut hit));
        let uv = hit.tex_coords.unwrap();
        assert!(uv.length() < 1.0e-5);
    }

    #[test]
    fn test_triangle_box_overlap() {
        let tri = triangle();
        assert!(tri.intersect_box(&Aabb::new(Vec3::new(-0.5, -0.5, -1.5), Vec3::new(0.5, 0.5, -0.5))));
        // Box in front of the triangle plane
        assert!(!tri.intersect_box(&Aabb::new(Vec3::new(-0.5, -0.5, -0.5), Vec3::splat(0.5))));
        // Box in the plane but outside the slanted edge
        assert!(!tri.intersect_box(&Aabb::new(Vec3::new(0.8, 0.8, -1.5), Vec3::new(1.5, 1.5, -0.5))));
    }

    #[test]
    fn test_triangle_sample_point_inside() {
        let tri = triangle();
        for (u, v) in [(0.1, 0.2), (0.9, 0.8), (0.3, 0.3), (0.05, 0.9)] {
            let p = tri.sample_point(u, v);
            let ray = Ray::primary(Vec3::new(p.x, p.y, 0.0), Vec3::new(0.0, 0.0, -1.0)).unwrap();
            let mut hit = Intersection::default();
            assert!(tri.intersect(&ray, &mut hit), "sample {p} outside");
        }
    }

    #[test]
    fn test_triangle_bounding_box_and_area() {
        let tri = triangle();
        let bbox = tri.bounding_box();
        assert_eq!(bbox.min, Vec3::new(-1.0, -1.0, -1.0));
        assert_eq!(bbox.max, Vec3::new(1.0, 1.0, -1.0));
        assert!((tri.area() - 2.0).abs() < 1.0e-5);
    }
}
