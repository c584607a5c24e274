//! Light sources: point lights and triangular area lights.

use lumen_math::Vec3;

use crate::{Intersection, Material, Ray, Sampler, Triangle};

/// An infinitely small light at a fixed position.
#[derive(Debug, Clone, Copy)]
pub struct PointLight {
    radiance: Material,
    position: Vec3,
}

impl PointLight {
    pub fn new(radiance: Material, position: Vec3) -> Self {
        Self { radiance, position }
    }
}

/// A triangle emitting light, sampled at a new point for every query.
pub struct AreaLight {
    radiance: Material,
    triangle: Triangle,
    sampler: Box<dyn Sampler>,
}

impl AreaLight {
    /// Create an area light; `sampler` picks points on the triangle.
    pub fn new(radiance: Material, sampler: Box<dyn Sampler>, triangle: Triangle) -> Self {
        Self {
            radiance,
            triangle,
            sampler,
        }
    }

    pub fn triangle(&self) -> &Triangle {
        &self.triangle
    }
}

impl std::fmt::Debug for AreaLight {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AreaLight")
            .field("radiance", &self.radiance)
            .field("triangle", &self.triangle)
            .finish_non_exhaustive()
    }
}

/// A light source.
#[derive(Debug)]
pub enum Light {
    Point(PointLight),
    Area(AreaLight),
}

impl Light {
    /// The emitted radiance, stored in `le`.
    pub fn radiance(&self) -> &Material {
        match self {
            Light::Point(l) => &l.radiance,
            Light::Area(l) => &l.radiance,
        }
    }

    /// Position to cast a shadow ray towards.
    ///
    /// Area lights return a new point on their surface every call.
    pub fn position(&self) -> Vec3 {
        match self {
            Light::Point(l) => l.position,
            Light::Area(l) => {
                let u = l.sampler.sample();
                let v = l.sampler.sample();
                l.triangle.sample_point(u, v)
            }
        }
    }

    /// Intersect a ray with the light's surface, updating `hit` if closer.
    ///
    /// Point lights have no surface and never hit. On a hit the material is
    /// cleared; callers use [`Light::radiance`] instead.
    pub fn intersect(&self, ray: &Ray, hit: &mut Intersection) -> bool {
        match self {
            Light::Point(_) => false,
            Light::Area(l) => {
                if l.triangle.intersect(ray, hit) {
                    hit.material = None;
                    true
                } else {
                    false
                }
            }
        }
    }

    /// Re-arm per-frame sampling state.
    pub fn reset_sampling(&self) {
        match self {
            Light::Point(_) => {}
            Light::Area(l) => l.sampler.reset_sampling(),
        }
    }

    /// Center of the light, for scene bounds and debugging.
    pub fn center(&self) -> Vec3 {
        match self {
            Light::Point(l) => l.position,
            Light::Area(l) => {
                let [a, b, c] = l.triangle.vertices();
                (a + b + c) / 3.0
            }
        }
    }
}

impl From<PointLight> for Light {
    fn from(l: PointLight) -> Self {
        Light::Point(l)
    }
}

impl From<AreaLight> for Light {
    fn from(l: AreaLight) -> Self {
        Light::Area(l)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{SampleTable, TableSampler};

    fn area_light() -> Light {
        let sampler = TableSampler::new(SampleTable::halton(128));
        let triangle = Triangle::new(
            Vec3::new(-1.0, 2.0, -1.0),
            Vec3::new(1.0, 2.0, -1.0),
            Vec3::new(0.0, 2.0, 1.0),
            0,
        );
        AreaLight::new(Material::emissive(Vec3::ONE), Box::new(sampler), triangle).into()
    }

    #[test]
    fn test_point_light() {
        let light: Light = PointLight::new(Material::emissive(Vec3::ONE), Vec3::Y).into();
        assert_eq!(light.position(), Vec3::Y);
        assert_eq!(light.radiance().le, Vec3::ONE);

        let ray = Ray::primary(Vec3::ZERO, Vec3::Y).unwrap();
        let mut hit = Intersection::default();
        assert!(!light.intersect(&ray, &mut hit));
    }

    #[test]
    fn test_area_light_positions_on_triangle() {
        let light = area_light();
        for _ in 0..32 {
            let p = light.position();
            assert!((p.y - 2.0).abs() < 1.0e-5);
            assert!(p.x.abs() <= 1.0 + 1.0e-5 && p.z.abs() <= 1.0 + 1.0e-5);
        }
    }

    #[test]
    fn test_area_light_reset_repeats_positions() {
        let light = area_light();
        let first: Vec<Vec3> = (0..8).map(|_| light.position()).collect();
        light.reset_sampling();
        let second: Vec<Vec3> = (0..8).map(|_| light.position()).collect();
        assert_eq!(first, second);
    }

    #[test]
    fn test_area_light_intersect_clears_material() {
        let light = area_light();
        let ray = Ray::primary(Vec3::ZERO, Vec3::Y).unwrap();
        let mut hit = Intersection::default();
        assert!(light.intersect(&ray, &mut hit));
        assert!((hit.length - 2.0).abs() < 1.0e-5);
        assert_eq!(hit.material, None);
    }
}
