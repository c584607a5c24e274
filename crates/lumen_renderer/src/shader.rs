//! Shading strategies and the scene queries they share.

use lumen_core::{Color, Intersection, Light, Material, PrimitiveId, Ray, Sampler, Scene};
use lumen_math::Vec3;
use serde::{Deserialize, Serialize};

use crate::bvh::Bvh;
use crate::{DepthMap, DiffuseMaterial, NoShadows, PathTracer, Whitted};

/// Computes the radiance carried back along a ray.
///
/// Shaders are shared by reference across every render thread.
pub trait Shader: Send + Sync {
    /// Radiance estimate for `ray`.
    fn ray_trace(&self, ray: &Ray) -> Color;

    /// Re-arm per-frame sampling state of the shader and the scene's lights.
    fn reset_sampling(&self);

    /// Build acceleration structures. Called once before the first frame.
    fn initialize_accelerators(&mut self);
}

/// Spatial index used for nearest-hit queries.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AcceleratorKind {
    /// Test every primitive
    Naive,
    /// Bounding volume hierarchy
    #[default]
    Bvh,
}

/// Available shading strategies.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ShaderKind {
    NoShadows,
    #[default]
    Whitted,
    PathTracer,
    DepthMap,
    DiffuseMaterial,
}

impl ShaderKind {
    /// Construct the shader owning `scene`.
    ///
    /// `sampler` drives the path tracer's light choice and bounces; the other
    /// strategies ignore it.
    pub fn build(
        self,
        scene: Scene,
        accelerator: AcceleratorKind,
        samples_light: u32,
        sampler: Box<dyn Sampler>,
    ) -> Box<dyn Shader> {
        let tracer = Tracer::new(scene, accelerator);
        match self {
            ShaderKind::NoShadows => Box::new(NoShadows::new(tracer)),
            ShaderKind::Whitted => Box::new(Whitted::new(tracer, samples_light)),
            ShaderKind::PathTracer => Box::new(PathTracer::new(tracer, sampler, samples_light)),
            ShaderKind::DepthMap => Box::new(DepthMap::new(tracer)),
            ShaderKind::DiffuseMaterial => Box::new(DiffuseMaterial::new(tracer)),
        }
    }
}

/// What a ray hit, resolved against the scene.
#[derive(Debug, Clone, Copy)]
pub enum Surface<'a> {
    /// A primitive with its material
    Object(&'a Material),
    /// The surface of an area light
    Light(&'a Light),
}

/// Owns the scene and answers nearest-hit and visibility queries through
/// the configured accelerator.
#[derive(Debug)]
pub struct Tracer {
    scene: Scene,
    accelerator: AcceleratorKind,
    bvh: Option<Bvh>,
}

impl Tracer {
    pub fn new(scene: Scene, accelerator: AcceleratorKind) -> Self {
        Self {
            scene,
            accelerator,
            bvh: None,
        }
    }

    /// Build the accelerator, if any. Repeated calls rebuild it.
    pub fn initialize(&mut self) {
        self.bvh = match self.accelerator {
            AcceleratorKind::Naive => {
                log::info!("Using naive accelerator over {} primitives", self.scene.primitive_count());
                None
            }
            AcceleratorKind::Bvh => Some(Bvh::new(&self.scene)),
        };
    }

    pub fn scene(&self) -> &Scene {
        &self.scene
    }

    pub fn accelerator(&self) -> AcceleratorKind {
        self.accelerator
    }

    /// Nearest hit among primitives and area lights.
    pub fn trace(&self, ray: &Ray, hit: &mut Intersection) -> bool {
        let found = match &self.bvh {
            Some(bvh) => bvh.trace(&self.scene, ray, hit),
            None => self.scene.trace(ray, hit),
        };
        // Lights are tested last so they only win when strictly closer
        self.scene.trace_lights(ray, hit) || found
    }

    /// Returns true if a primitive blocks `ray` closer than `max_dist`.
    pub fn shadow_trace(&self, ray: &Ray, max_dist: f32) -> bool {
        match &self.bvh {
            Some(bvh) => bvh.shadow_trace(&self.scene, ray, max_dist),
            None => self.scene.shadow_trace(ray, max_dist),
        }
    }

    /// Resolve the surface recorded in `hit`.
    pub fn surface(&self, hit: &Intersection) -> Option<Surface<'_>> {
        match hit.primitive? {
            PrimitiveId::Light(index) => self.scene.lights().get(index).map(Surface::Light),
            PrimitiveId::Shape(_) => hit.material.and_then(|m| self.scene.material(m)).map(Surface::Object),
        }
    }

    /// Diffuse light arriving at `hit` from one sampled point of `light`.
    ///
    /// Returns black when the light is behind the surface or, with
    /// `shadows`, when something blocks it.
    pub fn direct_light(
        &self,
        light: &Light,
        hit: &Intersection,
        normal: Vec3,
        depth: u32,
        shadows: bool,
    ) -> Color {
        let to_light = light.position() - hit.point;
        let distance = to_light.length();
        let Ok(shadow_ray) = Ray::new(hit.point, to_light, depth + 1, hit.primitive) else {
            return Color::ZERO;
        };

        let cos_theta = normal.dot(shadow_ray.direction());
        if cos_theta <= 0.0 {
            return Color::ZERO;
        }
        if shadows && self.shadow_trace(&shadow_ray, distance) {
            return Color::ZERO;
        }
        light.radiance().le * cos_theta
    }
}

/// Surface normal flipped to face against the incoming direction.
#[inline]
pub fn facing_normal(normal: Vec3, direction: Vec3) -> Vec3 {
    if normal.dot(direction) > 0.0 {
        -normal
    } else {
        normal
    }
}

/// Mirror `direction` about `normal`.
#[inline]
pub fn reflect(direction: Vec3, normal: Vec3) -> Vec3 {
    direction - 2.0 * direction.dot(normal) * normal
}

/// Refract `direction` through a surface with index `ior`, `None` on total
/// internal reflection.
///
/// `normal` is the geometric normal; entering or leaving is decided by its
/// orientation relative to `direction`.
pub fn refract(direction: Vec3, normal: Vec3, ior: f32) -> Option<Vec3> {
    let mut cos_i = direction.dot(normal).clamp(-1.0, 1.0);
    let (mut eta_i, mut eta_t, mut n) = (1.0, ior, normal);
    if cos_i < 0.0 {
        cos_i = -cos_i;
    } else {
        std::mem::swap(&mut eta_i, &mut eta_t);
        n = -normal;
    }
    let eta = eta_i / eta_t;
    let k = 1.0 - eta * eta * (1.0 - cos_i * cos_i);
    (k >= 0.0).then(|| eta * direction + (eta * cos_i - k.sqrt()) * n)
}

#[cfg(test)]
mod tests {
    use super::*;
    use lumen_core::{AreaLight, ConstantSampler, PointLight, Sphere, Triangle};

    fn scene() -> Scene {
        let mut scene = Scene::new();
        let m = scene.add_material(Material::diffuse(Vec3::ONE));
        scene.add_primitive(Sphere::new(Vec3::new(0.0, 0.0, -5.0), 1.0, m));
        scene.add_light(PointLight::new(Material::emissive(Vec3::ONE), Vec3::new(0.0, 5.0, -5.0)));
        scene
    }

    #[test]
    fn test_tracer_accelerators_agree() {
        let mut naive = Tracer::new(scene(), AcceleratorKind::Naive);
        let mut bvh = Tracer::new(scene(), AcceleratorKind::Bvh);
        naive.initialize();
        bvh.initialize();

        let ray = Ray::primary(Vec3::ZERO, Vec3::new(0.0, 0.0, -1.0)).unwrap();
        let (mut a, mut b) = (Intersection::default(), Intersection::default());
        assert!(naive.trace(&ray, &mut a));
        assert!(bvh.trace(&ray, &mut b));
        assert_eq!(a, b);
        assert!(matches!(naive.surface(&a), Some(Surface::Object(_))));
    }

    #[test]
    fn test_tracer_resolves_light_surface() {
        let mut scene = scene();
        let triangle = Triangle::new(
            Vec3::new(-1.0, 2.0, -1.0),
            Vec3::new(1.0, 2.0, -1.0),
            Vec3::new(0.0, 2.0, 1.0),
            0,
        );
        scene.add_light(AreaLight::new(
            Material::emissive(Vec3::splat(3.0)),
            Box::new(ConstantSampler::new(0.25)),
            triangle,
        ));
        let mut tracer = Tracer::new(scene, AcceleratorKind::Bvh);
        tracer.initialize();

        let up = Ray::primary(Vec3::ZERO, Vec3::Y).unwrap();
        let mut hit = Intersection::default();
        assert!(tracer.trace(&up, &mut hit));
        match tracer.surface(&hit) {
            Some(Surface::Light(light)) => assert_eq!(light.radiance().le, Vec3::splat(3.0)),
            other => panic!("expected light surface, got {other:?}"),
        }
    }

    #[test]
    fn test_direct_light_respects_shadows() {
        let mut tracer = Tracer::new(scene(), AcceleratorKind::Naive);
        tracer.initialize();
        let light = &tracer.scene().lights()[0];

        // Point below the sphere, light above it
        let mut hit = Intersection::default();
        hit.point = Vec3::new(0.0, -2.0, -5.0);
        let lit = tracer.direct_light(light, &hit, Vec3::Y, 0, false);
        let shadowed = tracer.direct_light(light, &hit, Vec3::Y, 0, true);
        assert!(lit.x > 0.99);
        assert_eq!(shadowed, Color::ZERO);

        let facing_away = tracer.direct_light(light, &hit, -Vec3::Y, 0, false);
        assert_eq!(facing_away, Color::ZERO);
    }

    #[test]
    fn test_reflect_and_refract() {
        let d = Vec3::new(1.0, -1.0, 0.0).normalize();
        let r = reflect(d, Vec3::Y);
        assert!((r - Vec3::new(1.0, 1.0, 0.0).normalize()).length() < 1.0e-6);

        // Same index passes straight through
        let t = refract(d, Vec3::Y, 1.0).unwrap();
        assert!((t - d).length() < 1.0e-6);

        // Grazing exit from a dense medium reflects totally
        let grazing = Vec3::new(0.9, 0.1, 0.0).normalize();
        assert!(refract(grazing, Vec3::Y, 1.5).is_none());

        assert_eq!(facing_normal(Vec3::Y, d), Vec3::Y);
        assert_eq!(facing_normal(Vec3::Y, -d), -Vec3::Y);
    }
}
