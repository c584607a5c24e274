//! Monte Carlo path tracing with next event estimation.
//!
//! Every hit adds its emission, direct light from randomly chosen lights and
//! one indirect bounce. Area light surfaces reached by a bounce are ignored
//! since direct lighting already accounts for them. Paths are terminated by
//! Russian roulette once they are `RAY_DEPTH_MIN` bounces deep.

use std::f32::consts::TAU;

use lumen_core::{Color, Intersection, Material, Ray, Sampler};
use lumen_math::utils::fresnel;
use lumen_math::{Vec3, RAY_DEPTH_MAX, RAY_DEPTH_MIN};

use crate::shader::{facing_normal, reflect, refract, Shader, Surface, Tracer};

/// Lowest survival probability for Russian roulette.
const MIN_SURVIVAL: f32 = 0.05;

pub struct PathTracer {
    tracer: Tracer,
    sampler: Box<dyn Sampler>,
    samples_light: u32,
}

impl PathTracer {
    /// `sampler` drives light selection, bounce directions and roulette.
    pub fn new(tracer: Tracer, sampler: Box<dyn Sampler>, samples_light: u32) -> Self {
        Self {
            tracer,
            sampler,
            samples_light: samples_light.max(1),
        }
    }

    fn direct(&self, hit: &Intersection, normal: Vec3, depth: u32) -> Color {
        let lights = self.tracer.scene().lights();
        if lights.is_empty() {
            return Color::ZERO;
        }

        let count = lights.len();
        let mut direct = Color::ZERO;
        for _ in 0..self.samples_light {
            let index = ((self.sampler.sample() * count as f32) as usize).min(count - 1);
            direct += self.tracer.direct_light(&lights[index], hit, normal, depth, true);
        }
        direct * count as f32 / self.samples_light as f32
    }

    fn shade(&self, ray: &Ray, hit: &Intersection, material: &Material) -> Color {
        let depth = ray.depth();
        let normal = facing_normal(hit.normal, ray.direction());
        let mut color = material.le;

        if material.kd.max_element() > 0.0 {
            color += material.kd * self.direct(hit, normal, depth);
        }

        if depth >= RAY_DEPTH_MAX {
            return color;
        }

        let mut weight = 1.0;
        if depth >= RAY_DEPTH_MIN {
            let survival = (material.kd + material.ks + material.kt)
                .max_element()
                .clamp(MIN_SURVIVAL, 1.0);
            if self.sampler.sample() >= survival {
                return color;
            }
            weight = 1.0 / survival;
        }

        let mut indirect = Color::ZERO;
        if material.kd.max_element() > 0.0 {
            let direction = cosine_hemisphere(normal, self.sampler.sample(), self.sampler.sample());
            indirect += material.kd * self.secondary(hit, direction, depth);
        }
        if material.ks.max_element() > 0.0 {
            indirect += material.ks * self.secondary(hit, reflect(ray.direction(), normal), depth);
        }
        if material.kt.max_element() > 0.0 {
            let kr = fresnel(ray.direction(), hit.normal, material.refractive_index);
            let refracted = refract(ray.direction(), hit.normal, material.refractive_index);
            let direction = match refracted {
                Some(direction) if self.sampler.sample() >= kr => direction,
                _ => reflect(ray.direction(), normal),
            };
            indirect += material.kt * self.secondary(hit, direction, depth);
        }

        color + indirect * weight
    }

    fn secondary(&self, hit: &Intersection, direction: Vec3, depth: u32) -> Color {
        match Ray::new(hit.point, direction, depth + 1, hit.primitive) {
            Ok(ray) => self.ray_trace(&ray),
            Err(_) => Color::ZERO,
        }
    }
}

/// Cosine-weighted direction in the hemisphere around `normal`.
fn cosine_hemisphere(normal: Vec3, r1: f32, r2: f32) -> Vec3 {
    let phi = TAU * r1;
    let radius = r2.sqrt();
    let (tangent, bitangent) = normal.any_orthonormal_pair();
    tangent * (radius * phi.cos())
        + bitangent * (radius * phi.sin())
        + normal * (1.0 - r2).max(0.0).sqrt()
}

impl Shader for PathTracer {
    fn ray_trace(&self, ray: &Ray) -> Color {
        let mut hit = Intersection::default();
        if !self.tracer.trace(ray, &mut hit) {
            return Color::ZERO;
        }

        match self.tracer.surface(&hit) {
            Some(Surface::Object(material)) => self.shade(ray, &hit, material),
            Some(Surface::Light(light)) if ray.depth() == 0 => light.radiance().le,
            Some(Surface::Light(_)) | None => Color::ZERO,
        }
    }

    fn reset_sampling(&self) {
        self.sampler.reset_sampling();
        self.tracer.scene().reset_sampling();
    }

    fn initialize_accelerators(&mut self) {
        self.tracer.initialize();
    }
}

impl std::fmt::Debug for PathTracer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PathTracer")
            .field("tracer", &self.tracer)
            .field("samples_light", &self.samples_light)
            .finish_non_exhaustive()
    }
}
