//! Whitted-style recursive ray tracing.
//!
//! Direct lighting with hard shadows, perfect mirror reflection and
//! Fresnel-weighted refraction, recursing until `RAY_DEPTH_MAX`.

use lumen_core::{Color, Intersection, Material, Ray};
use lumen_math::utils::fresnel;
use lumen_math::{Vec3, RAY_DEPTH_MAX};

use crate::shader::{facing_normal, reflect, refract, Shader, Surface, Tracer};

#[derive(Debug)]
pub struct Whitted {
    tracer: Tracer,
    samples_light: u32,
}

impl Whitted {
    /// `samples_light` shadow rays are averaged per light and hit.
    pub fn new(tracer: Tracer, samples_light: u32) -> Self {
        Self {
            tracer,
            samples_light: samples_light.max(1),
        }
    }

    fn shade(&self, ray: &Ray, hit: &Intersection, material: &Material) -> Color {
        let depth = ray.depth();
        let normal = facing_normal(hit.normal, ray.direction());
        let mut color = material.le;

        if material.kd.max_element() > 0.0 {
            let mut direct = Color::ZERO;
            for light in self.tracer.scene().lights() {
                for _ in 0..self.samples_light {
                    direct += self.tracer.direct_light(light, hit, normal, depth, true);
                }
            }
            color += material.kd * direct / self.samples_light as f32;
        }

        if depth >= RAY_DEPTH_MAX {
            return color;
        }

        if material.ks.max_element() > 0.0 {
            let reflected = reflect(ray.direction(), normal);
            color += material.ks * self.secondary(hit, reflected, depth);
        }

        if material.kt.max_element() > 0.0 {
            let kr = fresnel(ray.direction(), hit.normal, material.refractive_index);
            let reflected = self.secondary(hit, reflect(ray.direction(), normal), depth);
            let refracted = match refract(ray.direction(), hit.normal, material.refractive_index) {
                Some(direction) if kr < 1.0 => self.secondary(hit, direction, depth),
                _ => Color::ZERO,
            };
            color += material.kt * (reflected * kr + refracted * (1.0 - kr));
        }

        color
    }

    /// Trace a bounce ray leaving `hit`; a rejected direction carries no light.
    fn secondary(&self, hit: &Intersection, direction: Vec3, depth: u32) -> Color {
        match Ray::new(hit.point, direction, depth + 1, hit.primitive) {
            Ok(ray) => self.ray_trace(&ray),
            Err(_) => Color::ZERO,
        }
    }
}

impl Shader for Whitted {
    fn ray_trace(&self, ray: &Ray) -> Color {
        let mut hit = Intersection::default();
        if !self.tracer.trace(ray, &mut hit) {
            return Color::ZERO;
        }

        match self.tracer.surface(&hit) {
            Some(Surface::Object(material)) => self.shade(ray, &hit, material),
            Some(Surface::Light(light)) => light.radiance().le,
            None => Color::ZERO,
        }
    }

    fn reset_sampling(&self) {
        self.tracer.scene().reset_sampling();
    }

    fn initialize_accelerators(&mut self) {
        self.tracer.initialize();
    }
}
