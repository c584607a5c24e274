//! Direct diffuse lighting with no visibility test.

use lumen_core::{Color, Intersection, Ray};

use crate::shader::{facing_normal, Shader, Surface, Tracer};

/// Lights every visible surface from every light, ignoring occluders.
#[derive(Debug)]
pub struct NoShadows {
    tracer: Tracer,
}

impl NoShadows {
    pub fn new(tracer: Tracer) -> Self {
        Self { tracer }
    }
}

impl Shader for NoShadows {
    fn ray_trace(&self, ray: &Ray) -> Color {
        let mut hit = Intersection::default();
        if !self.tracer.trace(ray, &mut hit) {
            return Color::ZERO;
        }

        let material = match self.tracer.surface(&hit) {
            Some(Surface::Object(material)) => material,
            Some(Surface::Light(light)) => return light.radiance().le,
            None => return Color::ZERO,
        };

        let normal = facing_normal(hit.normal, ray.direction());
        let direct = self
            .tracer
            .scene()
            .lights()
            .iter()
            .map(|light| self.tracer.direct_light(light, &hit, normal, ray.depth(), false))
            .sum::<Color>();

        material.le + material.kd * direct
    }

    fn reset_sampling(&self) {
        self.tracer.scene().reset_sampling();
    }

    fn initialize_accelerators(&mut self) {
        self.tracer.initialize();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::shader::AcceleratorKind;
    use lumen_core::{Material, Plane, PointLight, Scene, Sphere};
    use lumen_math::Vec3;

    #[test]
    fn test_no_shadows_ignores_occluder() {
        let mut scene = Scene::new();
        let white = scene.add_material(Material::diffuse(Vec3::ONE));
        scene.add_primitive(Plane::new(Vec3::new(0.0, -1.0, 0.0), Vec3::Y, white));
        // Blocks the light for the floor point below it
        scene.add_primitive(Sphere::new(Vec3::new(0.0, 2.0, -3.0), 0.5, white));
        scene.add_light(PointLight::new(Material::emissive(Vec3::ONE), Vec3::new(0.0, 5.0, -3.0)));

        let mut shader = NoShadows::new(Tracer::new(scene, AcceleratorKind::Naive));
        shader.initialize_accelerators();

        let ray = Ray::primary(Vec3::new(0.0, 1.0, -3.0 + 1.0e-3), Vec3::new(0.0, -1.0, -1.0e-3)).unwrap();
        let color = shader.ray_trace(&ray);
        assert!(color.x > 0.9, "got {color}");
    }

    #[test]
    fn test_no_shadows_miss_is_black() {
        let mut shader = NoShadows::new(Tracer::new(Scene::new(), AcceleratorKind::Bvh));
        shader.initialize_accelerators();
        let ray = Ray::primary(Vec3::ZERO, Vec3::Z).unwrap();
        assert_eq!(shader.ray_trace(&ray), Color::ZERO);
    }
}
