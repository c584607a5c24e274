//! Fast single-hit shaders for inspecting a scene.

use lumen_core::{Color, Intersection, Ray};

use crate::shader::{Shader, Surface, Tracer};

/// Grey-scale distance to the nearest hit, bright when close.
#[derive(Debug)]
pub struct DepthMap {
    tracer: Tracer,
    max_distance: f32,
}

impl DepthMap {
    pub fn new(tracer: Tracer) -> Self {
        let bounds = tracer.scene().bounds();
        let diagonal = bounds.extent().length();
        let max_distance = if bounds.is_valid() && diagonal.is_finite() && diagonal > 0.0 {
            diagonal
        } else {
            1.0
        };
        Self { tracer, max_distance }
    }
}

impl Shader for DepthMap {
    fn ray_trace(&self, ray: &Ray) -> Color {
        let mut hit = Intersection::default();
        if !self.tracer.trace(ray, &mut hit) {
            return Color::ZERO;
        }
        Color::splat((1.0 - hit.length / self.max_distance).clamp(0.0, 1.0))
    }

    fn reset_sampling(&self) {
        self.tracer.scene().reset_sampling();
    }

    fn initialize_accelerators(&mut self) {
        self.tracer.initialize();
    }
}

/// Diffuse colour of the nearest hit, unlit.
#[derive(Debug)]
pub struct DiffuseMaterial {
    tracer: Tracer,
}

impl DiffuseMaterial {
    pub fn new(tracer: Tracer) -> Self {
        Self { tracer }
    }
}

impl Shader for DiffuseMaterial {
    fn ray_trace(&self, ray: &Ray) -> Color {
        let mut hit = Intersection::default();
        if !self.tracer.trace(ray, &mut hit) {
            return Color::ZERO;
        }
        match self.tracer.surface(&hit) {
            Some(Surface::Object(material)) => material.kd,
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
