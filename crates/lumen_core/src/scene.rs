//! Scene storage: primitives, materials and lights.
//!
//! A scene is filled by an [`ObjectLoader`](crate::ObjectLoader) and is
//! read-only once rendering starts, so it can be shared by reference across
//! every render thread without synchronization.

use lumen_math::Aabb;

use crate::{Intersection, Light, Material, Primitive, PrimitiveId, Ray};

/// All geometry, materials and lights of a render.
#[derive(Debug, Default)]
pub struct Scene {
    primitives: Vec<Primitive>,
    materials: Vec<Material>,
    lights: Vec<Light>,
}

impl Scene {
    /// Create an empty scene.
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a material, returning its index.
    pub fn add_material(&mut self, material: Material) -> usize {
        self.materials.push(material);
        self.materials.len() - 1
    }

    /// Add a primitive, returning its id.
    pub fn add_primitive(&mut self, primitive: impl Into<Primitive>) -> PrimitiveId {
        self.primitives.push(primitive.into());
        PrimitiveId::Shape(self.primitives.len() - 1)
    }

    /// Add a light, returning its id.
    pub fn add_light(&mut self, light: impl Into<Light>) -> PrimitiveId {
        self.lights.push(light.into());
        PrimitiveId::Light(self.lights.len() - 1)
    }

    pub fn primitives(&self) -> &[Primitive] {
        &self.primitives
    }

    pub fn materials(&self) -> &[Material] {
        &self.materials
    }

    pub fn lights(&self) -> &[Light] {
        &self.lights
    }

    /// Material by index, `None` if out of range.
    pub fn material(&self, index: usize) -> Option<&Material> {
        self.materials.get(index)
    }

    /// Get the number of primitives.
    pub fn primitive_count(&self) -> usize {
        self.primitives.len()
    }

    /// Check if the scene has no geometry and no lights.
    pub fn is_empty(&self) -> bool {
        self.primitives.is_empty() && self.lights.is_empty()
    }

    /// Intersect one primitive by index, filling in the primitive link.
    ///
    /// A flat primitive is skipped when the ray was cast from it.
    #[inline]
    pub fn intersect_primitive(&self, index: usize, ray: &Ray, hit: &mut Intersection) -> bool {
        let id = PrimitiveId::Shape(index);
        let primitive = &self.primitives[index];
        if ray.primitive() == Some(id) && primitive.is_flat() {
            return false;
        }
        if primitive.intersect(ray, hit) {
            hit.primitive = Some(id);
            true
        } else {
            false
        }
    }

    /// Nearest hit against every primitive, testing each one.
    pub fn trace(&self, ray: &Ray, hit: &mut Intersection) -> bool {
        let mut found = false;
        for index in 0..self.primitives.len() {
            found |= self.intersect_primitive(index, ray, hit);
        }
        found
    }

    /// Nearest hit against the surfaces of area lights.
    pub fn trace_lights(&self, ray: &Ray, hit: &mut Intersection) -> bool {
        let mut found = false;
        for (index, light) in self.lights.iter().enumerate() {
            let id = PrimitiveId::Light(index);
            if ray.primitive() == Some(id) {
                continue;
            }
            if light.intersect(ray, hit) {
                hit.primitive = Some(id);
                found = true;
            }
        }
        found
    }

    /// Returns true if any primitive blocks the ray closer than `max_dist`.
    pub fn shadow_trace(&self, ray: &Ray, max_dist: f32) -> bool {
        (0..self.primitives.len()).any(|index| {
            let mut hit = Intersection::new(max_dist);
            self.intersect_primitive(index, ray, &mut hit)
        })
    }

    /// Reset the sampling state of every light.
    pub fn reset_sampling(&self) {
        for light in &self.lights {
            light.reset_sampling();
        }
    }

    /// Bounds of all finite geometry and lights.
    pub fn bounds(&self) -> Aabb {
        let shapes = self
            .primitives
            .iter()
            .filter(|p| p.is_bounded())
            .fold(Aabb::EMPTY, |acc, p| Self::box_bounds(&acc, &p.bounding_box()));
        self.lights
            .iter()
            .fold(shapes, |acc, l| acc.include_point(l.center()))
    }

    /// The minimal box enclosing two boxes.
    pub fn box_bounds(box1: &Aabb, box2: &Aabb) -> Aabb {
        Aabb::union(box1, box2)
    }

    /// Clear every collection and return its memory to the allocator.
    pub fn release(&mut self) {
        let primitives = std::mem::take(&mut self.primitives).len();
        let lights = std::mem::take(&mut self.lights).len();
        self.materials = Vec::new();
        if primitives > 0 || lights > 0 {
            log::debug!("Released scene: {} primitives, {} lights", primitives, lights);
        }
    }
}

impl Drop for Scene {
    fn drop(&mut self) {
        self.release();
    }
}
