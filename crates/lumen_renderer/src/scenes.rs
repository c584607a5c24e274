//! Procedurally built scenes.

use lumen_core::{
    AreaLight, LoadError, LoadResult, Material, ObjectLoader, Plane, PointLight, SamplerFactory, Scene, Sphere,
    Triangle,
};
use lumen_math::{Vec2, Vec3};
use serde::{Deserialize, Serialize};

use crate::camera::{Camera, CameraError};

/// Scenes that can be rendered without any input files.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SceneKind {
    /// Coloured walls, two spheres and an area light in the ceiling
    #[default]
    CornellBox,
    /// Spheres on a ground plane under two point lights
    Spheres,
    /// Walls made of triangles around a sphere
    Triangles,
}

impl SceneKind {
    /// Camera framing the scene for an image of `aspect_ratio` (width / height).
    pub fn default_camera(self, aspect_ratio: f32) -> Result<Camera, CameraError> {
        match self {
            SceneKind::CornellBox => {
                Camera::perspective_with_aspect(Vec3::new(0.0, 0.0, 3.4), Vec3::ZERO, Vec3::Y, 45.0, aspect_ratio)
            }
            SceneKind::Spheres => Camera::perspective_with_aspect(
                Vec3::new(0.0, 1.0, 4.0),
                Vec3::new(0.0, 0.0, -1.0),
                Vec3::Y,
                50.0,
                aspect_ratio,
            ),
            SceneKind::Triangles => Camera::perspective_with_aspect(
                Vec3::new(0.0, 0.5, 3.0),
                Vec3::new(0.0, 0.0, -1.0),
                Vec3::Y,
                60.0,
                aspect_ratio,
            ),
        }
    }
}

/// Loader filling a scene with one of the [`SceneKind`]s.
#[derive(Debug, Clone)]
pub struct BuiltinScene {
    kind: SceneKind,
    filled: bool,
}

impl BuiltinScene {
    pub fn new(kind: SceneKind) -> Self {
        Self { kind, filled: false }
    }

    pub fn kind(&self) -> SceneKind {
        self.kind
    }
}

impl ObjectLoader for BuiltinScene {
    fn is_processed(&self) -> bool {
        true
    }

    fn fill_scene(&mut self, scene: &mut Scene, sampler_factory: &SamplerFactory) -> LoadResult<()> {
        if self.filled {
            return Err(LoadError::AlreadyProcessed);
        }
        match self.kind {
            SceneKind::CornellBox => cornell_box(scene, sampler_factory),
            SceneKind::Spheres => spheres(scene),
            SceneKind::Triangles => triangles(scene),
        }
        self.filled = true;
        log::info!(
            "Loaded {:?}: {} primitives, {} lights",
            self.kind,
            scene.primitive_count(),
            scene.lights().len()
        );
        Ok(())
    }
}

/// Two triangles covering the quad `a b c d`.
fn quad(a: Vec3, b: Vec3, c: Vec3, d: Vec3, material: usize) -> [Triangle; 2] {
    [Triangle::new(a, b, c, material), Triangle::new(a, c, d, material)]
}

fn cornell_box(scene: &mut Scene, sampler_factory: &SamplerFactory) {
    let white = scene.add_material(Material::diffuse(Vec3::splat(0.9)));
    let red = scene.add_material(Material::diffuse(Vec3::new(0.9, 0.1, 0.1)));
    let green = scene.add_material(Material::diffuse(Vec3::new(0.1, 0.9, 0.1)));
    let blue = scene.add_material(Material::diffuse(Vec3::new(0.1, 0.1, 0.9)));
    let mirror = scene.add_material(Material::mirror(Vec3::splat(0.9)));

    scene.add_primitive(Plane::new(Vec3::new(0.0, -1.0, 0.0), Vec3::Y, white));
    scene.add_primitive(Plane::new(Vec3::new(0.0, 1.0, 0.0), -Vec3::Y, white));
    scene.add_primitive(Plane::new(Vec3::new(0.0, 0.0, -1.0), Vec3::Z, white));
    scene.add_primitive(Plane::new(Vec3::new(-1.0, 0.0, 0.0), Vec3::X, red));
    scene.add_primitive(Plane::new(Vec3::new(1.0, 0.0, 0.0), -Vec3::X, green));
    // Behind the camera
    scene.add_primitive(Plane::new(Vec3::new(0.0, 0.0, 3.5), -Vec3::Z, white));

    scene.add_primitive(Sphere::new(Vec3::new(-0.45, -0.65, -0.4), 0.35, mirror));
    scene.add_primitive(Sphere::new(Vec3::new(0.45, -0.65, 0.2), 0.35, blue));

    let radiance = Material::emissive(Vec3::splat(4.0));
    let y = 0.99;
    let [first, second] = quad(
        Vec3::new(-0.25, y, -0.25),
        Vec3::new(0.25, y, -0.25),
        Vec3::new(0.25, y, 0.25),
        Vec3::new(-0.25, y, 0.25),
        0,
    );
    scene.add_light(AreaLight::new(radiance, sampler_factory(), first));
    scene.add_light(AreaLight::new(radiance, sampler_factory(), second));
}

fn spheres(scene: &mut Scene) {
    let ground = scene.add_material(Material::diffuse(Vec3::splat(0.5)));
    let orange = scene.add_material(Material::diffuse(Vec3::new(0.9, 0.5, 0.1)));
    let teal = scene.add_material(Material::diffuse(Vec3::new(0.1, 0.6, 0.6)));
    let mirror = scene.add_material(Material::mirror(Vec3::splat(0.8)));
    let glow = scene.add_material(Material {
        le: Vec3::new(0.6, 0.6, 0.3),
        ..Material::diffuse(Vec3::splat(0.2))
    });

    scene.add_primitive(Plane::new(Vec3::new(0.0, -0.5, 0.0), Vec3::Y, ground));
    scene.add_primitive(Sphere::new(Vec3::new(-1.1, 0.0, -1.0), 0.5, orange));
    scene.add_primitive(Sphere::new(Vec3::new(0.0, 0.0, -1.5), 0.5, mirror));
    scene.add_primitive(Sphere::new(Vec3::new(1.1, 0.0, -1.0), 0.5, teal));
    scene.add_primitive(Sphere::new(Vec3::new(0.4, -0.3, -0.2), 0.2, glow));

    scene.add_light(PointLight::new(Material::emissive(Vec3::splat(0.8)), Vec3::new(-2.0, 3.0, 1.0)));
    scene.add_light(PointLight::new(Material::emissive(Vec3::splat(0.4)), Vec3::new(3.0, 2.0, -2.0)));
}

fn triangles(scene: &mut Scene) {
    let floor = scene.add_material(Material::diffuse(Vec3::splat(0.7)));
    let wall = scene.add_material(Material::diffuse(Vec3::new(0.6, 0.6, 0.9)));
    let mirror = scene.add_material(Material::mirror(Vec3::splat(0.7)));
    let red = scene.add_material(Material::diffuse(Vec3::new(0.8, 0.2, 0.2)));

    let uv = [Vec2::ZERO, Vec2::X, Vec2::ONE];
    for triangle in quad(
        Vec3::new(-3.0, -1.0, 2.0),
        Vec3::new(3.0, -1.0, 2.0),
        Vec3::new(3.0, -1.0, -4.0),
        Vec3::new(-3.0, -1.0, -4.0),
        floor,
    ) {
        scene.add_primitive(triangle.with_tex_coords(uv));
    }
    for triangle in quad(
        Vec3::new(-3.0, -1.0, -4.0),
        Vec3::new(3.0, -1.0, -4.0),
        Vec3::new(3.0, 3.0, -4.0),
        Vec3::new(-3.0, 3.0, -4.0),
        wall,
    ) {
        scene.add_primitive(triangle);
    }
    // Angled mirror on the left
    for triangle in quad(
        Vec3::new(-2.5, -1.0, 0.0),
        Vec3::new(-1.5, -1.0, -3.0),
        Vec3::new(-1.5, 2.0, -3.0),
        Vec3::new(-2.5, 2.0, 0.0),
        mirror,
    ) {
        scene.add_primitive(triangle);
    }

    scene.add_primitive(Sphere::new(Vec3::new(0.3, -0.3, -1.5), 0.7, red));
    scene.add_light(PointLight::new(Material::emissive(Vec3::ONE), Vec3::new(1.0, 2.5, 1.0)));
}
