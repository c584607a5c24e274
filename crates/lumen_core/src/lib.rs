//! Lumen Core - geometry kernel and scene model.
//!
//! This crate provides:
//!
//! - **Rays and intersections**: `Ray`, `Intersection`
//! - **Primitives**: `Sphere`, `Plane`, `Triangle` behind the `Primitive` enum
//! - **Lights**: `PointLight`, `AreaLight` behind the `Light` enum
//! - **Samplers**: precomputed `SampleTable`s shared by `TableSampler`s
//! - **Scene**: owner of all geometry, materials and lights
//!
//! # Example
//!
//! ```ignore
//! use lumen_core::{Material, Scene, Sphere};
//! use lumen_math::Vec3;
//!
//! let mut scene = Scene::new();
//! let red = scene.add_material(Material::diffuse(Vec3::X));
//! scene.add_primitive(Sphere::new(Vec3::new(0.0, 0.0, -5.0), 1.0, red));
//! ```

mod intersection;
mod light;
pub mod loader;
mod material;
mod plane;
mod primitive;
mod ray;
pub mod sampler;
mod scene;
mod sphere;
mod triangle;

pub use intersection::Intersection;
pub use light::{AreaLight, Light, PointLight};
pub use loader::{LoadError, LoadResult, ObjectLoader};
pub use material::{Color, Material};
pub use plane::Plane;
pub use primitive::{Primitive, PrimitiveId};
pub use ray::{GeometryError, Ray};
pub use sampler::{ConstantSampler, SampleTable, Sampler, SamplerFactory, TableSampler};
pub use scene::Scene;
pub use sphere::Sphere;
pub use triangle::Triangle;
