//! Lumen Renderer - progressive multi-threaded CPU ray tracing.
//!
//! A [`Renderer`] splits the image into blocks that worker threads claim
//! through a lock-free cursor, and refines every pixel pass by pass with a
//! running mean stored in one packed word per pixel.
//!
//! Shading is pluggable through the [`Shader`] trait:
//!
//! - [`NoShadows`]: direct lighting without visibility tests
//! - [`Whitted`]: shadows, mirrors and refraction
//! - [`PathTracer`]: Monte Carlo global illumination
//! - [`DepthMap`] and [`DiffuseMaterial`]: quick previews

mod block;
mod bvh;
mod camera;
mod camera_factory;
mod config;
mod no_shadows;
mod path_tracer;
mod preview;
mod renderer;
mod scenes;
mod shader;
mod whitted;

pub use block::{block_order, Block, BlockGrid, BLOCKS_PER_AXIS, NUMBER_OF_BLOCKS};
pub use bvh::{Bvh, BvhNode};
pub use camera::{Camera, CameraError, Projection};
pub use camera_factory::CameraFactory;
pub use config::{ConfigError, RenderConfig, SamplerKind};
pub use no_shadows::NoShadows;
pub use path_tracer::PathTracer;
pub use preview::{DepthMap, DiffuseMaterial};
pub use renderer::{CancellationToken, RenderError, Renderer, NO_MORE_BLOCKS};
pub use scenes::{BuiltinScene, SceneKind};
pub use shader::{facing_normal, reflect, refract, AcceleratorKind, Shader, ShaderKind, Surface, Tracer};
pub use whitted::Whitted;
