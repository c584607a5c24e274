// Re-export glam for convenience
pub use glam::*;

// Lumen math types
mod aabb;
pub mod utils;

pub use aabb::Aabb;
pub use utils::{
    equal, equal_vec3, halton_sequence, incremental_avg, EPSILON, EPSILON_LARGE,
    RAY_DEPTH_MAX, RAY_DEPTH_MIN, RAY_LENGTH_MAX,
};
