//! Intersection record threaded through every ray-primitive test.

use lumen_math::{Vec2, Vec3, RAY_LENGTH_MAX};

use crate::PrimitiveId;

/// The best hit found so far along a ray.
///
/// Starts out with `length` set to a sentinel distance and no material;
/// primitive tests only overwrite it with strictly closer hits.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Intersection {
    /// Point of intersection
    pub point: Vec3,
    /// Outward unit surface normal
    pub normal: Vec3,
    /// Distance along the ray
    pub length: f32,
    /// Index into the scene's materials, `None` for no hit or a light
    pub material: Option<usize>,
    /// Surface that was hit, filled in by the scene
    pub primitive: Option<PrimitiveId>,
    /// Interpolated texture coordinates, if the surface has any
    pub tex_coords: Option<Vec2>,
}

impl Default for Intersection {
    fn default() -> Self {
        Self::new(RAY_LENGTH_MAX)
    }
}

impl Intersection {
    /// An empty record that accepts hits closer than `max_length`.
    pub fn new(max_length: f32) -> Self {
        Self {
            point: Vec3::ZERO,
            normal: Vec3::ZERO,
            length: max_length,
            material: None,
            primitive: None,
            tex_coords: None,
        }
    }

    /// Overwrite this record with a closer hit.
    ///
    /// The primitive link is cleared; the scene fills it in. `normal` must be
    /// finite and unit length.
    #[inline]
    pub fn record(&mut self, point: Vec3, length: f32, normal: Vec3, material: Option<usize>) {
        debug_assert!(normal.is_finite(), "normal can't be NaN or infinite");
        debug_assert!(
            (normal.length_squared() - 1.0).abs() < 1.0e-3,
            "normal must be unit length, got {normal}"
        );

        self.point = point;
        self.length = length;
        self.normal = normal;
        self.material = material;
        self.primitive = None;
        self.tex_coords = None;
    }
}
