//! Surface material description consumed by the shading strategies.

use lumen_math::Vec3;

/// Color type alias (RGB values typically 0-1)
pub type Color = Vec3;

/// A simple surface material.
///
/// Primitives store an index into the scene's material list instead of the
/// material itself, so identical surfaces share one entry.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Material {
    /// Emitted radiance (light sources)
    pub le: Color,
    /// Diffuse reflectance
    pub kd: Color,
    /// Perfect mirror reflectance
    pub ks: Color,
    /// Transmittance
    pub kt: Color,
    /// Index of refraction used with `kt`
    pub refractive_index: f32,
}

impl Default for Material {
    fn default() -> Self {
        Self {
            le: Color::ZERO,
            kd: Color::splat(0.5), // Grey default
            ks: Color::ZERO,
            kt: Color::ZERO,
            refractive_index: 1.0,
        }
    }
}

impl Material {
    /// A purely diffuse material.
    pub fn diffuse(kd: Color) -> Self {
        Self {
            kd,
            ..Default::default()
        }
    }

    /// A perfect mirror.
    pub fn mirror(ks: Color) -> Self {
        Self {
            kd: Color::ZERO,
            ks,
            ..Default::default()
        }
    }

    /// A clear dielectric with the given index of refraction.
    pub fn glass(kt: Color, refractive_index: f32) -> Self {
        Self {
            kd: Color::ZERO,
            kt,
            refractive_index,
            ..Default::default()
        }
    }

    /// A light-emitting material.
    pub fn emissive(le: Color) -> Self {
        Self {
            le,
            kd: Color::ZERO,
            ..Default::default()
        }
    }

    /// Check if this material emits light.
    pub fn is_emissive(&self) -> bool {
        self.le.max_element() > 0.0
    }

    /// Check if this material reflects or transmits specularly.
    pub fn is_specular(&self) -> bool {
        self.ks.max_element() > 0.0 || self.kt.max_element() > 0.0
    }
}
