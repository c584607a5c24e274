//! Camera for primary ray generation.

use lumen_core::{GeometryError, Ray};
use lumen_math::{Vec3, EPSILON};
use thiserror::Error;

/// Errors building a camera or reading its description.
#[derive(Error, Debug)]
pub enum CameraError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Camera description has no type line")]
    MissingType,

    #[error("Unknown camera type: {0}")]
    UnknownType(String),

    #[error("Camera description is missing '{0}'")]
    MissingField(char),

    #[error("Camera orientation is degenerate")]
    DegenerateOrientation,

    #[error("Invalid field of view or size: {0}")]
    InvalidExtent(f32),
}

/// How image-plane coordinates map to rays.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Projection {
    /// Pinhole camera; fields of view in radians
    Perspective { hfov: f32, vfov: f32 },
    /// Parallel rays; size of the view in world units
    Orthographic { width: f32, height: f32 },
}

/// Camera for generating rays into the scene.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Camera {
    position: Vec3,
    direction: Vec3,
    right: Vec3,
    up: Vec3,
    projection: Projection,
}

impl Camera {
    /// Create a perspective camera. Angles are in degrees.
    pub fn perspective(
        position: Vec3,
        look_at: Vec3,
        up: Vec3,
        hfov_deg: f32,
        vfov_deg: f32,
    ) -> Result<Self, CameraError> {
        for fov in [hfov_deg, vfov_deg] {
            if !(fov > 0.0 && fov < 180.0) {
                return Err(CameraError::InvalidExtent(fov));
            }
        }
        Self::with_projection(
            position,
            look_at,
            up,
            Projection::Perspective {
                hfov: hfov_deg.to_radians(),
                vfov: vfov_deg.to_radians(),
            },
        )
    }

    /// Create a perspective camera from a vertical fov and an aspect ratio
    /// (width / height).
    pub fn perspective_with_aspect(
        position: Vec3,
        look_at: Vec3,
        up: Vec3,
        vfov_deg: f32,
        aspect_ratio: f32,
    ) -> Result<Self, CameraError> {
        let half = (vfov_deg.to_radians() / 2.0).tan() * aspect_ratio;
        let hfov_deg = (2.0 * half.atan()).to_degrees();
        Self::perspective(position, look_at, up, hfov_deg, vfov_deg)
    }

    /// Create an orthographic camera covering `width` x `height` world units.
    pub fn orthographic(
        position: Vec3,
        look_at: Vec3,
        up: Vec3,
        width: f32,
        height: f32,
    ) -> Result<Self, CameraError> {
        for size in [width, height] {
            if !(size > 0.0 && size.is_finite()) {
                return Err(CameraError::InvalidExtent(size));
            }
        }
        Self::with_projection(position, look_at, up, Projection::Orthographic { width, height })
    }

    fn with_projection(
        position: Vec3,
        look_at: Vec3,
        up: Vec3,
        projection: Projection,
    ) -> Result<Self, CameraError> {
        let direction = (look_at - position).normalize_or_zero();
        let right = direction.cross(up).normalize_or_zero();
        if direction.length_squared() < EPSILON || right.length_squared() < EPSILON {
            return Err(CameraError::DegenerateOrientation);
        }
        let up = right.cross(direction);

        Ok(Self {
            position,
            direction,
            right,
            up,
            projection,
        })
    }

    pub fn position(&self) -> Vec3 {
        self.position
    }

    pub fn direction(&self) -> Vec3 {
        self.direction
    }

    pub fn projection(&self) -> Projection {
        self.projection
    }

    /// Generate the primary ray through image-plane point (u, v) offset by
    /// (du, dv).
    ///
    /// `u` and `v` run from 0 to 1 left to right and top to bottom.
    pub fn generate_ray(&self, u: f32, v: f32, du: f32, dv: f32) -> Result<Ray, GeometryError> {
        let x = 2.0 * (u + du) - 1.0;
        let y = 1.0 - 2.0 * (v + dv);

        match self.projection {
            Projection::Perspective { hfov, vfov } => {
                let direction = self.direction
                    + self.right * (x * (hfov / 2.0).tan())
                    + self.up * (y * (vfov / 2.0).tan());
                Ray::primary(self.position, direction)
            }
            Projection::Orthographic { width, height } => {
                let origin = self.position
                    + self.right * (x * width / 2.0)
                    + self.up * (y * height / 2.0);
                Ray::primary(origin, self.direction)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn camera() -> Camera {
        Camera::perspective(Vec3::ZERO, Vec3::new(0.0, 0.0, -1.0), Vec3::Y, 90.0, 90.0).unwrap()
    }

    #[test]
    fn test_center_ray() {
        let ray = camera().generate_ray(0.5, 0.5, 0.0, 0.0).unwrap();
        assert!((ray.direction() - Vec3::new(0.0, 0.0, -1.0)).length() < 1.0e-5);
        assert_eq!(ray.origin(), Vec3::ZERO);
        assert_eq!(ray.depth(), 0);
    }

    #[test]
    fn test_corner_rays() {
        let cam = camera();
        // 90 degree fov: the top-left corner is at 45 degrees on both axes
        let top_left = cam.generate_ray(0.0, 0.0, 0.0, 0.0).unwrap().direction();
        let expected = Vec3::new(-1.0, 1.0, -1.0).normalize();
        assert!((top_left - expected).length() < 1.0e-5);

        let bottom_right = cam.generate_ray(1.0, 1.0, 0.0, 0.0).unwrap().direction();
        assert!(bottom_right.x > 0.0 && bottom_right.y < 0.0);
    }

    #[test]
    fn test_jitter_moves_ray() {
        let cam = camera();
        let a = cam.generate_ray(0.5, 0.5, 0.0, 0.0).unwrap().direction();
        let b = cam.generate_ray(0.5, 0.5, 0.01, 0.0).unwrap().direction();
        assert!(b.x > a.x);
    }

    #[test]
    fn test_orthographic_rays_are_parallel() {
        let cam = Camera::orthographic(
            Vec3::new(0.0, 0.0, 5.0),
            Vec3::ZERO,
            Vec3::Y,
            4.0,
            2.0,
        )
        .unwrap();
        let a = cam.generate_ray(0.0, 0.0, 0.0, 0.0).unwrap();
        let b = cam.generate_ray(1.0, 1.0, 0.0, 0.0).unwrap();
        assert_eq!(a.direction(), b.direction());
        assert!((a.origin() - Vec3::new(-2.0, 1.0, 5.0)).length() < 1.0e-5);
        assert!((b.origin() - Vec3::new(2.0, -1.0, 5.0)).length() < 1.0e-5);
    }

    #[test]
    fn test_aspect_ratio_widens_hfov() {
        let cam = Camera::perspective_with_aspect(
            Vec3::ZERO,
            Vec3::new(0.0, 0.0, -1.0),
            Vec3::Y,
            60.0,
            2.0,
        )
        .unwrap();
        match cam.projection() {
            Projection::Perspective { hfov, vfov } => {
                assert!(hfov > vfov);
                assert!(((hfov / 2.0).tan() - 2.0 * (vfov / 2.0).tan()).abs() < 1.0e-4);
            }
            Projection::Orthographic { .. } => panic!("expected perspective"),
        }
    }

    #[test]
    fn test_degenerate_orientation() {
        let same_point = Camera::perspective(Vec3::ONE, Vec3::ONE, Vec3::Y, 45.0, 45.0);
        assert!(matches!(same_point, Err(CameraError::DegenerateOrientation)));

        let up_along_view = Camera::perspective(Vec3::ZERO, Vec3::Y, Vec3::Y, 45.0, 45.0);
        assert!(matches!(up_along_view, Err(CameraError::DegenerateOrientation)));

        let bad_fov = Camera::perspective(Vec3::ZERO, Vec3::Z, Vec3::Y, 0.0, 45.0);
        assert!(matches!(bad_fov, Err(CameraError::InvalidExtent(_))));
    }
}
