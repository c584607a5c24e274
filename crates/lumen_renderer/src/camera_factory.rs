//! Line-oriented camera description loader.
//!
//! ```text
//! t perspective      camera type (perspective | orthographic)
//! p 0 0 3.4          position
//! l 0 0 0            look-at point
//! u 0 1 0            up vector (optional, defaults to +Y)
//! f 45               vertical field of view in degrees (perspective)
//! s 4 3              view size in world units (orthographic)
//! ```
//!
//! Lines starting with `#` are comments. Unknown keys and malformed values
//! are skipped with a warning.

use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;

use lumen_math::Vec3;

use crate::camera::{Camera, CameraError};

/// Vertical field of view used when the description has none.
const DEFAULT_VFOV_DEG: f32 = 45.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum CameraType {
    Perspective,
    Orthographic,
}

/// Builds cameras from text descriptions.
#[derive(Debug, Default, Clone, Copy)]
pub struct CameraFactory;

impl CameraFactory {
    /// Load a camera description from a file.
    pub fn load_from_file(&self, path: impl AsRef<Path>, aspect_ratio: f32) -> Result<Camera, CameraError> {
        let file = File::open(path.as_ref())?;
        log::info!("Loading camera from {}", path.as_ref().display());
        self.load_from_reader(BufReader::new(file), aspect_ratio)
    }

    /// Load a camera description from a string.
    pub fn load_from_str(&self, text: &str, aspect_ratio: f32) -> Result<Camera, CameraError> {
        self.load_from_reader(text.as_bytes(), aspect_ratio)
    }

    /// Load a camera description from any buffered reader.
    ///
    /// `aspect_ratio` (width / height) derives the horizontal field of view,
    /// or the missing height of an orthographic view.
    pub fn load_from_reader<R: BufRead>(&self, reader: R, aspect_ratio: f32) -> Result<Camera, CameraError> {
        let mut kind = None;
        let mut position = None;
        let mut look_at = None;
        let mut up = Vec3::Y;
        let mut vfov = DEFAULT_VFOV_DEG;
        let mut size = None;

        for (number, line) in reader.lines().enumerate() {
            let line = line?;
            let line = line.trim_start_matches('\u{feff}').trim();
            if line.is_empty() || line.starts_with('#') {
                continue;
            }

            let mut chars = line.chars();
            let key = chars.next();
            let rest = chars.as_str();
            let values = parse_floats(rest);
            match (key, values.as_deref()) {
                (Some('t'), _) => {
                    let name = rest.trim();
                    kind = Some(match name {
                        "perspective" => CameraType::Perspective,
                        "orthographic" => CameraType::Orthographic,
                        other => return Err(CameraError::UnknownType(other.to_string())),
                    });
                }
                (Some('p'), Some([x, y, z])) => position = Some(Vec3::new(*x, *y, *z)),
                (Some('l'), Some([x, y, z])) => look_at = Some(Vec3::new(*x, *y, *z)),
                (Some('u'), Some([x, y, z])) => up = Vec3::new(*x, *y, *z),
                (Some('f'), Some([fov])) => vfov = *fov,
                (Some('s'), Some([w])) => size = Some((*w, *w / aspect_ratio)),
                (Some('s'), Some([w, h])) => size = Some((*w, *h)),
                _ => log::warn!("Skipping camera line {}: '{}'", number + 1, line),
            }
        }

        let kind = kind.ok_or(CameraError::MissingType)?;
        let position = position.ok_or(CameraError::MissingField('p'))?;
        let look_at = look_at.ok_or(CameraError::MissingField('l'))?;

        match kind {
            CameraType::Perspective => {
                Camera::perspective_with_aspect(position, look_at, up, vfov, aspect_ratio)
            }
            CameraType::Orthographic => {
                let (width, height) = size.ok_or(CameraError::MissingField('s'))?;
                Camera::orthographic(position, look_at, up, width, height)
            }
        }
    }
}

/// Parse whitespace-separated floats, `None` if any token is malformed.
fn parse_floats(text: &str) -> Option<Vec<f32>> {
    text.split_whitespace().map(|t| t.parse::<f32>().ok()).collect()
}
