//! Contract for collaborators that populate a [`Scene`].

use thiserror::Error;

use crate::{SamplerFactory, Scene};

/// Errors that can occur while filling a scene.
#[derive(Error, Debug)]
pub enum LoadError {
    #[error("Scene has no geometry")]
    NoGeometry,

    #[error("Scene was already loaded")]
    AlreadyProcessed,
}

/// Result type for loading operations.
pub type LoadResult<T> = Result<T, LoadError>;

/// Something that can fill a scene with geometry, materials and lights.
pub trait ObjectLoader {
    /// Whether the source was parsed successfully and is ready to fill a scene.
    fn is_processed(&self) -> bool;

    /// Append this loader's content to `scene`.
    ///
    /// `sampler_factory` constructs a fresh sampler for every area light.
    fn fill_scene(&mut self, scene: &mut Scene, sampler_factory: &SamplerFactory) -> LoadResult<()>;
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{ConstantSampler, Material, Sampler, Sphere};
    use lumen_math::Vec3;

    struct OneSphere {
        done: bool,
    }

    impl ObjectLoader for OneSphere {
        fn is_processed(&self) -> bool {
            true
        }

        fn fill_scene(&mut self, scene: &mut Scene, _factory: &SamplerFactory) -> LoadResult<()> {
            if self.done {
                return Err(LoadError::AlreadyProcessed);
            }
            let m = scene.add_material(Material::default());
            scene.add_primitive(Sphere::new(Vec3::ZERO, 1.0, m));
            self.done = true;
            Ok(())
        }
    }

    #[test]
    fn test_loader_contract() {
        let factory = || Box::new(ConstantSampler::new(0.5)) as Box<dyn Sampler>;
        let mut loader = OneSphere { done: false };
        let mut scene = Scene::new();

        assert!(loader.is_processed());
        loader.fill_scene(&mut scene, &factory).unwrap();
        assert_eq!(scene.primitive_count(), 1);
        assert!(matches!(
            loader.fill_scene(&mut scene, &factory),
            Err(LoadError::AlreadyProcessed)
        ));
    }

    #[test]
    fn test_error_display() {
        assert_eq!(LoadError::NoGeometry.to_string(), "Scene has no geometry");
        assert_eq!(LoadError::AlreadyProcessed.to_string(), "Scene was already loaded");
    }
}
