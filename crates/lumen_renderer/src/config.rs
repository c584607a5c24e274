//! Render configuration and session setup.

use std::cell::Cell;
use std::path::{Path, PathBuf};

use lumen_core::sampler::DEFAULT_TABLE_SIZE;
use lumen_core::{LoadError, ObjectLoader, SampleTable, Sampler, Scene, TableSampler};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::camera::{Camera, CameraError};
use crate::camera_factory::CameraFactory;
use crate::renderer::Renderer;
use crate::scenes::{BuiltinScene, SceneKind};
use crate::shader::{AcceleratorKind, ShaderKind};

/// Spacing between the table offsets of area light samplers.
const LIGHT_SAMPLER_STRIDE: usize = 7919;

/// Errors reading a configuration or setting up a render from it.
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Invalid configuration file: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Invalid configuration: {0}")]
    Invalid(String),

    #[error("Camera setup failed: {0}")]
    Camera(#[from] CameraError),

    #[error("Scene setup failed: {0}")]
    Load(#[from] LoadError),
}

/// Source of sample tables.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SamplerKind {
    /// Shuffled Halton sequence, identical across runs
    #[default]
    Halton,
    /// Entropy-seeded pseudo-random values
    Random,
}

/// Everything needed to render a frame.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RenderConfig {
    pub width: u32,
    pub height: u32,
    /// Progressive passes per frame
    pub samples_pixel: u32,
    /// Shadow rays per light and hit
    pub samples_light: u32,
    /// Render threads, 0 uses every available core
    pub threads: usize,
    pub sampler: SamplerKind,
    pub shader: ShaderKind,
    pub accelerator: AcceleratorKind,
    pub scene: SceneKind,
    /// Camera description overriding the scene's default camera
    pub camera_file: Option<PathBuf>,
    /// Where the image is written
    pub output: PathBuf,
    /// Entries per sample table
    pub table_size: usize,
}

impl Default for RenderConfig {
    fn default() -> Self {
        Self {
            width: 512,
            height: 512,
            samples_pixel: 16,
            samples_light: 1,
            threads: 0,
            sampler: SamplerKind::default(),
            shader: ShaderKind::default(),
            accelerator: AcceleratorKind::default(),
            scene: SceneKind::default(),
            camera_file: None,
            output: PathBuf::from("render.png"),
            table_size: DEFAULT_TABLE_SIZE,
        }
    }
}

impl RenderConfig {
    /// Load a configuration from a JSON file. Missing fields keep their defaults.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let text = std::fs::read_to_string(path.as_ref())?;
        log::info!("Loading config from {}", path.as_ref().display());
        Self::from_json(&text)
    }

    /// Parse and validate a JSON configuration.
    pub fn from_json(text: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_json::from_str(text)?;
        config.validate()?;
        Ok(config)
    }

    pub fn to_json(&self) -> Result<String, ConfigError> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.width == 0 || self.height == 0 {
            return Err(ConfigError::Invalid(format!(
                "image size {}x{} is empty",
                self.width, self.height
            )));
        }
        if self.samples_pixel == 0 {
            return Err(ConfigError::Invalid("samples_pixel must be at least 1".into()));
        }
        if self.table_size == 0 {
            return Err(ConfigError::Invalid("table_size must be at least 1".into()));
        }
        Ok(())
    }

    pub fn aspect_ratio(&self) -> f32 {
        self.width as f32 / self.height as f32
    }

    /// Resolved thread count, at least 1.
    pub fn thread_count(&self) -> usize {
        match self.threads {
            0 => std::thread::available_parallelism().map_or(1, |n| n.get()),
            n => n,
        }
    }

    /// Build a sample table of the configured kind.
    pub fn sample_table(&self) -> SampleTable {
        match self.sampler {
            SamplerKind::Halton => SampleTable::halton(self.table_size),
            SamplerKind::Random => SampleTable::random(self.table_size),
        }
    }

    /// The configured camera file, or the scene's default camera.
    pub fn camera(&self) -> Result<Camera, ConfigError> {
        let camera = match &self.camera_file {
            Some(path) => CameraFactory.load_from_file(path, self.aspect_ratio())?,
            None => self.scene.default_camera(self.aspect_ratio())?,
        };
        Ok(camera)
    }

    /// Load the scene through `loader`, giving every area light its own
    /// sampler over one shared table.
    pub fn load_scene(&self, loader: &mut dyn ObjectLoader, table: &SampleTable) -> Result<Scene, ConfigError> {
        if !loader.is_processed() {
            return Err(ConfigError::Invalid("scene loader has no content".into()));
        }
        let next_offset = Cell::new(0usize);
        let factory = || {
            let offset = next_offset.get();
            next_offset.set(offset + LIGHT_SAMPLER_STRIDE);
            Box::new(TableSampler::with_offset(table.clone(), offset)) as Box<dyn Sampler>
        };

        let mut scene = Scene::new();
        loader.fill_scene(&mut scene, &factory)?;
        if scene.is_empty() {
            return Err(LoadError::NoGeometry.into());
        }
        Ok(scene)
    }

    /// Build a renderer for the configured scene, shader and camera.
    pub fn build_renderer(&self) -> Result<Renderer, ConfigError> {
        self.validate()?;
        let table = self.sample_table();
        let scene = self.load_scene(&mut BuiltinScene::new(self.scene), &table)?;
        let camera = self.camera()?;

        let half = table.len() / 2;
        let shader = self.shader.build(
            scene,
            self.accelerator,
            self.samples_light,
            Box::new(TableSampler::with_offset(table.clone(), half)),
        );
        Ok(Renderer::new(
            shader,
            camera,
            Box::new(TableSampler::new(table)),
            self.width,
            self.height,
            self.samples_pixel,
        ))
    }
}
