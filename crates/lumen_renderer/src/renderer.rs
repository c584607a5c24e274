//! Progressive multi-threaded renderer.
//!
//! A frame is rendered in `samples_pixel` passes. In every pass the image
//! blocks are handed out through one shared atomic cursor, so each block is
//! rendered by exactly one thread per pass and threads never touch the same
//! pixel concurrently within a pass. Every pixel keeps a running mean of its
//! samples packed into a single `0xAABBGGRR` word.

use std::sync::atomic::{AtomicBool, AtomicU32, Ordering};
use std::sync::Arc;
use std::time::Instant;

use lumen_core::{Color, Sampler};
use lumen_math::incremental_avg;
use thiserror::Error;

use crate::block::{block_order, Block, BlockGrid, NUMBER_OF_BLOCKS};
use crate::camera::Camera;
use crate::shader::Shader;

/// Returned by [`Renderer::next_block`] when the current pass is exhausted.
pub const NO_MORE_BLOCKS: f32 = 1.0;

/// Errors rejecting a frame before any pixel is touched.
#[derive(Error, Debug, PartialEq, Eq)]
pub enum RenderError {
    #[error("At least one render thread is required")]
    NoThreads,

    #[error("Row stride of {stride} bytes can't hold {width} pixels of 4 bytes")]
    InvalidStride { stride: usize, width: u32 },

    #[error("Output buffer holds {actual} pixels, the frame needs {needed}")]
    BufferTooSmall { needed: usize, actual: usize },
}

/// Shared flag requesting render threads to stop.
#[derive(Debug, Clone, Default)]
pub struct CancellationToken(Arc<AtomicBool>);

impl CancellationToken {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.0.store(true, Ordering::Relaxed);
    }

    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::Relaxed)
    }
}

/// Drives a shader over every pixel of the image, one pass per sample.
pub struct Renderer {
    shader: Box<dyn Shader>,
    camera: Camera,
    sampler: Box<dyn Sampler>,
    width: u32,
    height: u32,
    samples_pixel: u32,
    grid: BlockGrid,
    block_cursor: AtomicU32,
    sample: AtomicU32,
    token: CancellationToken,
}

impl Renderer {
    /// Create a renderer and build the shader's acceleration structures.
    ///
    /// `sampler` jitters the primary rays inside their pixels.
    pub fn new(
        mut shader: Box<dyn Shader>,
        camera: Camera,
        sampler: Box<dyn Sampler>,
        width: u32,
        height: u32,
        samples_pixel: u32,
    ) -> Self {
        let start = Instant::now();
        shader.initialize_accelerators();
        log::info!("Initialized accelerators in {:.2?}", start.elapsed());

        // Build the visitation order before the first frame starts
        block_order();

        let grid = BlockGrid::new(width, height);
        log::debug!(
            "Block grid {}x{} px, {} blocks",
            grid.block_width(),
            grid.block_height(),
            grid.domain_size()
        );

        Self {
            shader,
            camera,
            sampler,
            width,
            height,
            samples_pixel,
            grid,
            block_cursor: AtomicU32::new(0),
            sample: AtomicU32::new(0),
            token: CancellationToken::new(),
        }
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    pub fn samples_pixel(&self) -> u32 {
        self.samples_pixel
    }

    pub fn grid(&self) -> &BlockGrid {
        &self.grid
    }

    /// Number of passes completed by the coordinating thread so far.
    pub fn sample(&self) -> u32 {
        self.sample.load(Ordering::Relaxed)
    }

    /// Token shared with the render threads; cancelling it stops the frame.
    pub fn cancellation_token(&self) -> CancellationToken {
        self.token.clone()
    }

    /// Stop rendering as soon as possible.
    ///
    /// Threads notice at the next block claim or row. A stopped renderer
    /// stays stopped: later frames return without rendering.
    pub fn stop_render(&self) {
        self.token.cancel();
        self.sampler.stop_sampling();
        log::info!("Render stopped at sample {}", self.sample());
    }

    /// Render one progressive frame into `buffer`.
    ///
    /// `buffer` holds rows of packed `0xAABBGGRR` pixels, `stride` bytes
    /// apart. `num_threads - 1` workers are spawned and the calling thread
    /// renders too; all have finished when this returns.
    pub fn render_frame(&self, buffer: &mut [u32], num_threads: usize, stride: usize) -> Result<(), RenderError> {
        let row_width = self.validate(buffer, num_threads, stride)?;
        if self.token.is_cancelled() {
            log::debug!("Renderer was stopped, skipping frame");
            return Ok(());
        }

        self.sample.store(0, Ordering::Relaxed);
        self.block_cursor.store(0, Ordering::Relaxed);
        self.sampler.reset_sampling();
        self.shader.reset_sampling();

        log::info!(
            "Rendering {}x{} with {} samples on {} threads",
            self.width,
            self.height,
            self.samples_pixel,
            num_threads
        );
        let start = Instant::now();

        // SAFETY: AtomicU32 has the same size and alignment as u32, and the
        // exclusive borrow of `buffer` lasts for the whole frame.
        let pixels: &[AtomicU32] = unsafe { &*(buffer as *mut [u32] as *const [AtomicU32]) };

        std::thread::scope(|scope| {
            for tid in 1..num_threads {
                scope.spawn(move || self.render_loop(tid, pixels, row_width));
            }
            self.render_loop(0, pixels, row_width);
        });

        log::info!("Frame finished in {:.2?}", start.elapsed());
        Ok(())
    }

    /// Claim the next block of pass `sample`.
    ///
    /// Returns its selector from [`block_order`], or [`NO_MORE_BLOCKS`] once
    /// all `NUMBER_OF_BLOCKS` claims of the pass are taken.
    pub fn next_block(&self, sample: u32) -> f32 {
        let limit = NUMBER_OF_BLOCKS.saturating_mul(sample.saturating_add(1));
        let claimed = self
            .block_cursor
            .fetch_update(Ordering::AcqRel, Ordering::Acquire, |cursor| {
                (cursor < limit).then_some(cursor + 1)
            });
        match claimed {
            Ok(cursor) => block_order()[(cursor % NUMBER_OF_BLOCKS) as usize],
            Err(_) => NO_MORE_BLOCKS,
        }
    }

    fn validate(&self, buffer: &[u32], num_threads: usize, stride: usize) -> Result<usize, RenderError> {
        if num_threads == 0 {
            return Err(RenderError::NoThreads);
        }
        let row_width = stride / 4;
        if stride % 4 != 0 || row_width < self.width as usize {
            return Err(RenderError::InvalidStride {
                stride,
                width: self.width,
            });
        }
        let needed = match (self.width as usize, self.height as usize) {
            (0, _) | (_, 0) => 0,
            (width, height) => (height - 1) * row_width + width,
        };
        if buffer.len() < needed {
            return Err(RenderError::BufferTooSmall {
                needed,
                actual: buffer.len(),
            });
        }
        Ok(row_width)
    }

    fn render_loop(&self, tid: usize, pixels: &[AtomicU32], row_width: usize) {
        for sample in 0..self.samples_pixel {
            loop {
                if self.token.is_cancelled() {
                    return;
                }
                let selector = self.next_block(sample);
                if selector >= NO_MORE_BLOCKS {
                    break;
                }
                // Small grids skip the selectors past their last block
                if let Some(block) = self.grid.block_for_selector(selector) {
                    if !self.render_block(&block, sample + 1, pixels, row_width) {
                        return;
                    }
                }
            }

            if tid == 0 {
                self.sample.store(sample + 1, Ordering::Relaxed);
                log::debug!("Sample {}/{} done", sample + 1, self.samples_pixel);
            }
        }
    }

    /// Returns false if rendering was cancelled part way through.
    fn render_block(&self, block: &Block, num_sample: u32, pixels: &[AtomicU32], row_width: usize) -> bool {
        let inv_width = 1.0 / self.width as f32;
        let inv_height = 1.0 / self.height as f32;

        for y in block.y..block.y + block.height {
            if self.token.is_cancelled() {
                return false;
            }
            let v = (y as f32 + 0.5) * inv_height;
            let row = y as usize * row_width;

            for x in block.x..block.x + block.width {
                let u = (x as f32 + 0.5) * inv_width;
                let du = (self.sampler.sample() - 0.5) * inv_width;
                let dv = (self.sampler.sample() - 0.5) * inv_height;

                let color = match self.camera.generate_ray(u, v, du, dv) {
                    Ok(ray) => self.shader.ray_trace(&ray),
                    Err(_) => Color::ZERO,
                };

                let pixel = &pixels[row + x as usize];
                pixel
                    .fetch_update(Ordering::Relaxed, Ordering::Relaxed, |avg| {
                        Some(incremental_avg(color, avg, num_sample))
                    })
                    .ok();
            }
        }
        true
    }
}
