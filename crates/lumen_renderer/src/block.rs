//! Block-based image partitioning for progressive rendering.
//!
//! The image is split into a grid of at most `BLOCKS_PER_AXIS` x
//! `BLOCKS_PER_AXIS` rectangles. Render threads claim blocks through a
//! shared cursor and visit them in a shuffled Halton order, so early passes
//! spread over the whole frame instead of sweeping top to bottom.

use std::sync::OnceLock;

use lumen_math::halton_sequence;
use rand::seq::SliceRandom;

/// Number of block claims per sample pass.
pub const NUMBER_OF_BLOCKS: u32 = 256;

/// Blocks along each image axis, the square root of `NUMBER_OF_BLOCKS`.
pub const BLOCKS_PER_AXIS: u32 = 16;

/// A rectangular region of the image to render.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Block {
    /// X coordinate of the block's top-left corner
    pub x: u32,
    /// Y coordinate of the block's top-left corner
    pub y: u32,
    /// Width of the block in pixels
    pub width: u32,
    /// Height of the block in pixels
    pub height: u32,
    /// Index of this block in the grid, row-major
    pub index: u32,
}

impl Block {
    /// Get the total number of pixels in this block.
    pub fn pixel_count(&self) -> u32 {
        self.width * self.height
    }
}

/// Block layout of one image.
///
/// The last column and row absorb the remainder when the image size isn't a
/// multiple of the grid, so every pixel belongs to exactly one block.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BlockGrid {
    width: u32,
    height: u32,
    columns: u32,
    rows: u32,
    block_width: u32,
    block_height: u32,
}

impl BlockGrid {
    /// Lay out blocks over a `width` x `height` image.
    pub fn new(width: u32, height: u32) -> Self {
        let columns = BLOCKS_PER_AXIS.min(width).max(1);
        let rows = BLOCKS_PER_AXIS.min(height).max(1);
        Self {
            width,
            height,
            columns,
            rows,
            block_width: width / columns,
            block_height: height / rows,
        }
    }

    /// Number of distinct blocks.
    pub fn domain_size(&self) -> u32 {
        self.columns * self.rows
    }

    pub fn block_width(&self) -> u32 {
        self.block_width
    }

    pub fn block_height(&self) -> u32 {
        self.block_height
    }

    /// The block at grid position `index`, `None` past the end of the grid.
    pub fn block(&self, index: u32) -> Option<Block> {
        if index >= self.domain_size() {
            return None;
        }
        let column = index % self.columns;
        let row = index / self.columns;
        let x = column * self.block_width;
        let y = row * self.block_height;
        let width = if column + 1 == self.columns { self.width - x } else { self.block_width };
        let height = if row + 1 == self.rows { self.height - y } else { self.block_height };
        Some(Block {
            x,
            y,
            width,
            height,
            index,
        })
    }

    /// Map a value from [`block_order`] to its block.
    ///
    /// Values that land outside a grid smaller than the full
    /// `NUMBER_OF_BLOCKS` yield `None`.
    pub fn block_for_selector(&self, selector: f32) -> Option<Block> {
        let index = (selector * NUMBER_OF_BLOCKS as f32).round() as u32;
        self.block(index)
    }

    /// Iterate over every block in row-major order.
    pub fn blocks(&self) -> impl Iterator<Item = Block> + '_ {
        (0..self.domain_size()).filter_map(|index| self.block(index))
    }
}

/// Shuffled base-2 Halton values, one per block claim of a pass.
///
/// Built once per process. Each value times `NUMBER_OF_BLOCKS` is a distinct
/// integer, so a pass visits every block id exactly once.
pub fn block_order() -> &'static [f32] {
    static ORDER: OnceLock<Vec<f32>> = OnceLock::new();
    ORDER.get_or_init(|| {
        let mut order: Vec<f32> = (0..NUMBER_OF_BLOCKS).map(|i| halton_sequence(i, 2)).collect();
        order.shuffle(&mut rand::thread_rng());
        log::debug!("Built block order with {} entries", order.len());
        order
    })
}
