//! Samplers producing values in [0,1) for pixel jitter and light sampling.
//!
//! Values come from precomputed [`SampleTable`]s that are built once and
//! shared read-only through an `Arc`; a sampler only owns an atomic cursor,
//! so one sampler can be used from every render thread at once.

use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Arc;

use lumen_math::halton_sequence;
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::{Rng, SeedableRng};

/// Default number of entries in a sample table.
pub const DEFAULT_TABLE_SIZE: usize = 1 << 16;

/// Seed for shuffling the Halton table, keeps it identical across runs.
const HALTON_SHUFFLE_SEED: u64 = 0x4c75_6d65_6e00_0002;

/// Value returned by samplers after [`Sampler::stop_sampling`].
pub const STOPPED_SAMPLE: f32 = 0.5;

/// Source of sample values in [0,1).
pub trait Sampler: Send + Sync {
    /// Draw the next value.
    fn sample(&self) -> f32;

    /// Re-arm per-frame state.
    fn reset_sampling(&self);

    /// Stop yielding fresh values; later draws return [`STOPPED_SAMPLE`].
    fn stop_sampling(&self);
}

/// Constructs a fresh sampler, handed to loaders for area lights.
pub type SamplerFactory<'a> = dyn Fn() -> Box<dyn Sampler> + 'a;

/// A fixed-size, read-only sequence of values in [0,1).
#[derive(Debug, Clone)]
pub struct SampleTable {
    values: Arc<[f32]>,
}

impl SampleTable {
    /// Base-2 Halton sequence, shuffled with a fixed seed.
    ///
    /// Reproducible bit-for-bit across runs.
    pub fn halton(size: usize) -> Self {
        let mut values = Self::halton_values(size);
        values.shuffle(&mut StdRng::seed_from_u64(HALTON_SHUFFLE_SEED));
        Self::from_values(values)
    }

    /// Values drawn from an entropy-seeded generator. Not reproducible.
    pub fn random(size: usize) -> Self {
        let mut rng = StdRng::from_entropy();
        Self::from_values((0..size.max(1)).map(|_| rng.gen::<f32>()).collect())
    }

    /// Wrap explicit values. An empty list becomes a single 0.5.
    pub fn from_values(values: Vec<f32>) -> Self {
        let values = if values.is_empty() { vec![STOPPED_SAMPLE] } else { values };
        Self {
            values: values.into(),
        }
    }

    fn halton_values(size: usize) -> Vec<f32> {
        (0..size.max(1) as u32).map(|i| halton_sequence(i, 2)).collect()
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Value at `index`, wrapping around the end of the table.
    #[inline]
    pub fn get(&self, index: usize) -> f32 {
        self.values[index % self.values.len()]
    }

    pub fn values(&self) -> &[f32] {
        &self.values
    }
}

/// Sampler reading successive entries of a shared table.
#[derive(Debug)]
pub struct TableSampler {
    table: SampleTable,
    offset: usize,
    cursor: AtomicUsize,
    stopped: AtomicBool,
}

impl TableSampler {
    pub fn new(table: SampleTable) -> Self {
        Self::with_offset(table, 0)
    }

    /// Start reading at `offset`, so several samplers sharing one table
    /// don't produce correlated sequences.
    pub fn with_offset(table: SampleTable, offset: usize) -> Self {
        Self {
            table,
            offset,
            cursor: AtomicUsize::new(0),
            stopped: AtomicBool::new(false),
        }
    }
}

impl Sampler for TableSampler {
    fn sample(&self) -> f32 {
        if self.stopped.load(Ordering::Relaxed) {
            return STOPPED_SAMPLE;
        }
        let index = self.cursor.fetch_add(1, Ordering::Relaxed);
        self.table.get(self.offset.wrapping_add(index))
    }

    fn reset_sampling(&self) {
        self.cursor.store(0, Ordering::Relaxed);
        self.stopped.store(false, Ordering::Relaxed);
    }

    fn stop_sampling(&self) {
        self.stopped.store(true, Ordering::Relaxed);
    }
}

/// Sampler that always returns the same value.
#[derive(Debug, Clone, Copy)]
pub struct ConstantSampler {
    value: f32,
}

impl ConstantSampler {
    pub fn new(value: f32) -> Self {
        Self { value }
    }
}

impl Sampler for ConstantSampler {
    fn sample(&self) -> f32 {
        self.value
    }

    fn reset_sampling(&self) {}

    fn stop_sampling(&self) {}
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_halton_table_is_reproducible() {
        let a = SampleTable::halton(1024);
        let b = SampleTable::halton(1024);
        assert_eq!(a.values(), b.values());
    }

    #[test]
    fn test_halton_table_is_shuffled_permutation() {
        let table = SampleTable::halton(256);
        let mut steps: Vec<u32> = table.values().iter().map(|v| (v * 256.0) as u32).collect();
        assert_ne!(steps, (0..256).map(|i| (halton_sequence(i, 2) * 256.0) as u32).collect::<Vec<_>>());
        steps.sort_unstable();
        assert_eq!(steps, (0..256).collect::<Vec<u32>>());
    }

    #[test]
    fn test_random_table_in_range() {
        let table = SampleTable::random(4096);
        assert_eq!(table.len(), 4096);
        assert!(table.values().iter().all(|v| (0.0..1.0).contains(v)));
    }

    #[test]
    fn test_table_sampler_reset_repeats_sequence() {
        let sampler = TableSampler::new(SampleTable::halton(64));
        let first: Vec<f32> = (0..100).map(|_| sampler.sample()).collect();
        sampler.reset_sampling();
        let second: Vec<f32> = (0..100).map(|_| sampler.sample()).collect();
        assert_eq!(first, second);
    }

    #[test]
    fn test_table_sampler_offset() {
        let table = SampleTable::from_values(vec![0.1, 0.2, 0.3]);
        let sampler = TableSampler::with_offset(table, 2);
        assert_eq!(sampler.sample(), 0.3);
        assert_eq!(sampler.sample(), 0.1);
    }

    #[test]
    fn test_stop_sampling() {
        let sampler = TableSampler::new(SampleTable::from_values(vec![0.1, 0.9]));
        assert_eq!(sampler.sample(), 0.1);
        sampler.stop_sampling();
        assert_eq!(sampler.sample(), STOPPED_SAMPLE);
        assert_eq!(sampler.sample(), STOPPED_SAMPLE);
        sampler.reset_sampling();
        assert_eq!(sampler.sample(), 0.1);
    }

    #[test]
    fn test_constant_sampler() {
        let sampler = ConstantSampler::new(0.25);
        assert_eq!(sampler.sample(), 0.25);
        sampler.stop_sampling();
        assert_eq!(sampler.sample(), 0.25);
    }

    #[test]
    fn test_sampler_shared_across_threads() {
        let sampler = Arc::new(TableSampler::new(SampleTable::halton(1 << 12)));
        std::thread::scope(|s| {
            for _ in 0..4 {
                let sampler = &sampler;
                s.spawn(move || {
                    for _ in 0..256 {
                        let v = sampler.sample();
                        assert!((0.0..1.0).contains(&v));
                    }
                });
            }
        });
    }
}
