//! Benchmark parameters.
//!
//! The defaults are the fixed benchmark constants; the binary only exposes
//! them as flags so a run can be repeated at other sizes.

use crate::dispatch::TileDim;
use crate::error::{BenchError, Result};

pub const DEFAULT_SIZE: usize = 1024;
pub const DEFAULT_TILE: usize = 16;
pub const DEFAULT_SEED: u64 = 0x5EED;

/// Aggregate sum-of-squares bound for PASS. Absolute, does not scale with n.
pub const RESIDUAL_THRESHOLD: f64 = 10.0;

#[derive(Debug, Clone, PartialEq)]
pub struct BenchConfig {
    /// Side length of every matrix.
    pub size: usize,
    /// Work-item tile used by the naive kernel.
    pub tile: TileDim,
    /// Seed for the input generator.
    pub seed: u64,
    /// Worker threads, `None` lets rayon pick.
    pub threads: Option<usize>,
}

impl Default for BenchConfig {
    fn default() -> Self {
        Self {
            size: DEFAULT_SIZE,
            tile: TileDim::square(DEFAULT_TILE),
            seed: DEFAULT_SEED,
            threads: None,
        }
    }
}

impl BenchConfig {
    pub fn validate(&self) -> Result<()> {
        if self.size == 0 {
            return Err(BenchError::InvalidSize(self.size));
        }
        self.tile.validate()?;
        if self.threads == Some(0) {
            return Err(BenchError::DeviceInit("thread count must be positive".to_string()));
        }
        Ok(())
    }

    /// Host memory for A, B and one result, in megabytes (1e6 bytes).
    pub fn memory_mb(&self) -> f64 {
        3.0 * (self.size as f64).powi(2) * size_of::<f64>() as f64 / 1e6
    }
}
