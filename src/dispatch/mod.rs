//! Parallel-for over a tiled 2D index space.
//!
//! A kernel is a closure run once per [`WorkItem`]. The grid is made of
//! `ceil(n / tile)` blocks along each axis, so when `n` is not a multiple of
//! the tile the last blocks hang over the edge and yield items with
//! `row >= n` or `col >= n`. Kernels must guard against those.
//!
//! Backends:
//! - [`Serial`]: runs every block on the calling thread
//! - [`Device`]: runs blocks on a rayon thread pool

mod device;

pub use device::Device;

use std::panic::{self, AssertUnwindSafe};

use crate::error::{BenchError, Result};

/// Work-item tile: how many rows and columns of the output one block covers.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TileDim {
    pub rows: usize,
    pub cols: usize,
}

impl TileDim {
    pub fn square(side: usize) -> Self {
        Self {
            rows: side,
            cols: side,
        }
    }

    pub fn validate(&self) -> Result<()> {
        if self.rows == 0 || self.cols == 0 {
            return Err(BenchError::InvalidTile {
                rows: self.rows,
                cols: self.cols,
            });
        }
        Ok(())
    }

    pub fn area(&self) -> usize {
        self.rows * self.cols
    }
}

/// Global position of one unit of work.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct WorkItem {
    pub row: usize,
    pub col: usize,
}

/// Blocks of [`TileDim`] covering an `n × n` output.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LaunchGrid {
    tile: TileDim,
    block_rows: usize,
    block_cols: usize,
}

impl LaunchGrid {
    /// Smallest grid of whole tiles that covers `n × n`.
    ///
    /// ```
    /// use gemmbench::dispatch::{LaunchGrid, TileDim};
    ///
    /// let grid = LaunchGrid::covering(1000, TileDim::square(16)).unwrap();
    /// assert_eq!(grid.blocks(), (63, 63));
    /// assert_eq!(grid.extent(), (1008, 1008));
    /// ```
    pub fn covering(n: usize, tile: TileDim) -> Result<Self> {
        if n == 0 {
            return Err(BenchError::InvalidSize(n));
        }
        tile.validate()?;
        let grid = Self {
            tile,
            block_rows: n.div_ceil(tile.rows),
            block_cols: n.div_ceil(tile.cols),
        };
        let fits = grid
            .block_rows
            .checked_mul(grid.block_cols)
            .and_then(|blocks| blocks.checked_mul(tile.area()))
            .is_some();
        if !fits {
            return Err(BenchError::Dispatch {
                op: "grid",
                reason: format!("{n}x{n} with {}x{} tiles overflows the index space", tile.rows, tile.cols),
            });
        }
        Ok(grid)
    }

    pub fn tile(&self) -> TileDim {
        self.tile
    }

    /// Blocks along (rows, cols).
    pub fn blocks(&self) -> (usize, usize) {
        (self.block_rows, self.block_cols)
    }

    pub fn block_count(&self) -> usize {
        self.block_rows * self.block_cols
    }

    /// Rows and columns spanned by the whole grid, including overhang.
    pub fn extent(&self) -> (usize, usize) {
        (self.block_rows * self.tile.rows, self.block_cols * self.tile.cols)
    }

    pub fn unit_count(&self) -> usize {
        self.block_count() * self.tile.area()
    }

    /// Run `unit` for every item of block `block`.
    ///
    /// Blocks are numbered column-major, and items inside a block walk down
    /// a column first, so consecutive items touch consecutive rows.
    pub fn run_block(&self, block: usize, unit: &(dyn Fn(WorkItem) + Sync)) {
        debug_assert!(block < self.block_count());
        let row0 = (block % self.block_rows) * self.tile.rows;
        let col0 = (block / self.block_rows) * self.tile.cols;
        for tc in 0..self.tile.cols {
            for tr in 0..self.tile.rows {
                unit(WorkItem {
                    row: row0 + tr,
                    col: col0 + tc,
                });
            }
        }
    }
}

/// Something that can run a kernel over a [`LaunchGrid`] and wait for it.
pub trait Dispatch {
    /// Run `unit` once for every item of `grid`. Returns after all items
    /// have finished. `op` names the kernel in errors.
    fn launch(&self, op: &'static str, grid: &LaunchGrid, unit: &(dyn Fn(WorkItem) + Sync)) -> Result<()>;

    /// Block until all previously dispatched work is complete.
    fn synchronize(&self) -> Result<()>;
}

/// Runs every block in order on the calling thread.
#[derive(Debug, Default, Clone, Copy)]
pub struct Serial;

impl Dispatch for Serial {
    fn launch(&self, op: &'static str, grid: &LaunchGrid, unit: &(dyn Fn(WorkItem) + Sync)) -> Result<()> {
        catch_launch(op, || {
            for block in 0..grid.block_count() {
                grid.run_block(block, unit);
            }
        })
    }

    fn synchronize(&self) -> Result<()> {
        Ok(())
    }
}

/// A panicking kernel is a failed launch, not a crashed benchmark.
pub(crate) fn catch_launch<R>(op: &'static str, f: impl FnOnce() -> R) -> Result<R> {
    panic::catch_unwind(AssertUnwindSafe(f)).map_err(|payload| {
        let reason = payload
            .downcast_ref::<&str>()
            .map(|s| s.to_string())
            .or_else(|| payload.downcast_ref::<String>().cloned())
            .unwrap_or_else(|| "kernel panicked".to_string());
        BenchError::Dispatch { op, reason }
    })
}
