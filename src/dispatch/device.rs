//! The compute device: a dedicated rayon pool plus its buffers.

use log::debug;
use rayon::prelude::*;
use rayon::{ThreadPool, ThreadPoolBuilder};

use super::{Dispatch, LaunchGrid, WorkItem, catch_launch};
use crate::error::{BenchError, Result};
use crate::matrix::Matrix;

/// Owns the worker pool for one benchmark run. Dropping it joins the
/// workers, so every exit path releases them.
pub struct Device {
    pool: ThreadPool,
}

impl Device {
    /// Start a pool with `threads` workers, or rayon's default when `None`.
    pub fn new(threads: Option<usize>) -> Result<Self> {
        let pool = ThreadPoolBuilder::new()
            .num_threads(threads.unwrap_or(0))
            .thread_name(|i| format!("gemm-worker-{i}"))
            .build()
            .map_err(|e| BenchError::DeviceInit(e.to_string()))?;
        debug!("device up with {} workers", pool.current_num_threads());
        Ok(Self { pool })
    }

    pub fn threads(&self) -> usize {
        self.pool.current_num_threads()
    }

    /// Run `f` inside the pool so rayon iterators in it use these workers.
    pub fn install<R: Send>(&self, f: impl FnOnce() -> R + Send) -> R {
        self.pool.install(f)
    }

    /// Copy a host matrix into a fresh device-side buffer.
    pub fn upload(&self, host: &Matrix) -> Result<Matrix> {
        let mut buffer = Matrix::zeros(host.size())?;
        buffer.as_mut_slice().copy_from_slice(host.as_slice());
        Ok(buffer)
    }

    /// Copy a device buffer back into a host matrix of the same size.
    pub fn download(&self, device: &Matrix, host: &mut Matrix) -> Result<()> {
        if device.size() != host.size() {
            return Err(BenchError::Transfer {
                op: "download",
                reason: format!("device buffer is {0}x{0}, host is {1}x{1}", device.size(), host.size()),
            });
        }
        host.as_mut_slice().copy_from_slice(device.as_slice());
        Ok(())
    }
}

impl Dispatch for Device {
    fn launch(&self, op: &'static str, grid: &LaunchGrid, unit: &(dyn Fn(WorkItem) + Sync)) -> Result<()> {
        catch_launch(op, || {
            self.pool.install(|| {
                (0..grid.block_count())
                    .into_par_iter()
                    .for_each(|block| grid.run_block(block, unit))
            })
        })
    }

    fn synchronize(&self) -> Result<()> {
        // `install` only returns once every spawned job has joined.
        Ok(())
    }
}

impl Drop for Device {
    fn drop(&mut self) {
        debug!("releasing device with {} workers", self.pool.current_num_threads());
    }
}
