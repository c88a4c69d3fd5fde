//! Wall-clock timing of one compute phase.

use std::time::{Duration, Instant};

use log::info;

use crate::dispatch::Dispatch;
use crate::error::Result;

/// Elapsed time of one n×n×n multiply and the throughput it implies.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Timing {
    pub n: usize,
    pub elapsed: Duration,
}

impl Timing {
    pub fn seconds(&self) -> f64 {
        self.elapsed.as_secs_f64()
    }

    /// Multiply-adds in one square multiply, counted as two ops each.
    pub fn flop_count(&self) -> f64 {
        2.0 * (self.n as f64).powi(3)
    }

    pub fn flops(&self) -> f64 {
        self.flop_count() / self.seconds()
    }

    pub fn gflops(&self) -> f64 {
        self.flops() / 1e9
    }
}

/// Time `phase`, synchronizing `dispatch` on both sides so nothing queued
/// before leaks in and nothing launched inside escapes the measurement.
pub fn time_phase<D, T>(dispatch: &D, label: &str, n: usize, phase: impl FnOnce() -> Result<T>) -> Result<(T, Timing)>
where
    D: Dispatch + ?Sized,
{
    dispatch.synchronize()?;
    let start = Instant::now();
    let out = phase()?;
    dispatch.synchronize()?;
    let timing = Timing {
        n,
        elapsed: start.elapsed(),
    };
    info!("{label}: {:.6} s, {:.3} GFlop/s", timing.seconds(), timing.gflops());
    Ok((out, timing))
}
