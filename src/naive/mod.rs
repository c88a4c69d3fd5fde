//! The hand-written multiply the benchmark exists to measure.
//!
//! `tiled` maps one work item to each output element and leaves all the
//! parallelism to the [`Dispatch`](crate::dispatch::Dispatch) backend.

pub mod tiled;

pub use tiled::naive_gemm;
