//! Cache-blocked GEMM, the trusted reference the naive kernel is measured
//! against.
//!
//! The multiply is broken into tiles that fit in L1/L2 cache, the inputs
//! are packed for sequential access, and the microkernels in
//! [`crate::kernels`] do the inner computation.
//!
//! Available implementations:
//! - `dgemm`: 4×4 kernel, parallel over column panels of C

pub mod dgemm;

pub use dgemm::dgemm;
