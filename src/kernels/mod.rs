//! SIMD microkernels for the inner loop of the reference GEMM.
//!
//! The kernel computes a small tile of A × B from packed panels. It is
//! called by the blocked GEMM in [`crate::blocked`] after packing.
//!
//! Available kernels:
//! - `kernel_4x4`: 4×4 tile, AVX2 + FMA (4 registers), scalar fallback

pub mod kernel_4x4;
