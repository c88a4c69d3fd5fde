//! Naive parallel matrix multiply, benchmarked against a blocked GEMM.
//!
//! One benchmark run generates two random `n × n` matrices, multiplies them
//! with the cache-blocked reference ([`dgemm`]) and with the hand-written
//! tiled kernel ([`naive_gemm`]), times both, and checks that they agree.
//!
//! ## Usage
//!
//! ```
//! use gemmbench::{BenchConfig, Harness, TileDim, Verdict};
//!
//! let config = BenchConfig {
//!     size: 100,
//!     tile: TileDim::square(16),
//!     ..BenchConfig::default()
//! };
//! let mut out = Vec::new();
//! let report = Harness::new(config).unwrap().run(&mut out).unwrap();
//! assert_eq!(report.verdict(), Verdict::Pass);
//! ```
//!
//! The kernels can be called directly too. Matrices are column-major and
//! square; the naive kernel runs on any [`dispatch::Dispatch`] backend:
//!
//! ```
//! use gemmbench::{Matrix, naive_gemm, TileDim};
//! use gemmbench::dispatch::Serial;
//!
//! let a = Matrix::from_row_major(2, &[1.0, 2.0, 3.0, 4.0]).unwrap();
//! let b = Matrix::from_row_major(2, &[5.0, 6.0, 7.0, 8.0]).unwrap();
//! let mut c = Matrix::zeros(2).unwrap();
//!
//! naive_gemm(&Serial, &a, &b, &mut c, TileDim::square(16)).unwrap();
//! assert_eq!(c[(1, 0)], 43.0);
//! ```
//!
//! ## What's inside
//!
//! - Column-major [`Matrix`] with a single addressing rule
//! - Tiled parallel-for with explicit bounds guard (serial or rayon backend)
//! - 4×4 AVX2 microkernel with cache blocking for the reference
//! - Sum-of-squares verification and a fixed-format report

pub mod blocked;
pub mod config;
pub mod dispatch;
pub mod error;
pub mod harness;
pub mod kernels;
pub mod matrix;
pub mod naive;

pub use blocked::dgemm;
pub use config::BenchConfig;
pub use dispatch::TileDim;
pub use error::{BenchError, Result};
pub use harness::Harness;
pub use harness::verify::Verdict;
pub use matrix::Matrix;
pub use matrix::generate::MatrixGenerator;
pub use naive::naive_gemm;
