//! Error type shared by every stage of a benchmark run.

use thiserror::Error;

/// Exit code for host allocation failure.
pub const ALLOCATION_EXIT_CODE: i32 = 911;

#[derive(Debug, Error)]
pub enum BenchError {
    #[error("matrix size must be positive, got {0}")]
    InvalidSize(usize),

    #[error("tile dimensions must be positive, got {rows}x{cols}")]
    InvalidTile { rows: usize, cols: usize },

    #[error("{op}: expected {expected}x{expected} matrix, got {got}x{got}")]
    DimensionMismatch {
        op: &'static str,
        expected: usize,
        got: usize,
    },

    #[error("failed to allocate {bytes} bytes of host memory")]
    Allocation { bytes: usize },

    #[error("device initialization failed: {0}")]
    DeviceInit(String),

    #[error("{op} dispatch failed: {reason}")]
    Dispatch { op: &'static str, reason: String },

    #[error("{op} transfer failed: {reason}")]
    Transfer { op: &'static str, reason: String },

    #[error("failed to write report: {0}")]
    Io(#[from] std::io::Error),
}

impl BenchError {
    /// Process exit code for a run that aborted with this error.
    pub fn exit_code(&self) -> i32 {
        match self {
            Self::Allocation { .. } => ALLOCATION_EXIT_CODE,
            _ => 1,
        }
    }
}

pub type Result<T> = std::result::Result<T, BenchError>;
