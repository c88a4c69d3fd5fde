//! Square dense matrices and their generation.
//!
//! A [`Matrix`] owns its buffer and fixes the column-major layout at
//! construction. Kernels that want raw slices still address them through
//! [`layout::offset`], never through ad-hoc index arithmetic.

pub mod generate;
pub mod layout;

use std::ops::{Index, IndexMut};

use crate::error::{BenchError, Result};

/// An `n × n` matrix of `f64` in column-major order.
#[derive(Debug, Clone, PartialEq)]
pub struct Matrix {
    n: usize,
    data: Vec<f64>,
}

impl Matrix {
    /// Allocate a zero-filled `n × n` matrix.
    ///
    /// Allocation failure is reported rather than aborting the process, so
    /// the caller can exit with the allocation exit code.
    pub fn zeros(n: usize) -> Result<Self> {
        if n == 0 {
            return Err(BenchError::InvalidSize(n));
        }
        let len = n.checked_mul(n).ok_or(BenchError::Allocation { bytes: usize::MAX })?;
        let bytes = len.saturating_mul(size_of::<f64>());
        let mut data = Vec::new();
        data.try_reserve_exact(len)
            .map_err(|_| BenchError::Allocation { bytes })?;
        data.resize(len, 0.0);
        Ok(Self { n, data })
    }

    /// Build a matrix from row-major values, the way matrices are written
    /// down on paper.
    ///
    /// ```
    /// use gemmbench::Matrix;
    ///
    /// let m = Matrix::from_row_major(2, &[1.0, 2.0, 3.0, 4.0]).unwrap();
    /// assert_eq!(m[(0, 1)], 2.0);
    /// assert_eq!(m.as_slice(), &[1.0, 3.0, 2.0, 4.0]);
    /// ```
    pub fn from_row_major(n: usize, values: &[f64]) -> Result<Self> {
        let mut m = Self::zeros(n)?;
        if values.len() != n * n {
            return Err(BenchError::DimensionMismatch {
                op: "from_row_major",
                expected: n,
                got: values.len().isqrt(),
            });
        }
        layout::row_major_to_column_major(values, &mut m.data, n);
        Ok(m)
    }

    /// Copy out the values in row-major order.
    pub fn to_row_major(&self) -> Vec<f64> {
        let mut out = vec![0.0; self.data.len()];
        layout::column_major_to_row_major(&self.data, &mut out, self.n);
        out
    }

    /// Side length.
    pub fn size(&self) -> usize {
        self.n
    }

    /// Number of elements, `n²`.
    pub fn len(&self) -> usize {
        self.data.len()
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    /// Size of the backing buffer in bytes.
    pub fn bytes(&self) -> usize {
        self.data.len() * size_of::<f64>()
    }

    #[inline(always)]
    pub fn offset(&self, row: usize, col: usize) -> usize {
        layout::offset(self.n, row, col)
    }

    pub fn as_slice(&self) -> &[f64] {
        &self.data
    }

    pub fn as_mut_slice(&mut self) -> &mut [f64] {
        &mut self.data
    }

    pub fn fill(&mut self, value: f64) {
        self.data.fill(value);
    }

    /// Fail with [`BenchError::DimensionMismatch`] unless this matrix has side `n`.
    pub(crate) fn expect_size(&self, op: &'static str, n: usize) -> Result<()> {
        if self.n != n {
            return Err(BenchError::DimensionMismatch {
                op,
                expected: n,
                got: self.n,
            });
        }
        Ok(())
    }
}

impl Index<(usize, usize)> for Matrix {
    type Output = f64;

    #[inline]
    fn index(&self, (row, col): (usize, usize)) -> &f64 {
        assert!(row < self.n && col < self.n, "({row}, {col}) outside {0}x{0}", self.n);
        &self.data[self.offset(row, col)]
    }
}

impl IndexMut<(usize, usize)> for Matrix {
    #[inline]
    fn index_mut(&mut self, (row, col): (usize, usize)) -> &mut f64 {
        assert!(row < self.n && col < self.n, "({row}, {col}) outside {0}x{0}", self.n);
        let offset = self.offset(row, col);
        &mut self.data[offset]
    }
}
