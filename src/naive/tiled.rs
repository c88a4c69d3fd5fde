//! One work item per output element, dispatched in tiles.

use crate::dispatch::{Dispatch, LaunchGrid, TileDim, WorkItem};
use crate::error::Result;
use crate::matrix::{Matrix, layout};

/// Shared handle to the output buffer for concurrent, disjoint writes.
struct OutputCells {
    ptr: *mut f64,
    len: usize,
}

// SAFETY: each in-range work item writes the one offset its (row, col) maps
// to, and the column-major offset is a bijection, so no two items share a
// cell. Out-of-range items never write.
unsafe impl Send for OutputCells {}
unsafe impl Sync for OutputCells {}

impl OutputCells {
    fn new(c: &mut [f64]) -> Self {
        Self {
            ptr: c.as_mut_ptr(),
            len: c.len(),
        }
    }

    /// # Safety
    ///
    /// `offset < len`, and no other thread touches `offset` during the launch.
    #[inline(always)]
    unsafe fn write(&self, offset: usize, value: f64) {
        debug_assert!(offset < self.len);
        unsafe { *self.ptr.add(offset) = value };
    }
}

/// Naive parallel multiply: C = A * B.
///
/// The `n × n` output is covered by a grid of `tile` blocks. Every item in
/// range computes the dot product of row `row` of A and column `col` of B
/// into a local accumulator, `k` ascending from 0, and stores it to C once.
/// Items that fall outside the matrix neither read nor write.
///
/// No register or cache blocking: this is the performance floor the
/// reference GEMM is measured against.
///
/// ```
/// use gemmbench::{Matrix, naive_gemm};
/// use gemmbench::dispatch::{Serial, TileDim};
///
/// let a = Matrix::from_row_major(2, &[1.0, 2.0, 3.0, 4.0]).unwrap();
/// let b = Matrix::from_row_major(2, &[5.0, 6.0, 7.0, 8.0]).unwrap();
/// let mut c = Matrix::zeros(2).unwrap();
///
/// naive_gemm(&Serial, &a, &b, &mut c, TileDim::square(16)).unwrap();
/// assert_eq!(c.to_row_major(), vec![19.0, 22.0, 43.0, 50.0]);
/// ```
pub fn naive_gemm<D>(dispatch: &D, a: &Matrix, b: &Matrix, c: &mut Matrix, tile: TileDim) -> Result<()>
where
    D: Dispatch + ?Sized,
{
    let n = a.size();
    b.expect_size("naive B", n)?;
    c.expect_size("naive C", n)?;

    let grid = LaunchGrid::covering(n, tile)?;
    let a = a.as_slice();
    let b = b.as_slice();
    let out = OutputCells::new(c.as_mut_slice());

    dispatch.launch("naive", &grid, &|WorkItem { row, col }| {
        if row < n && col < n {
            let acc = dot(a, b, n, row, col);
            // SAFETY: bounds checked above; (row, col) is unique to this item.
            unsafe { out.write(layout::offset(n, row, col), acc) };
        }
    })?;
    dispatch.synchronize()
}

/// Row `row` of A against column `col` of B, both column-major.
#[inline(always)]
fn dot(a: &[f64], b: &[f64], n: usize, row: usize, col: usize) -> f64 {
    let mut acc = 0.0;
    for k in 0..n {
        acc += a[layout::offset(n, row, k)] * b[layout::offset(n, k, col)];
    }
    acc
}
