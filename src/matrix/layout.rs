//! Column-major addressing for square matrices.
//!
//! Every producer and consumer of a [`Matrix`](super::Matrix) goes through
//! [`offset`], so generation, both multiply kernels and the verifier agree on
//! where `(row, col)` lives.

/// Linear offset of `(row, col)` in an `n × n` column-major buffer.
#[inline(always)]
pub fn offset(n: usize, row: usize, col: usize) -> usize {
    col * n + row
}

/// Inverse of [`offset`].
#[inline]
pub fn position(n: usize, offset: usize) -> (usize, usize) {
    (offset % n, offset / n)
}

/// Reorder an `n × n` row-major buffer into column-major storage.
///
/// Row-major and column-major layouts of the same square matrix are each
/// other's transpose, so this is a plain transpose copy.
///
/// ```
/// use gemmbench::matrix::layout::row_major_to_column_major;
///
/// let rows = [1.0, 2.0,
///             3.0, 4.0];
/// let mut cols = [0.0; 4];
/// row_major_to_column_major(&rows, &mut cols, 2);
/// assert_eq!(cols, [1.0, 3.0, 2.0, 4.0]);
/// ```
pub fn row_major_to_column_major(src: &[f64], dst: &mut [f64], n: usize) {
    debug_assert_eq!(src.len(), n * n);
    debug_assert_eq!(dst.len(), n * n);
    for row in 0..n {
        for col in 0..n {
            dst[offset(n, row, col)] = src[row * n + col];
        }
    }
}

/// Reorder an `n × n` column-major buffer into row-major storage.
pub fn column_major_to_row_major(src: &[f64], dst: &mut [f64], n: usize) {
    debug_assert_eq!(src.len(), n * n);
    debug_assert_eq!(dst.len(), n * n);
    for col in 0..n {
        for row in 0..n {
            dst[row * n + col] = src[offset(n, row, col)];
        }
    }
}
