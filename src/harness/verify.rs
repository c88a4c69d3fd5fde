//! Aggregate agreement check between two results.

use std::fmt;

use crate::error::Result;
use crate::matrix::Matrix;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Verdict {
    Pass,
    Fail,
}

impl fmt::Display for Verdict {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Pass => f.write_str("PASS"),
            Self::Fail => f.write_str("FAIL"),
        }
    }
}

/// Sum over all elements of `(expected - actual)²`.
///
/// ```
/// use gemmbench::Matrix;
/// use gemmbench::harness::verify::residual;
///
/// let x = Matrix::from_row_major(2, &[1.0, 2.0, 3.0, 4.0]).unwrap();
/// let y = Matrix::from_row_major(2, &[1.0, 2.0, 3.0, 6.0]).unwrap();
/// assert_eq!(residual(&x, &y).unwrap(), 4.0);
/// ```
pub fn residual(expected: &Matrix, actual: &Matrix) -> Result<f64> {
    actual.expect_size("residual", expected.size())?;
    Ok(expected
        .as_slice()
        .iter()
        .zip(actual.as_slice())
        .map(|(x, y)| (x - y) * (x - y))
        .sum())
}

/// FAIL only when the residual is strictly above `threshold`.
///
/// A residual that is not a number also fails: NaN compares false against
/// everything and would otherwise pass.
pub fn classify(residual: f64, threshold: f64) -> Verdict {
    if residual > threshold || residual.is_nan() {
        Verdict::Fail
    } else {
        Verdict::Pass
    }
}
