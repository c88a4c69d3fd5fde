//! 4×4 microkernel for the reference GEMM.
//!
//! Computes one 4×4 tile of A_packed × B_packed into a local accumulator.
//! A is packed as `k` groups of 4 consecutive rows, B as `k` groups of 4
//! consecutive columns. The caller adds the tile into C, which keeps edge
//! tiles (zero-padded in the packs) out of the SIMD code entirely.

/// Rows of C per tile.
pub const MR: usize = 4;
/// Columns of C per tile.
pub const NR: usize = 4;

/// Accumulated tile, indexed `[col][row]` to match column-major C.
pub type Tile = [[f64; MR]; NR];

/// Instruction set chosen for the microkernel.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Isa {
    Avx2Fma,
    Scalar,
}

impl Isa {
    /// Pick the fastest kernel this CPU supports.
    pub fn detect() -> Self {
        #[cfg(target_arch = "x86_64")]
        {
            if is_x86_feature_detected!("avx2") && is_x86_feature_detected!("fma") {
                return Self::Avx2Fma;
            }
        }
        Self::Scalar
    }

    /// Run the microkernel over `k` packed steps.
    ///
    /// # Panics
    ///
    /// Panics if either pack holds fewer than `4 * k` values.
    #[inline]
    pub fn tile(self, a_pack: &[f64], b_pack: &[f64], k: usize) -> Tile {
        assert!(a_pack.len() >= MR * k && b_pack.len() >= NR * k, "packed panel shorter than k={k}");
        match self {
            #[cfg(target_arch = "x86_64")]
            Self::Avx2Fma if is_x86_feature_detected!("avx2") && is_x86_feature_detected!("fma") => {
                // SAFETY: features checked above, pack lengths asserted.
                unsafe { kernel_4x4_avx2(a_pack.as_ptr(), b_pack.as_ptr(), k) }
            }
            _ => kernel_4x4_scalar(a_pack, b_pack, k),
        }
    }
}

/// Portable fallback, same arithmetic order as the AVX2 path minus FMA.
pub fn kernel_4x4_scalar(a_pack: &[f64], b_pack: &[f64], k: usize) -> Tile {
    let mut acc = [[0.0; MR]; NR];
    for p in 0..k {
        let a = &a_pack[p * MR..p * MR + MR];
        let b = &b_pack[p * NR..p * NR + NR];
        for (col, &b_val) in acc.iter_mut().zip(b) {
            for (c, &a_val) in col.iter_mut().zip(a) {
                *c += a_val * b_val;
            }
        }
    }
    acc
}

/// AVX2 tile: one register per column of C. Each step loads 4 rows of A,
/// broadcasts the 4 B values and FMAs them in.
///
/// # Safety
///
/// - CPU supports AVX2 and FMA
/// - `a_pack` and `b_pack` each point to `4 * k` readable f64 values
#[cfg(target_arch = "x86_64")]
#[target_feature(enable = "avx2,fma")]
#[allow(unsafe_op_in_unsafe_fn)]
#[allow(clippy::identity_op)]
pub unsafe fn kernel_4x4_avx2(a_pack: *const f64, b_pack: *const f64, k: usize) -> Tile {
    use std::arch::x86_64::*;

    let mut c0 = _mm256_setzero_pd();
    let mut c1 = _mm256_setzero_pd();
    let mut c2 = _mm256_setzero_pd();
    let mut c3 = _mm256_setzero_pd();

    for p in 0..k {
        let a_vec = _mm256_loadu_pd(a_pack.add(p * MR));

        let b0 = _mm256_broadcast_sd(&*b_pack.add(p * NR + 0));
        let b1 = _mm256_broadcast_sd(&*b_pack.add(p * NR + 1));
        let b2 = _mm256_broadcast_sd(&*b_pack.add(p * NR + 2));
        let b3 = _mm256_broadcast_sd(&*b_pack.add(p * NR + 3));

        c0 = _mm256_fmadd_pd(a_vec, b0, c0);
        c1 = _mm256_fmadd_pd(a_vec, b1, c1);
        c2 = _mm256_fmadd_pd(a_vec, b2, c2);
        c3 = _mm256_fmadd_pd(a_vec, b3, c3);
    }

    let mut out = [[0.0; MR]; NR];
    _mm256_storeu_pd(out[0].as_mut_ptr(), c0);
    _mm256_storeu_pd(out[1].as_mut_ptr(), c1);
    _mm256_storeu_pd(out[2].as_mut_ptr(), c2);
    _mm256_storeu_pd(out[3].as_mut_ptr(), c3);
    out
}
