//! Cache-blocked, multi-threaded DGEMM on column-major matrices.

use log::debug;
use rayon::prelude::*;

use crate::dispatch::{Device, Dispatch, catch_launch};
use crate::error::Result;
use crate::kernels::kernel_4x4::{Isa, MR, NR};
use crate::matrix::{Matrix, layout};

// Cache blocking sizes - KC×MC of A stays in L2, KC×NR of B in L1
const KC: usize = 256;
const MC: usize = 128;
// Columns of C per parallel task. Column panels are contiguous in
// column-major storage, so each task gets a plain disjoint slice.
const NC: usize = 64;

/// General matrix multiply: C = alpha * A * B + beta * C.
///
/// Splits C into column panels and runs them in parallel on `device`.
/// Each panel is computed K-block by K-block: pack a KC×NC slab of B
/// (scaled by alpha), pack MC×KC blocks of A, then run the 4×4
/// microkernel over every tile. Returns once all of C is written.
///
/// With `beta == 0` C is overwritten without being read.
///
/// ```
/// use gemmbench::{Matrix, dgemm};
/// use gemmbench::dispatch::Device;
///
/// let device = Device::new(Some(2)).unwrap();
/// let a = Matrix::from_row_major(2, &[1.0, 2.0, 3.0, 4.0]).unwrap();
/// let b = Matrix::from_row_major(2, &[5.0, 6.0, 7.0, 8.0]).unwrap();
/// let mut c = Matrix::zeros(2).unwrap();
///
/// dgemm(&device, 1.0, &a, &b, 0.0, &mut c).unwrap();
/// assert_eq!(c.to_row_major(), vec![19.0, 22.0, 43.0, 50.0]);
/// ```
pub fn dgemm(device: &Device, alpha: f64, a: &Matrix, b: &Matrix, beta: f64, c: &mut Matrix) -> Result<()> {
    let n = a.size();
    b.expect_size("dgemm B", n)?;
    c.expect_size("dgemm C", n)?;

    let isa = Isa::detect();
    debug!("dgemm n={n} alpha={alpha} beta={beta} kernel={isa:?} workers={}", device.threads());

    let a = a.as_slice();
    let b = b.as_slice();
    let c = c.as_mut_slice();

    catch_launch("dgemm", || {
        device.install(|| {
            c.par_chunks_mut(NC * n)
                .enumerate()
                .for_each(|(panel, c_panel)| {
                    scale(c_panel, beta);
                    if alpha != 0.0 {
                        gemm_panel(isa, alpha, a, b, c_panel, n, panel * NC);
                    }
                })
        })
    })?;
    device.synchronize()
}

fn scale(c: &mut [f64], beta: f64) {
    if beta == 0.0 {
        c.fill(0.0);
    } else if beta != 1.0 {
        c.iter_mut().for_each(|v| *v *= beta);
    }
}

/// Accumulate alpha * A * B[:, j0..j0 + nc] into one column panel of C.
fn gemm_panel(isa: Isa, alpha: f64, a: &[f64], b: &[f64], c_panel: &mut [f64], n: usize, j0: usize) {
    let nc = c_panel.len() / n;

    // Pre-allocate packing buffers once per panel
    let mut a_pack = vec![0.0; MC * KC];
    let mut b_pack = vec![0.0; NC * KC];

    for kk in (0..n).step_by(KC) {
        let kb = KC.min(n - kk);
        pack_b(b, &mut b_pack, n, kk, kb, j0, nc, alpha);

        for ii in (0..n).step_by(MC) {
            let mb = MC.min(n - ii);
            pack_a(a, &mut a_pack, n, ii, mb, kk, kb);

            for jg in (0..nc).step_by(NR) {
                let b_tile = &b_pack[jg * kb..(jg + NR) * kb];
                let cols = NR.min(nc - jg);

                for ig in (0..mb).step_by(MR) {
                    let a_tile = &a_pack[ig * kb..(ig + MR) * kb];
                    let rows = MR.min(mb - ig);

                    let tile = isa.tile(a_tile, b_tile, kb);

                    // Padding lanes computed zeros against zeros; drop them
                    for (j, col) in tile.iter().enumerate().take(cols) {
                        let base = layout::offset(n, ii + ig, jg + j);
                        for (r, &v) in col.iter().enumerate().take(rows) {
                            c_panel[base + r] += v;
                        }
                    }
                }
            }
        }
    }
}

// Pack rows ii..ii+mb, depth kk..kk+kb of A in groups of MR rows:
// each depth step's MR row values sit next to each other. Short groups are
// zero padded.
fn pack_a(a: &[f64], a_pack: &mut [f64], n: usize, ii: usize, mb: usize, kk: usize, kb: usize) {
    for ig in (0..mb).step_by(MR) {
        let rows = MR.min(mb - ig);
        for p in 0..kb {
            let out = &mut a_pack[ig * kb + p * MR..ig * kb + p * MR + MR];
            let src = layout::offset(n, ii + ig, kk + p);
            out[..rows].copy_from_slice(&a[src..src + rows]);
            out[rows..].fill(0.0);
        }
    }
}

// Pack depth kk..kk+kb, columns j0..j0+nc of B in groups of NR columns,
// pre-multiplied by alpha. Short groups are zero padded.
#[allow(clippy::too_many_arguments)]
fn pack_b(b: &[f64], b_pack: &mut [f64], n: usize, kk: usize, kb: usize, j0: usize, nc: usize, alpha: f64) {
    for jg in (0..nc).step_by(NR) {
        for p in 0..kb {
            let out = &mut b_pack[jg * kb + p * NR..jg * kb + p * NR + NR];
            for (jj, slot) in out.iter_mut().enumerate() {
                *slot = if jg + jj < nc {
                    alpha * b[layout::offset(n, kk + p, j0 + jg + jj)]
                } else {
                    0.0
                };
            }
        }
    }
}
