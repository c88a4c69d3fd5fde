use std::sync::atomic::{AtomicUsize, Ordering};

use gemmbench::dispatch::{Device, Dispatch, LaunchGrid, Serial, WorkItem};
use gemmbench::harness::verify::{classify, residual};
use gemmbench::{BenchError, Matrix, MatrixGenerator, TileDim, Verdict, dgemm, naive_gemm};
use proptest::prelude::*;

fn assert_matrices_close(expected: &Matrix, actual: &Matrix, name: &str) {
    assert_eq!(expected.size(), actual.size(), "{}: size mismatch", name);
    for (i, (x, y)) in expected.as_slice().iter().zip(actual.as_slice()).enumerate() {
        assert!(
            (x - y).abs() <= 1e-9 * x.abs().max(1.0),
            "{}: mismatch at index {}: expected {}, got {}",
            name,
            i,
            x,
            y
        );
    }
}

fn random_pair(n: usize, seed: u64) -> (Matrix, Matrix) {
    let mut generator = MatrixGenerator::new(seed);
    (generator.generate(n).unwrap(), generator.generate(n).unwrap())
}

fn reference(device: &Device, a: &Matrix, b: &Matrix) -> Matrix {
    let mut c = Matrix::zeros(a.size()).unwrap();
    dgemm(device, 1.0, a, b, 0.0, &mut c).unwrap();
    c
}

fn naive<D: Dispatch>(dispatch: &D, a: &Matrix, b: &Matrix, tile: TileDim) -> Matrix {
    let mut c = Matrix::zeros(a.size()).unwrap();
    c.fill(f64::NAN);
    naive_gemm(dispatch, a, b, &mut c, tile).unwrap();
    c
}

// ============================================================
// Fixed scenarios
// ============================================================

#[test]
fn test_2x2_both_kernels_exact() {
    let device = Device::new(Some(2)).unwrap();
    let a = Matrix::from_row_major(2, &[1.0, 2.0, 3.0, 4.0]).unwrap();
    let b = Matrix::from_row_major(2, &[5.0, 6.0, 7.0, 8.0]).unwrap();

    let c_ref = reference(&device, &a, &b);
    let c_naive = naive(&device, &a, &b, TileDim::square(16));

    assert_eq!(c_ref.to_row_major(), vec![19.0, 22.0, 43.0, 50.0]);
    assert_eq!(c_naive.to_row_major(), vec![19.0, 22.0, 43.0, 50.0]);
    let r = residual(&c_ref, &c_naive).unwrap();
    assert_eq!(r, 0.0);
    assert_eq!(classify(r, 10.0), Verdict::Pass);
}

#[test]
fn test_zero_a_gives_zero_c() {
    let device = Device::new(Some(2)).unwrap();
    let a = Matrix::zeros(19).unwrap();
    let (_, b) = random_pair(19, 3);

    let c_ref = reference(&device, &a, &b);
    let c_naive = naive(&device, &a, &b, TileDim::square(16));

    assert!(c_ref.as_slice().iter().all(|&v| v == 0.0));
    assert!(c_naive.as_slice().iter().all(|&v| v == 0.0));
    assert_eq!(residual(&c_ref, &c_naive).unwrap(), 0.0);
}

#[test]
fn test_1x1_scalar_product() {
    let device = Device::new(Some(1)).unwrap();
    let a = Matrix::from_row_major(1, &[0.75]).unwrap();
    let b = Matrix::from_row_major(1, &[4.0]).unwrap();

    assert_eq!(reference(&device, &a, &b).as_slice(), &[3.0]);
    assert_eq!(naive(&Serial, &a, &b, TileDim::square(16)).as_slice(), &[3.0]);
}

#[test]
fn test_identity_leaves_b_unchanged() {
    let n = 23;
    let mut identity = Matrix::zeros(n).unwrap();
    for i in 0..n {
        identity[(i, i)] = 1.0;
    }
    let (_, b) = random_pair(n, 11);

    let c = naive(&Serial, &identity, &b, TileDim { rows: 8, cols: 4 });
    assert_eq!(c, b);
}

// ============================================================
// Tile boundary tests
// ============================================================

#[test]
fn test_tile_boundaries_match_reference() {
    let device = Device::new(Some(4)).unwrap();
    let sizes = [1, 2, 15, 16, 17, 31, 33, 64, 65, 100];
    let tiles = [
        TileDim::square(16),
        TileDim::square(1),
        TileDim { rows: 4, cols: 3 },
        TileDim { rows: 32, cols: 8 },
    ];

    for n in sizes {
        let (a, b) = random_pair(n, n as u64);
        let c_ref = reference(&device, &a, &b);
        for tile in tiles {
            let c_naive = naive(&device, &a, &b, tile);
            assert_matrices_close(&c_ref, &c_naive, &format!("n={} tile={}x{}", n, tile.rows, tile.cols));
        }
    }
}

#[test]
fn test_serial_and_device_agree_bit_for_bit() {
    let device = Device::new(Some(4)).unwrap();
    let (a, b) = random_pair(45, 8);
    let tile = TileDim::square(16);
    // same accumulation order per element regardless of scheduling
    assert_eq!(naive(&Serial, &a, &b, tile), naive(&device, &a, &b, tile));
}

/// Wraps a backend and counts which work items reach the kernel.
struct Recording<'a, D> {
    inner: &'a D,
    n: usize,
    hits: Vec<AtomicUsize>,
    outside: AtomicUsize,
}

impl<'a, D: Dispatch> Recording<'a, D> {
    fn new(inner: &'a D, n: usize) -> Self {
        Self {
            inner,
            n,
            hits: (0..n * n).map(|_| AtomicUsize::new(0)).collect(),
            outside: AtomicUsize::new(0),
        }
    }
}

impl<D: Dispatch + Sync> Dispatch for Recording<'_, D> {
    fn launch(&self, op: &'static str, grid: &LaunchGrid, unit: &(dyn Fn(WorkItem) + Sync)) -> gemmbench::Result<()> {
        self.inner.launch(op, grid, &|item: WorkItem| {
            if item.row < self.n && item.col < self.n {
                self.hits[item.col * self.n + item.row].fetch_add(1, Ordering::Relaxed);
            } else {
                self.outside.fetch_add(1, Ordering::Relaxed);
            }
            unit(item)
        })
    }

    fn synchronize(&self) -> gemmbench::Result<()> {
        self.inner.synchronize()
    }
}

#[test]
fn test_ragged_grid_computes_each_element_once() {
    let device = Device::new(Some(4)).unwrap();
    let n = 100;
    let tile = TileDim::square(16);
    let (a, b) = random_pair(n, 5);

    let recording = Recording::new(&device, n);
    let c = naive(&recording, &a, &b, tile);

    assert!(recording.hits.iter().all(|h| h.load(Ordering::Relaxed) == 1));
    // 112×112 launched, 100×100 in range
    assert_eq!(recording.outside.load(Ordering::Relaxed), 112 * 112 - 100 * 100);
    // poisoned output: any cell skipped would still be NaN
    assert!(c.as_slice().iter().all(|v| v.is_finite()));
    assert_matrices_close(&reference(&device, &a, &b), &c, "ragged n=100");
}

#[test]
fn test_n1000_tile16_grid_covers_every_element_once() {
    let n = 1000;
    let grid = LaunchGrid::covering(n, TileDim::square(16)).unwrap();
    let hits: Vec<AtomicUsize> = (0..n * n).map(|_| AtomicUsize::new(0)).collect();
    let outside = AtomicUsize::new(0);
    let device = Device::new(None).unwrap();

    device
        .launch("cover", &grid, &|WorkItem { row, col }| {
            if row < n && col < n {
                hits[col * n + row].fetch_add(1, Ordering::Relaxed);
            } else {
                outside.fetch_add(1, Ordering::Relaxed);
            }
        })
        .unwrap();

    assert!(hits.iter().all(|h| h.load(Ordering::Relaxed) == 1));
    assert_eq!(outside.into_inner(), 1008 * 1008 - 1000 * 1000);
}

#[test]
fn test_size_mismatch_is_rejected() {
    let device = Device::new(Some(1)).unwrap();
    let a = Matrix::zeros(4).unwrap();
    let b = Matrix::zeros(5).unwrap();
    let mut c = Matrix::zeros(4).unwrap();

    assert!(matches!(
        dgemm(&device, 1.0, &a, &b, 0.0, &mut c),
        Err(BenchError::DimensionMismatch { .. })
    ));
    assert!(matches!(
        naive_gemm(&device, &a, &b, &mut c, TileDim::square(16)),
        Err(BenchError::DimensionMismatch { .. })
    ));
}

// ============================================================
// Full-size agreement
// ============================================================

#[test]
fn test_random_256_within_threshold() {
    let device = Device::new(None).unwrap();
    let (a, b) = random_pair(256, 0x5EED);
    let r = residual(&reference(&device, &a, &b), &naive(&device, &a, &b, TileDim::square(16))).unwrap();
    assert!(r < 1e-12, "residual {}", r);
    assert_eq!(classify(r, 10.0), Verdict::Pass);
}

#[test]
#[ignore = "benchmark-sized, slow without optimizations"]
fn test_random_1024_within_threshold() {
    let device = Device::new(None).unwrap();
    let (a, b) = random_pair(1024, 0x5EED);
    let r = residual(&reference(&device, &a, &b), &naive(&device, &a, &b, TileDim::square(16))).unwrap();
    assert_eq!(classify(r, 10.0), Verdict::Pass);
}

// ============================================================
// Properties
// ============================================================

proptest! {
    #![proptest_config(ProptestConfig::with_cases(48))]

    #[test]
    fn prop_naive_matches_reference(
        n in 1usize..40,
        tile_rows in 1usize..20,
        tile_cols in 1usize..20,
        seed in any::<u64>(),
    ) {
        let device = Device::new(Some(2)).unwrap();
        let (a, b) = random_pair(n, seed);
        let tile = TileDim { rows: tile_rows, cols: tile_cols };
        let r = residual(&reference(&device, &a, &b), &naive(&device, &a, &b, tile)).unwrap();
        prop_assert!(r < 1e-20, "residual {} for n={} tile={}x{}", r, n, tile_rows, tile_cols);
    }

    #[test]
    fn prop_residual_is_symmetric(
        values in proptest::collection::vec(-1e3f64..1e3, 2 * 7 * 7),
    ) {
        let (x, y) = values.split_at(49);
        let x = Matrix::from_row_major(7, x).unwrap();
        let y = Matrix::from_row_major(7, y).unwrap();
        prop_assert_eq!(residual(&x, &y).unwrap(), residual(&y, &x).unwrap());
    }

    #[test]
    fn prop_residual_of_self_is_zero(seed in any::<u64>()) {
        let (a, _) = random_pair(9, seed);
        prop_assert_eq!(residual(&a, &a).unwrap(), 0.0);
    }
}
