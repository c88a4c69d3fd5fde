use criterion::{BenchmarkId, Criterion, Throughput, criterion_group, criterion_main};
use gemmbench::dispatch::Device;
use gemmbench::{Matrix, MatrixGenerator, TileDim, dgemm, naive_gemm};
use std::hint::black_box;

fn bench_gemm(c: &mut Criterion) {
    let device = Device::new(None).expect("device");
    let mut group = c.benchmark_group("gemm");

    for size in [64, 128, 256, 512] {
        let mut generator = MatrixGenerator::new(0x5EED);
        let a = generator.generate(size).expect("alloc A");
        let b = generator.generate(size).expect("alloc B");
        let mut out = Matrix::zeros(size).expect("alloc C");

        group.throughput(Throughput::Elements(2 * (size as u64).pow(3)));

        group.bench_with_input(BenchmarkId::new("reference", size), &size, |bench, _| {
            bench.iter(|| dgemm(&device, 1.0, black_box(&a), black_box(&b), 0.0, &mut out).expect("dgemm"))
        });

        for tile in [8, 16, 32] {
            group.bench_with_input(BenchmarkId::new(format!("naive_{tile}x{tile}"), size), &size, |bench, _| {
                bench.iter(|| {
                    naive_gemm(&device, black_box(&a), black_box(&b), &mut out, TileDim::square(tile)).expect("naive")
                })
            });
        }
    }

    group.finish();
}

criterion_group!(benches, bench_gemm);
criterion_main!(benches);
