use std::sync::atomic::{AtomicU64, Ordering};

use criterion::{black_box, criterion_group, criterion_main, BatchSize, BenchmarkId, Criterion};
use packedgraph::stream::SumMonoid;
use packedgraph::{encode, intersect, CodecConfig, VertexId};

const DEGREES: [u32; 3] = [1_000, 100_000, 1_000_000];

fn neighbors(degree: u32, stride: u32) -> Vec<VertexId> {
    (0..degree).map(|i| i * stride).collect()
}

fn bench_encode(c: &mut Criterion) {
    let mut group = c.benchmark_group("encode");
    for degree in DEGREES {
        let ids = neighbors(degree, 3);
        let weights: Vec<i32> = (0..degree as i32).map(|i| i % 97 - 48).collect();
        let config = CodecConfig::default();
        group.bench_with_input(BenchmarkId::new("unweighted", degree), &ids, |b, ids| {
            b.iter(|| black_box(encode(ids, None, 0, &config).unwrap()));
        });
        group.bench_with_input(BenchmarkId::new("weighted", degree), &ids, |b, ids| {
            b.iter(|| black_box(encode(ids, Some(&weights), 0, &config).unwrap()));
        });
    }
    group.finish();
}

fn bench_decode(c: &mut Criterion) {
    let mut group = c.benchmark_group("decode");
    for degree in DEGREES {
        let config = CodecConfig::default();
        let stream = encode(&neighbors(degree, 3), None, 0, &config).unwrap();
        let view = stream.as_neighbors();

        group.bench_function(BenchmarkId::new("sequential", degree), |b| {
            b.iter(|| {
                let mut sum = 0u64;
                view.decode_seq(|n, _, _| {
                    sum += u64::from(n);
                    true
                })
                .unwrap();
                black_box(sum)
            });
        });
        group.bench_function(BenchmarkId::new("parallel", degree), |b| {
            b.iter(|| {
                let sum = AtomicU64::new(0);
                view.decode(|n, _, _| {
                    sum.fetch_add(u64::from(n), Ordering::Relaxed);
                    true
                })
                .unwrap();
                black_box(sum.into_inner())
            });
        });
        group.bench_function(BenchmarkId::new("map_reduce", degree), |b| {
            b.iter(|| {
                black_box(
                    view.map_reduce(|_, n, _| u64::from(n), &SumMonoid::new())
                        .unwrap(),
                )
            });
        });
        group.bench_function(BenchmarkId::new("iter", degree), |b| {
            b.iter(|| black_box(view.iter().unwrap().filter_map(Result::ok).count()));
        });
    }
    group.finish();
}

fn bench_pack(c: &mut Criterion) {
    let mut group = c.benchmark_group("pack");
    for degree in DEGREES {
        let config = CodecConfig::default();
        let stream = encode(&neighbors(degree, 3), None, 0, &config).unwrap();

        group.bench_function(BenchmarkId::new("keep_half", degree), |b| {
            b.iter_batched(
                || stream.clone(),
                |mut s| black_box(s.pack(|_, n, _| n % 2 == 0).unwrap()),
                BatchSize::LargeInput,
            );
        });
        // Falls below the repack threshold, so this includes the rebuild.
        group.bench_function(BenchmarkId::new("keep_few", degree), |b| {
            b.iter_batched(
                || stream.clone(),
                |mut s| black_box(s.pack(|_, n, _| n % 64 == 0).unwrap()),
                BatchSize::LargeInput,
            );
        });
    }
    group.finish();
}

fn bench_repack(c: &mut Criterion) {
    let mut group = c.benchmark_group("repack");
    for degree in DEGREES {
        let config = CodecConfig {
            repack_divisor: 0,
            ..CodecConfig::default()
        };
        let mut packed = encode(&neighbors(degree, 3), None, 0, &config).unwrap();
        packed.pack(|_, n, _| n % 4 == 0).unwrap();

        group.bench_function(BenchmarkId::from_parameter(degree), |b| {
            b.iter_batched(
                || packed.clone(),
                |mut s| {
                    s.repack().unwrap();
                    black_box(s)
                },
                BatchSize::LargeInput,
            );
        });
    }
    group.finish();
}

fn bench_intersect(c: &mut Criterion) {
    let mut group = c.benchmark_group("intersect");
    for degree in [1_000u32, 100_000] {
        let config = CodecConfig::default();
        let a = encode(&neighbors(degree, 2), None, 0, &config).unwrap();
        let b = encode(&neighbors(degree, 3), None, 0, &config).unwrap();
        group.bench_function(BenchmarkId::from_parameter(degree), |bench| {
            bench.iter(|| black_box(intersect(&a.as_neighbors(), &b.as_neighbors()).unwrap()));
        });
    }
    group.finish();
}

criterion_group!(
    benches,
    bench_encode,
    bench_decode,
    bench_pack,
    bench_repack,
    bench_intersect
);
criterion_main!(benches);
