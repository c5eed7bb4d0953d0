//! Benchmarks for relay throughput

use criterion::{criterion_group, criterion_main, Criterion, Throughput};
use pipemeter_core::relay::relay;
use std::hint::black_box;

/// Generate line-oriented test data of the given size
fn generate_test_data(size_kb: usize) -> Vec<u8> {
    let base = b"2024-01-01T00:00:00Z INFO request handled in 12ms status=200\n";
    let repetitions = size_kb * 1024 / base.len();
    base.repeat(repetitions)
}

fn benchmark_newline(c: &mut Criterion) {
    let mut group = c.benchmark_group("relay_newline");
    let data = generate_test_data(512);

    group.throughput(Throughput::Bytes(data.len() as u64));
    group.bench_function("512KB", |b| {
        b.iter(|| {
            let mut output = Vec::with_capacity(data.len());
            let mut segments = 0u64;
            relay(black_box(&data[..]), &mut output, b"\n", 1, |n| segments += n).unwrap();
            black_box(segments)
        });
    });

    group.finish();
}

fn benchmark_custom_delimiter(c: &mut Criterion) {
    let mut group = c.benchmark_group("relay_custom_delimiter");
    let data = generate_test_data(4096);

    for buf_size in [256usize, 4096, 65536] {
        group.throughput(Throughput::Bytes(data.len() as u64));
        group.bench_function(format!("4MB_buf_{buf_size}"), |b| {
            b.iter(|| {
                let mut output = Vec::with_capacity(data.len());
                let mut segments = 0u64;
                relay(black_box(&data[..]), &mut output, b" ", buf_size, |n| segments += n)
                    .unwrap();
                black_box(segments)
            });
        });
    }

    group.finish();
}

criterion_group!(benches, benchmark_newline, benchmark_custom_delimiter);
criterion_main!(benches);
