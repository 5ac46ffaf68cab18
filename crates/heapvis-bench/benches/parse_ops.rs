//! Criterion micro-benchmarks for log parsing.

use std::hint::black_box;

use criterion::{criterion_group, criterion_main, Criterion, Throughput};
use heapvis_bench::reference_log;
use heapvis_core::Geometry;
use heapvis_parse::{parse_reader, parse_str, LogLine};

/// Benchmark: Parse the reference log from a string.
fn bench_parse_reference(c: &mut Criterion) {
    let log = reference_log(42);
    let mut group = c.benchmark_group("parse");
    group.throughput(Throughput::Bytes(log.len() as u64));
    group.bench_function("parse_str_reference", |b| {
        b.iter(|| black_box(parse_str(&log, Geometry::default()).unwrap()));
    });
    group.bench_function("parse_reader_reference", |b| {
        b.iter(|| black_box(parse_reader(log.as_bytes(), Geometry::default()).unwrap()));
    });
    group.finish();
}

/// Benchmark: Classify one line of each shape.
fn bench_classify_line(c: &mut Criterion) {
    let lines = [
        "Heap  0x7f0000000000 size     135168 bytes:",
        "chunk 0x7f0000000030 size       1040 bytes          0123456789abcdef",
        "chunk 0x7f0000000440 size         48 bytes [free] ",
        "Pages in use for 0x7f0000000000-0x7f0000021000: 1111111111111111111111111111111?",
        "unrelated allocator chatter",
    ];
    c.bench_function("classify_line_mix", |b| {
        b.iter(|| {
            for (i, line) in lines.iter().enumerate() {
                black_box(LogLine::classify(i + 1, line).unwrap());
            }
        });
    });
}

criterion_group!(benches, bench_parse_reference, bench_classify_line);
criterion_main!(benches);
