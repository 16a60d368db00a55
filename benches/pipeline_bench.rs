//! Benchmarks for segrs.
//!
//! Run with:
//!     cargo bench

use criterion::{Criterion, Throughput, black_box, criterion_group, criterion_main};

use bytes::Bytes;
use segrs::{BytePipeline, CharPipeline, Identity, transform};

fn bench_pipeline(c: &mut Criterion) {
    let mut group = c.benchmark_group("pipeline");

    // Different data sizes
    for size in [64 * 1024, 1024 * 1024, 10 * 1024 * 1024] {
        // Deterministic pseudo-random data
        let data: Vec<u8> = (0..size).map(|i| (i * 7 + 13) as u8).collect();

        group.throughput(Throughput::Bytes(size as u64));
        group.bench_with_input(
            format!("identity_{}kb", size / 1024),
            &data,
            |b, data| {
                b.iter(|| {
                    let out = BytePipeline::from_read(black_box(&data[..]))
                        .stage(Identity)
                        .to_vec()
                        .unwrap();
                    black_box(out.len())
                });
            },
        );

        group.bench_with_input(
            format!("array_source_{}kb", size / 1024),
            &data,
            |b, data| {
                let data = Bytes::from(data.clone());
                b.iter(|| {
                    let out = BytePipeline::from_bytes(black_box(data.clone()))
                        .to_bytes()
                        .unwrap();
                    black_box(out.len())
                });
            },
        );
    }

    group.finish();
}

fn bench_wrappers(c: &mut Criterion) {
    let mut group = c.benchmark_group("wrappers");
    let size = 1024 * 1024; // 1 MB
    let data: Vec<u8> = (0..size).map(|i| (i * 7 + 13) as u8).collect();
    group.throughput(Throughput::Bytes(size as u64));

    // Source blocks that never line up with the stage size
    group.bench_function("fixed_size_16", |b| {
        b.iter(|| {
            BytePipeline::from_read(black_box(&data[..]))
                .block_size(1000)
                .unwrap()
                .stage_fixed_size(Identity, 16)
                .unwrap()
                .process()
                .unwrap()
        });
    });

    group.bench_function("rounding_size_16", |b| {
        b.iter(|| {
            BytePipeline::from_read(black_box(&data[..]))
                .block_size(1000)
                .unwrap()
                .stage_rounding_size(Identity, 16)
                .unwrap()
                .process()
                .unwrap()
        });
    });

    group.bench_function("buffered_lines", |b| {
        b.iter(|| {
            let lines = transform::from_fn(|data: &mut Bytes, end| {
                let cut = match data.iter().rposition(|&b| b == b'\n') {
                    Some(i) => i + 1,
                    None if end => data.len(),
                    None => return Ok(None),
                };
                Ok(Some(data.split_to(cut)))
            });
            BytePipeline::from_read(black_box(&data[..]))
                .stage_buffered(lines)
                .process()
                .unwrap()
        });
    });

    #[cfg(feature = "hash-blake3")]
    group.bench_function("digest", |b| {
        b.iter(|| {
            let mut digest = segrs::DigestStage::new();
            BytePipeline::from_read(black_box(&data[..]))
                .stage(&mut digest)
                .process()
                .unwrap();
            black_box(digest.digest())
        });
    });

    group.finish();
}

fn bench_charset(c: &mut Criterion) {
    let mut group = c.benchmark_group("charset");
    let text: String = "Grüße, 世界! ".repeat(32 * 1024);
    group.throughput(Throughput::Bytes(text.len() as u64));

    group.bench_function("decode_utf8", |b| {
        b.iter(|| {
            let out = BytePipeline::from_bytes(black_box(text.as_bytes().to_vec()))
                .decode(encoding_rs::UTF_8)
                .to_chars()
                .unwrap();
            black_box(out.len())
        });
    });

    group.bench_function("encode_utf8", |b| {
        b.iter(|| {
            let out = CharPipeline::from_str(black_box(&text))
                .encode(encoding_rs::UTF_8)
                .to_vec()
                .unwrap();
            black_box(out.len())
        });
    });

    group.finish();
}

criterion_group!(benches, bench_pipeline, bench_wrappers, bench_charset);
criterion_main!(benches);
