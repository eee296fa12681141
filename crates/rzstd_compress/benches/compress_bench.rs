use std::{hint::black_box, time::Duration};

use criterion::{BenchmarkId, Criterion, Throughput, criterion_group, criterion_main};

/// Synthetic inputs standing in for the Silesia corpus files
/// `rzstd_decompress`'s decode benchmark uses: a compressible English-like
/// text sample and an incompressible random sample, both large enough to
/// exercise multi-block frames at the default block size.
fn sample_text(target_len: usize) -> Vec<u8> {
    const SENTENCE: &[u8] =
        b"the quick brown fox jumps over the lazy dog while the sun sets slowly. ";
    let mut out = Vec::with_capacity(target_len);
    while out.len() < target_len {
        out.extend_from_slice(SENTENCE);
    }
    out.truncate(target_len);
    out
}

fn sample_random(target_len: usize) -> Vec<u8> {
    let mut state = 0x2545_F491_4F6C_DD1Du64;
    let mut out = Vec::with_capacity(target_len);
    for _ in 0..target_len {
        state ^= state << 13;
        state ^= state >> 7;
        state ^= state << 17;
        out.push(state as u8);
    }
    out
}

fn bench_levels(c: &mut Criterion) {
    let mut group = c.benchmark_group("compress levels");
    group.measurement_time(Duration::from_secs(7));

    let text = sample_text(4 * 1024 * 1024);
    let random = sample_random(1024 * 1024);

    for level in [1, 3, 9, 15, 19] {
        group.throughput(Throughput::Bytes(text.len() as u64));
        group.bench_with_input(BenchmarkId::new("text", level), &level, |b, &level| {
            b.iter(|| rzstd_compress::compress(black_box(&text), level, false).unwrap())
        });

        group.throughput(Throughput::Bytes(random.len() as u64));
        group.bench_with_input(BenchmarkId::new("random", level), &level, |b, &level| {
            b.iter(|| rzstd_compress::compress(black_box(&random), level, false).unwrap())
        });
    }

    group.finish();
}

fn bench_against_libzstd(c: &mut Criterion) {
    let mut group = c.benchmark_group("compress vs libzstd");
    let text = sample_text(4 * 1024 * 1024);
    group.throughput(Throughput::Bytes(text.len() as u64));

    group.bench_function("rzstd level 3", |b| {
        b.iter(|| rzstd_compress::compress(black_box(&text), 3, false).unwrap())
    });

    group.bench_function("libzstd level 3", |b| {
        b.iter(|| zstd::stream::encode_all(black_box(text.as_slice()), 3).unwrap())
    });

    group.finish();
}

criterion_group!(benches, bench_levels, bench_against_libzstd);
criterion_main!(benches);
