use std::hint::black_box;

use criterion::{BenchmarkId, Criterion, Throughput, criterion_group, criterion_main};

use par_rs::par::{ParOptions, apply_arg, par_data};

/// Build a paragraph of `words` words with varied lengths, wrapped at
/// roughly 60 columns the way hand-written text arrives.
fn generate_text(words: usize) -> Vec<u8> {
    const POOL: [&str; 8] = [
        "the", "reflow", "of", "paragraphs", "is", "an", "optimization", "problem",
    ];
    let mut data = Vec::new();
    let mut col = 0;
    for i in 0..words {
        let w = POOL[i % POOL.len()];
        if col > 0 {
            if col + w.len() >= 60 {
                data.push(b'\n');
                col = 0;
            } else {
                data.push(b' ');
                col += 1;
            }
        }
        data.extend_from_slice(w.as_bytes());
        col += w.len();
    }
    data.push(b'\n');
    data
}

fn bench_reflow(c: &mut Criterion) {
    let mut group = c.benchmark_group("reflow");
    for &words in &[100usize, 1_000, 10_000] {
        let data = generate_text(words);
        group.throughput(Throughput::Bytes(data.len() as u64));

        let ragged = ParOptions::default();
        group.bench_with_input(BenchmarkId::new("ragged", words), &data, |b, data| {
            b.iter(|| {
                let mut out = Vec::new();
                par_data(black_box(data), &mut out, &ragged).unwrap();
                out
            });
        });

        let mut justified = ParOptions::default();
        apply_arg(&mut justified, b"j").unwrap();
        group.bench_with_input(BenchmarkId::new("justified", words), &data, |b, data| {
            b.iter(|| {
                let mut out = Vec::new();
                par_data(black_box(data), &mut out, &justified).unwrap();
                out
            });
        });

        let mut fitted = ParOptions::default();
        apply_arg(&mut fitted, b"f").unwrap();
        group.bench_with_input(BenchmarkId::new("fit", words), &data, |b, data| {
            b.iter(|| {
                let mut out = Vec::new();
                par_data(black_box(data), &mut out, &fitted).unwrap();
                out
            });
        });
    }
    group.finish();
}

criterion_group!(benches, bench_reflow);
criterion_main!(benches);
