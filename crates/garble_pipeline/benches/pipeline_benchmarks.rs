//! Criterion benchmarks for buffer construction and composed pipelines.
//!
//! Benchmarks cover:
//! - Tokenising text of increasing size into a buffer
//! - A mixed word/character pipeline over the same inputs
//! - Sequential versus parallel batch composition

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use garble_core::buffer::TextBuffer;
use garble_ops::MotorWeighting;
use garble_pipeline::{compose, compose_batch, Descriptor, OperationSpec};

const SENTENCE: &str = "The quick brown fox, who was rather clever, jumped over 3 lazy dogs! ";

fn generate_text(sentences: usize) -> String {
    SENTENCE.repeat(sentences)
}

fn descriptors() -> Vec<Descriptor> {
    vec![
        Descriptor::new("Reduple", OperationSpec::Reduplicate { rate: 0.05, unweighted: false }),
        Descriptor::new(
            "Typogre",
            OperationSpec::Typo {
                rate: 0.02,
                layout: None,
                shift_slip_rate: 0.0,
                shift_slip_exit_rate: None,
                shift_map: None,
                motor_weighting: MotorWeighting::Uniform,
            },
        ),
        Descriptor::new("Scannequin", OperationSpec::Ocr { rate: 0.05 }),
        Descriptor::new(
            "Zeedub",
            OperationSpec::Zwj {
                rate: 0.02,
                characters: Vec::new(),
                visibility: Default::default(),
                placement: Default::default(),
                max_consecutive: 4,
            },
        ),
    ]
}

fn bench_buffer(c: &mut Criterion) {
    let mut group = c.benchmark_group("buffer");
    for sentences in [10usize, 100, 1000] {
        let text = generate_text(sentences);
        group.bench_with_input(BenchmarkId::new("tokenise", sentences), &text, |b, text| {
            b.iter(|| TextBuffer::new(black_box(text)))
        });
    }
    group.finish();
}

fn bench_compose(c: &mut Criterion) {
    let descriptors = descriptors();
    let mut group = c.benchmark_group("compose");
    for sentences in [10usize, 100, 1000] {
        let text = generate_text(sentences);
        group.bench_with_input(BenchmarkId::new("mixed", sentences), &text, |b, text| {
            b.iter(|| compose(black_box(text), &descriptors, 151))
        });
    }
    group.finish();
}

fn bench_batch(c: &mut Criterion) {
    let descriptors = descriptors();
    let texts: Vec<String> = (0..256).map(|_| generate_text(5)).collect();
    let mut group = c.benchmark_group("batch");
    group.bench_function("sequential", |b| {
        b.iter(|| {
            texts
                .iter()
                .map(|text| compose(text, &descriptors, 151))
                .collect::<Result<Vec<_>, _>>()
        })
    });
    group.bench_function("parallel", |b| {
        b.iter(|| compose_batch(black_box(&texts), &descriptors, 151))
    });
    group.finish();
}

criterion_group!(benches, bench_buffer, bench_compose, bench_batch);
criterion_main!(benches);
