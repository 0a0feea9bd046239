use std::hint::black_box;
use std::time::Duration;

use criterion::{Criterion, criterion_group, criterion_main};
use lyric_core::{TtmlGenerationOptions, TtmlParsingOptions};
use ttml_processor::{generate_ttml, parse_ttml};

const SAMPLE_TTML: &str = include_str!("../tests/test_data/real_world.ttml");

fn benchmark_parse_ttml(c: &mut Criterion) {
    let mut group = c.benchmark_group("TTML Parsing");

    group.measurement_time(Duration::from_secs(20));
    group.sample_size(200);

    let default_options = TtmlParsingOptions::default();

    group.bench_function("parse_normal_ttml", |b| {
        b.iter(|| {
            let parsed_data = parse_ttml(black_box(SAMPLE_TTML), black_box(&default_options));
            black_box(parsed_data);
        });
    });

    group.finish();
}

fn benchmark_generate_ttml(c: &mut Criterion) {
    let mut group = c.benchmark_group("TTML Generation");

    let document = parse_ttml(SAMPLE_TTML, &TtmlParsingOptions::default()).document;
    let options = TtmlGenerationOptions::default();

    group.bench_function("generate_normal_ttml", |b| {
        b.iter(|| {
            let output = generate_ttml(black_box(&document), black_box(&options)).expect("样本生成失败");
            black_box(output);
        });
    });

    group.finish();
}

criterion_group!(benches, benchmark_parse_ttml, benchmark_generate_ttml);

criterion_main!(benches);
