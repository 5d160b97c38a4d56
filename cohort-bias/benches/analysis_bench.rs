//! Benchmarks for the CSV decode and analysis pipeline.

use criterion::{criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};
use std::hint::black_box;

use cohort_bias::analyzers::AnalysisRunner;
use cohort_bias::core::Dataset;
use cohort_bias::sources::{CsvSource, DataSource};

const GENDER_CODES: [&str; 8] = ["M", "F", "male", "female", "1", "0", "f.", "unknown"];

/// Builds a deterministic CSV body with the given number of rows.
fn create_csv(rows: usize) -> Vec<u8> {
    let mut csv = String::from("patient_id,Sex,Age\n");
    for i in 0..rows {
        let age = if i % 23 == 0 {
            "n/a".to_string()
        } else {
            ((i * 13) % 95).to_string()
        };
        csv.push_str(&format!("P{i},{},{age}\n", GENDER_CODES[i % GENDER_CODES.len()]));
    }
    csv.into_bytes()
}

fn load(rows: usize) -> Dataset {
    CsvSource::from_bytes(create_csv(rows))
        .load()
        .expect("benchmark CSV is well formed")
}

fn bench_analysis(c: &mut Criterion) {
    let mut group = c.benchmark_group("analysis");
    let runner = AnalysisRunner::new();

    for rows in [1_000, 10_000, 100_000] {
        let dataset = load(rows);
        group.throughput(Throughput::Elements(rows as u64));
        group.bench_with_input(BenchmarkId::new("run", rows), &dataset, |b, data| {
            b.iter(|| runner.run(black_box(data)).expect("analysis succeeds"))
        });
    }
    group.finish();
}

fn bench_csv_decode(c: &mut Criterion) {
    let mut group = c.benchmark_group("csv_decode");

    for rows in [1_000, 100_000] {
        let body = create_csv(rows);
        group.throughput(Throughput::Bytes(body.len() as u64));
        group.bench_with_input(BenchmarkId::new("load", rows), &body, |b, body| {
            b.iter(|| {
                CsvSource::from_bytes(black_box(body.clone()))
                    .load()
                    .expect("decode succeeds")
            })
        });
    }
    group.finish();
}

criterion_group!(benches, bench_analysis, bench_csv_decode);
criterion_main!(benches);
