use criterion::{Criterion, criterion_group, criterion_main};
use querychart_rs::api::{CategoryOptions, ChartConfig, ChartEngine, SeriesChartOptions};
use querychart_rs::core::{
    AggregationOp, CategoryQuery, DataType, FieldMetadata, Row, SeriesQuery, reduce_category,
    reduce_series,
};
use std::hint::black_box;

const HOSTS: [&str; 8] = ["api", "web", "db", "cache", "queue", "auth", "search", "cdn"];

fn generated_rows(count: usize) -> Vec<Row> {
    (0..count)
        .map(|i| {
            Row::new()
                .with("_timeslice", (1_696_723_200_000 + (i as i64 % 288) * 300_000).to_string())
                .with("host", HOSTS[i % HOSTS.len()])
                .with("status", if i % 7 == 0 { "500" } else { "200" })
                .with("bytes", format!("{}", 100 + (i * 37) % 4_000))
        })
        .collect()
}

fn bench_category_reduce_10k(c: &mut Criterion) {
    let rows = generated_rows(10_000);
    let query = CategoryQuery::new("host")
        .with_value("bytes", AggregationOp::Sum)
        .with_top_n(5, true);

    c.bench_function("category_reduce_10k", |b| {
        b.iter(|| {
            let _ = reduce_category(black_box(&rows), black_box(&query));
        })
    });
}

fn bench_series_reduce_10k(c: &mut Criterion) {
    let rows = generated_rows(10_000);
    let query = SeriesQuery::new("_timeslice", "host")
        .with_value("bytes", AggregationOp::Avg)
        .with_top_n(4, true);

    c.bench_function("series_reduce_10k", |b| {
        b.iter(|| {
            let _ = reduce_series(black_box(&rows), black_box(&query));
        })
    });
}

fn bench_engine_build_spec_10k(c: &mut Criterion) {
    let rows = generated_rows(10_000);
    let engine = ChartEngine::with_builtin_chart_types();
    let metadata = vec![
        FieldMetadata::time("_timeslice"),
        FieldMetadata::new("host", DataType::String),
        FieldMetadata::new("status", DataType::String),
        FieldMetadata::new("bytes", DataType::Number),
    ];
    let category = ChartConfig::category(["status", "bytes"], CategoryOptions::default());
    let series = ChartConfig::timeseries_by_series(
        ["_timeslice", "host", "bytes"],
        SeriesChartOptions::default(),
    );

    c.bench_function("engine_build_category_spec_10k", |b| {
        b.iter(|| {
            let _ = engine
                .build_spec(black_box(&rows), &category, &metadata, None)
                .expect("category spec should build");
        })
    });

    c.bench_function("engine_build_series_spec_10k", |b| {
        b.iter(|| {
            let _ = engine
                .build_spec(black_box(&rows), &series, &metadata, None)
                .expect("series spec should build");
        })
    });
}

criterion_group!(
    benches,
    bench_category_reduce_10k,
    bench_series_reduce_10k,
    bench_engine_build_spec_10k
);
criterion_main!(benches);
