//! Benchmarks for backup parsing and import planning

use charts_store::charts_config::NameMatch;
use charts_store::charts_shared::{
    Chart, ChartCategory, ChartsBackupFile, ConflictStrategy, StoredChart,
};
use charts_store::import::{apply_import, compute_preview, parse_backup};
use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};

fn generate_backup(charts: usize, categories: usize) -> ChartsBackupFile {
    let categories: Vec<ChartCategory> = (0..categories)
        .map(|i| ChartCategory::new(format!("cat-{i}"), format!("Category {i}")))
        .collect();

    let charts = (0..charts)
        .map(|i| {
            let mut stored = StoredChart::new(Chart::new(format!("chart-{i}"), format!("Chart {i}")));
            if !categories.is_empty() {
                stored.add_category(&categories[i % categories.len()].id);
            }
            stored
        })
        .collect();

    ChartsBackupFile::new(charts, categories, "2024-01-01T00:00:00.000Z".to_string())
}

fn bench_parse_backup(c: &mut Criterion) {
    let mut group = c.benchmark_group("parse_backup");
    for size in [100, 1_000, 10_000] {
        let raw = serde_json::to_value(generate_backup(size, 20)).unwrap_or_default();
        group.throughput(Throughput::Elements(size as u64));
        group.bench_with_input(BenchmarkId::from_parameter(size), &raw, |b, raw| {
            b.iter(|| {
                let result = parse_backup(black_box(raw), 1);
                black_box(result)
            });
        });
    }
    group.finish();
}

fn bench_preview(c: &mut Criterion) {
    let existing = generate_backup(5_000, 20);
    let incoming = generate_backup(10_000, 40);

    c.bench_function("preview_10k_against_5k", |b| {
        b.iter(|| {
            let preview = compute_preview(
                black_box(&incoming),
                black_box(&existing.charts),
                black_box(&existing.categories),
                NameMatch::CaseInsensitive,
            );
            black_box(preview)
        });
    });
}

fn bench_apply_import(c: &mut Criterion) {
    let existing = generate_backup(5_000, 20);
    let incoming = generate_backup(10_000, 40);

    let mut group = c.benchmark_group("apply_import");
    group.throughput(Throughput::Elements(incoming.charts.len() as u64));
    for strategy in [
        ConflictStrategy::Skip,
        ConflictStrategy::Replace,
        ConflictStrategy::KeepBoth,
    ] {
        group.bench_function(strategy.to_string(), |b| {
            b.iter(|| {
                let plan = apply_import(
                    black_box(&incoming),
                    strategy,
                    existing.charts.clone(),
                    existing.categories.clone(),
                    NameMatch::CaseInsensitive,
                );
                black_box(plan)
            });
        });
    }
    group.finish();
}

criterion_group!(benches, bench_parse_backup, bench_preview, bench_apply_import);
criterion_main!(benches);
