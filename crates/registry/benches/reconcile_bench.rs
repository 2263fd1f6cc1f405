//! Reconciliation benchmarks

use chrono::{Days, NaiveDate};
use criterion::{black_box, criterion_group, criterion_main, BatchSize, Criterion};
use dayline_core::{DelimiterPlanner, Item};
use dayline_registry::{MarkerRegistry, MemoryRenderer, Reconciler};

fn mailbox(len: usize, per_day: usize, offset: f64) -> Vec<Item> {
    let today = NaiveDate::from_ymd_opt(2025, 11, 21).unwrap();
    (0..len)
        .map(|ordinal| {
            let day = today
                .checked_sub_days(Days::new((ordinal / per_day) as u64))
                .unwrap();
            Item {
                ordinal,
                position: Some(offset + ordinal as f64 * 40.0),
                raw_timestamp: Some(day.format("%A, %B %-d, %Y at 10:00 AM").to_string()),
            }
        })
        .collect()
}

fn bench_reconcile(c: &mut Criterion) {
    let today = NaiveDate::from_ymd_opt(2025, 11, 21).unwrap();
    let planner = DelimiterPlanner::default();
    let initial = planner.plan(&mailbox(2_000, 10, 0.0), today);
    let shifted = planner.plan(&mailbox(2_000, 10, 24.0), today);

    c.bench_function("reconcile_unchanged", |b| {
        let mut surface = MemoryRenderer::new();
        let mut registry = MarkerRegistry::new();
        let _ = Reconciler::apply(&initial, &mut registry, &mut surface);
        b.iter(|| black_box(Reconciler::apply(black_box(&initial), &mut registry, &mut surface)));
    });

    c.bench_function("reconcile_relayout", |b| {
        b.iter_batched(
            || {
                let mut surface = MemoryRenderer::new();
                let mut registry = MarkerRegistry::new();
                let _ = Reconciler::apply(&initial, &mut registry, &mut surface);
                (surface, registry)
            },
            |(mut surface, mut registry)| {
                black_box(Reconciler::apply(&shifted, &mut registry, &mut surface))
            },
            BatchSize::SmallInput,
        );
    });
}

criterion_group!(benches, bench_reconcile);
criterion_main!(benches);
