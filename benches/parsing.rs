use criterion::{Criterion, criterion_group, criterion_main};
use std::hint::black_box;

use flashscore_sync::keys::{build_source_event_key, slugify};
use flashscore_sync::records::MatchStatus;
use flashscore_sync::rows::{RawParticipant, RawRow, classify_rows};

fn sample_rows(count: usize) -> Vec<RawRow> {
    (0..count)
        .map(|i| RawRow {
            home: Some(RawParticipant {
                title: Some(format!("Home Club {i}")),
                aria_label: None,
                data_tooltip: None,
                text: format!("Home {i}"),
            }),
            away: Some(RawParticipant {
                title: None,
                aria_label: Some(format!("Away Club {i}")),
                data_tooltip: None,
                text: format!("Away {i}"),
            }),
            text: format!("Round {} Mar {} 3:00 PM", i % 26 + 1, i % 28 + 1),
            home_score: Some(format!("{}", i % 60)),
            away_score: Some(format!("{}", (i + 7) % 60)),
            score_fallback: Vec::new(),
        })
        .collect()
}

fn bench_classify_rows(c: &mut Criterion) {
    let rows = sample_rows(400);
    c.bench_function("classify_rows_400", |b| {
        b.iter(|| {
            let items = classify_rows(black_box(&rows), MatchStatus::Finished);
            black_box(items.len());
        })
    });
}

fn bench_source_event_key(c: &mut Criterion) {
    c.bench_function("source_event_key", |b| {
        b.iter(|| {
            let key = build_source_event_key(
                black_box("top-14"),
                "2024/2025",
                "2025-03-15",
                "15:00:00",
                "Stade Toulousain",
                "Union Bordeaux-Bègles",
            );
            black_box(key.len());
        })
    });
}

fn bench_slugify(c: &mut Criterion) {
    c.bench_function("slugify", |b| {
        b.iter(|| {
            let slug = slugify(black_box("  Union Bordeaux-Bègles!!  "));
            black_box(slug.len());
        })
    });
}

criterion_group!(
    benches,
    bench_classify_rows,
    bench_source_event_key,
    bench_slugify
);
criterion_main!(benches);
