//! 요청 분류 마이크로벤치마크.

use criterion::{black_box, criterion_group, criterion_main, Criterion};
use nuri_cache::class::classify;

fn bench_classify(c: &mut Criterion) {
    let paths = [
        "/_next/static/chunks/main.abc123.js",
        "/images/hero.webp?v=3",
        "/fonts/NotoSansJP-Regular.woff2",
        "/api/reservations/42",
        "/services/catering",
        "https://example.com/assets/site.css",
    ];

    c.bench_function("classify_mixed_paths", |b| {
        b.iter(|| {
            for path in &paths {
                black_box(classify(black_box(path)));
            }
        })
    });
}

criterion_group!(benches, bench_classify);
criterion_main!(benches);
