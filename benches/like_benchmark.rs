use criterion::{criterion_group, criterion_main, Criterion};
use fake::{faker::lorem::en::Sentence, Fake};
use std::hint::black_box;
use sqlscalar::sql::CaseInsensitiveCollator;
use sqlscalar::vm::like;

fn bench_like(c: &mut Criterion) {
    let mut group = c.benchmark_group("LIKE");

    let sentences: Vec<String> = (0..256).map(|_| Sentence(4..40).fake()).collect();

    for (name, pattern) in [
        ("prefix", "Lorem%"),
        ("infix", "%quia%"),
        ("wildcards", "_o%e_%s"),
        ("escaped", "%50!%%"),
    ] {
        group.bench_function(name, |b| {
            b.iter(|| {
                for sentence in &sentences {
                    let res = like::like_str(black_box(sentence), pattern, Some('!'), None);
                    black_box(res.ok());
                }
            })
        });
    }

    group.bench_function("infix_collated", |b| {
        b.iter(|| {
            for sentence in &sentences {
                let res = like::like_str(
                    black_box(sentence),
                    "%QUIA%",
                    None,
                    Some(&CaseInsensitiveCollator),
                );
                black_box(res.ok());
            }
        })
    });

    group.bench_function("range_bounds", |b| {
        b.iter(|| {
            let lower = like::greater_equal_string(black_box("abc%d_"), None, 64);
            let upper = like::less_than_string(black_box("abc%d_"), None, 64);
            black_box((lower.ok(), upper.ok()));
        })
    });

    group.finish();
}

criterion_group!(benches, bench_like);
criterion_main!(benches);
