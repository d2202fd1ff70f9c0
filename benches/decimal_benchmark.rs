use criterion::{criterion_group, criterion_main, Criterion};
use std::hint::black_box;
use std::str::FromStr;
use sqlscalar::{Decimal, FormatVersion, Value};

fn bench_decimal_ops(c: &mut Criterion) {
    let mut group = c.benchmark_group("Decimal Operations");

    let short1 = Decimal::from(12345i64);
    let short2 = Decimal::from_str("678.90").unwrap();

    let long1 = Decimal::from_str("100000000000000000000.125").unwrap();
    let long2 = Decimal::from_str("-200000000000000000000.5").unwrap();

    // Short + Short
    group.bench_function("add_short_short", |b| {
        b.iter(|| {
            let res = black_box(&short1) + black_box(&short2);
            black_box(res);
        })
    });

    // Long + Long
    group.bench_function("add_long_long", |b| {
        b.iter(|| {
            let res = black_box(&long1) + black_box(&long2);
            black_box(res);
        })
    });

    group.bench_function("mul_long_long", |b| {
        b.iter(|| {
            let res = black_box(&long1).times(black_box(&long2));
            black_box(res);
        })
    });

    group.bench_function("div_long_short", |b| {
        b.iter(|| {
            let res = black_box(&long1).divide(black_box(&short2), None);
            black_box(res)
        })
    });

    // Compare Short vs Long
    group.bench_function("cmp_short_long", |b| {
        b.iter(|| {
            let res = black_box(&short1) < black_box(&long1);
            black_box(res);
        })
    });

    group.finish();
}

fn bench_decimal_storage(c: &mut Criterion) {
    let mut group = c.benchmark_group("Decimal Storage");

    let value = Value::Decimal(Decimal::from_str("-98765432109876543210.0123").unwrap());
    let bytes = value.serialise(FormatVersion::Current).unwrap();

    group.bench_function("serialise", |b| {
        b.iter(|| black_box(&value).serialise(FormatVersion::Current))
    });

    // only the envelope is read, the digits stay encoded
    group.bench_function("deserialise_lazy", |b| {
        b.iter(|| Value::deserialise(black_box(&bytes)))
    });

    group.bench_function("deserialise_and_render", |b| {
        b.iter(|| {
            let (value, _) = Value::deserialise(black_box(&bytes)).unwrap();
            black_box(value.to_string());
        })
    });

    group.finish();
}

criterion_group!(benches, bench_decimal_ops, bench_decimal_storage);
criterion_main!(benches);
