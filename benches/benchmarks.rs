use criterion::{criterion_group, criterion_main, BenchmarkId, Criterion};
use json_kv::{JsonKv, MathOp};
use serde_json::json;
use std::hint::black_box;
use std::time::Duration;
use tempfile::TempDir;

fn seeded(dir: &TempDir, size: usize) -> JsonKv {
    let db = JsonKv::builder("bench").dir(dir.path()).build().unwrap();
    for i in 0..size {
        db.set(&format!("k{i}"), json!({"n": i, "tags": ["a", "b"]}))
            .unwrap();
    }
    db
}

fn bench_fetch(c: &mut Criterion) {
    let mut group = c.benchmark_group("fetch");
    for size in [10, 100, 1000] {
        group.bench_with_input(BenchmarkId::new("document", size), &size, |b, &size| {
            let dir = TempDir::new().unwrap();
            let db = seeded(&dir, size);
            b.iter(|| black_box(db.fetch("k0").unwrap()));
        });
    }
}

fn bench_write_cycle(c: &mut Criterion) {
    let mut group = c.benchmark_group("write_cycle");
    group.sample_size(50);
    group.measurement_time(Duration::from_secs(8));
    for size in [10, 100, 1000] {
        group.bench_with_input(BenchmarkId::new("add", size), &size, |b, &size| {
            let dir = TempDir::new().unwrap();
            let db = seeded(&dir, size);
            b.iter(|| db.add("counter", 1.0).unwrap());
        });
        group.bench_with_input(BenchmarkId::new("math", size), &size, |b, &size| {
            let dir = TempDir::new().unwrap();
            let db = seeded(&dir, size);
            db.set("x", 1).unwrap();
            b.iter(|| db.math("x", MathOp::Mul, 1.0).unwrap());
        });
    }
}

fn bench_scan(c: &mut Criterion) {
    let mut group = c.benchmark_group("scan");
    for size in [100, 1000] {
        group.bench_with_input(BenchmarkId::new("count_by", size), &size, |b, &size| {
            let dir = TempDir::new().unwrap();
            let db = seeded(&dir, size);
            b.iter(|| {
                db.count_by(|_, v| v["n"].as_u64().is_some_and(|n| n % 2 == 0))
                    .unwrap()
            });
        });
        group.bench_with_input(BenchmarkId::new("pluck", size), &size, |b, &size| {
            let dir = TempDir::new().unwrap();
            let db = seeded(&dir, size);
            b.iter(|| black_box(db.pluck("n").unwrap()));
        });
    }
}

fn bench_push(c: &mut Criterion) {
    let mut group = c.benchmark_group("push");
    group.sample_size(50);
    group.bench_function("append_and_clear", |b| {
        let dir = TempDir::new().unwrap();
        let db = seeded(&dir, 100);
        b.iter(|| {
            for i in 0..10 {
                db.push("log", i).unwrap();
            }
            db.clear("log").unwrap();
        });
    });
}

criterion_group!(benches, bench_fetch, bench_write_cycle, bench_scan, bench_push);
criterion_main!(benches);
