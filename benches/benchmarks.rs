use criterion::{criterion_group, criterion_main, BenchmarkId, Criterion};
use filedict::SerializedDict;
use std::hint::black_box;
use std::time::Duration;

fn bench_set_get_delete(c: &mut Criterion) {
    let mut group = c.benchmark_group("set_get_delete");
    group.sample_size(20);
    for size in [10, 100] {
        group.bench_with_input(BenchmarkId::new("json", size), &size, |b, &size| {
            let dir = tempfile::tempdir().unwrap();
            let mut db = SerializedDict::<String, i32>::open(dir.path(), "bench.json").unwrap();
            b.iter(|| {
                for i in 0..size {
                    db.set(format!("k{i}"), i as i32).unwrap();
                }
                for i in 0..size {
                    black_box(db.get(&format!("k{i}")).unwrap());
                }
                for i in 0..size {
                    db.delete(&format!("k{i}")).unwrap();
                }
            });
        });
    }
}

fn bench_flush(c: &mut Criterion) {
    let mut group = c.benchmark_group("flush");
    group.sample_size(50);
    group.measurement_time(Duration::from_secs(8));
    for size in [100, 1000, 10_000] {
        group.bench_with_input(BenchmarkId::new("json", size), &size, |b, &size| {
            let dir = tempfile::tempdir().unwrap();
            let mut db = SerializedDict::<String, i32>::open(dir.path(), "bench.json").unwrap();
            db.extend((0..size).map(|i| (format!("k{i}"), i as i32))).unwrap();
            b.iter(|| db.flush().unwrap());
        });
        #[cfg(feature = "msgpack")]
        group.bench_with_input(BenchmarkId::new("msgpack", size), &size, |b, &size| {
            let dir = tempfile::tempdir().unwrap();
            let mut db = SerializedDict::<String, i32>::builder(dir.path(), "bench.bin")
                .codec(filedict::MsgPackCodec)
                .build()
                .unwrap();
            db.extend((0..size).map(|i| (format!("k{i}"), i as i32))).unwrap();
            b.iter(|| db.flush().unwrap());
        });
    }
}

fn bench_load(c: &mut Criterion) {
    let mut group = c.benchmark_group("load");
    for size in [1000, 10_000] {
        group.bench_with_input(BenchmarkId::new("json", size), &size, |b, &size| {
            let dir = tempfile::tempdir().unwrap();
            let mut db = SerializedDict::<String, i32>::open(dir.path(), "bench.json").unwrap();
            db.extend((0..size).map(|i| (format!("k{i}"), i as i32))).unwrap();
            b.iter(|| db.load().unwrap());
        });
    }
}

fn bench_list(c: &mut Criterion) {
    let mut group = c.benchmark_group("list");
    for size in [1000, 10_000] {
        group.bench_with_input(BenchmarkId::new("json", size), &size, |b, &size| {
            let dir = tempfile::tempdir().unwrap();
            let mut db = SerializedDict::<String, i32>::open(dir.path(), "bench.json").unwrap();
            db.extend((0..size).map(|i| (format!("k{i}"), i as i32))).unwrap();
            b.iter(|| black_box(db.list()));
        });
    }
}

criterion_group!(benches, bench_set_get_delete, bench_flush, bench_load, bench_list);
criterion_main!(benches);
