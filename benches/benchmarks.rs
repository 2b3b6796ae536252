use chrono::{DateTime, Duration};
use criterion::{black_box, criterion_group, criterion_main, Criterion, Throughput};
use trendlog::{HistoryStore, LogCodec, MemoryStorage, Reading};

fn history(count: usize) -> Vec<Reading> {
    let base = DateTime::from_timestamp(1_760_000_000, 0).unwrap();
    (0..count)
        .map(|i| {
            let tenths = 800 + (i % 40) as i64;
            Reading::new(
                base + Duration::minutes(5 * i as i64),
                format!("{}.{}", tenths / 10, tenths % 10),
                ['d', 'e', 'x'][i % 3],
            )
        })
        .collect()
}

fn bench_encode(c: &mut Criterion) {
    let mut group = c.benchmark_group("encode");
    let codec = LogCodec::new();

    for count in [1, 30, 120] {
        let log = history(count);
        group.throughput(Throughput::Elements(count as u64));
        group.bench_function(format!("{count}_readings"), |b| {
            b.iter(|| black_box(codec.encode(black_box(&log)).unwrap()))
        });
    }
    group.finish();
}

fn bench_decode(c: &mut Criterion) {
    let codec = LogCodec::new();
    let blob = codec.encode(&history(120)).unwrap();

    let mut group = c.benchmark_group("decode");
    group.throughput(Throughput::Elements(120));
    group.bench_function("120_readings", |b| {
        b.iter(|| black_box(codec.decode(black_box(&blob)).unwrap()))
    });
    group.finish();
}

fn bench_store_append(c: &mut Criterion) {
    let log = history(130);
    let mut group = c.benchmark_group("store");
    group.throughput(Throughput::Elements(130));
    group.bench_function("append_past_capacity", |b| {
        b.iter(|| {
            let store = HistoryStore::open(MemoryStorage::new());
            for r in &log {
                store.append(r.clone()).unwrap();
            }
            black_box(store.len())
        })
    });
    group.finish();
}

criterion_group!(benches, bench_encode, bench_decode, bench_store_append);
criterion_main!(benches);
