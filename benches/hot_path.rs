use criterion::{black_box, criterion_group, criterion_main, Criterion};

use smoothie_monitor::{Host, Monitor, Occasion, ReportSink};

struct FakeMap {
    average_order: u32,
    split_succeeds: bool,
}

impl Host for FakeMap {
    type Key = u64;
    type InflatedSegment = u64;

    fn compute_average_segment_order(&mut self, _map_size: u64) -> u32 {
        self.average_order
    }

    fn max_splittable_segment_order(&self, average_order: u32) -> u32 {
        average_order + 2
    }

    fn try_split_inflated(
        &mut self,
        _segment: &mut Self::InflatedSegment,
        _order: u32,
        _excluded_key_hash: u64,
        _excluded_key: &Self::Key,
    ) -> bool {
        self.split_succeeds
    }
}

struct NoopSink;

impl ReportSink<FakeMap> for NoopSink {
    fn report(&mut self, _map: &FakeMap, _occasion: &Occasion<'_, FakeMap>) -> bool {
        false
    }
}

fn bench_inflated_fast_path(c: &mut Criterion) {
    let mut monitor = Monitor::<FakeMap, NoopSink>::new(1e-9, NoopSink);
    let mut host = FakeMap { average_order: 10, split_succeeds: false };
    let mut segment = 5u64;
    let key = 1u64;

    // one slow-path call to populate the cache, then the bench measures
    // repeat touches that should all take the fast path.
    monitor
        .check_and_report_too_large_inflated_segment(&mut host, &mut segment, 10, 1_000_000, 5, 0, &key)
        .unwrap();

    c.bench_function("inflated_fast_path", |b| {
        b.iter(|| {
            monitor
                .check_and_report_too_large_inflated_segment(
                    &mut host,
                    black_box(&mut segment),
                    10,
                    1_000_000,
                    black_box(5),
                    0,
                    &key,
                )
                .unwrap();
        })
    });
}

fn bench_skewed_split_accounting(c: &mut Criterion) {
    let mut monitor = Monitor::<FakeMap, NoopSink>::new(1e-9, NoopSink);
    let host = FakeMap { average_order: 6, split_succeeds: false };
    monitor.average_segment_order_updated(0, 6).unwrap();

    c.bench_function("skewed_split_balanced", |b| {
        b.iter(|| {
            monitor.account_segment_split(&host, black_box(5), black_box(24), black_box(48)).unwrap();
        })
    });
}

criterion_group!(benches, bench_inflated_fast_path, bench_skewed_split_accounting);
criterion_main!(benches);
