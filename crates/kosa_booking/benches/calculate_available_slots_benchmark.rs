use chrono::{DateTime, Duration, NaiveDate, NaiveTime, TimeZone};
use chrono_tz::Tz;
use criterion::{black_box, criterion_group, criterion_main, Criterion};
use kosa_booking::logic::{calculate_available_slots, WorkingHours};

fn day() -> NaiveDate {
    NaiveDate::from_ymd_opt(2024, 1, 10).unwrap()
}

// Back-to-back appointments of `minutes` starting at 09:00, one every `every` minutes
fn create_busy_periods(count: usize, minutes: i64, every: i64) -> Vec<(DateTime<Tz>, DateTime<Tz>)> {
    let tz = Tz::Europe__Belgrade;
    let opening = tz
        .from_local_datetime(&day().and_time(NaiveTime::from_hms_opt(9, 0, 0).unwrap()))
        .unwrap();
    (0..count as i64)
        .map(|i| {
            let start = opening + Duration::minutes(i * every);
            (start, start + Duration::minutes(minutes))
        })
        .collect()
}

fn benchmark_calculate_available_slots(c: &mut Criterion) {
    let mut group = c.benchmark_group("calculate_available_slots");
    let tz = Tz::Europe__Belgrade;
    let hours = WorkingHours::new(9, 18);

    group.bench_function("empty_day", |b| {
        let busy_periods = Vec::new();
        b.iter(|| {
            calculate_available_slots(
                black_box(day()),
                black_box(hours),
                black_box(Duration::minutes(30)),
                black_box(&busy_periods),
                black_box(Duration::minutes(30)),
                tz,
            )
        })
    });

    group.bench_function("busy_day", |b| {
        let busy_periods = create_busy_periods(8, 45, 60);
        b.iter(|| {
            calculate_available_slots(
                black_box(day()),
                black_box(hours),
                black_box(Duration::minutes(60)),
                black_box(&busy_periods),
                black_box(Duration::minutes(30)),
                tz,
            )
        })
    });

    // Around the clock at five minute steps, to stress the candidate loop
    group.bench_function("fine_grained_full_day", |b| {
        let busy_periods = create_busy_periods(48, 10, 20);
        b.iter(|| {
            calculate_available_slots(
                black_box(day()),
                black_box(WorkingHours::new(0, 24)),
                black_box(Duration::minutes(15)),
                black_box(&busy_periods),
                black_box(Duration::minutes(5)),
                tz,
            )
        })
    });

    group.finish();
}

criterion_group!(benches, benchmark_calculate_available_slots);
criterion_main!(benches);
