//! Performance benchmarks for the check-in verification hot path.
//!
//! Run with: cargo bench --package geo-presence-verify
//!
//! Covers the integrity scorer (with and without optional evidence), the
//! Haversine primitive it leans on, and one Kalman update cycle.

use chrono::{TimeZone, Utc};
use criterion::{black_box, criterion_group, criterion_main, Criterion};

use geo_presence_core::{
    haversine_distance_m, GeoPoint, MotionSample, Place, PlaceId, PositionFix, WifiObservation,
};
use geo_presence_verify::{
    FilterMeasurement, IntegrityScorer, KalmanPositionFilter, PositionFilter,
};

fn bench_haversine(c: &mut Criterion) {
    let a = GeoPoint::new(52.5200, 13.4050);
    let b = GeoPoint::new(48.8566, 2.3522);

    c.bench_function("haversine_distance", |bencher| {
        bencher.iter(|| haversine_distance_m(black_box(a), black_box(b)))
    });
}

fn bench_scoring(c: &mut Criterion) {
    let scorer = IntegrityScorer::with_defaults();
    let place = Place::new(
        PlaceId::new("cafe-17"),
        GeoPoint::new(52.5200, 13.4050),
        50.0,
        vec!["cafe-guest".into(), "cafe-staff".into(), "cafe-iot".into()],
    );
    let server_time = Utc.with_ymd_and_hms(2024, 3, 15, 12, 30, 45).unwrap();
    let fix = PositionFix::new(GeoPoint::new(52.52003, 13.40507), 8.0, server_time);
    let wifi = WifiObservation::new(vec!["cafe-guest".into(), "unknown-1".into()]);
    let motion = MotionSample::new(0.02, -0.11, 0.31);

    c.bench_function("score_full_evidence", |bencher| {
        bencher.iter(|| {
            scorer.score(
                black_box(&fix),
                black_box(Some(&wifi)),
                black_box(Some(&motion)),
                black_box(&place),
                black_box(server_time),
            )
        })
    });

    c.bench_function("score_position_only", |bencher| {
        bencher.iter(|| {
            scorer.score(
                black_box(&fix),
                None,
                None,
                black_box(&place),
                black_box(server_time),
            )
        })
    });
}

fn bench_kalman_update(c: &mut Criterion) {
    let base = Utc.with_ymd_and_hms(2024, 3, 15, 12, 0, 0).unwrap();

    c.bench_function("kalman_update_cycle", |bencher| {
        bencher.iter(|| {
            let mut filter = KalmanPositionFilter::with_defaults();
            for i in 0..5i64 {
                let fix = PositionFix::new(
                    GeoPoint::new(52.5200 + i as f64 * 1e-5, 13.4050),
                    8.0,
                    base + chrono::Duration::seconds(i),
                );
                black_box(filter.update(&FilterMeasurement::from_fix(fix)));
            }
        })
    });
}

criterion_group!(benches, bench_haversine, bench_scoring, bench_kalman_update);
criterion_main!(benches);
