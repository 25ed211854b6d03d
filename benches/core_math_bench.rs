use criterion::{Criterion, criterion_group, criterion_main};
use spacetime_rs::core::{
    CoreTrackRange, PathData, PathPoint, Scale, ScaleTree, TimeAxisTimeZone, TrackDirection,
    compute_visible_time_markers, find_track_section_offset, track_length_cumulative_sums,
};
use spacetime_rs::{SpaceTimeChart, SpaceTimeChartConfig};
use std::hint::black_box;

/// Alternating 1 km blocks and 30 px station bands.
fn station_scales(stations: usize) -> Vec<Scale> {
    (1..=stations)
        .flat_map(|i| {
            let to = i as f64 * 1_000_000.0;
            [Scale::with_size(to, 80.0), Scale::with_size(to, 30.0)]
        })
        .collect()
}

fn bench_scale_tree_round_trip(c: &mut Criterion) {
    let tree = ScaleTree::new(0.0, &station_scales(500)).expect("valid scales");

    c.bench_function("scale_tree_round_trip_1k_segments", |b| {
        b.iter(|| {
            let px = tree.space_to_pixel(black_box(123_456_789.0), false);
            let _ = tree.pixel_to_space(black_box(px));
        })
    });
}

fn bench_path_projection_2k(c: &mut Criterion) {
    let config = SpaceTimeChartConfig::new(0.0, vec![Scale::with_size(86_400_000.0, 4_000.0)])
        .with_space_scales(0.0, station_scales(200));
    let chart = SpaceTimeChart::new(config).expect("valid chart");

    let path = PathData::new(
        (0..2_000)
            .map(|i| {
                let t = f64::from(i);
                PathPoint::new(t * 40_000.0, t * 100_000.0)
            })
            .collect(),
    )
    .expect("valid generated path");

    c.bench_function("path_projection_2k", |b| {
        b.iter(|| {
            let _ = chart.project_path(black_box(&path));
        })
    });
}

fn bench_time_markers_one_day(c: &mut Criterion) {
    let intervals = [60_000, 300_000, 900_000, 1_800_000, 3_600_000, 21_600_000, 86_400_000];
    let levels = [0, 5, 4, 3, 2, 1, 1];

    c.bench_function("time_markers_one_day", |b| {
        b.iter(|| {
            let _ = compute_visible_time_markers(
                black_box(1_704_067_200_000),
                black_box(1_704_153_600_000),
                &intervals,
                &levels,
                TimeAxisTimeZone::Utc,
            )
            .expect("valid intervals");
        })
    });
}

fn bench_track_offset_lookup(c: &mut Criterion) {
    let ranges: Vec<CoreTrackRange> = (0..5_000)
        .map(|i| CoreTrackRange::new(format!("TA{i}"), 0, 1_500, TrackDirection::StartToStop))
        .collect();
    let sums = track_length_cumulative_sums(&ranges);

    c.bench_function("track_offset_lookup_5k_ranges", |b| {
        b.iter(|| {
            let _ = find_track_section_offset(black_box(4_321_000), &sums, &ranges)
                .expect("position inside path");
        })
    });
}

criterion_group!(
    benches,
    bench_scale_tree_round_trip,
    bench_path_projection_2k,
    bench_time_markers_one_day,
    bench_track_offset_lookup
);
criterion_main!(benches);
