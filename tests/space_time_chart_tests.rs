use chrono::{TimeZone, Utc};
use spacetime_rs::api::PixelPoint;
use spacetime_rs::core::{PathData, PathPoint, Scale, TimeAxisTimeZone};
use spacetime_rs::{ChartError, SpaceTimeChart, SpaceTimeChartConfig};

const HOUR: f64 = 3_600_000.0;

/// One hour per 600 px, and a 1 km block, a 40 px station band, then 2 km.
fn station_chart() -> SpaceTimeChart {
    let config = SpaceTimeChartConfig::new(0.0, vec![Scale::with_size(HOUR, 600.0)])
        .with_space_scales(
            0.0,
            vec![
                Scale::with_size(1_000.0, 100.0),
                Scale::with_size(1_000.0, 40.0),
                Scale::with_size(3_000.0, 200.0),
            ],
        );
    SpaceTimeChart::new(config).expect("valid chart")
}

fn px(x: f64, y: f64) -> PixelPoint {
    PixelPoint { x, y }
}

#[test]
fn moving_train_jumps_across_station_band() {
    let chart = station_chart();
    let path = PathData::new(vec![
        PathPoint::new(0.0, 0.0),
        PathPoint::new(HOUR / 2.0, 2_000.0),
    ])
    .expect("valid path");

    assert_eq!(
        chart.project_path(&path),
        vec![
            px(0.0, 0.0),
            px(150.0, 100.0),
            px(150.0, 140.0),
            px(300.0, 240.0)
        ]
    );
}

#[test]
fn stopped_train_stays_on_arrival_edge_then_departs_from_far_edge() {
    let chart = station_chart();
    let path = PathData::new(vec![
        PathPoint::new(0.0, 0.0),
        PathPoint::new(HOUR / 2.0, 1_000.0),
        PathPoint::new(HOUR * 2.0 / 3.0, 1_000.0),
        PathPoint::new(HOUR, 2_000.0),
    ])
    .expect("valid path");

    assert_eq!(
        chart.project_path(&path),
        vec![
            px(0.0, 0.0),
            px(300.0, 100.0),
            px(400.0, 100.0),
            px(400.0, 140.0),
            px(600.0, 240.0)
        ]
    );
}

#[test]
fn backward_train_mirrors_band_edges() {
    let chart = station_chart();
    let path = PathData::new(vec![
        PathPoint::new(0.0, 2_000.0),
        PathPoint::new(HOUR / 2.0, 0.0),
    ])
    .expect("valid path");

    assert_eq!(
        chart.project_path(&path),
        vec![
            px(0.0, 240.0),
            px(150.0, 140.0),
            px(150.0, 100.0),
            px(300.0, 0.0)
        ]
    );
}

#[test]
fn swapped_axes_exchange_canvas_coordinates() {
    let config = station_chart().config().clone().with_swapped_axes(true);
    let chart = SpaceTimeChart::new(config).expect("valid chart");

    let point = chart.point_to_pixel(PathPoint::new(HOUR / 2.0, 500.0), false);
    assert_eq!(point, px(50.0, 300.0));
}

#[test]
fn many_paths_project_like_single_ones() {
    let chart = station_chart();
    let paths: Vec<PathData> = (0..16)
        .map(|i| {
            let start = f64::from(i) * 60_000.0;
            PathData::new(vec![
                PathPoint::new(start, 0.0),
                PathPoint::new(start + HOUR / 4.0, 3_000.0),
            ])
            .expect("valid path")
        })
        .collect();

    let projected = chart.project_paths(&paths);
    assert_eq!(projected.len(), paths.len());
    for (path, polyline) in paths.iter().zip(&projected) {
        assert_eq!(*polyline, chart.project_path(path));
    }
}

#[test]
fn crisp_uses_configured_device_pixel_ratio() {
    let config = station_chart().config().clone().with_device_pixel_ratio(2.0);
    let chart = SpaceTimeChart::new(config).expect("valid chart");

    assert_eq!(chart.crisp(10.3, 1.0), 10.5);
    assert_eq!(chart.crisp(10.3, 1.5), 10.25);
}

#[test]
fn visible_markers_skip_flat_time_steps() {
    let origin = Utc
        .with_ymd_and_hms(2024, 1, 1, 5, 0, 0)
        .single()
        .expect("valid instant")
        .timestamp_millis() as f64;
    let config = SpaceTimeChartConfig::new(
        origin,
        vec![
            Scale::with_size(origin + HOUR, 120.0),
            Scale::with_size(origin + HOUR, 20.0),
            Scale::with_size(origin + 2.0 * HOUR, 120.0),
        ],
    )
    .with_time_zone(TimeAxisTimeZone::Utc);
    let chart = SpaceTimeChart::new(config).expect("valid chart");

    let markers = chart
        .visible_time_markers(0.0, 260.0, &[1_800_000, 3_600_000], &[2, 1])
        .expect("valid intervals");

    let placed: Vec<(f64, u8)> = markers
        .iter()
        .map(|placed| (placed.pixel, placed.marker.level))
        .collect();
    assert_eq!(placed, vec![(0.0, 1), (60.0, 2), (200.0, 2), (260.0, 1)]);
}

#[test]
fn config_deserializes_with_defaults() {
    let config: SpaceTimeChartConfig =
        serde_json::from_str(r#"{"time_origin": 0.0, "time_scales": [{"to": 10.0, "size": 100.0}]}"#)
            .expect("valid json");

    assert_eq!(config.device_pixel_ratio, 1.0);
    assert_eq!(config.time_zone, TimeAxisTimeZone::Local);
    assert!(config.space_scales.is_empty());
    assert!(!config.swap_axes);
}

#[test]
fn invalid_configs_are_rejected() {
    let bad_ratio = SpaceTimeChartConfig::default().with_device_pixel_ratio(0.0);
    assert!(matches!(
        SpaceTimeChart::new(bad_ratio),
        Err(ChartError::InvalidData(_))
    ));

    let bad_scales = SpaceTimeChartConfig::new(0.0, vec![Scale::with_size(10.0, -1.0)]);
    assert_eq!(
        SpaceTimeChart::new(bad_scales),
        Err(ChartError::InvalidScaleExtent { index: 0 })
    );
}
