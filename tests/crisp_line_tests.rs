use proptest::prelude::*;
use spacetime_rs::render::{aliased_disc_shape, crisp_line_coordinate, picking_color, picking_index};

#[test]
fn odd_width_lines_land_on_pixel_centers() {
    assert_eq!(crisp_line_coordinate(10.2, 1.0, 1.0), 10.5);
    assert_eq!(crisp_line_coordinate(10.0, 1.0, 1.0), 10.5);
    assert_eq!(crisp_line_coordinate(10.9, 3.0, 1.0), 10.5);
    assert_eq!(crisp_line_coordinate(-3.2, 1.0, 1.0), -3.5);
}

#[test]
fn even_width_lines_land_on_pixel_edges() {
    assert_eq!(crisp_line_coordinate(10.4, 2.0, 1.0), 10.0);
    assert_eq!(crisp_line_coordinate(10.5, 2.0, 1.0), 11.0);
    assert_eq!(crisp_line_coordinate(-2.5, 2.0, 1.0), -2.0);
}

#[test]
fn parity_is_evaluated_in_physical_pixels() {
    // 1 logical px at ratio 2 is 2 physical px: even.
    assert_eq!(crisp_line_coordinate(10.3, 1.0, 2.0), 10.5);
    assert_eq!(crisp_line_coordinate(10.25, 1.0, 2.0), 10.5);
    // 1.5 logical px at ratio 2 is 3 physical px: odd.
    assert_eq!(crisp_line_coordinate(10.3, 1.5, 2.0), 10.25);
}

#[test]
fn fractional_widths_round_before_parity() {
    assert_eq!(crisp_line_coordinate(10.2, 0.5, 1.0), 10.5);
    assert_eq!(crisp_line_coordinate(10.2, 1.2, 1.0), 10.5);
    assert_eq!(crisp_line_coordinate(10.2, 1.6, 1.0), 10.0);
}

#[test]
fn disc_masks_match_reference_shapes() {
    assert_eq!(aliased_disc_shape(0), vec![1]);
    assert_eq!(aliased_disc_shape(1), vec![0, 1, 0, 1, 1, 1, 0, 1, 0]);
    assert_eq!(
        aliased_disc_shape(2),
        vec![
            0, 1, 1, 1, 0, //
            1, 1, 1, 1, 1, //
            1, 1, 1, 1, 1, //
            1, 1, 1, 1, 1, //
            0, 1, 1, 1, 0,
        ]
    );
}

#[test]
fn larger_discs_are_symmetric_and_sized() {
    let radius = 7u32;
    let side = (2 * radius + 1) as usize;
    let mask = aliased_disc_shape(radius);
    assert_eq!(mask.len(), side * side);
    for y in 0..side {
        for x in 0..side {
            assert_eq!(mask[y * side + x], mask[x * side + y]);
            assert_eq!(mask[y * side + x], mask[(side - 1 - y) * side + x]);
        }
    }
    assert_eq!(mask[radius as usize], 1);
    assert_eq!(mask[0], 0);
}

#[test]
fn picking_colors_round_trip_indices() {
    assert_eq!(picking_color(0), Some([0, 0, 1, 255]));
    for index in [0u32, 1, 255, 256, 65_535, 0x00FF_FFFE] {
        let color = picking_color(index).expect("index in range");
        assert_eq!(picking_index(color), Some(index));
    }
    assert_eq!(picking_color(0x00FF_FFFF), None);
}

#[test]
fn empty_or_blended_picking_pixels_resolve_nothing() {
    assert_eq!(picking_index([0, 0, 0, 255]), None);
    assert_eq!(picking_index([0, 0, 0, 0]), None);
    assert_eq!(picking_index([1, 2, 3, 128]), None);
    assert_eq!(picking_index([1, 2, 3, 255]), Some(0x01_0203 - 1));
}

proptest! {
    #[test]
    fn snapping_is_idempotent(
        coordinate in -10_000.0f64..10_000.0,
        line_width in 0.5f64..8.0,
        device_pixel_ratio in prop::sample::select(vec![1.0f64, 2.0, 4.0]),
    ) {
        let once = crisp_line_coordinate(coordinate, line_width, device_pixel_ratio);
        let twice = crisp_line_coordinate(once, line_width, device_pixel_ratio);
        prop_assert_eq!(once, twice);
        prop_assert!((once - coordinate).abs() <= 1.0 / device_pixel_ratio);
    }
}
