/// Rounds half-way values toward `+inf`, so `-1.5` and `1.5` both move up.
fn round_half_up(value: f64) -> f64 {
    (value + 0.5).floor()
}

/// Snaps a logical coordinate so a stroke of `line_width` logical pixels
/// lands on whole physical pixels at `device_pixel_ratio`.
///
/// Odd physical widths are centered on half pixels, even widths on pixel
/// edges. Fractional physical widths are rounded first.
#[must_use]
pub fn crisp_line_coordinate(coordinate: f64, line_width: f64, device_pixel_ratio: f64) -> f64 {
    let physical_width = round_half_up(line_width * device_pixel_ratio);
    let physical = coordinate * device_pixel_ratio;

    let snapped = if physical_width.rem_euclid(2.0) == 1.0 {
        round_half_up(physical - 0.5) + 0.5
    } else {
        round_half_up(physical)
    };
    snapped / device_pixel_ratio
}

#[cfg(test)]
mod tests {
    use super::round_half_up;

    #[test]
    fn half_values_round_toward_positive_infinity() {
        assert_eq!(round_half_up(0.5), 1.0);
        assert_eq!(round_half_up(-0.5), 0.0);
        assert_eq!(round_half_up(-1.5), -1.0);
        assert_eq!(round_half_up(2.4), 2.0);
    }
}
