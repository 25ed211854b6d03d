use std::collections::BTreeMap;

use chrono::{
    DateTime, Datelike, Days, FixedOffset, Local, NaiveDateTime, NaiveTime, TimeDelta,
    TimeZone, Utc,
};
use serde::{Deserialize, Serialize};

use crate::error::{ChartError, ChartResult};

const MS_PER_DAY: i64 = 24 * 60 * 60 * 1000;

/// Zone in which gridline boundaries ("midnight", "6am") are evaluated.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub enum TimeAxisTimeZone {
    /// Platform zone of the running process.
    #[default]
    Local,
    Utc,
    FixedOffsetMinutes {
        minutes: i16,
    },
}

impl TimeAxisTimeZone {
    fn fixed_offset(minutes: i16) -> ChartResult<FixedOffset> {
        FixedOffset::east_opt(i32::from(minutes) * 60).ok_or_else(|| {
            ChartError::InvalidData(format!("time zone offset {minutes} min is out of range"))
        })
    }
}

/// One gridline: epoch milliseconds and its display level (lower is more prominent).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TimeMarker {
    pub time: i64,
    pub level: u8,
}

/// Gridlines visible in `[min_time, max_time]` (epoch ms, inclusive).
///
/// `intervals_ms` must be ascending; `levels[i]` is the level drawn for
/// `intervals_ms[i]`, with `0` meaning the spacing is too dense to draw.
/// An instant lying on several boundaries takes the level of the coarsest
/// interval. Boundaries are aligned on wall-clock time in `time_zone`.
pub fn compute_visible_time_markers(
    min_time: i64,
    max_time: i64,
    intervals_ms: &[i64],
    levels: &[u8],
    time_zone: TimeAxisTimeZone,
) -> ChartResult<Vec<TimeMarker>> {
    match time_zone {
        TimeAxisTimeZone::Local => {
            compute_time_markers_in(min_time, max_time, intervals_ms, levels, &Local)
        }
        TimeAxisTimeZone::Utc => {
            compute_time_markers_in(min_time, max_time, intervals_ms, levels, &Utc)
        }
        TimeAxisTimeZone::FixedOffsetMinutes { minutes } => {
            let offset = TimeAxisTimeZone::fixed_offset(minutes)?;
            compute_time_markers_in(min_time, max_time, intervals_ms, levels, &offset)
        }
    }
}

/// Same as [`compute_visible_time_markers`] for any `chrono` time zone.
pub fn compute_time_markers_in<Tz: TimeZone>(
    min_time: i64,
    max_time: i64,
    intervals_ms: &[i64],
    levels: &[u8],
    zone: &Tz,
) -> ChartResult<Vec<TimeMarker>> {
    if intervals_ms.len() != levels.len() {
        return Err(ChartError::InvalidData(format!(
            "expected {} marker levels, got {}",
            intervals_ms.len(),
            levels.len()
        )));
    }
    if intervals_ms.iter().any(|&interval| interval <= 0) {
        return Err(ChartError::InvalidData(
            "marker intervals must be > 0".to_owned(),
        ));
    }
    if intervals_ms.windows(2).any(|pair| pair[0] > pair[1]) {
        return Err(ChartError::InvalidData(
            "marker intervals must be ascending".to_owned(),
        ));
    }
    if min_time > max_time {
        return Ok(Vec::new());
    }

    let local_min = local_datetime(min_time, zone)?;
    let local_max = local_datetime(max_time, zone)?;

    let mut markers: BTreeMap<i64, u8> = BTreeMap::new();
    for (&interval, &level) in intervals_ms.iter().zip(levels).rev() {
        if level == 0 {
            continue;
        }
        for time in boundaries_in_range(interval, local_min, local_max, max_time, zone) {
            if (min_time..=max_time).contains(&time) {
                markers.entry(time).or_insert(level);
            }
        }
    }

    Ok(markers
        .into_iter()
        .map(|(time, level)| TimeMarker { time, level })
        .collect())
}

fn local_datetime<Tz: TimeZone>(time: i64, zone: &Tz) -> ChartResult<NaiveDateTime> {
    let utc = DateTime::<Utc>::from_timestamp_millis(time).ok_or_else(|| {
        ChartError::InvalidData(format!("timestamp {time} ms is out of range"))
    })?;
    Ok(utc.with_timezone(zone).naive_local())
}

/// Epoch instants of the wall-clock boundaries of `interval` between
/// `local_min` and `max_time`, walking the local days of the range padded by
/// one day on each side.
///
/// Sub-day intervals restart at each local midnight; each day's walk starts
/// at the first boundary not before `local_min` and stops past `max_time`.
/// Multi-day intervals step over local midnights whose day count since the
/// CE epoch is a multiple of the interval.
///
/// Ambiguous wall-clock times resolve to their earliest instant, which keeps
/// instants non-decreasing along the walk, so stopping early loses nothing.
fn boundaries_in_range<Tz: TimeZone>(
    interval: i64,
    local_min: NaiveDateTime,
    local_max: NaiveDateTime,
    max_time: i64,
    zone: &Tz,
) -> Vec<i64> {
    let mut instants = Vec::new();
    let (first_day, last_day) = (local_min.date(), local_max.date());
    let start = first_day.checked_sub_days(Days::new(1)).unwrap_or(first_day);
    let end = last_day.checked_add_days(Days::new(1)).unwrap_or(last_day);

    let mut day = start;
    while day <= end {
        let midnight = day.and_time(NaiveTime::MIN);
        if interval < MS_PER_DAY {
            let skipped = (local_min - midnight).num_milliseconds().max(0);
            let mut offset = (skipped + interval - 1) / interval * interval;
            while offset < MS_PER_DAY {
                if let Some(instant) = resolve_local(midnight, offset, zone) {
                    if instant > max_time {
                        break;
                    }
                    instants.push(instant);
                }
                offset += interval;
            }
        } else if interval % MS_PER_DAY == 0 {
            let days = interval / MS_PER_DAY;
            if i64::from(day.num_days_from_ce()) % days == 0 {
                if let Some(instant) = resolve_local(midnight, 0, zone) {
                    instants.push(instant);
                }
            }
        }

        match day.succ_opt() {
            Some(next) => day = next,
            None => break,
        }
    }
    instants
}

fn resolve_local<Tz: TimeZone>(midnight: NaiveDateTime, offset_ms: i64, zone: &Tz) -> Option<i64> {
    let wall_clock = midnight.checked_add_signed(TimeDelta::try_milliseconds(offset_ms)?)?;
    zone.from_local_datetime(&wall_clock)
        .earliest()
        .map(|instant| instant.timestamp_millis())
}

#[cfg(test)]
mod tests {
    use chrono::{NaiveDate, NaiveDateTime, Utc};

    use super::boundaries_in_range;

    const HOUR: i64 = 60 * 60 * 1000;

    fn at(day: u32, hour: u32, minute: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2024, 3, day)
            .and_then(|date| date.and_hms_opt(hour, minute, 0))
            .expect("valid local time")
    }

    #[test]
    fn sub_day_boundaries_restart_at_midnight() {
        let (min, max) = (at(1, 0, 0), at(1, 23, 0));
        let max_time = max.and_utc().timestamp_millis();
        let instants = boundaries_in_range(7 * HOUR, min, max, max_time, &Utc);

        let expected: Vec<i64> = [0, 7, 14, 21]
            .into_iter()
            .map(|hour| at(1, hour, 0).and_utc().timestamp_millis())
            .collect();
        assert_eq!(instants, expected);
    }

    #[test]
    fn walk_is_bounded_by_the_visible_window() {
        let (min, max) = (at(1, 12, 0), at(1, 12, 1));
        let max_time = max.and_utc().timestamp_millis();
        let instants = boundaries_in_range(1_000, min, max, max_time, &Utc);

        assert_eq!(instants.len(), 61);
        assert_eq!(instants[0], min.and_utc().timestamp_millis());
        assert_eq!(instants[60], max_time);
    }

    #[test]
    fn multi_day_intervals_align_on_day_count() {
        let (min, max) = (at(1, 0, 0), at(1, 0, 0));
        let max_time = max.and_utc().timestamp_millis();
        let instants = boundaries_in_range(48 * HOUR, min, max, max_time, &Utc);
        assert!(!instants.is_empty());
        assert!(instants.len() <= 2);
    }
}
