use serde::{Deserialize, Serialize};

use crate::error::{ChartError, ChartResult};

/// Traversal direction of a track section within a path.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum TrackDirection {
    StartToStop,
    StopToStart,
}

/// One contiguous traversal of a track section, offsets in mm.
///
/// `begin <= end` in the section's own frame regardless of `direction`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct CoreTrackRange {
    pub track_section: String,
    pub begin: u64,
    pub end: u64,
    pub direction: TrackDirection,
}

impl CoreTrackRange {
    #[must_use]
    pub fn new(
        track_section: impl Into<String>,
        begin: u64,
        end: u64,
        direction: TrackDirection,
    ) -> Self {
        Self {
            track_section: track_section.into(),
            begin,
            end,
            direction,
        }
    }

    /// Section offset where the traversal enters the range.
    #[must_use]
    pub fn start(&self) -> u64 {
        match self.direction {
            TrackDirection::StartToStop => self.begin,
            TrackDirection::StopToStart => self.end,
        }
    }

    /// Section offset where the traversal leaves the range.
    #[must_use]
    pub fn stop(&self) -> u64 {
        match self.direction {
            TrackDirection::StartToStop => self.end,
            TrackDirection::StopToStart => self.begin,
        }
    }

    #[must_use]
    pub fn length(&self) -> u64 {
        self.end.abs_diff(self.begin)
    }

    fn section_offset(&self, local_offset: u64) -> u64 {
        match self.direction {
            TrackDirection::StartToStop => self.begin + local_offset,
            TrackDirection::StopToStart => self.end.saturating_sub(local_offset),
        }
    }

    fn local_offset(&self, section_offset: u64) -> Option<u64> {
        let (low, high) = (self.begin.min(self.end), self.begin.max(self.end));
        if section_offset < low || section_offset > high {
            return None;
        }
        Some(match self.direction {
            TrackDirection::StartToStop => section_offset - self.begin,
            TrackDirection::StopToStart => self.end - section_offset,
        })
    }
}

/// A concrete location: track section plus offset in mm.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TrackOffset {
    pub track: String,
    pub offset: u64,
}

/// Running total of range lengths, one entry per range.
#[must_use]
pub fn track_length_cumulative_sums(ranges: &[CoreTrackRange]) -> Vec<u64> {
    ranges
        .iter()
        .scan(0u64, |total, range| {
            *total += range.length();
            Some(*total)
        })
        .collect()
}

/// Resolves a path position (mm) into a track section and section offset.
///
/// A position equal to the total path length resolves on the last range.
pub fn find_track_section_offset(
    position: u64,
    cumulative_sums: &[u64],
    ranges: &[CoreTrackRange],
) -> ChartResult<TrackOffset> {
    let index = cumulative_sums.partition_point(|&sum| sum < position);
    if index >= cumulative_sums.len() {
        return Err(ChartError::TrackRangeNotFound { position });
    }
    let range = ranges
        .get(index)
        .ok_or(ChartError::TrackRangeNotFound { position })?;

    let previous = index
        .checked_sub(1)
        .map_or(0, |previous| cumulative_sums[previous]);
    let local_offset = position - previous;

    Ok(TrackOffset {
        track: range.track_section.clone(),
        offset: range.section_offset(local_offset),
    })
}

/// Inverse of [`find_track_section_offset`]: first path position covering
/// `offset` on `track`, or `None` when the path never traverses it.
#[must_use]
pub fn find_path_position(
    track: &str,
    offset: u64,
    cumulative_sums: &[u64],
    ranges: &[CoreTrackRange],
) -> Option<u64> {
    ranges
        .iter()
        .zip(cumulative_sums)
        .find_map(|(range, &sum)| {
            if range.track_section != track {
                return None;
            }
            let local = range.local_offset(offset)?;
            Some(sum - range.length() + local)
        })
}

#[cfg(test)]
mod tests {
    use super::{CoreTrackRange, TrackDirection};

    #[test]
    fn start_and_stop_follow_direction() {
        let forward = CoreTrackRange::new("a", 10, 40, TrackDirection::StartToStop);
        let backward = CoreTrackRange::new("a", 10, 40, TrackDirection::StopToStart);
        assert_eq!((forward.start(), forward.stop()), (10, 40));
        assert_eq!((backward.start(), backward.stop()), (40, 10));
        assert_eq!(backward.length(), 30);
    }

    #[test]
    fn local_offset_rejects_offsets_outside_range() {
        let range = CoreTrackRange::new("a", 10, 40, TrackDirection::StopToStart);
        assert_eq!(range.local_offset(5), None);
        assert_eq!(range.local_offset(40), Some(0));
        assert_eq!(range.local_offset(10), Some(30));
    }
}
