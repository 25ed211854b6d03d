use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::core::{CoreTrackRange, PathData, PathPoint};
use crate::error::{ChartError, ChartResult};

/// Opaque identifier of a timetable entry to project.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TimetableItemId {
    TrainSchedule(i64),
    PacedTrain(i64),
}

/// Reference to an operational point, as accepted by the projection backend.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(untagged)]
pub enum OperationalPointRef {
    Id {
        operational_point: String,
    },
    Trigram {
        trigram: String,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        secondary_code: Option<String>,
    },
    Uic {
        uic: u32,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        secondary_code: Option<String>,
    },
}

/// Reference path trains are projected onto.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ProjectionPath {
    /// Operational points with the distance (mm) between consecutive ones.
    OperationalPoints {
        operational_points_refs: Vec<OperationalPointRef>,
        operational_points_distances: Vec<u64>,
    },
    TrackRanges {
        track_section_ranges: Vec<CoreTrackRange>,
    },
}

impl ProjectionPath {
    pub(crate) fn validate(&self) -> ChartResult<()> {
        match self {
            Self::OperationalPoints {
                operational_points_refs,
                operational_points_distances,
            } => {
                if operational_points_refs.len() < 2 {
                    return Err(ChartError::InvalidProjectionPath(
                        "Expected at least two refs".to_owned(),
                    ));
                }
                let expected = operational_points_refs.len() - 1;
                let found = operational_points_distances.len();
                if expected != found {
                    return Err(ChartError::InvalidProjectionPath(format!(
                        "Expected {expected} distances, but got {found}"
                    )));
                }
                Ok(())
            }
            Self::TrackRanges {
                track_section_ranges,
            } => {
                if track_section_ranges.is_empty() {
                    return Err(ChartError::InvalidProjectionPath(
                        "track section ranges must not be empty".to_owned(),
                    ));
                }
                Ok(())
            }
        }
    }

    /// Length of the path in mm.
    #[must_use]
    pub fn length(&self) -> u64 {
        match self {
            Self::OperationalPoints {
                operational_points_distances,
                ..
            } => operational_points_distances.iter().sum(),
            Self::TrackRanges {
                track_section_ranges,
            } => track_section_ranges
                .iter()
                .map(CoreTrackRange::length)
                .sum(),
        }
    }
}

/// Fixed context of one loader instance.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProjectionContext {
    pub infra_id: i64,
    pub electrical_profile_set_id: Option<i64>,
    pub path: ProjectionPath,
}

/// Payload of one backend projection call.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ProjectionRequest {
    pub infra_id: i64,
    pub electrical_profile_set_id: Option<i64>,
    pub ids: Vec<TimetableItemId>,
    #[serde(flatten)]
    pub path: Arc<ProjectionPath>,
}

/// Projected positions (mm along the reference path) over time (ms since departure).
///
/// Both vectors have the same length.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct SpaceTimeCurve {
    pub positions: Vec<u64>,
    pub times: Vec<u64>,
}

impl SpaceTimeCurve {
    /// Converts into chart samples, shifting times by `departure_time` (epoch ms).
    pub fn to_path_data(&self, departure_time: i64) -> ChartResult<PathData> {
        if self.positions.len() != self.times.len() {
            return Err(ChartError::InvalidData(format!(
                "space time curve has {} positions for {} times",
                self.positions.len(),
                self.times.len()
            )));
        }
        let points = self
            .times
            .iter()
            .zip(&self.positions)
            .map(|(&time, &position)| {
                PathPoint::new(departure_time as f64 + time as f64, position as f64)
            })
            .collect();
        PathData::new(points)
    }
}

/// Aspect change of one signal seen along the reference path.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SignalUpdate {
    pub signal_id: String,
    pub signaling_system: String,
    /// ms since departure
    pub time_start: u64,
    pub time_end: u64,
    /// mm along the reference path
    pub position_start: u64,
    pub position_end: u64,
    /// ARGB, 8 bits per channel
    pub color: i32,
    pub blinking: bool,
    pub aspect_label: String,
}

/// Projection of one timetable item onto the loader's path.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProjectedTrain {
    pub id: TimetableItemId,
    /// Epoch ms the curve times are relative to.
    pub departure_time: i64,
    pub space_time_curves: Vec<SpaceTimeCurve>,
    #[serde(default)]
    pub signal_updates: Vec<SignalUpdate>,
}
