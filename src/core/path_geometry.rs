use serde::{Deserialize, Serialize};

use crate::core::ScaleTree;
use crate::error::{ChartError, ChartResult};

/// One `(time, position)` sample of a train trajectory.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PathPoint {
    pub time: f64,
    pub position: f64,
}

impl PathPoint {
    #[must_use]
    pub const fn new(time: f64, position: f64) -> Self {
        Self { time, position }
    }
}

/// Non-empty, time-ordered trajectory. Position may go back and forth.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PathData {
    points: Vec<PathPoint>,
}

impl PathData {
    pub fn new(points: Vec<PathPoint>) -> ChartResult<Self> {
        if points.is_empty() {
            return Err(ChartError::InvalidData(
                "path data must contain at least one sample".to_owned(),
            ));
        }
        if points
            .iter()
            .any(|point| !point.time.is_finite() || !point.position.is_finite())
        {
            return Err(ChartError::InvalidData(
                "path samples must be finite".to_owned(),
            ));
        }
        Ok(Self { points })
    }

    #[must_use]
    pub fn points(&self) -> &[PathPoint] {
        &self.points
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.points.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PathDirection {
    Forward,
    Backward,
    Still,
}

/// Interpolated position at `time`.
///
/// Outside the sampled time span the position of the earliest or latest
/// sample (by time, not by index) is returned.
#[must_use]
pub fn space_at_time(path: &PathData, time: f64) -> f64 {
    for pair in path.points.windows(2) {
        let (a, b) = (pair[0], pair[1]);
        if a.time <= time && time < b.time {
            let ratio = (time - a.time) / (b.time - a.time);
            return a.position + (b.position - a.position) * ratio;
        }
    }

    let mut earliest = path.points[0];
    let mut latest = path.points[0];
    for point in &path.points[1..] {
        if point.time < earliest.time {
            earliest = *point;
        }
        if point.time >= latest.time {
            latest = *point;
        }
    }

    if time <= earliest.time {
        earliest.position
    } else {
        latest.position
    }
}

/// Direction of travel at `index`, looking at the incoming segment when
/// `from_entering` is set and at the outgoing one otherwise.
///
/// Cusps legitimately yield different answers for each side.
#[must_use]
pub fn path_direction(path: &PathData, index: usize, from_entering: bool) -> PathDirection {
    let neighbors = if from_entering {
        index
            .checked_sub(1)
            .and_then(|previous| path.points.get(previous))
            .zip(path.points.get(index))
    } else {
        path.points
            .get(index)
            .zip(index.checked_add(1).and_then(|next| path.points.get(next)))
    };

    let Some((before, after)) = neighbors else {
        return PathDirection::Still;
    };

    let delta = after.position - before.position;
    if delta > 0.0 {
        PathDirection::Forward
    } else if delta < 0.0 {
        PathDirection::Backward
    } else {
        PathDirection::Still
    }
}

/// Splits the straight segment `a -> b` at every space-scale boundary it
/// crosses, inserting samples with linearly interpolated times.
///
/// The returned samples start with `a` and end with `b`.
#[must_use]
pub fn split_segment_at_breakpoints(
    space_tree: &ScaleTree,
    a: PathPoint,
    b: PathPoint,
) -> Vec<PathPoint> {
    let mut breakpoints = space_tree.space_breakpoints(a.position, b.position);
    if b.position < a.position {
        breakpoints.reverse();
    }

    let mut points = Vec::with_capacity(breakpoints.len() + 2);
    points.push(a);
    let span = b.position - a.position;
    for position in breakpoints {
        let ratio = (position - a.position) / span;
        points.push(PathPoint::new(a.time + (b.time - a.time) * ratio, position));
    }
    points.push(b);
    points
}

#[cfg(test)]
mod tests {
    use super::{PathData, PathPoint, space_at_time};

    #[test]
    fn clamps_to_chronological_extremes_not_array_ends() {
        let path = PathData::new(vec![
            PathPoint::new(10.0, 100.0),
            PathPoint::new(0.0, 50.0),
            PathPoint::new(20.0, 300.0),
            PathPoint::new(5.0, 70.0),
        ])
        .expect("valid path");

        assert_eq!(space_at_time(&path, -1.0), 50.0);
        assert_eq!(space_at_time(&path, 25.0), 300.0);
    }
}
