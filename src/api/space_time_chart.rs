use std::collections::BTreeSet;

use ordered_float::OrderedFloat;
#[cfg(feature = "parallel-projection")]
use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::core::{
    PathData, PathPoint, ScaleTree, TimeMarker, compute_visible_time_markers, flat_steps,
    split_segment_at_breakpoints,
};
use crate::error::ChartResult;
use crate::render::crisp_line_coordinate;

use super::SpaceTimeChartConfig;

/// Logical pixel coordinates on the chart canvas.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PixelPoint {
    pub x: f64,
    pub y: f64,
}

/// Time gridline resolved to its pixel offset along the time axis.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PlacedTimeMarker {
    pub marker: TimeMarker,
    pub pixel: f64,
}

/// Space-time chart geometry: one scale tree per axis plus canvas settings.
///
/// Rebuild it whenever scales or the device pixel ratio change; every query
/// is then read-only.
#[derive(Debug, Clone, PartialEq)]
pub struct SpaceTimeChart {
    config: SpaceTimeChartConfig,
    time_tree: ScaleTree,
    space_tree: ScaleTree,
    flat_time_steps: BTreeSet<OrderedFloat<f64>>,
}

impl SpaceTimeChart {
    pub fn new(config: SpaceTimeChartConfig) -> ChartResult<Self> {
        config.validate()?;
        let time_tree = ScaleTree::new(config.time_origin, &config.time_scales)?;
        let space_tree = ScaleTree::new(config.space_origin, &config.space_scales)?;
        let flat_time_steps = flat_steps(config.time_origin, &config.time_scales);
        debug!(
            time_segments = time_tree.len(),
            space_segments = space_tree.len(),
            device_pixel_ratio = config.device_pixel_ratio,
            "build space-time chart"
        );

        Ok(Self {
            config,
            time_tree,
            space_tree,
            flat_time_steps,
        })
    }

    #[must_use]
    pub fn config(&self) -> &SpaceTimeChartConfig {
        &self.config
    }

    #[must_use]
    pub fn time_tree(&self) -> &ScaleTree {
        &self.time_tree
    }

    #[must_use]
    pub fn space_tree(&self) -> &ScaleTree {
        &self.space_tree
    }

    #[must_use]
    pub fn time_to_pixel(&self, time: f64) -> f64 {
        self.time_tree.space_to_pixel(time, false)
    }

    #[must_use]
    pub fn pixel_to_time(&self, pixel: f64) -> f64 {
        self.time_tree.pixel_to_space(pixel)
    }

    #[must_use]
    pub fn space_to_pixel(&self, position: f64, from_end: bool) -> f64 {
        self.space_tree.space_to_pixel(position, from_end)
    }

    #[must_use]
    pub fn pixel_to_space(&self, pixel: f64) -> f64 {
        self.space_tree.pixel_to_space(pixel)
    }

    /// Snaps a logical coordinate for a stroke of `line_width` at the
    /// configured device pixel ratio.
    #[must_use]
    pub fn crisp(&self, coordinate: f64, line_width: f64) -> f64 {
        crisp_line_coordinate(coordinate, line_width, self.config.device_pixel_ratio)
    }

    #[must_use]
    pub fn point_to_pixel(&self, point: PathPoint, from_end: bool) -> PixelPoint {
        self.to_canvas(
            self.time_to_pixel(point.time),
            self.space_to_pixel(point.position, from_end),
        )
    }

    /// Projects a trajectory into a canvas polyline.
    ///
    /// Segments are split at space-scale boundaries. On a flat step the line
    /// leaves from the edge matching the travel direction, and a stopped
    /// train stays on the edge it arrived at.
    #[must_use]
    pub fn project_path(&self, path: &PathData) -> Vec<PixelPoint> {
        let points = path.points();
        let mut polyline = Vec::with_capacity(points.len());

        let mut edge = points
            .windows(2)
            .find(|pair| pair[1].position != pair[0].position)
            .is_some_and(|pair| pair[1].position > pair[0].position);
        push_distinct(&mut polyline, self.point_to_pixel(points[0], edge));

        for pair in points.windows(2) {
            let (a, b) = (pair[0], pair[1]);
            if a.position == b.position {
                push_distinct(&mut polyline, self.point_to_pixel(b, edge));
                continue;
            }

            // Forward travel leaves a boundary from its far edge and reaches
            // the next one on its near edge; backward travel is the mirror.
            let depart = b.position > a.position;
            push_distinct(&mut polyline, self.point_to_pixel(a, depart));

            let split = split_segment_at_breakpoints(&self.space_tree, a, b);
            let inner = &split[1..split.len() - 1];
            let mut previous_position = a.position;
            for point in inner {
                if point.position == previous_position {
                    continue;
                }
                previous_position = point.position;
                push_distinct(&mut polyline, self.point_to_pixel(*point, !depart));
                push_distinct(&mut polyline, self.point_to_pixel(*point, depart));
            }

            edge = !depart;
            push_distinct(&mut polyline, self.point_to_pixel(b, edge));
        }
        polyline
    }

    /// Projects many trajectories. Parallel with the `parallel-projection` feature.
    #[must_use]
    pub fn project_paths(&self, paths: &[PathData]) -> Vec<Vec<PixelPoint>> {
        #[cfg(feature = "parallel-projection")]
        {
            paths.par_iter().map(|path| self.project_path(path)).collect()
        }

        #[cfg(not(feature = "parallel-projection"))]
        {
            paths.iter().map(|path| self.project_path(path)).collect()
        }
    }

    /// Time gridlines between two pixel offsets of the time axis.
    ///
    /// Markers falling on a flat time step are skipped.
    pub fn visible_time_markers(
        &self,
        min_pixel: f64,
        max_pixel: f64,
        intervals_ms: &[i64],
        levels: &[u8],
    ) -> ChartResult<Vec<PlacedTimeMarker>> {
        let (min_pixel, max_pixel) = if min_pixel <= max_pixel {
            (min_pixel, max_pixel)
        } else {
            (max_pixel, min_pixel)
        };
        let min_time = self.pixel_to_time(min_pixel).ceil() as i64;
        let max_time = self.pixel_to_time(max_pixel).floor() as i64;

        let markers = compute_visible_time_markers(
            min_time,
            max_time,
            intervals_ms,
            levels,
            self.config.time_zone,
        )?;
        Ok(markers
            .into_iter()
            .filter(|marker| {
                !self
                    .flat_time_steps
                    .contains(&OrderedFloat(marker.time as f64))
            })
            .map(|marker| PlacedTimeMarker {
                marker,
                pixel: self.time_to_pixel(marker.time as f64),
            })
            .collect())
    }

    fn to_canvas(&self, time_pixel: f64, space_pixel: f64) -> PixelPoint {
        if self.config.swap_axes {
            PixelPoint {
                x: space_pixel,
                y: time_pixel,
            }
        } else {
            PixelPoint {
                x: time_pixel,
                y: space_pixel,
            }
        }
    }
}

fn push_distinct(polyline: &mut Vec<PixelPoint>, point: PixelPoint) {
    if polyline.last() != Some(&point) {
        polyline.push(point);
    }
}
