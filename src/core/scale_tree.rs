use std::collections::BTreeSet;

use ordered_float::OrderedFloat;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::{ChartError, ChartResult};

/// How one scale segment resolves its pixel extent.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ScaleExtent {
    /// Pixel length of the segment.
    Size(f64),
    /// Domain units per pixel.
    Coefficient(f64),
}

/// One axis segment, ending at domain coordinate `to`.
///
/// The segment starts where the previous one ends (or at the tree origin).
/// Serialized flat, as `{ "to": 10.0, "size": 100.0 }` or
/// `{ "to": 10.0, "coefficient": 0.5 }`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Scale {
    pub to: f64,
    #[serde(flatten)]
    pub extent: ScaleExtent,
}

impl Scale {
    #[must_use]
    pub const fn with_size(to: f64, size: f64) -> Self {
        Self {
            to,
            extent: ScaleExtent::Size(size),
        }
    }

    #[must_use]
    pub const fn with_coefficient(to: f64, coefficient: f64) -> Self {
        Self {
            to,
            extent: ScaleExtent::Coefficient(coefficient),
        }
    }
}

/// Fully resolved segment: domain bounds, pixel bounds and domain units per pixel.
///
/// A coefficient of `0.0` marks a flat step (zero domain length, non-zero pixel length).
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct NormalizedScale {
    pub from: f64,
    pub to: f64,
    pub pixel_from: f64,
    pub pixel_to: f64,
    pub coefficient: f64,
}

impl NormalizedScale {
    const UNBOUNDED: Self = Self {
        from: f64::NEG_INFINITY,
        to: f64::INFINITY,
        pixel_from: f64::NEG_INFINITY,
        pixel_to: f64::INFINITY,
        coefficient: 1.0,
    };

    #[must_use]
    pub fn is_flat(&self) -> bool {
        self.coefficient == 0.0
    }

    fn is_unbounded(&self) -> bool {
        !self.from.is_finite()
    }
}

#[derive(Debug, Clone, PartialEq)]
enum ScaleNode {
    Leaf(usize),
    Branch {
        limit: f64,
        pixel_limit: f64,
        left: Box<ScaleNode>,
        right: Box<ScaleNode>,
    },
}

impl ScaleNode {
    fn build(lo: usize, hi: usize, scales: &[NormalizedScale]) -> Self {
        if hi - lo <= 1 {
            return Self::Leaf(lo);
        }
        let mid = (lo + hi) / 2;
        let boundary = scales[mid - 1];
        Self::Branch {
            limit: boundary.to,
            pixel_limit: boundary.pixel_to,
            left: Box::new(Self::build(lo, mid, scales)),
            right: Box::new(Self::build(mid, hi, scales)),
        }
    }
}

/// Balanced binary tree over a run of non-uniform axis segments.
///
/// Built once per scale-array change, read-only afterwards. Sibling adjacency
/// is the index order of the owned segment list.
#[derive(Debug, Clone, PartialEq)]
pub struct ScaleTree {
    origin: f64,
    scales: Vec<NormalizedScale>,
    root: ScaleNode,
}

impl ScaleTree {
    /// Validates and normalizes `scales`, then indexes them.
    ///
    /// An empty `scales` slice yields a single unbounded identity segment
    /// anchored at `origin`, so lookups never fail.
    pub fn new(origin: f64, scales: &[Scale]) -> ChartResult<Self> {
        if !origin.is_finite() {
            return Err(ChartError::InvalidData(
                "scale origin must be finite".to_owned(),
            ));
        }

        let normalized = normalize_scales(origin, scales)?;
        if normalized.is_empty() {
            return Ok(Self {
                origin,
                scales: vec![NormalizedScale::UNBOUNDED],
                root: ScaleNode::Leaf(0),
            });
        }

        let root = ScaleNode::build(0, normalized.len(), &normalized);
        debug!(
            segment_count = normalized.len(),
            origin,
            "built scale tree"
        );
        Ok(Self {
            origin,
            scales: normalized,
            root,
        })
    }

    #[must_use]
    pub fn origin(&self) -> f64 {
        self.origin
    }

    #[must_use]
    pub fn scales(&self) -> &[NormalizedScale] {
        &self.scales
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.scales.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.scales.is_empty()
    }

    /// Total covered domain range.
    #[must_use]
    pub fn domain_range(&self) -> (f64, f64) {
        (self.first().from, self.last().to)
    }

    /// Total covered pixel range.
    #[must_use]
    pub fn pixel_range(&self) -> (f64, f64) {
        (self.first().pixel_from, self.last().pixel_to)
    }

    /// Finds the segment covering `position`, clamped to the tree bounds.
    ///
    /// On a boundary shared by several segments, `pick_last == false` selects
    /// the segment that ends there and `pick_last == true` the one that
    /// starts there.
    #[must_use]
    pub fn scale_at_position(&self, position: f64, pick_last: bool) -> &NormalizedScale {
        &self.scales[self.index_at_position(position, pick_last)]
    }

    #[must_use]
    pub fn scale_at_pixel(&self, pixel: f64) -> &NormalizedScale {
        let (min, max) = self.pixel_range();
        let pixel = pixel.clamp(min, max);
        let mut node = &self.root;
        loop {
            match node {
                ScaleNode::Leaf(index) => return &self.scales[*index],
                ScaleNode::Branch {
                    pixel_limit,
                    left,
                    right,
                    ..
                } => {
                    node = if pixel <= *pixel_limit { left } else { right };
                }
            }
        }
    }

    /// Maps a domain position to its pixel offset.
    ///
    /// `from_end` picks the far edge at boundaries and flat steps.
    #[must_use]
    pub fn space_to_pixel(&self, position: f64, from_end: bool) -> f64 {
        let scale = self.scale_at_position(position, from_end);
        if scale.is_unbounded() {
            return (position - self.origin) / scale.coefficient;
        }
        if scale.is_flat() {
            return if from_end {
                scale.pixel_to
            } else {
                scale.pixel_from
            };
        }

        let position = position.clamp(scale.from, scale.to);
        scale.pixel_from + (position - scale.from) / scale.coefficient
    }

    #[must_use]
    pub fn pixel_to_space(&self, pixel: f64) -> f64 {
        let scale = self.scale_at_pixel(pixel);
        if scale.is_unbounded() {
            return self.origin + pixel * scale.coefficient;
        }

        let pixel = pixel.clamp(scale.pixel_from, scale.pixel_to);
        scale.from + (pixel - scale.pixel_from) * scale.coefficient
    }

    /// Segment boundaries strictly between `from` and `to` (order-independent).
    ///
    /// Flat steps contribute their boundary once per segment, so a flat step
    /// crossed by the line shows up as a repeated value.
    #[must_use]
    pub fn space_breakpoints(&self, from: f64, to: f64) -> Vec<f64> {
        let (min, max) = self.domain_range();
        let (from, to) = if from <= to { (from, to) } else { (to, from) };
        let from = from.clamp(min, max);
        let to = to.clamp(min, max);

        let mut breakpoints = Vec::new();
        let start = self.index_at_position(from, true);
        for scale in &self.scales[start..] {
            if scale.to >= to {
                break;
            }
            breakpoints.push(scale.to);
        }
        breakpoints
    }

    fn index_at_position(&self, position: f64, pick_last: bool) -> usize {
        let (min, max) = self.domain_range();
        let position = position.clamp(min, max);
        let mut node = &self.root;
        loop {
            match node {
                ScaleNode::Leaf(index) => return *index,
                ScaleNode::Branch {
                    limit, left, right, ..
                } => {
                    let go_right = if pick_last {
                        position >= *limit
                    } else {
                        position > *limit
                    };
                    node = if go_right { right } else { left };
                }
            }
        }
    }

    fn first(&self) -> &NormalizedScale {
        &self.scales[0]
    }

    fn last(&self) -> &NormalizedScale {
        &self.scales[self.scales.len() - 1]
    }
}

/// Domain values where a segment has zero domain length.
pub fn flat_steps(origin: f64, scales: &[Scale]) -> BTreeSet<OrderedFloat<f64>> {
    let mut steps = BTreeSet::new();
    let mut previous = origin;
    for scale in scales {
        if scale.to == previous {
            steps.insert(OrderedFloat(scale.to));
        }
        previous = scale.to;
    }
    steps
}

fn normalize_scales(origin: f64, scales: &[Scale]) -> ChartResult<Vec<NormalizedScale>> {
    let mut normalized = Vec::with_capacity(scales.len());
    let mut from = origin;
    let mut pixel_from = 0.0;

    for (index, scale) in scales.iter().enumerate() {
        if !scale.to.is_finite() || scale.to < from {
            return Err(ChartError::InvalidScaleOrdering {
                index,
                previous: from,
                to: scale.to,
            });
        }

        let length = scale.to - from;
        let (size, coefficient) = match scale.extent {
            ScaleExtent::Size(size) => {
                if !size.is_finite() || size <= 0.0 {
                    return Err(ChartError::InvalidScaleExtent { index });
                }
                (size, length / size)
            }
            ScaleExtent::Coefficient(coefficient) => {
                if !coefficient.is_finite() || coefficient <= 0.0 || length <= 0.0 {
                    return Err(ChartError::InvalidScaleExtent { index });
                }
                (length / coefficient, coefficient)
            }
        };

        let pixel_to = pixel_from + size;
        normalized.push(NormalizedScale {
            from,
            to: scale.to,
            pixel_from,
            pixel_to,
            coefficient,
        });
        from = scale.to;
        pixel_from = pixel_to;
    }

    Ok(normalized)
}
