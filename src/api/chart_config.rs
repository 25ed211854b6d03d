use serde::{Deserialize, Serialize};

use crate::core::{Scale, TimeAxisTimeZone};
use crate::error::{ChartError, ChartResult};

/// Space-time chart bootstrap configuration.
///
/// Serializable so host applications can persist zoom layouts (scale runs)
/// alongside their own view state.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SpaceTimeChartConfig {
    /// Epoch ms where the first time scale starts.
    pub time_origin: f64,
    #[serde(default)]
    pub time_scales: Vec<Scale>,
    /// Path position (mm) where the first space scale starts.
    #[serde(default)]
    pub space_origin: f64,
    #[serde(default)]
    pub space_scales: Vec<Scale>,
    #[serde(default = "default_device_pixel_ratio")]
    pub device_pixel_ratio: f64,
    #[serde(default)]
    pub time_zone: TimeAxisTimeZone,
    /// Draw space horizontally and time vertically.
    #[serde(default)]
    pub swap_axes: bool,
}

fn default_device_pixel_ratio() -> f64 {
    1.0
}

impl Default for SpaceTimeChartConfig {
    fn default() -> Self {
        Self {
            time_origin: 0.0,
            time_scales: Vec::new(),
            space_origin: 0.0,
            space_scales: Vec::new(),
            device_pixel_ratio: default_device_pixel_ratio(),
            time_zone: TimeAxisTimeZone::default(),
            swap_axes: false,
        }
    }
}

impl SpaceTimeChartConfig {
    #[must_use]
    pub fn new(time_origin: f64, time_scales: Vec<Scale>) -> Self {
        Self {
            time_origin,
            time_scales,
            ..Self::default()
        }
    }

    #[must_use]
    pub fn with_space_scales(mut self, space_origin: f64, space_scales: Vec<Scale>) -> Self {
        self.space_origin = space_origin;
        self.space_scales = space_scales;
        self
    }

    #[must_use]
    pub fn with_device_pixel_ratio(mut self, device_pixel_ratio: f64) -> Self {
        self.device_pixel_ratio = device_pixel_ratio;
        self
    }

    #[must_use]
    pub fn with_time_zone(mut self, time_zone: TimeAxisTimeZone) -> Self {
        self.time_zone = time_zone;
        self
    }

    #[must_use]
    pub fn with_swapped_axes(mut self, swap_axes: bool) -> Self {
        self.swap_axes = swap_axes;
        self
    }

    pub(super) fn validate(&self) -> ChartResult<()> {
        if !self.device_pixel_ratio.is_finite() || self.device_pixel_ratio <= 0.0 {
            return Err(ChartError::InvalidData(
                "device pixel ratio must be finite and > 0".to_owned(),
            ));
        }
        Ok(())
    }
}
