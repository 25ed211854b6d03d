mod chart_config;
mod space_time_chart;

pub use chart_config::SpaceTimeChartConfig;
pub use space_time_chart::{PixelPoint, PlacedTimeMarker, SpaceTimeChart};
