//! spacetime-rs: space-time chart engine for railway timetables.
//!
//! Pure axis math (`core`), canvas pixel helpers (`render`), the lazy train
//! projection pipeline (`projection`) and a chart facade tying the axes
//! together (`api`). Drawing itself is left to the host canvas layer.

pub mod api;
pub mod core;
pub mod error;
pub mod projection;
pub mod render;
pub mod telemetry;

pub use api::{SpaceTimeChart, SpaceTimeChartConfig};
pub use error::{ChartError, ChartResult};
