use thiserror::Error;

pub type ChartResult<T> = Result<T, ChartError>;

#[derive(Debug, Clone, PartialEq, Error)]
pub enum ChartError {
    #[error("invalid scale ordering at index {index}: `to`={to} is lower than previous bound {previous}")]
    InvalidScaleOrdering { index: usize, previous: f64, to: f64 },

    #[error("invalid scale extent at index {index}: size and coefficient must be > 0")]
    InvalidScaleExtent { index: usize },

    #[error("No track range found for the given position on path")]
    TrackRangeNotFound { position: u64 },

    #[error("invalid projection path: {0}")]
    InvalidProjectionPath(String),

    #[error("projection backend failure: {0}")]
    Backend(String),

    #[error("invalid data: {0}")]
    InvalidData(String),
}
