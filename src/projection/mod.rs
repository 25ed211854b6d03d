//! Lazy projection of timetable items onto a reference path.
//!
//! A [`TrainProjectionLoader`] batches backend calls for newly requested items,
//! merges answers as they arrive and reports the cumulative state through a
//! progress callback, so charts can draw trains progressively.

mod backend;
mod loader;
mod types;

pub use backend::ProjectionBackend;
pub use loader::{
    FailureCallbackFn, ProgressCallbackFn, ProjectionLoaderConfig, ProjectionProgress,
    ProjectionTask, TrainProjectionLoader,
};
pub use types::{
    OperationalPointRef, ProjectedTrain, ProjectionContext, ProjectionPath, ProjectionRequest,
    SignalUpdate, SpaceTimeCurve, TimetableItemId,
};
