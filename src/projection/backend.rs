use futures::future::BoxFuture;

use crate::error::ChartResult;

use super::{ProjectedTrain, ProjectionRequest};

/// Remote service computing projections.
///
/// One call per batch. Items missing from the response are treated as not
/// projectable and stay absent from the loader results. Timeouts and retries
/// belong to the implementation.
pub trait ProjectionBackend: Send + Sync + 'static {
    fn project(
        &self,
        request: ProjectionRequest,
    ) -> BoxFuture<'static, ChartResult<Vec<ProjectedTrain>>>;
}
