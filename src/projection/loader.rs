use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use futures::future::{BoxFuture, FutureExt};
use futures::stream::{FuturesUnordered, StreamExt};
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use tracing::{debug, trace, warn};

use crate::error::{ChartError, ChartResult};

use super::{
    ProjectedTrain, ProjectionBackend, ProjectionContext, ProjectionPath, ProjectionRequest,
    TimetableItemId,
};

/// Progress hook. Calls are serialized and never deliver an older state
/// after a newer one; the hook must not call `refresh_timetable_items` or
/// `remove_timetable_items` on the same loader.
pub type ProgressCallbackFn = Arc<dyn Fn(&ProjectionProgress) + Send + Sync + 'static>;
pub type FailureCallbackFn =
    Arc<dyn Fn(&[TimetableItemId], &ChartError) + Send + Sync + 'static>;

/// Work returned by loader operations. Drive it to completion (await or spawn)
/// for the backend calls to run; dropping it abandons them.
pub type ProjectionTask = BoxFuture<'static, ()>;

/// Tuning for backend batching.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProjectionLoaderConfig {
    /// Maximum number of items per backend call.
    pub batch_size: usize,
}

impl Default for ProjectionLoaderConfig {
    fn default() -> Self {
        Self { batch_size: 10 }
    }
}

impl ProjectionLoaderConfig {
    fn validate(self) -> ChartResult<Self> {
        if self.batch_size == 0 {
            return Err(ChartError::InvalidData(
                "projection batch size must be > 0".to_owned(),
            ));
        }
        Ok(self)
    }
}

/// Cumulative state handed to the progress callback.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ProjectionProgress {
    pub projected: IndexMap<TimetableItemId, Arc<ProjectedTrain>>,
    pub all_trains_projected: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum PendingState {
    Wanted,
    /// Inputs changed while in flight: the answer is outdated, ask again.
    Stale,
    /// Un-projected while in flight: drop the answer.
    Unwanted,
}

#[derive(Debug, Default)]
struct LoaderState {
    results: IndexMap<TimetableItemId, Arc<ProjectedTrain>>,
    pending: IndexMap<TimetableItemId, PendingState>,
    cancelled: bool,
    /// Bumped on every change the progress callback must see.
    generation: u64,
}

impl LoaderState {
    fn progress(&self) -> ProjectionProgress {
        ProjectionProgress {
            projected: self.results.clone(),
            all_trains_projected: self.pending.is_empty(),
        }
    }
}

struct LoaderShared<B> {
    backend: Arc<B>,
    infra_id: i64,
    electrical_profile_set_id: Option<i64>,
    path: Arc<ProjectionPath>,
    state: Mutex<LoaderState>,
    /// Generation last handed to `on_progress`; held while the callback runs.
    delivered: Mutex<u64>,
    on_progress: ProgressCallbackFn,
    on_failure: Option<FailureCallbackFn>,
}

impl<B> LoaderShared<B> {
    fn lock(&self) -> MutexGuard<'_, LoaderState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Hands the latest state to `on_progress`.
    ///
    /// The snapshot is taken under the delivery lock, so concurrent batches
    /// settle in any order but the host only ever sees newer states.
    fn notify_progress(&self) {
        let mut delivered = self
            .delivered
            .lock()
            .unwrap_or_else(PoisonError::into_inner);
        let progress = {
            let state = self.lock();
            if state.cancelled || state.generation == *delivered {
                return;
            }
            *delivered = state.generation;
            state.progress()
        };
        (self.on_progress)(&progress);
    }
}

/// Items owned by one batch until the backend answer settles them.
///
/// Dropping an unfinished batch (task dropped or aborted) releases its items
/// so a later call can request them again.
struct InFlightBatch<B> {
    shared: Arc<LoaderShared<B>>,
    ids: Vec<TimetableItemId>,
}

impl<B> Drop for InFlightBatch<B> {
    fn drop(&mut self) {
        if self.ids.is_empty() {
            return;
        }
        let released = {
            let mut state = self.shared.lock();
            let mut released = false;
            for id in &self.ids {
                released |= state.pending.shift_remove(id).is_some();
            }
            if released {
                state.generation += 1;
            }
            released
        };
        if released {
            debug!(count = self.ids.len(), "release abandoned projection batch");
            self.shared.notify_progress();
        }
    }
}

/// Incremental, cancelable projection of timetable items onto one path.
///
/// One instance serves one fixed context (infra, electrical profile set, path).
/// When the context changes, `cancel()` the instance and build a new one.
pub struct TrainProjectionLoader<B: ProjectionBackend> {
    shared: Arc<LoaderShared<B>>,
    config: ProjectionLoaderConfig,
}

impl<B: ProjectionBackend> TrainProjectionLoader<B> {
    pub fn new(
        backend: Arc<B>,
        context: ProjectionContext,
        on_progress: ProgressCallbackFn,
    ) -> ChartResult<Self> {
        context.path.validate()?;
        debug!(
            infra_id = context.infra_id,
            electrical_profile_set_id = ?context.electrical_profile_set_id,
            path_length = context.path.length(),
            "create projection loader"
        );

        Ok(Self {
            shared: Arc::new(LoaderShared {
                backend,
                infra_id: context.infra_id,
                electrical_profile_set_id: context.electrical_profile_set_id,
                path: Arc::new(context.path),
                state: Mutex::new(LoaderState::default()),
                delivered: Mutex::new(0),
                on_progress,
                on_failure: None,
            }),
            config: ProjectionLoaderConfig::default(),
        })
    }

    pub fn with_config(mut self, config: ProjectionLoaderConfig) -> ChartResult<Self> {
        self.config = config.validate()?;
        Ok(self)
    }

    /// Installs the host's failure notification hook.
    ///
    /// Must be called before any work is issued.
    pub fn with_failure_handler(mut self, on_failure: FailureCallbackFn) -> ChartResult<Self> {
        let shared = Arc::get_mut(&mut self.shared).ok_or_else(|| {
            ChartError::InvalidData("failure handler must be set before issuing work".to_owned())
        })?;
        shared.on_failure = Some(on_failure);
        Ok(self)
    }

    /// Ensures `ids` get projected.
    ///
    /// Items already projected or in flight are skipped, so a backend call is
    /// never issued twice for the same item. The returned task resolves once
    /// every batch it issued has been merged.
    pub fn project_timetable_items<I>(&self, ids: I) -> ProjectionTask
    where
        I: IntoIterator<Item = TimetableItemId>,
    {
        let queued = {
            let mut state = self.shared.lock();
            if state.cancelled {
                return futures::future::ready(()).boxed();
            }

            let mut queued = Vec::new();
            for id in ids {
                if state.results.contains_key(&id) {
                    continue;
                }
                match state.pending.get_mut(&id) {
                    Some(pending) => {
                        if *pending == PendingState::Unwanted {
                            *pending = PendingState::Wanted;
                        }
                    }
                    None => {
                        state.pending.insert(id, PendingState::Wanted);
                        queued.push(id);
                    }
                }
            }
            queued
        };

        self.dispatch(queued)
    }

    /// Drops results for `ids` and asks the backend again.
    ///
    /// Items still in flight are re-requested by the task that owns them once
    /// their current call returns.
    pub fn refresh_timetable_items<I>(&self, ids: I) -> ProjectionTask
    where
        I: IntoIterator<Item = TimetableItemId>,
    {
        let (queued, removed_any) = {
            let mut state = self.shared.lock();
            if state.cancelled {
                return futures::future::ready(()).boxed();
            }

            let mut queued = Vec::new();
            let mut removed_any = false;
            for id in ids {
                removed_any |= state.results.shift_remove(&id).is_some();
                match state.pending.get_mut(&id) {
                    Some(pending) => *pending = PendingState::Stale,
                    None => {
                        state.pending.insert(id, PendingState::Wanted);
                        queued.push(id);
                    }
                }
            }
            if removed_any {
                state.generation += 1;
            }
            (queued, removed_any)
        };

        if removed_any {
            self.shared.notify_progress();
        }
        self.dispatch(queued)
    }

    /// Un-projects `ids` (e.g. deselected trains).
    pub fn remove_timetable_items<I>(&self, ids: I)
    where
        I: IntoIterator<Item = TimetableItemId>,
    {
        {
            let mut state = self.shared.lock();
            if state.cancelled {
                return;
            }
            for id in ids {
                state.results.shift_remove(&id);
                if let Some(pending) = state.pending.get_mut(&id) {
                    *pending = PendingState::Unwanted;
                }
            }
            state.generation += 1;
        }
        self.shared.notify_progress();
    }

    /// Makes the loader inert: answers still in flight are discarded and no
    /// further callback fires.
    pub fn cancel(&self) {
        let mut state = self.shared.lock();
        if !state.cancelled {
            debug!(pending = state.pending.len(), "cancel projection loader");
        }
        state.cancelled = true;
    }

    #[must_use]
    pub fn is_cancelled(&self) -> bool {
        self.shared.lock().cancelled
    }

    #[must_use]
    pub fn all_trains_projected(&self) -> bool {
        self.shared.lock().pending.is_empty()
    }

    #[must_use]
    pub fn pending_count(&self) -> usize {
        self.shared.lock().pending.len()
    }

    #[must_use]
    pub fn projected_trains(&self) -> IndexMap<TimetableItemId, Arc<ProjectedTrain>> {
        self.shared.lock().results.clone()
    }

    fn dispatch(&self, queued: Vec<TimetableItemId>) -> ProjectionTask {
        if queued.is_empty() {
            return futures::future::ready(()).boxed();
        }
        debug!(
            count = queued.len(),
            batch_size = self.config.batch_size,
            "queue timetable items for projection"
        );

        let mut batches: FuturesUnordered<_> = queued
            .chunks(self.config.batch_size)
            .map(|chunk| run_batch(Arc::clone(&self.shared), chunk.to_vec()))
            .collect();

        async move { while batches.next().await.is_some() {} }.boxed()
    }
}

/// Builds the batch future. The items are owned from this point on, so a
/// task dropped before its first poll still releases them.
fn run_batch<B: ProjectionBackend>(
    shared: Arc<LoaderShared<B>>,
    ids: Vec<TimetableItemId>,
) -> BoxFuture<'static, ()> {
    let mut batch = InFlightBatch { shared, ids };
    async move {
        while !batch.ids.is_empty() {
            let shared = Arc::clone(&batch.shared);
            let request = ProjectionRequest {
                infra_id: shared.infra_id,
                electrical_profile_set_id: shared.electrical_profile_set_id,
                ids: batch.ids.clone(),
                path: Arc::clone(&shared.path),
            };
            trace!(count = batch.ids.len(), "request projection batch");
            let outcome = shared.backend.project(request).await;

            let (retry, failed) = {
                let mut state = shared.lock();
                if state.cancelled {
                    debug!(
                        count = batch.ids.len(),
                        "discard projection batch after cancel"
                    );
                    batch.ids.clear();
                    return;
                }
                let settled = match outcome {
                    Ok(trains) => (merge_batch(&mut state, &batch.ids, trains), None),
                    Err(err) => {
                        let (retry, failed) = fail_batch(&mut state, &batch.ids);
                        (retry, Some((failed, err)))
                    }
                };
                state.generation += 1;
                settled
            };
            batch.ids = retry;

            if let Some((failed, err)) = failed {
                warn!(error = %err, ids = ?failed, "projection batch failed");
                if let Some(on_failure) = &shared.on_failure {
                    if !failed.is_empty() {
                        on_failure(&failed, &err);
                    }
                }
            }
            shared.notify_progress();
        }
    }
    .boxed()
}

/// Merges one successful answer, returning the items to request again.
fn merge_batch(
    state: &mut LoaderState,
    ids: &[TimetableItemId],
    trains: Vec<ProjectedTrain>,
) -> Vec<TimetableItemId> {
    let mut answered: IndexMap<TimetableItemId, ProjectedTrain> = trains
        .into_iter()
        .map(|train| (train.id, train))
        .collect();

    let mut retry = Vec::new();
    for id in ids {
        let answer = answered.shift_remove(id);
        match state.pending.get(id).copied() {
            Some(PendingState::Wanted) => {
                state.pending.shift_remove(id);
                match answer {
                    Some(train) => {
                        state.results.insert(*id, Arc::new(train));
                    }
                    None => trace!(id = ?id, "backend returned no projection"),
                }
            }
            Some(PendingState::Stale) => {
                state.pending.insert(*id, PendingState::Wanted);
                retry.push(*id);
            }
            Some(PendingState::Unwanted) | None => {
                state.pending.shift_remove(id);
            }
        }
    }

    if !answered.is_empty() {
        trace!(
            count = answered.len(),
            "ignore projections for items outside the batch"
        );
    }
    debug!(
        projected = state.results.len(),
        pending = state.pending.len(),
        "merge projection batch"
    );
    retry
}

/// Settles a failed batch, returning the items to request again and the
/// failed items still wanted by the host.
fn fail_batch(
    state: &mut LoaderState,
    ids: &[TimetableItemId],
) -> (Vec<TimetableItemId>, Vec<TimetableItemId>) {
    let mut retry = Vec::new();
    let mut failed = Vec::new();
    for id in ids {
        match state.pending.get(id).copied() {
            Some(PendingState::Wanted) => {
                state.pending.shift_remove(id);
                failed.push(*id);
            }
            Some(PendingState::Stale) => {
                state.pending.insert(*id, PendingState::Wanted);
                retry.push(*id);
            }
            Some(PendingState::Unwanted) | None => {
                state.pending.shift_remove(id);
            }
        }
    }
    (retry, failed)
}
