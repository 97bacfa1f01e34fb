//! DispatchHandle - awaitable handle for pool-bounded dispatch tasks

use std::collections::HashMap;
use std::time::Duration;

use tokio::task::JoinHandle;
use tracing::{error, instrument, warn};

use contracts::{DeviceId, DispatchOutcome, DispatchRequest, DispatchResult, SubjectId};

use crate::engine::DispatchEngine;

/// Handle to a dispatch task submitted to the worker pool
///
/// The task converts every failure into a `DispatchResult` value, so joining
/// never surfaces an error to the caller.
pub struct DispatchHandle {
    request_id: String,
    subject_id: SubjectId,
    device_ids: Vec<DeviceId>,
    inner: JoinHandle<DispatchResult>,
}

impl DispatchHandle {
    /// Id of the request the task is dispatching.
    pub fn request_id(&self) -> &str {
        &self.request_id
    }

    /// Whether the task has completed (poll-style check).
    pub fn is_finished(&self) -> bool {
        self.inner.is_finished()
    }

    /// Wait for the dispatch to complete.
    ///
    /// A task that died before producing a result (cancelled, panicked
    /// outside the isolated adapter calls) is reported as a failed result
    /// covering every requested device.
    pub async fn join(self) -> DispatchResult {
        match self.inner.await {
            Ok(result) => result,
            Err(join_error) => {
                error!(
                    request_id = %self.request_id,
                    error = %join_error,
                    "dispatch task died before producing a result"
                );
                let message = format!("dispatch task failed: {join_error}");
                let outcomes: HashMap<DeviceId, DispatchOutcome> = self
                    .device_ids
                    .into_iter()
                    .map(|id| (id, DispatchOutcome::request_rejected(&message)))
                    .collect();
                DispatchResult::from_outcomes(
                    self.request_id,
                    self.subject_id,
                    outcomes,
                    Duration::ZERO,
                )
            }
        }
    }
}

impl DispatchEngine {
    /// Submit a dispatch to the bounded worker pool.
    ///
    /// Returns immediately; the unit of work runs to completion before its
    /// result is observable through the handle. A hard request failure
    /// (validation) inside the task becomes a failed result value, never an
    /// unhandled task error.
    #[instrument(
        name = "engine_dispatch_async",
        skip(self, request),
        fields(request_id = %request.request_id)
    )]
    pub fn dispatch_async(&self, request: DispatchRequest) -> DispatchHandle {
        let engine = self.clone();
        let limiter = self.limiter.clone();
        let request_id = request.request_id.clone();
        let subject_id = request.subject_id.clone();
        let device_ids = request.device_ids();

        let inner = tokio::spawn(async move {
            let _permit = match limiter.acquire_owned().await {
                Ok(permit) => permit,
                Err(_) => return DispatchResult::rejected(&request, "worker pool closed"),
            };
            match engine.dispatch(&request).await {
                Ok(result) => result,
                Err(e) => {
                    warn!(request_id = %request.request_id, error = %e, "async dispatch rejected");
                    DispatchResult::rejected(&request, e.to_string())
                }
            }
        });

        DispatchHandle {
            request_id,
            subject_id,
            device_ids,
            inner,
        }
    }
}
