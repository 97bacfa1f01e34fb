//! DispatchEngine - validation, per-device fan-out and aggregation

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Instant;

use tokio::sync::Semaphore;
use tracing::{debug, info, instrument, warn};

use adapter_registry::AdapterRegistry;
use contracts::{
    CanonicalPayload, DeviceDescriptor, DispatchEngineConfig, DispatchError, DispatchOutcome,
    DispatchRequest, DispatchResult, PayloadCache, SubjectId, TemplateStore,
};

use crate::metrics::{EngineMetrics, EngineMetricsSnapshot};
use crate::{payload, validate};

/// The dispatch orchestrator
///
/// Holds no per-call state; everything mutable and shared lives in the
/// registry, the worker-pool limiter and the metric counters, so one engine
/// value is cloned freely into spawned dispatch tasks.
#[derive(Clone)]
pub struct DispatchEngine {
    registry: Arc<AdapterRegistry>,
    config: DispatchEngineConfig,
    pub(crate) limiter: Arc<Semaphore>,
    metrics: Arc<EngineMetrics>,
    cache: Option<Arc<dyn PayloadCache>>,
    store: Option<Arc<dyn TemplateStore>>,
}

impl DispatchEngine {
    /// Create an engine over the given registry.
    pub fn new(registry: Arc<AdapterRegistry>, config: DispatchEngineConfig) -> Self {
        let max_concurrent = config.pool.max_concurrent.max(1);
        Self {
            registry,
            config,
            limiter: Arc::new(Semaphore::new(max_concurrent)),
            metrics: Arc::new(EngineMetrics::new()),
            cache: None,
            store: None,
        }
    }

    /// Attach the canonical payload cache collaborator.
    pub fn with_cache(mut self, cache: Arc<dyn PayloadCache>) -> Self {
        self.cache = Some(cache);
        self
    }

    /// Attach the authoritative template store collaborator.
    pub fn with_template_store(mut self, store: Arc<dyn TemplateStore>) -> Self {
        self.store = Some(store);
        self
    }

    /// Engine configuration.
    pub fn config(&self) -> &DispatchEngineConfig {
        &self.config
    }

    /// Snapshot of the engine counters.
    pub fn metrics(&self) -> EngineMetricsSnapshot {
        self.metrics.snapshot()
    }

    /// Dispatch one request synchronously on the caller's task.
    ///
    /// Only a malformed request fails the call; per-device trouble
    /// (unresolvable adapter, adapter error, adapter panic, timeout) is
    /// recorded in the result and never aborts the remaining devices. The
    /// returned outcome map carries one entry per requested device.
    #[instrument(
        name = "engine_dispatch",
        skip(self, request),
        fields(
            request_id = %request.request_id,
            subject_id = %request.subject_id,
            devices = request.devices.len()
        )
    )]
    pub async fn dispatch(
        &self,
        request: &DispatchRequest,
    ) -> Result<DispatchResult, DispatchError> {
        let started = Instant::now();

        if let Err(e) = validate::validate_request(request) {
            self.metrics.inc_validation_failure_count();
            warn!(error = %e, "request rejected by validation");
            return Err(e);
        }

        let canonical = Arc::new(CanonicalPayload::from_request(request));
        payload::write_back(self.cache.as_deref(), &canonical).await;

        let mut outcomes = HashMap::with_capacity(request.devices.len());
        for device in &request.devices {
            let outcome = self.dispatch_to_device(device, Arc::clone(&canonical)).await;
            if outcome.success {
                self.metrics.inc_device_success_count();
            } else {
                self.metrics.inc_device_failure_count();
                warn!(
                    device_id = %device.id,
                    failure = ?outcome.failure,
                    message = %outcome.message,
                    "device dispatch failed"
                );
            }
            outcomes.insert(device.id.clone(), outcome);
        }

        let result = DispatchResult::from_outcomes(
            request.request_id.clone(),
            request.subject_id.clone(),
            outcomes,
            started.elapsed(),
        );
        self.metrics.inc_request_count();
        info!(
            success = result.success,
            ok = result.success_count,
            failed = result.failure_count,
            elapsed_ms = result.elapsed.as_millis() as u64,
            "dispatch complete"
        );
        Ok(result)
    }

    /// Re-dispatch only the devices that failed in `previous`.
    ///
    /// Builds a request scoped to the failed subset of `original`'s targets,
    /// dispatches it, and merges the fresh outcomes over a copy of the
    /// previous outcome map. An all-success input comes back unchanged
    /// without touching any adapter.
    #[instrument(
        name = "engine_retry_failed",
        skip(self, previous, original),
        fields(request_id = %previous.request_id)
    )]
    pub async fn retry_failed_devices(
        &self,
        previous: &DispatchResult,
        original: &DispatchRequest,
    ) -> Result<DispatchResult, DispatchError> {
        let failed: Vec<DeviceDescriptor> = original
            .devices
            .iter()
            .filter(|d| {
                previous
                    .device_outcomes
                    .get(&d.id)
                    .is_some_and(|o| !o.success)
            })
            .cloned()
            .collect();

        if failed.is_empty() {
            debug!("no failed devices, returning previous result unchanged");
            return Ok(previous.clone());
        }

        info!(retrying = failed.len(), "retrying failed devices");
        let retry_request = original.scoped_to(failed);
        let retry_result = self.dispatch(&retry_request).await?;
        self.metrics.inc_retry_count();

        // Fresh outcomes overwrite the old entries for the retried devices;
        // everything else keeps its original outcome.
        let mut merged = previous.device_outcomes.clone();
        merged.extend(retry_result.device_outcomes);

        Ok(DispatchResult::from_outcomes(
            previous.request_id.clone(),
            previous.subject_id.clone(),
            merged,
            retry_result.elapsed,
        ))
    }

    /// Canonical payload for a subject, read-through against the cache.
    ///
    /// On miss the payload is rebuilt from the template store and written
    /// back best-effort. Requires a template store collaborator.
    pub async fn payload_for_subject(
        &self,
        subject_id: &SubjectId,
    ) -> Result<CanonicalPayload, DispatchError> {
        let store = self.store.as_deref().ok_or_else(|| {
            DispatchError::store(subject_id.as_str(), "no template store configured")
        })?;
        payload::read_through(self.cache.as_deref(), store, subject_id).await
    }

    /// Dispatch the canonical payload to one device.
    ///
    /// The adapter call runs in its own task so a panicking adapter is
    /// isolated and recorded instead of unwinding through the engine.
    async fn dispatch_to_device(
        &self,
        device: &DeviceDescriptor,
        canonical: Arc<CanonicalPayload>,
    ) -> DispatchOutcome {
        let Some(adapter) = self.registry.resolve(device) else {
            debug!(
                device_id = %device.id,
                device_type = %device.device_type,
                "no adapter resolved"
            );
            return DispatchOutcome::not_supported(&device.device_type);
        };

        let device_id = device.id.clone();
        let device = device.clone();
        let call = tokio::spawn(async move { adapter.dispatch(&device, &canonical).await });
        let abort = call.abort_handle();

        let joined = match self.config.adapter_timeout() {
            Some(limit) => match tokio::time::timeout(limit, call).await {
                Ok(joined) => joined,
                Err(_) => {
                    abort.abort();
                    warn!(device_id = %device_id, limit_ms = limit.as_millis() as u64, "adapter call timed out");
                    return DispatchOutcome::timed_out(limit.as_millis() as u64);
                }
            },
            None => call.await,
        };

        match joined {
            Ok(Ok(outcome)) => outcome,
            Ok(Err(e)) => DispatchOutcome::fault(format!(
                "adapter raised an error for device '{device_id}': {e}"
            )),
            Err(join_error) => DispatchOutcome::fault(format!(
                "adapter task failed for device '{device_id}': {join_error}"
            )),
        }
    }
}
