//! Canonical payload build / cache plumbing
//!
//! The cache is best-effort on the write side: a failed put is logged and
//! the dispatching caller never sees it.

use tracing::{debug, instrument, warn};

use contracts::{
    BiometricRecord, CanonicalPayload, DispatchError, PayloadCache, SubjectId, TemplateStore,
};

/// Read-through payload lookup for a subject.
///
/// Cache hit wins; on miss the payload is rebuilt from the authoritative
/// store (skipping undispatchable records), grouped by modality, and written
/// back best-effort.
#[instrument(name = "payload_read_through", skip(cache, store), fields(subject_id = %subject_id))]
pub(crate) async fn read_through(
    cache: Option<&dyn PayloadCache>,
    store: &dyn TemplateStore,
    subject_id: &SubjectId,
) -> Result<CanonicalPayload, DispatchError> {
    if let Some(cache) = cache {
        if let Some(hit) = cache.get(subject_id).await {
            debug!(records = hit.record_count(), "canonical payload cache hit");
            return Ok(hit);
        }
    }

    let records = store.load_records(subject_id).await?;
    let dispatchable: Vec<BiometricRecord> = records
        .into_iter()
        .filter(BiometricRecord::is_dispatchable)
        .collect();
    debug!(records = dispatchable.len(), "rebuilt canonical payload from store");

    let payload = CanonicalPayload::from_records(subject_id.clone(), dispatchable);
    write_back(cache, &payload).await;
    Ok(payload)
}

/// Best-effort cache write; failures are logged and swallowed.
pub(crate) async fn write_back(cache: Option<&dyn PayloadCache>, payload: &CanonicalPayload) {
    let Some(cache) = cache else { return };
    if let Err(e) = cache.put(&payload.subject_id, payload).await {
        warn!(
            subject_id = %payload.subject_id,
            error = %e,
            "canonical payload cache write failed"
        );
    }
}
