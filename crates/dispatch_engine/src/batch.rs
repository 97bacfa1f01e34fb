//! Chunked batch dispatch

use tracing::{debug, info, instrument};

use contracts::{DispatchRequest, DispatchResult};

use crate::engine::DispatchEngine;
use crate::handle::DispatchHandle;

impl DispatchEngine {
    /// Dispatch a batch of independent requests, chunked to bound fan-out.
    ///
    /// Requests within a chunk run concurrently on the worker pool; the call
    /// joins on the whole chunk before starting the next one, so cross-chunk
    /// execution is strictly sequential. Results come back in input order,
    /// one per request.
    #[instrument(
        name = "engine_batch_dispatch",
        skip(self, requests),
        fields(requests = requests.len(), chunk_size = self.config().batch.chunk_size)
    )]
    pub async fn batch_dispatch(&self, requests: Vec<DispatchRequest>) -> Vec<DispatchResult> {
        let chunk_size = self.config().batch.chunk_size.max(1);
        let mut results = Vec::with_capacity(requests.len());

        for (index, chunk) in requests.chunks(chunk_size).enumerate() {
            debug!(chunk = index, size = chunk.len(), "dispatching batch chunk");

            let handles: Vec<DispatchHandle> = chunk
                .iter()
                .map(|request| self.dispatch_async(request.clone()))
                .collect();

            // Chunk boundary: every request in this chunk completes before
            // the next chunk is submitted.
            for handle in handles {
                results.push(handle.join().await);
            }
        }

        info!(results = results.len(), "batch dispatch complete");
        results
    }
}
