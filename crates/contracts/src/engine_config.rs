//! Dispatch engine configuration contracts that can be shared across crates.

use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Dispatch engine configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct DispatchEngineConfig {
    /// Worker pool configuration (async / batch paths)
    #[serde(default)]
    pub pool: WorkerPoolConfig,

    /// Batch configuration
    #[serde(default)]
    pub batch: BatchConfig,

    /// Optional per-adapter-call timeout in milliseconds.
    ///
    /// None preserves the unbounded behavior: a hanging adapter blocks the
    /// dispatch unit that invoked it.
    #[serde(default)]
    pub adapter_timeout_ms: Option<u64>,
}

impl DispatchEngineConfig {
    /// Per-adapter-call timeout as a `Duration`, if configured.
    pub fn adapter_timeout(&self) -> Option<Duration> {
        self.adapter_timeout_ms.map(Duration::from_millis)
    }
}

/// Bounded worker pool configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WorkerPoolConfig {
    /// Maximum dispatch tasks running at once
    pub max_concurrent: usize,
}

impl Default for WorkerPoolConfig {
    fn default() -> Self {
        Self { max_concurrent: 8 }
    }
}

/// Batch dispatch configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BatchConfig {
    /// Requests dispatched concurrently per chunk; the batch joins at each
    /// chunk boundary before starting the next
    pub chunk_size: usize,
}

impl Default for BatchConfig {
    fn default() -> Self {
        Self { chunk_size: 50 }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = DispatchEngineConfig::default();
        assert_eq!(config.pool.max_concurrent, 8);
        assert_eq!(config.batch.chunk_size, 50);
        assert!(config.adapter_timeout().is_none());
    }

    #[test]
    fn test_partial_deserialization_fills_defaults() {
        let config: DispatchEngineConfig =
            serde_json::from_str(r#"{"adapter_timeout_ms": 1500}"#).unwrap();
        assert_eq!(config.adapter_timeout(), Some(Duration::from_millis(1500)));
        assert_eq!(config.batch.chunk_size, 50);
    }
}
