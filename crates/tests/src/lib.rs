//! # Integration Tests
//!
//! 集成测试与端到端测试。
//!
//! 负责：
//! - 合约快照测试
//! - 注册表 + 引擎端到端测试（无需真实设备）
//! - 批量分块与重试语义验证

#[cfg(test)]
mod contract_tests {
    #[test]
    fn test_contracts_compile() {
        // 验证 contracts crate 可编译
        assert_eq!(contracts::BiometricKind::ALL.len(), 5);
    }
}

#[cfg(test)]
mod e2e_tests {
    use std::sync::atomic::{AtomicU64, Ordering};
    use std::sync::Arc;
    use std::time::Duration;

    use async_trait::async_trait;
    use bytes::Bytes;
    use chrono::Utc;

    use adapter_registry::{AdapterRegistry, MockAdapter};
    use config_loader::{ConfigFormat, ConfigLoader};
    use contracts::{
        BiometricKind, BiometricRecord, CanonicalPayload, DeviceAdapter, DeviceDescriptor,
        DispatchEngineConfig, DispatchError, DispatchOutcome, DispatchRequest, FailureKind,
        SubjectId, WorkerPoolConfig,
    };
    use dispatch_engine::{DispatchEngine, MemoryPayloadCache, MemoryTemplateStore};
    use observability::DispatchStatsAggregator;

    fn face_record(subject: &str) -> BiometricRecord {
        BiometricRecord {
            record_id: format!("rec-{subject}"),
            subject_id: subject.into(),
            kind: BiometricKind::Face,
            template: Bytes::from_static(b"\x10\x20\x30"),
            quality: 0.92,
            template_version: "v3".to_string(),
            captured_at: Utc::now(),
            algorithm_version: "facenet-7".to_string(),
        }
    }

    fn device(id: &str, device_type: &str) -> DeviceDescriptor {
        DeviceDescriptor::new(id, format!("SITE-{id}"), device_type, "acme")
    }

    /// End-to-end scenario: subject 42, one FACE record, two target devices.
    /// D1 has a registered adapter that succeeds, D2 has none; a later
    /// registration plus retry heals the result.
    ///
    /// 验证完整流程：
    /// 1. 部分失败不阻断批次
    /// 2. 重试只触碰失败设备
    /// 3. 合并结果保留 D1 的原始 outcome
    #[tokio::test]
    async fn test_e2e_partial_failure_then_retry() {
        let registry = Arc::new(AdapterRegistry::new());
        let face = Arc::new(MockAdapter::succeeding("face_terminal"));
        registry.register("acme_face", face.clone());

        let engine = DispatchEngine::new(Arc::clone(&registry), DispatchEngineConfig::default());
        let request = DispatchRequest::new(
            "42",
            vec![face_record("42")],
            vec![device("D1", "face_terminal"), device("D2", "iris_gate")],
        );

        let first = engine.dispatch(&request).await.unwrap();
        assert_eq!(first.success_count, 1);
        assert_eq!(first.failure_count, 1);
        assert!(first.device_outcomes["D1"].success);
        assert_eq!(
            first.device_outcomes["D2"].failure,
            Some(FailureKind::DeviceNotSupported)
        );

        let d1_message = first.device_outcomes["D1"].message.clone();

        // Heal the fleet and retry only the failed subset
        registry.register("acme_iris", Arc::new(MockAdapter::succeeding("iris_gate")));
        let merged = engine.retry_failed_devices(&first, &request).await.unwrap();

        assert!(merged.success);
        assert_eq!(merged.success_count, 2);
        assert_eq!(merged.failure_count, 0);
        assert_eq!(merged.device_outcomes["D1"].message, d1_message);
        // D1's adapter was not re-invoked by the retry
        assert_eq!(face.call_count(), 1);
    }

    /// Retry over an all-success result must not touch any adapter.
    #[tokio::test]
    async fn test_retry_idempotent_on_success() {
        let registry = Arc::new(AdapterRegistry::new());
        let face = Arc::new(MockAdapter::succeeding("face_terminal"));
        registry.register("acme_face", face.clone());
        let engine = DispatchEngine::new(registry, DispatchEngineConfig::default());

        let request = DispatchRequest::new(
            "42",
            vec![face_record("42")],
            vec![device("D1", "face_terminal")],
        );
        let first = engine.dispatch(&request).await.unwrap();
        let retried = engine.retry_failed_devices(&first, &request).await.unwrap();

        assert_eq!(retried.request_id, first.request_id);
        assert_eq!(retried.success_count, first.success_count);
        assert_eq!(retried.failure_count, 0);
        assert_eq!(face.call_count(), 1);
    }

    /// A malformed request never reaches an adapter.
    #[tokio::test]
    async fn test_validation_blocks_adapter_invocation() {
        let registry = Arc::new(AdapterRegistry::new());
        let face = Arc::new(MockAdapter::succeeding("face_terminal"));
        registry.register("acme_face", face.clone());
        let engine = DispatchEngine::new(registry, DispatchEngineConfig::default());

        let mut empty_template = face_record("42");
        empty_template.template = Bytes::new();
        let request = DispatchRequest::new(
            "42",
            vec![empty_template],
            vec![device("D1", "face_terminal")],
        );

        let err = engine.dispatch(&request).await.unwrap_err();
        assert!(matches!(err, DispatchError::Validation { .. }));
        assert_eq!(face.call_count(), 0);
    }

    /// An adapter that panics mid-dispatch is recorded, not propagated.
    #[tokio::test]
    async fn test_adapter_panic_contained() {
        let registry = Arc::new(AdapterRegistry::new());
        registry.register("broken", Arc::new(MockAdapter::panicking("palm_scanner")));
        let engine = DispatchEngine::new(registry, DispatchEngineConfig::default());

        let request = DispatchRequest::new(
            "42",
            vec![face_record("42")],
            vec![device("D3", "palm_scanner")],
        );

        let result = engine.dispatch(&request).await.unwrap();
        let outcome = &result.device_outcomes["D3"];
        assert!(!outcome.success);
        assert!(!outcome.message.is_empty());
        assert_eq!(outcome.failure, Some(FailureKind::AdapterFault));
    }

    /// Adapter that counts concurrent in-flight dispatches.
    struct GaugeAdapter {
        in_flight: AtomicU64,
        peak: AtomicU64,
        calls: AtomicU64,
    }

    impl GaugeAdapter {
        fn new() -> Self {
            Self {
                in_flight: AtomicU64::new(0),
                peak: AtomicU64::new(0),
                calls: AtomicU64::new(0),
            }
        }
    }

    #[async_trait]
    impl DeviceAdapter for GaugeAdapter {
        fn declared_device_type(&self) -> &str {
            "face_terminal"
        }

        fn supports(&self, device: &DeviceDescriptor) -> bool {
            device.device_type.eq_ignore_ascii_case("face_terminal")
        }

        async fn dispatch(
            &self,
            _device: &DeviceDescriptor,
            _payload: &CanonicalPayload,
        ) -> Result<DispatchOutcome, DispatchError> {
            let now = self.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
            self.peak.fetch_max(now, Ordering::SeqCst);
            self.calls.fetch_add(1, Ordering::SeqCst);
            tokio::time::sleep(Duration::from_millis(5)).await;
            self.in_flight.fetch_sub(1, Ordering::SeqCst);
            Ok(DispatchOutcome::ok("accepted"))
        }
    }

    /// 120 requests with chunk size 50: 3 chunks, results in input order,
    /// and the chunk boundary caps concurrent fan-out.
    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_batch_chunking() {
        let registry = Arc::new(AdapterRegistry::new());
        let gauge = Arc::new(GaugeAdapter::new());
        registry.register("face", gauge.clone());

        let config = DispatchEngineConfig {
            pool: WorkerPoolConfig { max_concurrent: 64 },
            ..Default::default()
        };
        assert_eq!(config.batch.chunk_size, 50);
        let engine = DispatchEngine::new(registry, config);

        let requests: Vec<DispatchRequest> = (0..120)
            .map(|n| {
                DispatchRequest::new(
                    format!("subject-{n}"),
                    vec![face_record(&format!("subject-{n}"))],
                    vec![device(&format!("D{n}"), "face_terminal")],
                )
            })
            .collect();
        let expected: Vec<String> = requests.iter().map(|r| r.request_id.clone()).collect();

        let results = engine.batch_dispatch(requests).await;

        assert_eq!(results.len(), 120);
        let got: Vec<String> = results.iter().map(|r| r.request_id.clone()).collect();
        assert_eq!(got, expected);
        assert!(results.iter().all(|r| r.success));
        assert_eq!(gauge.calls.load(Ordering::SeqCst), 120);
        // The join at each chunk boundary keeps fan-out within one chunk
        assert!(gauge.peak.load(Ordering::SeqCst) <= 50);
    }

    /// Async handle converts an in-task validation failure into a failed
    /// result instead of an unhandled task error.
    #[tokio::test]
    async fn test_async_handle_never_errors() {
        let registry = Arc::new(AdapterRegistry::new());
        registry.register("face", Arc::new(MockAdapter::succeeding("face_terminal")));
        let engine = DispatchEngine::new(registry, DispatchEngineConfig::default());

        let mut bad = face_record("42");
        bad.template = Bytes::new();
        let request = DispatchRequest::new(
            "42",
            vec![bad],
            vec![device("D1", "face_terminal"), device("D2", "face_terminal")],
        );

        let handle = engine.dispatch_async(request);
        let result = tokio::time::timeout(Duration::from_secs(2), handle.join())
            .await
            .expect("async dispatch timed out");

        assert!(!result.success);
        assert_eq!(result.device_outcomes.len(), 2);
        assert!(result
            .device_outcomes
            .values()
            .all(|o| o.failure == Some(FailureKind::RequestRejected)));
    }

    /// Read-through payload build: miss rebuilds from the store and caches;
    /// hit skips the store.
    #[tokio::test]
    async fn test_payload_read_through() {
        let registry = Arc::new(AdapterRegistry::new());
        let cache = Arc::new(MemoryPayloadCache::new());
        let store = Arc::new(MemoryTemplateStore::new());
        let subject: SubjectId = "42".into();
        store.seed(subject.clone(), vec![face_record("42")]);

        let engine = DispatchEngine::new(registry, DispatchEngineConfig::default())
            .with_cache(cache.clone())
            .with_template_store(store);

        let built = engine.payload_for_subject(&subject).await.unwrap();
        assert_eq!(built.record_count(), 1);
        assert_eq!(cache.len(), 1);

        let cached = engine.payload_for_subject(&subject).await.unwrap();
        assert_eq!(cached.request_id, built.request_id);
    }

    /// Engine built from a TOML configuration string.
    #[tokio::test]
    async fn test_engine_from_loaded_config() {
        let content = r#"
[pool]
max_concurrent = 2

[batch]
chunk_size = 3
"#;
        let config = ConfigLoader::load_from_str(content, ConfigFormat::Toml).unwrap();
        assert_eq!(config.batch.chunk_size, 3);

        let registry = Arc::new(AdapterRegistry::new());
        registry.register("face", Arc::new(MockAdapter::succeeding("face_terminal")));
        let engine = DispatchEngine::new(registry, config);

        let requests: Vec<DispatchRequest> = (0..7)
            .map(|n| {
                DispatchRequest::new(
                    format!("s{n}"),
                    vec![face_record(&format!("s{n}"))],
                    vec![device(&format!("D{n}"), "face_terminal")],
                )
            })
            .collect();

        let results = engine.batch_dispatch(requests).await;
        assert_eq!(results.len(), 7);
        assert!(results.iter().all(|r| r.success));
    }

    /// Aggregated summary over a mixed run.
    #[tokio::test]
    async fn test_stats_aggregation() {
        let registry = Arc::new(AdapterRegistry::new());
        registry.register("face", Arc::new(MockAdapter::succeeding("face_terminal")));
        let engine = DispatchEngine::new(registry, DispatchEngineConfig::default());

        let mut aggregator = DispatchStatsAggregator::new();

        let ok_request = DispatchRequest::new(
            "42",
            vec![face_record("42")],
            vec![device("D1", "face_terminal")],
        );
        aggregator.update(&engine.dispatch(&ok_request).await.unwrap());

        let mixed_request = DispatchRequest::new(
            "43",
            vec![face_record("43")],
            vec![device("D1", "face_terminal"), device("D2", "iris_gate")],
        );
        aggregator.update(&engine.dispatch(&mixed_request).await.unwrap());

        let summary = aggregator.summary();
        assert_eq!(summary.total_requests, 2);
        assert_eq!(summary.fully_successful, 1);
        assert_eq!(summary.devices_ok, 3);
        assert_eq!(summary.devices_failed, 1);
        assert_eq!(summary.failure_kinds.get("not_supported"), Some(&1));
    }
}
