//! Mock 设备适配器
//!
//! 用于无真实设备机群的测试。

use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;

use async_trait::async_trait;
use tracing::trace;

use contracts::{
    CanonicalPayload, DeviceAdapter, DeviceDescriptor, DispatchError, DispatchOutcome,
};

/// What the mock does when `dispatch` is invoked
#[derive(Debug, Clone)]
pub enum MockBehavior {
    /// Report success
    Succeed,
    /// Report an adapter-level failure with the given error code
    Reject { code: String },
    /// Return an `Err` from `dispatch`
    Error,
    /// Panic inside `dispatch`
    Panic,
    /// Sleep, then report success
    Delay { ms: u64 },
}

/// Mock 设备适配器
///
/// 记录调用次数，行为可配置。`supports` 按声明类型大小写不敏感匹配，
/// `accepting_any` 之后匹配任意设备（用于覆盖线性扫描回退路径）。
pub struct MockAdapter {
    device_type: String,
    behavior: MockBehavior,
    accept_any: bool,
    calls: AtomicU64,
}

impl MockAdapter {
    /// Mock that reports success.
    pub fn succeeding(device_type: impl Into<String>) -> Self {
        Self::with_behavior(device_type, MockBehavior::Succeed)
    }

    /// Mock that reports an adapter failure with `code`.
    pub fn rejecting(device_type: impl Into<String>, code: impl Into<String>) -> Self {
        Self::with_behavior(device_type, MockBehavior::Reject { code: code.into() })
    }

    /// Mock whose `dispatch` returns an error.
    pub fn erroring(device_type: impl Into<String>) -> Self {
        Self::with_behavior(device_type, MockBehavior::Error)
    }

    /// Mock whose `dispatch` panics.
    pub fn panicking(device_type: impl Into<String>) -> Self {
        Self::with_behavior(device_type, MockBehavior::Panic)
    }

    /// Mock that sleeps for `ms` before reporting success.
    pub fn delayed(device_type: impl Into<String>, ms: u64) -> Self {
        Self::with_behavior(device_type, MockBehavior::Delay { ms })
    }

    /// Mock with explicit behavior.
    pub fn with_behavior(device_type: impl Into<String>, behavior: MockBehavior) -> Self {
        Self {
            device_type: device_type.into(),
            behavior,
            accept_any: false,
            calls: AtomicU64::new(0),
        }
    }

    /// Make `supports` accept every device regardless of declared type.
    pub fn accepting_any(mut self) -> Self {
        self.accept_any = true;
        self
    }

    /// How many times `dispatch` was invoked.
    pub fn call_count(&self) -> u64 {
        self.calls.load(Ordering::Relaxed)
    }
}

#[async_trait]
impl DeviceAdapter for MockAdapter {
    fn declared_device_type(&self) -> &str {
        &self.device_type
    }

    fn supports(&self, device: &DeviceDescriptor) -> bool {
        self.accept_any || device.device_type.eq_ignore_ascii_case(&self.device_type)
    }

    async fn dispatch(
        &self,
        device: &DeviceDescriptor,
        payload: &CanonicalPayload,
    ) -> Result<DispatchOutcome, DispatchError> {
        self.calls.fetch_add(1, Ordering::Relaxed);
        trace!(device = %device.id, records = payload.record_count(), "mock dispatch");

        match &self.behavior {
            MockBehavior::Succeed => Ok(DispatchOutcome::ok(format!(
                "mock accepted {} record(s)",
                payload.record_count()
            ))),
            MockBehavior::Reject { code } => Ok(DispatchOutcome::adapter_error(
                "mock rejected payload",
                Some(code.clone()),
            )),
            MockBehavior::Error => Err(DispatchError::adapter(
                device.id.as_str(),
                "mock adapter error",
            )),
            MockBehavior::Panic => panic!("mock adapter panic for device {}", device.id),
            MockBehavior::Delay { ms } => {
                tokio::time::sleep(Duration::from_millis(*ms)).await;
                Ok(DispatchOutcome::ok("mock accepted after delay"))
            }
        }
    }
}
