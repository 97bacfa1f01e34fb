//! DeviceAdapter trait - per-manufacturer push abstraction
//!
//! Defines the uniform contract the engine depends on. Each device family
//! ships its own implementation; the wire protocol behind `dispatch` is
//! opaque to the engine.

use async_trait::async_trait;

use crate::{CanonicalPayload, DeviceDescriptor, DispatchError, DispatchOutcome};

/// Device adapter trait
///
/// The engine holds adapters as `Arc<dyn DeviceAdapter>` and never branches
/// on a concrete implementation, only on this contract. Resolution uses
/// `declared_device_type` for the fast path and `supports` as the final
/// authority.
///
/// Implementations are expected, but not enforced, to bound their own call
/// latency; the engine's per-call timeout is opt-in configuration.
#[async_trait]
pub trait DeviceAdapter: Send + Sync {
    /// Declared device type, matched case-insensitively against
    /// `DeviceDescriptor::device_type`.
    fn declared_device_type(&self) -> &str;

    /// Whether this adapter can serve the given device.
    fn supports(&self, device: &DeviceDescriptor) -> bool;

    /// Push the canonical payload to one device.
    ///
    /// `Ok` carries the adapter-reported outcome, success or failure.
    /// `Err` means the adapter itself faulted; the engine converts it into
    /// a failed per-device outcome instead of propagating.
    async fn dispatch(
        &self,
        device: &DeviceDescriptor,
        payload: &CanonicalPayload,
    ) -> Result<DispatchOutcome, DispatchError>;
}
