//! DeviceDescriptor - 设备清单输出
//!
//! 目标设备的只读描述。设备清单归属外部系统，引擎只读。

use serde::{Deserialize, Serialize};

use crate::{BiometricKind, DeviceId};

/// Target device descriptor
///
/// Owned by the external device inventory. Immutable once handed to the
/// engine; the engine never verifies device existence beyond adapter
/// resolution.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DeviceDescriptor {
    /// Device ID
    pub id: DeviceId,

    /// Device code (manufacturer serial / site label)
    pub code: String,

    /// Declared device type, matched case-insensitively against adapters
    pub device_type: String,

    /// Manufacturer name
    pub manufacturer: String,

    /// Capability flags
    #[serde(default)]
    pub capabilities: DeviceCapabilities,
}

/// Which biometric modalities a device accepts
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeviceCapabilities {
    #[serde(default)]
    pub face: bool,
    #[serde(default)]
    pub fingerprint: bool,
    #[serde(default)]
    pub iris: bool,
    #[serde(default)]
    pub palmprint: bool,
    #[serde(default)]
    pub voice: bool,
}

impl DeviceCapabilities {
    /// Flags with every modality enabled.
    pub fn all() -> Self {
        Self {
            face: true,
            fingerprint: true,
            iris: true,
            palmprint: true,
            voice: true,
        }
    }

    /// Whether the device accepts the given modality.
    pub fn supports(&self, kind: BiometricKind) -> bool {
        match kind {
            BiometricKind::Face => self.face,
            BiometricKind::Fingerprint => self.fingerprint,
            BiometricKind::Iris => self.iris,
            BiometricKind::Palmprint => self.palmprint,
            BiometricKind::Voice => self.voice,
        }
    }
}

impl DeviceDescriptor {
    /// Shorthand constructor for a device with every capability enabled.
    pub fn new(
        id: impl Into<DeviceId>,
        code: impl Into<String>,
        device_type: impl Into<String>,
        manufacturer: impl Into<String>,
    ) -> Self {
        Self {
            id: id.into(),
            code: code.into(),
            device_type: device_type.into(),
            manufacturer: manufacturer.into(),
            capabilities: DeviceCapabilities::all(),
        }
    }
}
