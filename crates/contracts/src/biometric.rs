//! BiometricRecord - 模板存储输出
//!
//! 单个受试者的生物特征模板记录。

use bytes::Bytes;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::SubjectId;

/// Biometric modality
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BiometricKind {
    Face,
    Fingerprint,
    Iris,
    Palmprint,
    Voice,
}

impl BiometricKind {
    /// All modalities, in canonical order.
    pub const ALL: [BiometricKind; 5] = [
        BiometricKind::Face,
        BiometricKind::Fingerprint,
        BiometricKind::Iris,
        BiometricKind::Palmprint,
        BiometricKind::Voice,
    ];

    /// Stable lowercase name (used in metric labels and log fields).
    pub fn as_str(&self) -> &'static str {
        match self {
            BiometricKind::Face => "face",
            BiometricKind::Fingerprint => "fingerprint",
            BiometricKind::Iris => "iris",
            BiometricKind::Palmprint => "palmprint",
            BiometricKind::Voice => "voice",
        }
    }
}

impl std::fmt::Display for BiometricKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// 生物特征模板记录
///
/// 从外部模板存储读取的原始记录。引擎只读，不回写。
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BiometricRecord {
    /// 记录 ID
    pub record_id: String,

    /// 受试者 ID
    pub subject_id: SubjectId,

    /// 模态
    pub kind: BiometricKind,

    /// 编码后的模板载荷 (不透明, 零拷贝)
    pub template: Bytes,

    /// 质量分 (0.0 - 1.0)
    pub quality: f32,

    /// 模板版本
    pub template_version: String,

    /// 采集时间
    pub captured_at: DateTime<Utc>,

    /// 算法版本
    pub algorithm_version: String,
}

impl BiometricRecord {
    /// A record can be dispatched only with a non-empty template payload.
    /// The modality half of the invariant is carried by `BiometricKind`.
    pub fn is_dispatchable(&self) -> bool {
        !self.template.is_empty()
    }
}
