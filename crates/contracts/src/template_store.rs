//! TemplateStore trait - authoritative biometric record store
//!
//! The persisted record store is external; the engine reads from it only
//! when rebuilding a canonical payload on a cache miss.

use async_trait::async_trait;

use crate::{BiometricRecord, DispatchError, SubjectId};

/// Biometric template store contract
#[async_trait]
pub trait TemplateStore: Send + Sync {
    /// Load all persisted records for a subject.
    ///
    /// # Errors
    /// Returns a store error; unlike cache writes this fails the
    /// payload-rebuild call.
    async fn load_records(
        &self,
        subject_id: &SubjectId,
    ) -> Result<Vec<BiometricRecord>, DispatchError>;
}
