//! # Contracts
//!
//! Frozen interface contracts (ICD), defining inter-module data structures and traits.
//! All business crates can only depend on this crate, reverse dependencies are prohibited.
//!
//! ## Identity Model
//! - `SubjectId` identifies the person whose biometric templates are dispatched
//! - `DeviceId` identifies one physical device in the fleet
//! - Request ids are generated per dispatch call (UUID v4)

mod adapter;
mod biometric;
mod cache;
mod device;
mod engine_config;
mod error;
mod ids;
mod outcome;
mod payload;
mod request;
mod template_store;

pub use adapter::DeviceAdapter;
pub use biometric::*;
pub use cache::PayloadCache;
pub use device::*;
pub use engine_config::*;
pub use error::*;
pub use ids::{DeviceId, SubjectId};
pub use outcome::*;
pub use payload::CanonicalPayload;
pub use request::DispatchRequest;
pub use template_store::TemplateStore;
