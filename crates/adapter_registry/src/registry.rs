//! AdapterRegistry - shared adapter set with type-indexed resolution

use std::sync::Arc;

use dashmap::DashMap;
use tracing::{debug, instrument, warn};

use contracts::{DeviceAdapter, DeviceDescriptor};

/// Shared adapter registry
///
/// Holds the known adapters under their registration name plus a secondary
/// index keyed by declared device type (case-normalized). Both maps are
/// concurrency-safe; register and resolve may run from any task.
#[derive(Default)]
pub struct AdapterRegistry {
    /// Registration name -> adapter
    adapters: DashMap<String, Arc<dyn DeviceAdapter>>,

    /// Normalized declared type -> registration name
    type_index: DashMap<String, String>,
}

/// Registry statistics (administrative, not on the dispatch hot path)
#[derive(Debug, Clone)]
pub struct RegistryStats {
    /// Number of registered adapters
    pub adapter_count: usize,

    /// Declared types currently indexed
    pub supported_types: Vec<String>,
}

impl AdapterRegistry {
    /// Create an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Register an adapter under `name` and index it by its declared type.
    ///
    /// A second adapter declaring the same type silently replaces the
    /// type-index entry; the earlier adapter stays reachable by name and by
    /// the resolve fallback scan. Logged because the overwrite is almost
    /// always a fleet-configuration mistake.
    #[instrument(name = "registry_register", skip_all)]
    pub fn register(&self, name: impl Into<String>, adapter: Arc<dyn DeviceAdapter>) {
        let name = name.into();
        let declared = normalize(adapter.declared_device_type());
        debug!(name = %name, device_type = %declared, "registering adapter");

        if let Some(previous) = self.type_index.insert(declared.clone(), name.clone()) {
            if previous != name {
                warn!(
                    device_type = %declared,
                    previous = %previous,
                    replacement = %name,
                    "type index entry replaced; earlier adapter unreachable by type"
                );
            }
        }

        if self.adapters.insert(name.clone(), adapter).is_some() {
            debug!(name = %name, "adapter re-registered under existing name");
        }
    }

    /// Resolve an adapter for a device.
    ///
    /// Fast path: exact type-index lookup re-confirmed with `supports`.
    /// Fallback: linear scan over all registered adapters, first match wins.
    pub fn resolve(&self, device: &DeviceDescriptor) -> Option<Arc<dyn DeviceAdapter>> {
        let key = normalize(&device.device_type);

        let indexed = self
            .type_index
            .get(&key)
            .and_then(|name| self.adapters.get(name.value()).map(|a| a.value().clone()));
        if let Some(adapter) = indexed {
            if adapter.supports(device) {
                return Some(adapter);
            }
        }

        self.adapters
            .iter()
            .find(|entry| entry.value().supports(device))
            .map(|entry| entry.value().clone())
    }

    /// Direct lookup by registration name.
    pub fn resolve_by_name(&self, name: &str) -> Option<Arc<dyn DeviceAdapter>> {
        self.adapters.get(name).map(|a| a.value().clone())
    }

    /// Direct lookup by declared type (case-insensitive).
    pub fn resolve_by_type(&self, device_type: &str) -> Option<Arc<dyn DeviceAdapter>> {
        let name = self.type_index.get(&normalize(device_type))?.value().clone();
        self.resolve_by_name(&name)
    }

    /// Remove an adapter and any type-index entries pointing at it.
    ///
    /// Returns true if an adapter was registered under `name`.
    #[instrument(name = "registry_unregister", skip(self))]
    pub fn unregister(&self, name: &str) -> bool {
        let removed = self.adapters.remove(name).is_some();
        if removed {
            self.type_index.retain(|_, indexed| indexed.as_str() != name);
            debug!(name = %name, "adapter unregistered");
        }
        removed
    }

    /// Declared types currently indexed.
    pub fn list_types(&self) -> Vec<String> {
        let mut types: Vec<String> = self.type_index.iter().map(|e| e.key().clone()).collect();
        types.sort();
        types
    }

    /// Registration names of all adapters.
    pub fn list_adapters(&self) -> Vec<String> {
        let mut names: Vec<String> = self.adapters.iter().map(|e| e.key().clone()).collect();
        names.sort();
        names
    }

    /// Snapshot of registry statistics.
    pub fn statistics(&self) -> RegistryStats {
        RegistryStats {
            adapter_count: self.adapters.len(),
            supported_types: self.list_types(),
        }
    }
}

/// Declared types are matched case-insensitively and ignoring edge whitespace.
fn normalize(device_type: &str) -> String {
    device_type.trim().to_ascii_lowercase()
}
