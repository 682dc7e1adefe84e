//! # Runtime Registry
//!
//! Maps each engine kind to its runtime and crypto driver. Engines register
//! on startup; codecs look them up while decoding manifests.
//!
//! Entries are overwritten, never removed. Lookups clone the entry's `Arc`s
//! and release the lock before returning.
//!
//! ## Usage
//!
//! ```rust,ignore
//! let registry = Arc::new(RuntimeRegistry::new());
//! registry.register(EngineKind::Pisa, pisa_runtime, pisa_crypto);
//!
//! let codec = ManifestCodec::new(Arc::clone(&registry), EngineIoConfig::default());
//! ```

use crate::domain::value_objects::EngineKind;
use crate::ports::inbound::EngineRuntime;
use crate::ports::outbound::CryptoDriver;
use parking_lot::RwLock;
use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;
use tracing::{info, warn};

/// Runtime and crypto driver registered for one engine kind.
#[derive(Clone)]
pub struct RegistryEntry {
    /// Engine runtime.
    pub runtime: Arc<dyn EngineRuntime>,
    /// Signature handling for the engine.
    pub crypto: Arc<dyn CryptoDriver>,
}

impl fmt::Debug for RegistryEntry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RegistryEntry")
            .field("kind", &self.runtime.kind())
            .field("version", &self.runtime.version())
            .finish_non_exhaustive()
    }
}

/// Engine kind to runtime registry.
#[derive(Default)]
pub struct RuntimeRegistry {
    entries: RwLock<HashMap<EngineKind, RegistryEntry>>,
}

impl RuntimeRegistry {
    /// Create a new empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Register the runtime and crypto driver for `kind`, replacing any
    /// previous registration.
    pub fn register(&self, kind: EngineKind, runtime: Arc<dyn EngineRuntime>, crypto: Arc<dyn CryptoDriver>) {
        if runtime.kind() != kind {
            warn!(
                "[Registry] Runtime for {} reports kind {}",
                kind,
                runtime.kind()
            );
        }

        let version = runtime.version().to_string();
        let previous = self
            .entries
            .write()
            .insert(kind, RegistryEntry { runtime, crypto });

        if previous.is_some() {
            warn!("[Registry] Engine {} already registered, replacing", kind);
        }
        info!(engine = %kind, version = %version, "[Registry] Registered engine runtime");
    }

    /// Entry registered for `kind`.
    #[must_use]
    pub fn lookup(&self, kind: EngineKind) -> Option<RegistryEntry> {
        self.entries.read().get(&kind).cloned()
    }

    /// Runtime registered for `kind`.
    #[must_use]
    pub fn runtime(&self, kind: EngineKind) -> Option<Arc<dyn EngineRuntime>> {
        self.entries.read().get(&kind).map(|e| Arc::clone(&e.runtime))
    }

    /// Crypto driver registered for `kind`.
    #[must_use]
    pub fn crypto(&self, kind: EngineKind) -> Option<Arc<dyn CryptoDriver>> {
        self.entries.read().get(&kind).map(|e| Arc::clone(&e.crypto))
    }

    /// Check if an engine kind is registered.
    #[must_use]
    pub fn is_registered(&self, kind: EngineKind) -> bool {
        self.entries.read().contains_key(&kind)
    }

    /// Registered engine kinds in table order.
    #[must_use]
    pub fn registered_kinds(&self) -> Vec<EngineKind> {
        let mut kinds: Vec<_> = self.entries.read().keys().copied().collect();
        kinds.sort();
        kinds
    }

    /// Number of registered engines.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.read().len()
    }

    /// Returns true if nothing is registered.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.read().is_empty()
    }
}

impl fmt::Debug for RuntimeRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RuntimeRegistry")
            .field("engines", &self.registered_kinds())
            .finish()
    }
}
