//! # Engine IO - Logic Engine Contract Layer
//!
//! The layer between a host and its pluggable logic engines. Engines register
//! a runtime per [`EngineKind`](domain::EngineKind); the host then decodes
//! manifests, compiles them into logic descriptors and encodes call arguments
//! without knowing any engine's internals.
//!
//! ## Components
//!
//! | Component | Location | Purpose |
//! |-----------|----------|---------|
//! | Runtime registry | `registry.rs` | Thread-safe engine kind to runtime map |
//! | Manifest codec | `codec/manifest.rs` | POLO / JSON / YAML envelopes, content hash |
//! | Value encoder | `codec/values.rs` | Deterministic POLO encoding of dynamic values |
//! | Key ordering | `codec/ordering.rs` | Canonical map key order |
//! | Shape decoder | `codec/shapes.rs` | Typed POLO to value decoding |
//! | Call encoder | `codec/call.rs` | Named arguments to calldata documents |
//! | Ports | `ports/` | Runtime, instance and host driver traits |
//!
//! ## Manifest Decoding
//!
//! | Step | Failure |
//! |------|---------|
//! | Header syntax supported | `SchemaError::UnsupportedSyntax` |
//! | Engine kind known and registered | `SchemaError::UnknownEngine` |
//! | Element kind known to the runtime | `SchemaError::UnrecognizedElementKind` |
//! | Element payload decodes | `CodecError::Payload` |
//! | Element pointers unique | `SchemaError::DuplicateElement` |
//! | Nesting within `max_depth` | `CodecError::StructureTooDeep` |
//!
//! ## Usage Example
//!
//! ```ignore
//! use engine_io::prelude::*;
//!
//! let registry = Arc::new(RuntimeRegistry::new());
//! registry.register(EngineKind::Pisa, Arc::new(runtime), Arc::new(crypto));
//!
//! let codec = ManifestCodec::new(registry, EngineIoConfig::from_env());
//! let manifest = codec.read_file("token.yaml")?;
//! println!("manifest hash: {}", manifest.hash()?);
//! ```

// Crate-level lints
#![warn(missing_docs)]
#![warn(clippy::all)]

// =============================================================================
// MODULES
// =============================================================================

pub mod adapters;
pub mod codec;
pub mod config;
pub mod domain;
pub mod errors;
pub mod ports;
pub mod registry;

// =============================================================================
// PRELUDE
// =============================================================================

/// Convenient re-exports for common usage.
pub mod prelude {
    // Domain
    pub use crate::domain::{
        Address, CallResult, CallSignature, Callsite, CallsiteKind, Classdef, ContextStateKind,
        ContextStateMatrix, ElementKind, ElementPayload, ElementPtr, Encoding, EngineFuel,
        EngineKind, Hash, LogicElement, LogicElementTable, LogicId, Manifest, ManifestElement,
        ManifestEngine, ManifestHeader, MapKey, PayloadData, RawPayload, ReferenceValue, Scalar,
        TypeField, TypeShape, Value, U256,
    };

    // Ports
    pub use crate::ports::{
        CallEncoder, CryptoDriver, DependencyDriver, ElementGenerator, EngineInstance,
        EngineRuntime, EnvDriver, ErrorResult, InteractionDriver, LogicDescriptor, LogicDriver,
        NamedValues, ReferenceProvider, StateDriver,
    };

    // Codecs
    pub use crate::codec::{
        decode_value, encode_value, EncoderConfig, ManifestCallEncoder, ManifestCodec,
    };

    // Registry and configuration
    pub use crate::config::EngineIoConfig;
    pub use crate::registry::{RegistryEntry, RuntimeRegistry};

    // Errors
    pub use crate::errors::{
        CallError, CodecError, EncodeError, EngineError, KeyOrderingError, PayloadError,
        ReferenceError, SchemaError,
    };

    // Adapters
    pub use crate::adapters::{
        DependencyTable, DescriptorLogic, EngineFailure, InMemoryStorage, StaticRuntime,
    };
}

// =============================================================================
// CRATE INFO
// =============================================================================

/// Crate version.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

// =============================================================================
// TESTS
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_prelude_exports() {
        use prelude::*;
        let _ = EngineIoConfig::default();
        let _ = RuntimeRegistry::new();
        assert_eq!(Hash::ZERO.as_bytes(), &[0u8; 32]);
    }

    #[test]
    fn test_version() {
        assert!(!VERSION.is_empty());
    }
}
