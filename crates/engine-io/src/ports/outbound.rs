//! # Driven Ports (SPI - Outbound)
//!
//! Collaborators an engine runtime depends on. The host implements these
//! traits; engines consume them and never reach storage, cryptography or
//! the dependency graph any other way.
//!
//! | Trait | Purpose |
//! |-------|---------|
//! | `StateDriver` | Storage scoped to one account and one logic |
//! | `DependencyDriver` | Element dependency graph |
//! | `CryptoDriver` | Signature validation and verification |
//! | `InteractionDriver` | The interaction being executed |
//! | `EnvDriver` | Execution environment |
//! | `LogicDriver` | A compiled, deployed logic |
//! | `ReferenceProvider` | Resolution of `ref<name>` placeholders |

use crate::domain::abi::{Callsite, Classdef};
use crate::domain::logic::LogicElement;
use crate::domain::value_objects::{
    Address, ElementPtr, Encoding, EngineFuel, EngineKind, Hash, LogicId, U256,
};
use crate::domain::values::{ReferenceValue, Value};
use crate::errors::EngineError;
use std::collections::{BTreeMap, HashMap};
use std::fmt;

// =============================================================================
// STATE
// =============================================================================

/// Namespaced storage of one account for one logic.
pub trait StateDriver: Send + Sync {
    /// Account owning the storage.
    fn address(&self) -> Address;

    /// Logic the storage is scoped to.
    fn logic_id(&self) -> LogicId;

    /// Reads the entry at `key`.
    fn get_storage_entry(&self, key: &[u8]) -> Option<Vec<u8>>;

    /// Writes `value` at `key`, returning true if an entry was replaced.
    fn set_storage_entry(&self, key: Vec<u8>, value: Vec<u8>) -> bool;
}

// =============================================================================
// DEPENDENCIES
// =============================================================================

/// Directed dependency graph over element pointers.
pub trait DependencyDriver: fmt::Debug + Send + Sync {
    /// Adds `ptr` with its direct dependencies.
    fn insert(&mut self, ptr: ElementPtr, deps: &[ElementPtr]);

    /// Removes `ptr` and every edge pointing at it.
    fn remove(&mut self, ptr: ElementPtr);

    /// Number of vertices.
    fn size(&self) -> usize;

    /// Returns true if `ptr` is a vertex.
    fn contains(&self, ptr: ElementPtr) -> bool;

    /// Direct dependencies of `ptr`.
    fn edges(&self, ptr: ElementPtr) -> Vec<ElementPtr>;

    /// Transitive dependencies of `ptr`.
    fn dependencies(&self, ptr: ElementPtr) -> Vec<ElementPtr>;

    /// All vertices in ascending order.
    fn vertices(&self) -> Vec<ElementPtr>;

    /// Encodes the graph.
    fn encode(&self, encoding: Encoding) -> Result<Vec<u8>, EngineError>;
}

// =============================================================================
// CRYPTOGRAPHY
// =============================================================================

/// Engine-specific signature handling.
pub trait CryptoDriver: Send + Sync {
    /// Checks that `signature` is well formed.
    fn validate_signature(&self, signature: &[u8]) -> Result<(), EngineError>;

    /// Verifies `signature` over `data` against `public_key`.
    fn verify_signature(&self, data: &[u8], signature: &[u8], public_key: &[u8]) -> Result<bool, EngineError>;
}

// =============================================================================
// EXECUTION CONTEXT
// =============================================================================

/// The interaction an engine is executing.
pub trait InteractionDriver: Send + Sync {
    /// Interaction type name.
    fn kind(&self) -> &str;

    /// Price per fuel unit.
    fn fuel_price(&self) -> U256;

    /// Fuel available to the call.
    fn fuel_limit(&self) -> EngineFuel;

    /// Name of the callsite being invoked.
    fn callsite(&self) -> &str;

    /// Encoded call inputs.
    fn calldata(&self) -> &[u8];
}

/// Execution environment.
pub trait EnvDriver: Send + Sync {
    /// Unix timestamp of the enclosing block.
    fn timestamp(&self) -> i64;

    /// Identifier of the executing cluster.
    fn cluster_id(&self) -> &str;
}

// =============================================================================
// LOGIC
// =============================================================================

/// A deployed logic as seen by an engine.
pub trait LogicDriver: Send + Sync {
    /// Identifier of the logic.
    fn logic_id(&self) -> LogicId;

    /// Engine the logic was compiled for.
    fn engine(&self) -> EngineKind;

    /// Hash of the source manifest.
    fn manifest_hash(&self) -> Hash;

    /// Returns true if the logic can no longer be modified.
    fn is_sealed(&self) -> bool;

    /// Returns true if the logic defines an asset.
    fn is_asset_logic(&self) -> bool;

    /// Returns true if the logic exposes interactable callsites.
    fn is_interactive(&self) -> bool;

    /// Element holding persistent state.
    fn persistent_state(&self) -> Option<ElementPtr>;

    /// Element holding ephemeral state.
    fn ephemeral_state(&self) -> Option<ElementPtr>;

    /// Transitive dependencies of `ptr`.
    fn element_deps(&self, ptr: ElementPtr) -> Vec<ElementPtr>;

    /// Element at `ptr`.
    fn element(&self, ptr: ElementPtr) -> Option<LogicElement>;

    /// Callsite named `name`.
    fn callsite(&self, name: &str) -> Option<Callsite>;

    /// Class definition named `name`.
    fn classdef(&self, name: &str) -> Option<Classdef>;
}

// =============================================================================
// REFERENCES
// =============================================================================

/// Resolves `ref<name>` placeholders during value encoding.
///
/// A resolved value may itself contain references.
pub trait ReferenceProvider {
    /// Value bound to `reference`, if any.
    fn get_reference(&self, reference: &ReferenceValue) -> Option<Value>;
}

impl ReferenceProvider for HashMap<String, Value> {
    fn get_reference(&self, reference: &ReferenceValue) -> Option<Value> {
        self.get(reference.name()).cloned()
    }
}

impl ReferenceProvider for BTreeMap<String, Value> {
    fn get_reference(&self, reference: &ReferenceValue) -> Option<Value> {
        self.get(reference.name()).cloned()
    }
}

impl<F> ReferenceProvider for F
where
    F: Fn(&ReferenceValue) -> Option<Value>,
{
    fn get_reference(&self, reference: &ReferenceValue) -> Option<Value> {
        self(reference)
    }
}
