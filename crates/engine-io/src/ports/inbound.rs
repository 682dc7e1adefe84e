//! # Driving Ports (API - Inbound)
//!
//! Interfaces an execution engine exposes to the host. A runtime is
//! registered once per engine kind; it compiles manifests, spawns instances
//! and hands out call encoders.
//!
//! ## Lifecycle
//!
//! ```text
//! bytes --ManifestCodec::decode--> Manifest
//!       --EngineRuntime::compile_manifest--> LogicDescriptor
//!       --EngineRuntime::spawn_instance--> EngineInstance::call
//! ```

use crate::domain::abi::{Callsite, Classdef};
use crate::domain::logic::{CallResult, ContextStateMatrix, LogicElementTable};
use crate::domain::manifest::Manifest;
use crate::domain::payload::ElementPayload;
use crate::domain::value_objects::{ElementKind, Encoding, EngineFuel, EngineKind, Hash};
use crate::domain::values::Value;
use crate::errors::{CallError, EngineError};
use crate::ports::outbound::{
    DependencyDriver, EnvDriver, InteractionDriver, LogicDriver, ReferenceProvider, StateDriver,
};
use async_trait::async_trait;
use std::collections::BTreeMap;
use std::fmt;
use std::sync::Arc;

/// Produces an empty payload prototype for one element kind.
pub type ElementGenerator = fn() -> Box<dyn ElementPayload>;

/// Arguments or results keyed by label.
pub type NamedValues = BTreeMap<String, Value>;

// =============================================================================
// COMPILED LOGIC
// =============================================================================

/// Everything an engine extracted from a manifest at compile time.
#[derive(Debug)]
pub struct LogicDescriptor {
    /// Engine the logic targets.
    pub engine: EngineKind,
    /// Canonical binary manifest.
    pub manifest_raw: Vec<u8>,
    /// Hash of `manifest_raw`.
    pub manifest_hash: Hash,
    /// Returns true if any callsite is interactable.
    pub interactive: bool,
    /// Element dependency graph.
    pub dependency: Box<dyn DependencyDriver>,
    /// Elements by pointer.
    pub elements: LogicElementTable,
    /// State element layout.
    pub ctx_state: ContextStateMatrix,
    /// Callsites by name.
    pub callsites: BTreeMap<String, Callsite>,
    /// Class definitions by name.
    pub classdefs: BTreeMap<String, Classdef>,
}

// =============================================================================
// ENGINE RUNTIME
// =============================================================================

/// A pluggable execution backend for one engine kind.
pub trait EngineRuntime: Send + Sync {
    /// Engine kind served by this runtime.
    fn kind(&self) -> EngineKind;

    /// Runtime version string.
    fn version(&self) -> &str;

    /// Payload prototype factory for `kind`, if the engine knows the kind.
    fn element_generator(&self, kind: &ElementKind) -> Option<ElementGenerator>;

    /// Compiles a manifest, returning the descriptor and the fuel consumed.
    fn compile_manifest(
        &self,
        manifest: &Manifest,
        fuel: EngineFuel,
    ) -> Result<(LogicDescriptor, EngineFuel), EngineError>;

    /// Spawns an instance bound to a logic and its storage.
    fn spawn_instance(
        &self,
        logic: Arc<dyn LogicDriver>,
        fuel: EngineFuel,
        storage: Arc<dyn StateDriver>,
        env: Arc<dyn EnvDriver>,
    ) -> Result<Box<dyn EngineInstance>, EngineError>;

    /// Checks calldata against the logic before spawning.
    fn validate_calldata(
        &self,
        logic: &dyn LogicDriver,
        interaction: &dyn InteractionDriver,
    ) -> Result<(), EngineError>;

    /// Call encoder for a callsite of a deployed logic.
    fn call_encoder(
        &self,
        logic: &dyn LogicDriver,
        callsite: &Callsite,
    ) -> Result<Box<dyn CallEncoder>, CallError>;

    /// Decodes an error payload produced by this engine.
    fn decode_error_result(&self, data: &[u8]) -> Result<Box<dyn ErrorResult>, EngineError>;

    /// Decodes an encoded dependency graph.
    fn decode_dependencies(
        &self,
        data: &[u8],
        encoding: Encoding,
    ) -> Result<Box<dyn DependencyDriver>, EngineError>;
}

/// A running engine bound to one logic.
#[async_trait]
pub trait EngineInstance: Send + Sync {
    /// Engine kind of the instance.
    fn kind(&self) -> EngineKind;

    /// Executes the interaction's callsite.
    async fn call(
        &self,
        interaction: &dyn InteractionDriver,
        participant: Arc<dyn StateDriver>,
        others: &[Arc<dyn StateDriver>],
    ) -> Result<CallResult, EngineError>;
}

// =============================================================================
// CALL ENCODING
// =============================================================================

/// Encodes inputs and decodes outputs for one callsite.
pub trait CallEncoder: Send + Sync {
    /// Validates and encodes call arguments.
    fn encode_inputs(
        &self,
        args: &NamedValues,
        references: Option<&dyn ReferenceProvider>,
    ) -> Result<Vec<u8>, CallError>;

    /// Decodes call outputs.
    fn decode_outputs(&self, data: &[u8]) -> Result<NamedValues, CallError>;
}

/// Engine-specific error payload.
pub trait ErrorResult: fmt::Debug + Send + Sync {
    /// Engine that produced the error.
    fn engine(&self) -> EngineKind;

    /// Human readable message.
    fn text(&self) -> String;

    /// Encoded form.
    fn bytes(&self) -> Result<Vec<u8>, EngineError>;

    /// Returns true if the error was an explicit revert.
    fn reverted(&self) -> bool;
}
