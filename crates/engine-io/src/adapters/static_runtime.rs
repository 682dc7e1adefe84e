//! # Static Runtime
//!
//! An `EngineRuntime` built from a fixed table of element kinds. It decodes,
//! compiles and call-encodes manifests but cannot execute them, which is
//! enough for tooling and for exercising the codecs in tests.

use crate::adapters::dependency::DependencyTable;
use crate::codec::call::ManifestCallEncoder;
use crate::codec::values::EncoderConfig;
use crate::domain::abi::Callsite;
use crate::domain::logic::ContextStateMatrix;
use crate::domain::manifest::Manifest;
use crate::domain::payload::{ElementPayload, RawPayload};
use crate::domain::value_objects::{ElementKind, Encoding, EngineFuel, EngineKind};
use crate::errors::{CallError, EngineError, PayloadError};
use crate::ports::inbound::{
    CallEncoder, ElementGenerator, EngineInstance, EngineRuntime, ErrorResult, LogicDescriptor,
};
use crate::ports::outbound::{
    DependencyDriver, EnvDriver, InteractionDriver, LogicDriver, StateDriver,
};
use serde::{Deserialize, Serialize};
use shared_wire::{Depolorize, Depolorizer, Document, Polorize, Polorizer, WireError};
use std::collections::BTreeMap;
use std::sync::Arc;
use tracing::debug;

/// Fuel charged per compiled element.
pub const COMPILE_FUEL_PER_ELEMENT: EngineFuel = 1;

/// Decode-only engine runtime.
#[derive(Debug, Clone)]
pub struct StaticRuntime {
    kind: EngineKind,
    version: String,
    generators: BTreeMap<ElementKind, ElementGenerator>,
    config: EncoderConfig,
}

impl StaticRuntime {
    /// Creates a runtime with no element kinds.
    #[must_use]
    pub fn new(kind: EngineKind, version: impl Into<String>) -> Self {
        Self {
            kind,
            version: version.into(),
            generators: BTreeMap::new(),
            config: EncoderConfig::default(),
        }
    }

    /// Adds an element kind with an explicit generator.
    #[must_use]
    pub fn with_element(mut self, kind: impl Into<ElementKind>, generator: ElementGenerator) -> Self {
        self.generators.insert(kind.into(), generator);
        self
    }

    /// Adds an element kind whose prototype is `T::default()`.
    #[must_use]
    pub fn with_element_type<T: ElementPayload + Default>(self, kind: impl Into<ElementKind>) -> Self {
        self.with_element(kind, prototype::<T>)
    }

    /// Overrides the encoder settings handed to call encoders.
    #[must_use]
    pub fn with_encoder_config(mut self, config: EncoderConfig) -> Self {
        self.config = config;
        self
    }

    /// Element kinds this runtime understands.
    pub fn element_kinds(&self) -> impl Iterator<Item = &ElementKind> {
        self.generators.keys()
    }
}

fn prototype<T: ElementPayload + Default>() -> Box<dyn ElementPayload> {
    Box::new(T::default())
}

impl EngineRuntime for StaticRuntime {
    fn kind(&self) -> EngineKind {
        self.kind
    }

    fn version(&self) -> &str {
        &self.version
    }

    fn element_generator(&self, kind: &ElementKind) -> Option<ElementGenerator> {
        self.generators.get(kind).copied()
    }

    fn compile_manifest(
        &self,
        manifest: &Manifest,
        fuel: EngineFuel,
    ) -> Result<(LogicDescriptor, EngineFuel), EngineError> {
        if manifest.engine() != self.kind {
            return Err(EngineError::Compile(format!(
                "manifest targets {}, runtime serves {}",
                manifest.engine(),
                self.kind
            )));
        }

        let consumed = COMPILE_FUEL_PER_ELEMENT.saturating_mul(manifest.size() as EngineFuel);
        if consumed > fuel {
            return Err(EngineError::Compile(format!(
                "insufficient fuel: need {consumed}, have {fuel}"
            )));
        }

        let manifest_raw = manifest.encode(Encoding::Polo)?;
        let manifest_hash = manifest.hash()?;
        let elements = manifest.logic_elements()?;
        let dependency = Box::new(DependencyTable::from_elements(&elements));

        debug!(
            engine = %self.kind,
            elements = elements.len(),
            hash = %manifest_hash,
            "compiled manifest"
        );

        let descriptor = LogicDescriptor {
            engine: self.kind,
            manifest_raw,
            manifest_hash,
            interactive: false,
            dependency,
            elements,
            ctx_state: ContextStateMatrix::new(),
            callsites: BTreeMap::new(),
            classdefs: BTreeMap::new(),
        };
        Ok((descriptor, consumed))
    }

    fn spawn_instance(
        &self,
        _logic: Arc<dyn LogicDriver>,
        _fuel: EngineFuel,
        _storage: Arc<dyn StateDriver>,
        _env: Arc<dyn EnvDriver>,
    ) -> Result<Box<dyn EngineInstance>, EngineError> {
        Err(EngineError::Unsupported(format!(
            "{} static runtime cannot execute logic",
            self.kind
        )))
    }

    fn validate_calldata(
        &self,
        logic: &dyn LogicDriver,
        interaction: &dyn InteractionDriver,
    ) -> Result<(), EngineError> {
        let name = interaction.callsite();
        let callsite = logic
            .callsite(name)
            .ok_or_else(|| EngineError::InvalidCalldata(format!("unknown callsite '{name}'")))?;
        if !callsite.kind.is_external() {
            return Err(EngineError::InvalidCalldata(format!(
                "callsite '{name}' is not externally callable"
            )));
        }
        if !interaction.calldata().is_empty() {
            Document::from_bytes(interaction.calldata())
                .map_err(|err| EngineError::InvalidCalldata(err.to_string()))?;
        }
        Ok(())
    }

    fn call_encoder(
        &self,
        logic: &dyn LogicDriver,
        callsite: &Callsite,
    ) -> Result<Box<dyn CallEncoder>, CallError> {
        let element = logic
            .element(callsite.ptr)
            .ok_or_else(|| CallError::ElementNotFound {
                callsite: callsite.name.clone(),
                ptr: callsite.ptr,
            })?;
        let not_callable = || CallError::NotCallable {
            ptr: callsite.ptr,
            kind: element.kind.clone(),
        };

        let generator = self.element_generator(&element.kind).ok_or_else(not_callable)?;
        let mut payload = generator();
        payload
            .decode_payload(&RawPayload::Polo(element.data.clone()), self.config.max_depth)
            .map_err(|err| match err {
                PayloadError::Wire(err) => CallError::Decode(err),
                other => CallError::Decode(WireError::InvalidValue(other.to_string())),
            })?;
        let signature = payload.signature().ok_or_else(not_callable)?.clone();

        Ok(Box::new(ManifestCallEncoder::new(
            callsite.clone(),
            signature,
            self.config,
        )))
    }

    fn decode_error_result(&self, data: &[u8]) -> Result<Box<dyn ErrorResult>, EngineError> {
        let mut error: EngineFailure = shared_wire::depolorize(data)?;
        error.engine = self.kind;
        Ok(Box::new(error))
    }

    fn decode_dependencies(
        &self,
        data: &[u8],
        encoding: Encoding,
    ) -> Result<Box<dyn DependencyDriver>, EngineError> {
        Ok(Box::new(DependencyTable::decode(data, encoding)?))
    }
}

// =============================================================================
// ERROR RESULTS
// =============================================================================

/// Error payload: a message and whether it was an explicit revert.
///
/// Wire form: `pack[ message: word, reverted: bool ]`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EngineFailure {
    /// Engine that raised the error.
    pub engine: EngineKind,
    /// Human readable message.
    pub message: String,
    /// Returns true if the logic reverted on purpose.
    pub reverted: bool,
}

impl Polorize for EngineFailure {
    fn polorize(&self, polorizer: &mut Polorizer) -> Result<(), WireError> {
        let mut pack = Polorizer::new();
        pack.write_str(&self.message);
        pack.write_bool(self.reverted);
        polorizer.write_pack(pack);
        Ok(())
    }
}

impl Depolorize for EngineFailure {
    fn depolorize(depolorizer: &mut Depolorizer<'_>) -> Result<Self, WireError> {
        let mut pack = depolorizer.read_packed()?;
        Ok(Self {
            engine: EngineKind::Pisa,
            message: pack.read_string()?,
            reverted: pack.read_bool()?,
        })
    }
}

impl ErrorResult for EngineFailure {
    fn engine(&self) -> EngineKind {
        self.engine
    }

    fn text(&self) -> String {
        self.message.clone()
    }

    fn bytes(&self) -> Result<Vec<u8>, EngineError> {
        Ok(shared_wire::polorize(self)?)
    }

    fn reverted(&self) -> bool {
        self.reverted
    }
}
