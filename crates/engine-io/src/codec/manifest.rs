//! # Manifest Codec
//!
//! Decodes manifests from POLO, JSON or YAML and encodes them back.
//!
//! ## Decode Pipeline
//!
//! 1. Read only the header.
//! 2. Check the syntax version and resolve the engine runtime. Nothing
//!    element-related is touched before this succeeds.
//! 3. For every element, ask the runtime for a payload prototype and let it
//!    decode the element's data in the envelope's encoding.
//! 4. Build the manifest, rejecting duplicate pointers.
//!
//! ## Canonical Binary Layout
//!
//! ```text
//! manifest = pack[ header, elements ]
//! header   = pack[ syntax, pack[ kind, pack[flag...] ] ]
//! elements = pack[ pack[ ptr, pack[dep...], kind, raw(data) ]... ]
//! ```

use crate::config::EngineIoConfig;
use crate::domain::logic::{LogicElement, LogicElementTable};
use crate::domain::manifest::{
    Manifest, ManifestElement, ManifestEngine, ManifestHeader, RawHeader,
};
use crate::domain::payload::RawPayload;
use crate::domain::value_objects::{ElementKind, ElementPtr, Encoding, Hash};
use crate::errors::{CodecError, PayloadError, SchemaError};
use crate::ports::inbound::EngineRuntime;
use crate::registry::RuntimeRegistry;
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use shared_wire::{Depolorizer, Polorizer, WireType};
use std::path::Path;
use std::sync::Arc;
use tracing::{debug, instrument, warn};

/// Element as read off the wire, before its payload is interpreted.
#[derive(Debug, Deserialize)]
struct RawElement<P> {
    ptr: ElementPtr,
    #[serde(default)]
    deps: Vec<ElementPtr>,
    kind: ElementKind,
    #[serde(default)]
    data: P,
}

#[derive(Serialize)]
struct EnvelopeOut<'a, P> {
    header: &'a ManifestHeader,
    elements: Vec<ElementOut<'a, P>>,
}

#[derive(Serialize)]
struct ElementOut<'a, P> {
    ptr: ElementPtr,
    deps: &'a [ElementPtr],
    kind: &'a ElementKind,
    data: P,
}

/// Manifest decoder bound to a runtime registry.
#[derive(Debug, Clone)]
pub struct ManifestCodec {
    registry: Arc<RuntimeRegistry>,
    config: EngineIoConfig,
}

impl ManifestCodec {
    /// Creates a codec.
    #[must_use]
    pub fn new(registry: Arc<RuntimeRegistry>, config: EngineIoConfig) -> Self {
        Self { registry, config }
    }

    /// Registry used to resolve engine runtimes.
    #[must_use]
    pub fn registry(&self) -> &RuntimeRegistry {
        &self.registry
    }

    /// Active configuration.
    #[must_use]
    pub fn config(&self) -> &EngineIoConfig {
        &self.config
    }

    /// Decodes a manifest carried in `encoding`.
    #[instrument(skip(self, data), fields(encoding = %encoding, size = data.len()))]
    pub fn decode(&self, data: &[u8], encoding: Encoding) -> Result<Manifest, CodecError> {
        let result = match encoding {
            Encoding::Polo => self.decode_polo(data),
            Encoding::Json => self.decode_json(data),
            Encoding::Yaml => self.decode_yaml(data),
        };

        match &result {
            Ok(manifest) => debug!(
                engine = %manifest.engine(),
                elements = manifest.size(),
                "decoded manifest"
            ),
            Err(err) => warn!(error = %err, "rejected manifest"),
        }
        result
    }

    /// Loads a manifest file, choosing the encoding from its extension.
    pub fn read_file(&self, path: impl AsRef<Path>) -> Result<Manifest, CodecError> {
        let path = path.as_ref();
        let encoding = Encoding::from_path(path).ok_or_else(|| {
            CodecError::Load(format!("unrecognized manifest extension: {}", path.display()))
        })?;
        let data = std::fs::read(path)
            .map_err(|err| CodecError::Load(format!("{}: {err}", path.display())))?;
        debug!(path = %path.display(), size = data.len(), "read manifest file");
        self.decode(&data, encoding)
    }

    /// Writes a manifest file, choosing the encoding from its extension.
    pub fn write_file(&self, manifest: &Manifest, path: impl AsRef<Path>) -> Result<(), CodecError> {
        let path = path.as_ref();
        let encoding = Encoding::from_path(path).ok_or_else(|| {
            CodecError::Load(format!("unrecognized manifest extension: {}", path.display()))
        })?;
        let data = manifest.encode(encoding)?;
        std::fs::write(path, data).map_err(|err| CodecError::Load(format!("{}: {err}", path.display())))
    }

    // =========================================================================
    // HEADER
    // =========================================================================

    fn resolve_header(&self, raw: RawHeader) -> Result<(ManifestHeader, Arc<dyn EngineRuntime>), SchemaError> {
        if !self.config.is_supported_syntax(&raw.syntax) {
            return Err(SchemaError::UnsupportedSyntax(raw.syntax));
        }

        let kind = raw
            .engine
            .kind
            .parse()
            .map_err(|_| SchemaError::UnknownEngine(raw.engine.kind.clone()))?;
        let runtime = self
            .registry
            .runtime(kind)
            .ok_or_else(|| SchemaError::UnknownEngine(raw.engine.kind.clone()))?;

        let header = ManifestHeader {
            syntax: raw.syntax,
            engine: ManifestEngine {
                kind,
                flags: raw.engine.flags,
            },
        };
        Ok((header, runtime))
    }

    // =========================================================================
    // ENVELOPES
    // =========================================================================

    fn decode_polo(&self, data: &[u8]) -> Result<Manifest, CodecError> {
        let mut reader = Depolorizer::with_max_depth(data, self.config.max_depth)?;
        let mut envelope = reader.read_packed()?;
        let raw_header: RawHeader = envelope.depolorize()?;
        let (header, runtime) = self.resolve_header(raw_header)?;

        let mut elements = envelope.read_packed()?;
        expect_done(&envelope, "manifest envelope")?;

        let mut raws = Vec::with_capacity(elements.remaining());
        while !elements.is_done() {
            let mut element = elements.read_packed()?;
            if element.peek_wire() != Some(WireType::PosInt) {
                return Err(CodecError::Structural(format!(
                    "element {} has no pointer",
                    raws.len()
                )));
            }
            raws.push(RawElement {
                ptr: element.read_u64()?,
                deps: element.depolorize()?,
                kind: element.depolorize()?,
                data: RawPayload::Polo(element.read_raw()?.to_vec()),
            });
            expect_done(&element, "manifest element")?;
        }

        self.assemble(header, runtime.as_ref(), raws)
    }

    fn decode_json(&self, data: &[u8]) -> Result<Manifest, CodecError> {
        let document: serde_json::Value = serde_json::from_slice(data)?;
        let raw_header = document
            .get("header")
            .ok_or_else(|| CodecError::Structural("missing header".to_string()))?;
        let (header, runtime) = self.resolve_header(RawHeader::deserialize(raw_header)?)?;

        let raws = match document.get("elements") {
            Some(elements) => Vec::<RawElement<serde_json::Value>>::deserialize(elements)?,
            None => Vec::new(),
        };
        let raws = raws
            .into_iter()
            .map(|raw| RawElement {
                ptr: raw.ptr,
                deps: raw.deps,
                kind: raw.kind,
                data: RawPayload::Json(raw.data),
            })
            .collect();

        self.assemble(header, runtime.as_ref(), raws)
    }

    fn decode_yaml(&self, data: &[u8]) -> Result<Manifest, CodecError> {
        let document: serde_yaml::Value = serde_yaml::from_slice(data)?;
        let raw_header = document
            .get("header")
            .ok_or_else(|| CodecError::Structural("missing header".to_string()))?;
        let (header, runtime) = self.resolve_header(RawHeader::deserialize(raw_header)?)?;

        let raws = match document.get("elements") {
            Some(elements) => Vec::<RawElement<serde_yaml::Value>>::deserialize(elements)?,
            None => Vec::new(),
        };
        let raws = raws
            .into_iter()
            .map(|raw| RawElement {
                ptr: raw.ptr,
                deps: raw.deps,
                kind: raw.kind,
                data: RawPayload::Yaml(raw.data),
            })
            .collect();

        self.assemble(header, runtime.as_ref(), raws)
    }

    fn assemble(
        &self,
        header: ManifestHeader,
        runtime: &dyn EngineRuntime,
        raws: Vec<RawElement<RawPayload>>,
    ) -> Result<Manifest, CodecError> {
        let mut elements = Vec::with_capacity(raws.len());

        for raw in raws {
            let generator = runtime.element_generator(&raw.kind).ok_or_else(|| {
                SchemaError::UnrecognizedElementKind {
                    ptr: raw.ptr,
                    kind: raw.kind.clone(),
                }
            })?;

            let mut data = generator();
            data.decode_payload(&raw.data, self.config.max_depth)
                .map_err(|source| CodecError::Payload {
                    ptr: raw.ptr,
                    kind: raw.kind.clone(),
                    source,
                })?;

            elements.push(ManifestElement {
                ptr: raw.ptr,
                deps: raw.deps,
                kind: raw.kind,
                data,
            });
        }

        Ok(Manifest::new(header, elements)?)
    }
}

// =============================================================================
// ENCODING
// =============================================================================

impl Manifest {
    /// Encodes the manifest in `encoding`.
    pub fn encode(&self, encoding: Encoding) -> Result<Vec<u8>, CodecError> {
        match encoding {
            Encoding::Polo => self.encode_polo(),
            Encoding::Json => {
                let envelope = self.envelope(Encoding::Json, RawPayload::into_json)?;
                Ok(serde_json::to_vec(&envelope)?)
            }
            Encoding::Yaml => {
                let envelope = self.envelope(Encoding::Yaml, RawPayload::into_yaml)?;
                Ok(serde_yaml::to_string(&envelope)?.into_bytes())
            }
        }
    }

    /// SHA-256 of the canonical binary encoding.
    pub fn hash(&self) -> Result<Hash, CodecError> {
        let encoded = self.encode_polo()?;
        Ok(Hash(Sha256::digest(&encoded).into()))
    }

    /// Element table with every payload in canonical binary form.
    pub fn logic_elements(&self) -> Result<LogicElementTable, CodecError> {
        self.elements()
            .iter()
            .map(|element| {
                let data = element
                    .data
                    .encode_payload(Encoding::Polo)
                    .and_then(RawPayload::into_polo)
                    .map_err(|source| payload_error(element, source))?;
                let logic = LogicElement {
                    kind: element.kind.clone(),
                    deps: element.deps.clone(),
                    data,
                };
                Ok::<_, CodecError>((element.ptr, logic))
            })
            .collect()
    }

    fn encode_polo(&self) -> Result<Vec<u8>, CodecError> {
        let mut elements = Polorizer::new();
        for element in self.elements() {
            let data = element
                .data
                .encode_payload(Encoding::Polo)
                .and_then(RawPayload::into_polo)
                .map_err(|source| payload_error(element, source))?;

            let mut entry = Polorizer::new();
            entry.write_u64(element.ptr);
            entry.polorize(&element.deps)?;
            entry.polorize(&element.kind)?;
            entry.write_raw(&data);
            elements.write_pack(entry);
        }

        let mut envelope = Polorizer::new();
        envelope.polorize(self.header())?;
        envelope.write_pack(elements);
        Ok(envelope.packed())
    }

    fn envelope<P>(
        &self,
        encoding: Encoding,
        unwrap: fn(RawPayload) -> Result<P, PayloadError>,
    ) -> Result<EnvelopeOut<'_, P>, CodecError> {
        let elements = self
            .elements()
            .iter()
            .map(|element| {
                let data = element
                    .data
                    .encode_payload(encoding)
                    .and_then(unwrap)
                    .map_err(|source| payload_error(element, source))?;
                Ok(ElementOut {
                    ptr: element.ptr,
                    deps: &element.deps,
                    kind: &element.kind,
                    data,
                })
            })
            .collect::<Result<_, CodecError>>()?;

        Ok(EnvelopeOut {
            header: self.header(),
            elements,
        })
    }
}

fn payload_error(element: &ManifestElement, source: PayloadError) -> CodecError {
    CodecError::Payload {
        ptr: element.ptr,
        kind: element.kind.clone(),
        source,
    }
}

fn expect_done(reader: &Depolorizer<'_>, what: &str) -> Result<(), CodecError> {
    if reader.is_done() {
        return Ok(());
    }
    Err(CodecError::Structural(format!(
        "{} unexpected trailing elements in {what}",
        reader.remaining()
    )))
}
