//! # Call Encoder
//!
//! Encodes call arguments and decodes call results for one callsite, using
//! the call signature exposed by the callsite's element payload.
//!
//! Arguments travel as a document keyed by input label; results come back
//! as a document keyed by output label.

use crate::codec::shapes::decode_value;
use crate::codec::values::{EncoderConfig, ValueEncoder};
use crate::domain::abi::{CallSignature, Callsite, TypeField};
use crate::domain::manifest::Manifest;
use crate::domain::values::Value;
use crate::errors::CallError;
use crate::ports::inbound::{CallEncoder, NamedValues};
use crate::ports::outbound::ReferenceProvider;
use shared_wire::Document;
use tracing::debug;

/// Call encoder backed by a declared signature.
#[derive(Debug, Clone, PartialEq)]
pub struct ManifestCallEncoder {
    callsite: Callsite,
    signature: CallSignature,
    config: EncoderConfig,
}

impl ManifestCallEncoder {
    /// Creates an encoder for `callsite` with `signature`.
    #[must_use]
    pub fn new(callsite: Callsite, signature: CallSignature, config: EncoderConfig) -> Self {
        Self {
            callsite,
            signature,
            config,
        }
    }

    /// Callsite served by this encoder.
    #[must_use]
    pub fn callsite(&self) -> &Callsite {
        &self.callsite
    }

    /// Declared signature.
    #[must_use]
    pub fn signature(&self) -> &CallSignature {
        &self.signature
    }

    /// Checks `args` against the declared inputs without encoding anything.
    pub fn validate_inputs(&self, args: &NamedValues) -> Result<(), CallError> {
        for label in args.keys() {
            if self.signature.input(label).is_none() {
                return Err(CallError::UnexpectedArgument(label.clone()));
            }
        }

        for field in &self.signature.inputs {
            let value = args
                .get(&field.label)
                .ok_or_else(|| CallError::MissingArgument(field.label.clone()))?;
            check_field(field, value)?;
        }
        Ok(())
    }
}

/// References pass this check; arguments are checked again once resolved.
fn check_field(field: &TypeField, value: &Value) -> Result<(), CallError> {
    field
        .shape
        .check(value)
        .map_err(|reason| CallError::ShapeMismatch {
            label: field.label.clone(),
            expected: field.shape.to_string(),
            reason,
        })
}

impl CallEncoder for ManifestCallEncoder {
    fn encode_inputs(
        &self,
        args: &NamedValues,
        references: Option<&dyn ReferenceProvider>,
    ) -> Result<Vec<u8>, CallError> {
        self.validate_inputs(args)?;

        let encoder = ValueEncoder::new(self.config, references);
        let mut document = Document::new();
        for field in &self.signature.inputs {
            let value = args
                .get(&field.label)
                .ok_or_else(|| CallError::MissingArgument(field.label.clone()))?;
            let resolved = encoder.resolve(value)?;
            check_field(field, &resolved)?;
            document.set_raw(field.label.clone(), encoder.encode(&resolved)?);
        }

        debug!(
            callsite = %self.callsite.name,
            inputs = document.len(),
            "encoded call inputs"
        );
        Ok(document.bytes())
    }

    fn decode_outputs(&self, data: &[u8]) -> Result<NamedValues, CallError> {
        let document = if data.is_empty() {
            Document::new()
        } else {
            Document::from_bytes(data)?
        };

        let mut outputs = NamedValues::new();
        for field in &self.signature.outputs {
            let raw = document
                .get_raw(&field.label)
                .ok_or_else(|| CallError::MissingOutput(field.label.clone()))?;
            let value = decode_value(raw, &field.shape, self.config.max_depth)?;
            outputs.insert(field.label.clone(), value);
        }
        Ok(outputs)
    }
}

impl Manifest {
    /// Call encoder for `callsite` with default encoder settings.
    pub fn call_encoder(&self, callsite: &Callsite) -> Result<ManifestCallEncoder, CallError> {
        self.call_encoder_with(callsite, EncoderConfig::default())
    }

    /// Call encoder for `callsite` with explicit encoder settings.
    pub fn call_encoder_with(
        &self,
        callsite: &Callsite,
        config: EncoderConfig,
    ) -> Result<ManifestCallEncoder, CallError> {
        let element = self
            .element(callsite.ptr)
            .ok_or_else(|| CallError::ElementNotFound {
                callsite: callsite.name.clone(),
                ptr: callsite.ptr,
            })?;

        let signature = element
            .data
            .signature()
            .ok_or_else(|| CallError::NotCallable {
                ptr: element.ptr,
                kind: element.kind.clone(),
            })?;

        Ok(ManifestCallEncoder::new(callsite.clone(), signature.clone(), config))
    }
}
