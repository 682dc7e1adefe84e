//! # Deterministic Value Encoder
//!
//! Turns a [`Value`] into canonical binary bytes. Output depends only on
//! the value's content and on what its references resolve to.
//!
//! ## Rules
//!
//! | Shape | Encoding |
//! |-------|----------|
//! | `Object` | document; keys in byte order |
//! | `Map` | `key, value` pairs in canonical key order |
//! | `List` | elements in order |
//! | `Reference` | the encoding of the resolved value |
//! | `Scalar` | the scalar's wire type |
//!
//! Lists, maps and array keys are rendered like any written sequence: no
//! elements is `null`, one element is that element alone and anything longer
//! is a pack.
//!
//! Every container and every reference hop counts one level toward
//! [`EncoderConfig::max_depth`].

use crate::codec::ordering::sorted_entries;
use crate::domain::values::{MapKey, ReferenceValue, Scalar, Value};
use crate::errors::{EncodeError, KeyOrderingError, ReferenceError};
use crate::ports::outbound::ReferenceProvider;
use shared_wire::{Document, Polorizer};
use std::collections::HashSet;
use tracing::trace;

/// Value encoder settings.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EncoderConfig {
    /// Deepest container or reference nesting accepted.
    pub max_depth: usize,
}

impl Default for EncoderConfig {
    fn default() -> Self {
        Self {
            max_depth: shared_wire::DEFAULT_MAX_DEPTH,
        }
    }
}

/// Encodes `value` with default settings.
pub fn encode_value(value: &Value, references: Option<&dyn ReferenceProvider>) -> Result<Vec<u8>, EncodeError> {
    ValueEncoder::new(EncoderConfig::default(), references).encode(value)
}

/// Encoder bound to a configuration and an optional reference provider.
pub struct ValueEncoder<'r> {
    config: EncoderConfig,
    references: Option<&'r dyn ReferenceProvider>,
}

impl<'r> ValueEncoder<'r> {
    /// Creates an encoder.
    #[must_use]
    pub fn new(config: EncoderConfig, references: Option<&'r dyn ReferenceProvider>) -> Self {
        Self { config, references }
    }

    /// Encodes `value` as one standalone element.
    pub fn encode(&self, value: &Value) -> Result<Vec<u8>, EncodeError> {
        self.encode_at(value, 0)
    }

    /// Replaces every reference inside `value` with what it resolves to.
    ///
    /// Depth is counted the same way as in [`ValueEncoder::encode`].
    pub fn resolve(&self, value: &Value) -> Result<Value, EncodeError> {
        self.resolve_at(value, 0)
    }

    fn resolve_at(&self, value: &Value, depth: usize) -> Result<Value, EncodeError> {
        match value {
            Value::Scalar(_) => Ok(value.clone()),
            Value::Object(fields) => {
                let depth = self.descend(depth)?;
                let fields = fields
                    .iter()
                    .map(|(name, field)| Ok((name.clone(), self.resolve_at(field, depth)?)))
                    .collect::<Result<_, EncodeError>>()?;
                Ok(Value::Object(fields))
            }
            Value::Map(entries) => {
                let depth = self.descend(depth)?;
                let entries = entries
                    .iter()
                    .map(|(key, entry)| Ok((key.clone(), self.resolve_at(entry, depth)?)))
                    .collect::<Result<_, EncodeError>>()?;
                Ok(Value::Map(entries))
            }
            Value::List(items) => {
                let depth = self.descend(depth)?;
                let items = items
                    .iter()
                    .map(|item| self.resolve_at(item, depth))
                    .collect::<Result<_, _>>()?;
                Ok(Value::List(items))
            }
            Value::Reference(reference) => {
                let depth = self.descend(depth)?;
                let resolved = self.lookup(reference)?;
                self.resolve_at(&resolved, depth)
            }
        }
    }

    fn lookup(&self, reference: &ReferenceValue) -> Result<Value, ReferenceError> {
        let provider = self
            .references
            .ok_or_else(|| ReferenceError::MissingProvider(reference.to_string()))?;
        let resolved = provider
            .get_reference(reference)
            .ok_or_else(|| ReferenceError::Unresolved(reference.to_string()))?;
        trace!(reference = %reference, "resolved reference");
        Ok(resolved)
    }

    fn descend(&self, depth: usize) -> Result<usize, EncodeError> {
        let next = depth + 1;
        if next > self.config.max_depth {
            return Err(EncodeError::StructureTooDeep {
                max: self.config.max_depth,
            });
        }
        Ok(next)
    }

    fn encode_at(&self, value: &Value, depth: usize) -> Result<Vec<u8>, EncodeError> {
        match value {
            Value::Scalar(scalar) => Ok(encode_scalar(scalar)),

            Value::Object(fields) => {
                let depth = self.descend(depth)?;
                let mut document = Document::new();
                for (name, field) in fields {
                    document.set_raw(name.clone(), self.encode_at(field, depth)?);
                }
                Ok(document.bytes())
            }

            Value::Map(entries) => {
                let depth = self.descend(depth)?;
                let mut pack = Polorizer::new();
                let mut seen = HashSet::new();
                for (key, entry) in sorted_entries(entries)? {
                    let encoded = self.encode_key(key, depth)?;
                    if seen.contains(&encoded) {
                        return Err(KeyOrderingError::DuplicateKey(key.to_string()).into());
                    }
                    pack.write_encoded(&encoded)?;
                    seen.insert(encoded);
                    pack.write_encoded(&self.encode_at(entry, depth)?)?;
                }
                Ok(pack.bytes())
            }

            Value::List(items) => {
                let depth = self.descend(depth)?;
                let mut pack = Polorizer::new();
                for item in items {
                    pack.write_encoded(&self.encode_at(item, depth)?)?;
                }
                Ok(pack.bytes())
            }

            Value::Reference(reference) => {
                let depth = self.descend(depth)?;
                let resolved = self.lookup(reference)?;
                self.encode_at(&resolved, depth)
            }
        }
    }

    fn encode_key(&self, key: &MapKey, depth: usize) -> Result<Vec<u8>, EncodeError> {
        let mut polorizer = Polorizer::new();
        match key {
            MapKey::Bool(v) => polorizer.write_bool(*v),
            MapKey::Int(v) => polorizer.write_i64(*v),
            MapKey::Uint(v) => polorizer.write_u64(*v),
            MapKey::Float(v) => polorizer.write_f64(*v),
            MapKey::String(v) => polorizer.write_str(v),
            MapKey::Bytes(v) => polorizer.write_bytes(v),
            MapKey::Array(items) => {
                let depth = self.descend(depth)?;
                let mut pack = Polorizer::new();
                for item in items {
                    pack.write_encoded(&self.encode_key(item, depth)?)?;
                }
                return Ok(pack.bytes());
            }
        }
        Ok(polorizer.bytes())
    }
}

fn encode_scalar(scalar: &Scalar) -> Vec<u8> {
    let mut polorizer = Polorizer::new();
    match scalar {
        Scalar::Null => polorizer.write_null(),
        Scalar::Bool(v) => polorizer.write_bool(*v),
        Scalar::Int(v) => polorizer.write_i64(*v),
        Scalar::Uint(v) => polorizer.write_u64(*v),
        Scalar::Float(v) => polorizer.write_f64(*v),
        Scalar::String(v) => polorizer.write_str(v),
        Scalar::Bytes(v) => polorizer.write_bytes(v),
    }
    polorizer.bytes()
}
