//! # Element Payloads
//!
//! Every manifest element carries engine-defined data. The codec never knows
//! the concrete type; it asks the engine runtime for a prototype and lets the
//! prototype decode itself from a [`RawPayload`] in the envelope's encoding.
//!
//! Types implementing [`PayloadData`] get [`ElementPayload`] for free.

use crate::domain::abi::CallSignature;
use crate::domain::value_objects::Encoding;
use crate::errors::PayloadError;
use serde::de::DeserializeOwned;
use serde::Serialize;
use shared_wire::{Depolorize, Polorize};
use std::any::Any;
use std::fmt;

/// Element data in one of the three wire encodings.
#[derive(Clone, Debug, PartialEq)]
pub enum RawPayload {
    /// Complete canonical binary element.
    Polo(Vec<u8>),
    /// JSON sub-document.
    Json(serde_json::Value),
    /// YAML sub-document.
    Yaml(serde_yaml::Value),
}

impl RawPayload {
    /// Encoding of this payload.
    #[must_use]
    pub const fn encoding(&self) -> Encoding {
        match self {
            RawPayload::Polo(_) => Encoding::Polo,
            RawPayload::Json(_) => Encoding::Json,
            RawPayload::Yaml(_) => Encoding::Yaml,
        }
    }

    /// Canonical binary bytes, or a mismatch error.
    pub fn into_polo(self) -> Result<Vec<u8>, PayloadError> {
        match self {
            RawPayload::Polo(bytes) => Ok(bytes),
            other => Err(other.mismatch(Encoding::Polo)),
        }
    }

    /// JSON sub-document, or a mismatch error.
    pub fn into_json(self) -> Result<serde_json::Value, PayloadError> {
        match self {
            RawPayload::Json(value) => Ok(value),
            other => Err(other.mismatch(Encoding::Json)),
        }
    }

    /// YAML sub-document, or a mismatch error.
    pub fn into_yaml(self) -> Result<serde_yaml::Value, PayloadError> {
        match self {
            RawPayload::Yaml(value) => Ok(value),
            other => Err(other.mismatch(Encoding::Yaml)),
        }
    }

    fn mismatch(&self, expected: Encoding) -> PayloadError {
        PayloadError::EncodingMismatch {
            expected: expected.as_str(),
            found: self.encoding().as_str(),
        }
    }
}

/// Engine-defined element data, handled polymorphically by the codec.
pub trait ElementPayload: fmt::Debug + Send + Sync + 'static {
    /// Encodes the payload in `encoding`.
    fn encode_payload(&self, encoding: Encoding) -> Result<RawPayload, PayloadError>;

    /// Replaces the payload contents with the decoded `raw` payload.
    fn decode_payload(&mut self, raw: &RawPayload, max_depth: usize) -> Result<(), PayloadError>;

    /// Call signature, if the element is callable.
    fn signature(&self) -> Option<&CallSignature>;

    /// Boxed copy of this payload.
    fn clone_payload(&self) -> Box<dyn ElementPayload>;

    /// Structural equality against another payload of any type.
    fn eq_payload(&self, other: &dyn ElementPayload) -> bool;

    /// Upcast for downcasting to the concrete payload type.
    fn as_any(&self) -> &dyn Any;
}

impl dyn ElementPayload {
    /// Concrete payload, if it is a `T`.
    #[must_use]
    pub fn downcast_ref<T: ElementPayload>(&self) -> Option<&T> {
        self.as_any().downcast_ref::<T>()
    }
}

impl Clone for Box<dyn ElementPayload> {
    fn clone(&self) -> Self {
        self.clone_payload()
    }
}

impl PartialEq for dyn ElementPayload {
    fn eq(&self, other: &Self) -> bool {
        self.eq_payload(other)
    }
}

/// Plain data types usable as element payloads in all three encodings.
pub trait PayloadData:
    Polorize + Depolorize + Serialize + DeserializeOwned + Clone + PartialEq + fmt::Debug + Send + Sync + 'static
{
    /// Call signature, if the element is callable.
    fn call_signature(&self) -> Option<&CallSignature> {
        None
    }
}

impl<T: PayloadData> ElementPayload for T {
    fn encode_payload(&self, encoding: Encoding) -> Result<RawPayload, PayloadError> {
        Ok(match encoding {
            Encoding::Polo => RawPayload::Polo(shared_wire::polorize(self)?),
            Encoding::Json => RawPayload::Json(serde_json::to_value(self)?),
            Encoding::Yaml => RawPayload::Yaml(serde_yaml::to_value(self)?),
        })
    }

    fn decode_payload(&mut self, raw: &RawPayload, max_depth: usize) -> Result<(), PayloadError> {
        *self = match raw {
            RawPayload::Polo(bytes) => shared_wire::depolorize_with_depth(bytes, max_depth)?,
            RawPayload::Json(value) => T::deserialize(value)?,
            RawPayload::Yaml(value) => T::deserialize(value)?,
        };
        Ok(())
    }

    fn signature(&self) -> Option<&CallSignature> {
        self.call_signature()
    }

    fn clone_payload(&self) -> Box<dyn ElementPayload> {
        Box::new(self.clone())
    }

    fn eq_payload(&self, other: &dyn ElementPayload) -> bool {
        other
            .as_any()
            .downcast_ref::<T>()
            .is_some_and(|other| other == self)
    }

    fn as_any(&self) -> &dyn Any {
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde::Deserialize;
    use shared_wire::{Depolorizer, Polorizer, WireError};

    #[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
    struct Note {
        text: String,
    }

    impl Polorize for Note {
        fn polorize(&self, polorizer: &mut Polorizer) -> Result<(), WireError> {
            polorizer.write_str(&self.text);
            Ok(())
        }
    }

    impl Depolorize for Note {
        fn depolorize(depolorizer: &mut Depolorizer<'_>) -> Result<Self, WireError> {
            Ok(Self {
                text: depolorizer.read_string()?,
            })
        }
    }

    impl PayloadData for Note {}

    #[test]
    fn test_payload_in_every_encoding() {
        let note = Note {
            text: "hi".to_string(),
        };
        for encoding in Encoding::ALL {
            let raw = note.encode_payload(*encoding).unwrap();
            assert_eq!(raw.encoding(), *encoding);

            let mut decoded = Note::default();
            decoded.decode_payload(&raw, 8).unwrap();
            assert_eq!(decoded, note);
        }
    }

    #[test]
    fn test_dyn_payload_equality_and_downcast() {
        let a: Box<dyn ElementPayload> = Box::new(Note {
            text: "a".to_string(),
        });
        let b = a.clone();
        assert!(*a == *b);
        assert_eq!(b.downcast_ref::<Note>().map(|n| n.text.as_str()), Some("a"));
        assert!(a.signature().is_none());
    }

    #[test]
    fn test_encoding_mismatch() {
        let raw = RawPayload::Json(serde_json::Value::Null);
        assert!(matches!(
            raw.into_polo(),
            Err(PayloadError::EncodingMismatch {
                expected: "POLO",
                found: "JSON"
            })
        ));
    }
}
