//! # Error Types
//!
//! All error types for manifest codecs, value encoding and call encoding.

use crate::domain::value_objects::{ElementKind, ElementPtr};
use shared_wire::WireError;
use thiserror::Error;

// =============================================================================
// CODEC ERRORS
// =============================================================================

/// Errors from decoding, encoding or loading a manifest.
#[derive(Debug, Error)]
pub enum CodecError {
    /// Envelope is not a well-formed manifest.
    #[error("malformed manifest: {0}")]
    Structural(String),

    /// Header or element table violates the manifest schema.
    #[error("schema violation: {0}")]
    Schema(#[from] SchemaError),

    /// An element's nested payload could not be decoded or encoded.
    #[error("payload of element {ptr} ({kind}) is invalid: {source}")]
    Payload {
        /// Pointer of the offending element.
        ptr: ElementPtr,
        /// Kind tag of the offending element.
        kind: ElementKind,
        /// Underlying payload failure.
        #[source]
        source: PayloadError,
    },

    /// Nesting exceeded the configured depth.
    #[error("manifest exceeds maximum depth of {max}")]
    StructureTooDeep {
        /// Configured nesting limit.
        max: usize,
    },

    /// Manifest file could not be read.
    #[error("failed to load manifest: {0}")]
    Load(String),
}

impl From<WireError> for CodecError {
    fn from(err: WireError) -> Self {
        match err {
            WireError::TooDeep { max } => CodecError::StructureTooDeep { max },
            other => CodecError::Structural(other.to_string()),
        }
    }
}

impl From<serde_json::Error> for CodecError {
    fn from(err: serde_json::Error) -> Self {
        CodecError::Structural(err.to_string())
    }
}

impl From<serde_yaml::Error> for CodecError {
    fn from(err: serde_yaml::Error) -> Self {
        CodecError::Structural(err.to_string())
    }
}

/// Manifest schema violations.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum SchemaError {
    /// Header syntax version is not supported.
    #[error("unsupported manifest syntax: {0}")]
    UnsupportedSyntax(String),

    /// Header engine kind is unknown or has no registered runtime.
    #[error("unknown engine: {0}")]
    UnknownEngine(String),

    /// The engine runtime has no payload generator for an element kind.
    #[error("unrecognized element kind '{kind}' at ptr {ptr}")]
    UnrecognizedElementKind {
        /// Pointer of the element.
        ptr: ElementPtr,
        /// Unrecognized kind tag.
        kind: ElementKind,
    },

    /// Two elements share a pointer.
    #[error("duplicate element ptr: {0}")]
    DuplicateElement(ElementPtr),
}

/// Errors from encoding or decoding an element payload.
#[derive(Debug, Error)]
pub enum PayloadError {
    /// Canonical binary failure.
    #[error("wire: {0}")]
    Wire(#[from] WireError),

    /// JSON failure.
    #[error("json: {0}")]
    Json(#[from] serde_json::Error),

    /// YAML failure.
    #[error("yaml: {0}")]
    Yaml(#[from] serde_yaml::Error),

    /// Payload was produced in a different encoding than requested.
    #[error("payload encoding mismatch: expected {expected}, found {found}")]
    EncodingMismatch {
        /// Requested encoding.
        expected: &'static str,
        /// Encoding actually produced.
        found: &'static str,
    },
}

// =============================================================================
// VALUE ENCODER ERRORS
// =============================================================================

/// Errors from the deterministic value encoder.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum EncodeError {
    /// Reference could not be resolved.
    #[error("reference error: {0}")]
    Reference(#[from] ReferenceError),

    /// Map keys could not be put in canonical order.
    #[error("key ordering error: {0}")]
    KeyOrdering(#[from] KeyOrderingError),

    /// Value nesting exceeded the configured depth.
    #[error("value exceeds maximum depth of {max}")]
    StructureTooDeep {
        /// Configured nesting limit.
        max: usize,
    },

    /// Canonical binary failure.
    #[error("wire: {0}")]
    Wire(#[from] WireError),
}

/// Reference resolution failures.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ReferenceError {
    /// A reference was encountered without a provider to resolve it.
    #[error("no reference provider for {0}")]
    MissingProvider(String),

    /// The provider does not know the reference.
    #[error("unresolved reference: {0}")]
    Unresolved(String),
}

/// Map key ordering failures.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum KeyOrderingError {
    /// Byte or array keys of different lengths were compared.
    #[error("mismatched key length: {left} vs {right}")]
    MismatchedLength {
        /// Length of the left key.
        left: usize,
        /// Length of the right key.
        right: usize,
    },

    /// Keys have no total order (NaN floats).
    #[error("incomparable keys: {0}")]
    Incomparable(String),

    /// Two keys are equal.
    #[error("duplicate map key: {0}")]
    DuplicateKey(String),
}

// =============================================================================
// CALL ENCODER ERRORS
// =============================================================================

/// Errors from building or using a call encoder.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum CallError {
    /// No element at the callsite's pointer.
    #[error("callsite '{callsite}' points at missing element {ptr}")]
    ElementNotFound {
        /// Callsite name.
        callsite: String,
        /// Pointer the callsite refers to.
        ptr: ElementPtr,
    },

    /// Element payload exposes no call signature.
    #[error("element {ptr} ({kind}) is not callable")]
    NotCallable {
        /// Element pointer.
        ptr: ElementPtr,
        /// Element kind.
        kind: ElementKind,
    },

    /// A declared input has no argument.
    #[error("missing argument: {0}")]
    MissingArgument(String),

    /// An argument has no declared input.
    #[error("unexpected argument: {0}")]
    UnexpectedArgument(String),

    /// An argument does not conform to its declared shape.
    #[error("argument '{label}' does not match {expected}: {reason}")]
    ShapeMismatch {
        /// Input label.
        label: String,
        /// Declared shape.
        expected: String,
        /// What went wrong.
        reason: String,
    },

    /// Argument encoding failed.
    #[error("encode: {0}")]
    Encode(#[from] EncodeError),

    /// Output decoding failed.
    #[error("decode: {0}")]
    Decode(#[from] WireError),

    /// A declared output is absent from the output document.
    #[error("missing output: {0}")]
    MissingOutput(String),
}

// =============================================================================
// ENGINE ERRORS
// =============================================================================

/// Failures surfaced by engine runtimes and their collaborators.
#[derive(Debug, Error)]
pub enum EngineError {
    /// Manifest could not be compiled.
    #[error("compile failed: {0}")]
    Compile(String),

    /// Engine instance could not be spawned.
    #[error("spawn failed: {0}")]
    Spawn(String),

    /// Calldata was rejected.
    #[error("invalid calldata: {0}")]
    InvalidCalldata(String),

    /// Signature handling failed.
    #[error("crypto: {0}")]
    Crypto(String),

    /// Operation is not supported by this runtime.
    #[error("unsupported: {0}")]
    Unsupported(String),

    /// Codec failure.
    #[error("codec: {0}")]
    Codec(#[from] CodecError),

    /// Call encoding failure.
    #[error("call: {0}")]
    Call(#[from] CallError),

    /// Canonical binary failure.
    #[error("wire: {0}")]
    Wire(#[from] WireError),
}

/// A type shape string does not follow the shape grammar.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[error("invalid type shape '{input}': {reason}")]
pub struct ShapeParseError {
    /// Rejected input.
    pub input: String,
    /// What went wrong.
    pub reason: &'static str,
}

/// A string did not match any entry of an enumeration's string table.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[error("invalid {enumeration}: '{value}'")]
pub struct UnknownVariant {
    /// Enumeration name.
    pub enumeration: &'static str,
    /// Rejected input.
    pub value: String,
}
