//! # Error Types
//!
//! Errors raised while reading or writing the canonical wire format.

use crate::wire::WireType;
use thiserror::Error;

/// Errors from encoding or decoding canonical wire data.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum WireError {
    /// Input ended before the element was complete.
    #[error("unexpected end of input")]
    UnexpectedEof,

    /// Wire tag does not name a known wire type.
    #[error("invalid wire type: {0}")]
    InvalidWireType(u64),

    /// Element has a different wire type than the reader asked for.
    #[error("unexpected wire type: expected {expected}, found {found}")]
    UnexpectedWire {
        /// What the reader was prepared to accept.
        expected: &'static str,
        /// What was actually on the wire.
        found: WireType,
    },

    /// Varint carries redundant continuation bytes.
    #[error("non-minimal varint")]
    NonMinimalVarint,

    /// Varint does not fit in 64 bits.
    #[error("varint overflows 64 bits")]
    VarintOverflow,

    /// Integer body is not in its minimal big-endian form.
    #[error("non-canonical integer encoding")]
    NonCanonicalInteger,

    /// Integer does not fit the requested type.
    #[error("integer overflow: value does not fit {0}")]
    IntegerOverflow(&'static str),

    /// Float body is not exactly eight bytes.
    #[error("malformed float: expected 8 bytes, found {0}")]
    MalformedFloat(usize),

    /// Word body is not valid UTF-8.
    #[error("invalid utf-8 in word")]
    InvalidUtf8,

    /// Packed load header is inconsistent with its data.
    #[error("malformed load: {0}")]
    MalformedLoad(&'static str),

    /// Document entries are unpaired, unsorted or mistyped.
    #[error("malformed document: {0}")]
    MalformedDocument(String),

    /// Bytes remain after the top-level element.
    #[error("trailing data after element")]
    TrailingData,

    /// Nesting went beyond the configured limit.
    #[error("structure exceeds maximum depth of {max}")]
    TooDeep {
        /// Configured nesting limit.
        max: usize,
    },

    /// Element decoded but its value is not acceptable to the target type.
    #[error("invalid value: {0}")]
    InvalidValue(String),
}
