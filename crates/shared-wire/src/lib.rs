//! # Shared Wire - Canonical Binary Encoding
//!
//! The canonical binary format (POLO) used for manifest content hashes and
//! call-argument transport. The format is deterministic: a given logical
//! value has exactly one encoding, and the decoder rejects every other one.
//!
//! ## Wire Layout
//!
//! | Wire | Tag | Body |
//! |------|-----|------|
//! | `null` | 0 | empty |
//! | `false` / `true` | 1 / 2 | empty |
//! | `posint` / `negint` | 3 / 4 | minimal big-endian magnitude |
//! | `raw` | 5 | a complete embedded element |
//! | `word` | 6 | UTF-8 or byte string |
//! | `float` | 7 | 8 byte big-endian IEEE-754 |
//! | `document` | 13 | load of sorted `word` keys and `raw` values |
//! | `pack` | 14 | load of elements |
//!
//! A load is `varint(header_len << 4 | 15)`, then one varint per slot
//! (`offset << 4 | wire`), then the concatenated slot bodies.
//!
//! ## Usage
//!
//! ```
//! use shared_wire::{depolorize, polorize};
//!
//! let encoded = polorize(&100u64).unwrap();
//! assert_eq!(encoded, vec![0x03, 0x64]);
//! assert_eq!(depolorize::<u64>(&encoded).unwrap(), 100);
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod depolorizer;
pub mod document;
pub mod errors;
pub mod polorizer;
pub mod traits;
pub mod wire;

pub use depolorizer::Depolorizer;
pub use document::Document;
pub use errors::WireError;
pub use polorizer::Polorizer;
pub use traits::{Depolorize, Polorize};
pub use wire::WireType;

/// Nesting limit applied when no explicit limit is given.
pub const DEFAULT_MAX_DEPTH: usize = 64;

/// Encodes a value as one standalone element.
pub fn polorize<T: Polorize + ?Sized>(value: &T) -> Result<Vec<u8>, WireError> {
    let mut polorizer = Polorizer::new();
    value.polorize(&mut polorizer)?;
    Ok(polorizer.bytes())
}

/// Decodes a standalone element, rejecting trailing data.
pub fn depolorize<T: Depolorize>(data: &[u8]) -> Result<T, WireError> {
    depolorize_with_depth(data, DEFAULT_MAX_DEPTH)
}

/// Decodes a standalone element with an explicit nesting limit.
pub fn depolorize_with_depth<T: Depolorize>(data: &[u8], max_depth: usize) -> Result<T, WireError> {
    let mut depolorizer = Depolorizer::with_max_depth(data, max_depth)?;
    let value = T::depolorize(&mut depolorizer)?;
    if !depolorizer.is_done() {
        tracing::trace!(remaining = depolorizer.remaining(), "unread elements after decode");
        return Err(WireError::TrailingData);
    }
    Ok(value)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_reference_scalar() {
        assert_eq!(polorize(&100u64).unwrap(), vec![0x03, 0x64]);
        assert_eq!(hex::encode(polorize("hello world").unwrap()), "0668656c6c6f20776f726c64");
    }

    #[test]
    fn test_depolorize_rejects_wrong_type() {
        let encoded = polorize("word").unwrap();
        assert!(matches!(
            depolorize::<u64>(&encoded),
            Err(WireError::UnexpectedWire { .. })
        ));
    }

    #[test]
    fn test_depth_limit_applies() {
        let nested = vec![vec![vec![1u64]]];
        let encoded = polorize(&nested).unwrap();

        assert!(depolorize_with_depth::<Vec<Vec<Vec<u64>>>>(&encoded, 3).is_ok());
        assert_eq!(
            depolorize_with_depth::<Vec<Vec<Vec<u64>>>>(&encoded, 2),
            Err(WireError::TooDeep { max: 2 })
        );
    }
}
