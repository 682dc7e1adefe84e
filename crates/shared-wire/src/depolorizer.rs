//! # Depolorizer
//!
//! Read-side cursor over canonical wire elements.
//!
//! A depolorizer yields elements one at a time. The top-level depolorizer
//! holds exactly one element; reading a pack produces a child depolorizer
//! over the pack's slots, one level deeper.

use crate::document::Document;
use crate::errors::WireError;
use crate::traits::Depolorize;
use crate::wire::{parse_load, split_element, WireType};
use crate::DEFAULT_MAX_DEPTH;
use std::collections::VecDeque;

/// Sequential reader over wire elements.
#[derive(Clone, Debug)]
pub struct Depolorizer<'a> {
    slots: VecDeque<(WireType, &'a [u8])>,
    depth: usize,
    max_depth: usize,
}

impl<'a> Depolorizer<'a> {
    /// Creates a reader over a single standalone element.
    pub fn new(data: &'a [u8]) -> Result<Self, WireError> {
        Self::with_max_depth(data, DEFAULT_MAX_DEPTH)
    }

    /// Creates a reader that refuses nesting beyond `max_depth` packs.
    pub fn with_max_depth(data: &'a [u8], max_depth: usize) -> Result<Self, WireError> {
        let (wire, body) = split_element(data)?;
        Ok(Self {
            slots: VecDeque::from([(wire, body)]),
            depth: 0,
            max_depth,
        })
    }

    /// Current nesting depth.
    #[must_use]
    pub fn depth(&self) -> usize {
        self.depth
    }

    /// Configured nesting limit.
    #[must_use]
    pub fn max_depth(&self) -> usize {
        self.max_depth
    }

    /// Number of unread elements.
    #[must_use]
    pub fn remaining(&self) -> usize {
        self.slots.len()
    }

    /// Returns true once every element has been read.
    #[must_use]
    pub fn is_done(&self) -> bool {
        self.slots.is_empty()
    }

    /// Wire type of the next element without consuming it.
    #[must_use]
    pub fn peek_wire(&self) -> Option<WireType> {
        self.slots.front().map(|(wire, _)| *wire)
    }

    /// Consumes the next element as a raw `(wire, body)` pair.
    pub fn read_slot(&mut self) -> Result<(WireType, &'a [u8]), WireError> {
        self.slots.pop_front().ok_or(WireError::UnexpectedEof)
    }

    /// Consumes a null element.
    pub fn read_null(&mut self) -> Result<(), WireError> {
        match self.read_slot()? {
            (WireType::Null, _) => Ok(()),
            (found, _) => Err(WireError::UnexpectedWire {
                expected: "null",
                found,
            }),
        }
    }

    /// Reads a boolean; null reads as false.
    pub fn read_bool(&mut self) -> Result<bool, WireError> {
        match self.read_slot()? {
            (WireType::True, _) => Ok(true),
            (WireType::False | WireType::Null, _) => Ok(false),
            (found, _) => Err(WireError::UnexpectedWire {
                expected: "bool",
                found,
            }),
        }
    }

    /// Reads an unsigned integer; null reads as zero.
    pub fn read_u64(&mut self) -> Result<u64, WireError> {
        match self.read_slot()? {
            (WireType::PosInt, body) => decode_magnitude(body),
            (WireType::Null, _) => Ok(0),
            (found, _) => Err(WireError::UnexpectedWire {
                expected: "posint",
                found,
            }),
        }
    }

    /// Reads a signed integer; null reads as zero.
    pub fn read_i64(&mut self) -> Result<i64, WireError> {
        let (wire, body) = self.read_slot()?;
        decode_signed(wire, body)
    }

    /// Reads an eight byte float; null reads as zero.
    pub fn read_f64(&mut self) -> Result<f64, WireError> {
        match self.read_slot()? {
            (WireType::Float, body) => decode_float(body),
            (WireType::Null, _) => Ok(0.0),
            (found, _) => Err(WireError::UnexpectedWire {
                expected: "float",
                found,
            }),
        }
    }

    /// Reads a UTF-8 word; null reads as empty.
    pub fn read_string(&mut self) -> Result<String, WireError> {
        match self.read_slot()? {
            (WireType::Word, body) => decode_utf8(body),
            (WireType::Null, _) => Ok(String::new()),
            (found, _) => Err(WireError::UnexpectedWire {
                expected: "word",
                found,
            }),
        }
    }

    /// Reads a byte word; null reads as empty.
    pub fn read_bytes(&mut self) -> Result<Vec<u8>, WireError> {
        match self.read_slot()? {
            (WireType::Word, body) => Ok(body.to_vec()),
            (WireType::Null, _) => Ok(Vec::new()),
            (found, _) => Err(WireError::UnexpectedWire {
                expected: "word",
                found,
            }),
        }
    }

    /// Reads an embedded raw element and returns its complete encoding.
    pub fn read_raw(&mut self) -> Result<&'a [u8], WireError> {
        match self.read_slot()? {
            (WireType::Raw, body) => Ok(body),
            (found, _) => Err(WireError::UnexpectedWire {
                expected: "raw",
                found,
            }),
        }
    }

    /// Opens the next pack as a child reader; null opens as empty.
    pub fn read_packed(&mut self) -> Result<Depolorizer<'a>, WireError> {
        match self.read_slot()? {
            (WireType::Pack, body) => self.child(parse_load(body)?),
            (WireType::Null, _) => self.child(Vec::new()),
            (found, _) => Err(WireError::UnexpectedWire {
                expected: "pack",
                found,
            }),
        }
    }

    /// Reads the next document.
    pub fn read_document(&mut self) -> Result<Document, WireError> {
        match self.read_slot()? {
            (WireType::Doc, body) => {
                self.check_depth()?;
                Document::from_load(body)
            }
            (WireType::Null, _) => Ok(Document::new()),
            (found, _) => Err(WireError::UnexpectedWire {
                expected: "document",
                found,
            }),
        }
    }

    /// Reads any depolorizable value.
    pub fn depolorize<T: Depolorize>(&mut self) -> Result<T, WireError> {
        T::depolorize(self)
    }

    /// Opens a child reader over explicit slots, one level deeper.
    pub fn child(&self, slots: Vec<(WireType, &'a [u8])>) -> Result<Depolorizer<'a>, WireError> {
        self.check_depth()?;
        Ok(Self {
            slots: slots.into(),
            depth: self.depth + 1,
            max_depth: self.max_depth,
        })
    }

    fn check_depth(&self) -> Result<(), WireError> {
        if self.depth + 1 > self.max_depth {
            return Err(WireError::TooDeep {
                max: self.max_depth,
            });
        }
        Ok(())
    }
}

// =============================================================================
// BODY DECODERS
// =============================================================================

/// Decodes a minimal big-endian magnitude of at most eight bytes.
pub fn decode_magnitude(body: &[u8]) -> Result<u64, WireError> {
    if body.len() > 8 {
        return Err(WireError::IntegerOverflow("u64"));
    }
    if body.first() == Some(&0) {
        return Err(WireError::NonCanonicalInteger);
    }
    Ok(body.iter().fold(0u64, |acc, b| (acc << 8) | u64::from(*b)))
}

/// Decodes a signed integer body given its wire type.
pub fn decode_signed(wire: WireType, body: &[u8]) -> Result<i64, WireError> {
    match wire {
        WireType::PosInt => {
            let magnitude = decode_magnitude(body)?;
            i64::try_from(magnitude).map_err(|_| WireError::IntegerOverflow("i64"))
        }
        WireType::NegInt => {
            let magnitude = decode_magnitude(body)?;
            if magnitude == 0 {
                return Err(WireError::NonCanonicalInteger);
            }
            if magnitude > i64::MIN.unsigned_abs() {
                return Err(WireError::IntegerOverflow("i64"));
            }
            // magnitude is within 1..=2^63, so the wrapping negation is exact
            Ok((magnitude as i64).wrapping_neg())
        }
        WireType::Null => Ok(0),
        found => Err(WireError::UnexpectedWire {
            expected: "integer",
            found,
        }),
    }
}

/// Decodes an eight byte big-endian float body.
pub fn decode_float(body: &[u8]) -> Result<f64, WireError> {
    let bytes: [u8; 8] = body
        .try_into()
        .map_err(|_| WireError::MalformedFloat(body.len()))?;
    Ok(f64::from_be_bytes(bytes))
}

/// Decodes a UTF-8 word body.
pub fn decode_utf8(body: &[u8]) -> Result<String, WireError> {
    std::str::from_utf8(body)
        .map(str::to_owned)
        .map_err(|_| WireError::InvalidUtf8)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_read_scalars() {
        let mut reader = Depolorizer::new(&[0x03, 0x64]).unwrap();
        assert_eq!(reader.read_u64().unwrap(), 100);
        assert!(reader.is_done());

        let mut reader = Depolorizer::new(&[0x04, 0x01, 0x2c]).unwrap();
        assert_eq!(reader.read_i64().unwrap(), -300);

        let mut reader = Depolorizer::new(&[0x04, 0x80, 0, 0, 0, 0, 0, 0, 0]).unwrap();
        assert_eq!(reader.read_i64().unwrap(), i64::MIN);
    }

    #[test]
    fn test_read_pack() {
        let data = [0x0e, 0x2f, 0x03, 0x13, 0x01, 0x02];
        let mut reader = Depolorizer::new(&data).unwrap();
        let mut pack = reader.read_packed().unwrap();

        assert_eq!(pack.depth(), 1);
        assert_eq!(pack.remaining(), 2);
        assert_eq!(pack.read_u64().unwrap(), 1);
        assert_eq!(pack.read_u64().unwrap(), 2);
        assert_eq!(pack.read_u64(), Err(WireError::UnexpectedEof));
    }

    #[test]
    fn test_wrong_wire_type() {
        let mut reader = Depolorizer::new(&[0x03, 0x01]).unwrap();
        assert_eq!(
            reader.read_string(),
            Err(WireError::UnexpectedWire {
                expected: "word",
                found: WireType::PosInt
            })
        );
    }

    #[test]
    fn test_non_canonical_integers() {
        assert_eq!(decode_magnitude(&[0x00, 0x01]), Err(WireError::NonCanonicalInteger));
        assert_eq!(decode_signed(WireType::NegInt, &[]), Err(WireError::NonCanonicalInteger));
        assert_eq!(
            decode_magnitude(&[1, 0, 0, 0, 0, 0, 0, 0, 0]),
            Err(WireError::IntegerOverflow("u64"))
        );
    }

    #[test]
    fn test_depth_limit() {
        // pack[pack[]]
        let data = [0x0e, 0x1f, 0x0e, 0x0f];
        let mut reader = Depolorizer::with_max_depth(&data, 1).unwrap();
        let mut outer = reader.read_packed().unwrap();
        assert_eq!(outer.read_packed().unwrap_err(), WireError::TooDeep { max: 1 });
    }

    #[test]
    fn test_malformed_float() {
        assert_eq!(decode_float(&[0x01, 0x02]), Err(WireError::MalformedFloat(2)));
    }
}
