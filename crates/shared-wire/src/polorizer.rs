//! # Polorizer
//!
//! Write-side buffer for canonical wire elements.

use crate::document::Document;
use crate::errors::WireError;
use crate::traits::Polorize;
use crate::wire::{build_load, frame_element, split_element, WireType};

/// Accumulates encoded elements in write order.
///
/// A polorizer holding a single element renders as that element; more than
/// one element renders as a pack. Use [`Polorizer::packed`] when a pack is
/// required regardless of the element count.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Polorizer {
    slots: Vec<(WireType, Vec<u8>)>,
}

impl Polorizer {
    /// Creates an empty polorizer.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of elements written so far.
    #[must_use]
    pub fn len(&self) -> usize {
        self.slots.len()
    }

    /// Returns true if nothing has been written.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }

    /// Writes a null element.
    pub fn write_null(&mut self) {
        self.slots.push((WireType::Null, Vec::new()));
    }

    /// Writes a boolean.
    pub fn write_bool(&mut self, value: bool) {
        let wire = if value { WireType::True } else { WireType::False };
        self.slots.push((wire, Vec::new()));
    }

    /// Writes an unsigned integer as a minimal big-endian body.
    pub fn write_u64(&mut self, value: u64) {
        self.slots.push((WireType::PosInt, minimal_be(value)));
    }

    /// Writes a signed integer; negatives carry their magnitude.
    pub fn write_i64(&mut self, value: i64) {
        if value >= 0 {
            self.slots.push((WireType::PosInt, minimal_be(value.unsigned_abs())));
        } else {
            self.slots.push((WireType::NegInt, minimal_be(value.unsigned_abs())));
        }
    }

    /// Writes a float as eight big-endian bytes.
    pub fn write_f64(&mut self, value: f64) {
        self.slots.push((WireType::Float, value.to_be_bytes().to_vec()));
    }

    /// Writes a UTF-8 string.
    pub fn write_str(&mut self, value: &str) {
        self.slots.push((WireType::Word, value.as_bytes().to_vec()));
    }

    /// Writes a byte string.
    pub fn write_bytes(&mut self, value: &[u8]) {
        self.slots.push((WireType::Word, value.to_vec()));
    }

    /// Embeds a complete encoded element as an opaque raw value.
    pub fn write_raw(&mut self, encoded: &[u8]) {
        self.slots.push((WireType::Raw, encoded.to_vec()));
    }

    /// Inlines a complete encoded element, keeping its own wire type.
    pub fn write_encoded(&mut self, encoded: &[u8]) -> Result<(), WireError> {
        let (wire, body) = split_element(encoded)?;
        self.slots.push((wire, body.to_vec()));
        Ok(())
    }

    /// Writes the contents of another polorizer as a nested pack.
    pub fn write_pack(&mut self, inner: Polorizer) {
        self.slots.push((WireType::Pack, inner.load()));
    }

    /// Writes a document.
    pub fn write_document(&mut self, document: &Document) {
        self.slots.push((WireType::Doc, document.load()));
    }

    /// Writes any polorizable value.
    pub fn polorize<T: Polorize + ?Sized>(&mut self, value: &T) -> Result<(), WireError> {
        value.polorize(self)
    }

    /// Renders the written elements as one standalone element.
    ///
    /// Zero elements render as null and a single element renders as itself.
    #[must_use]
    pub fn bytes(self) -> Vec<u8> {
        match self.slots.len() {
            0 => frame_element(WireType::Null, &[]),
            1 => {
                let (wire, body) = &self.slots[0];
                frame_element(*wire, body)
            }
            _ => self.packed(),
        }
    }

    /// Renders the written elements as a pack, whatever their count.
    #[must_use]
    pub fn packed(self) -> Vec<u8> {
        frame_element(WireType::Pack, &self.load())
    }

    fn load(&self) -> Vec<u8> {
        build_load(self.slots.iter().map(|(wire, body)| (*wire, body.as_slice())))
    }
}

/// Big-endian bytes with leading zeros stripped; zero is empty.
fn minimal_be(value: u64) -> Vec<u8> {
    let bytes = value.to_be_bytes();
    let skip = bytes.iter().take_while(|b| **b == 0).count();
    bytes[skip..].to_vec()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_small_uint() {
        let mut polorizer = Polorizer::new();
        polorizer.write_u64(100);
        assert_eq!(polorizer.bytes(), vec![0x03, 0x64]);
    }

    #[test]
    fn test_zero_has_empty_body() {
        let mut polorizer = Polorizer::new();
        polorizer.write_u64(0);
        assert_eq!(polorizer.bytes(), vec![0x03]);
    }

    #[test]
    fn test_negative_int() {
        let mut polorizer = Polorizer::new();
        polorizer.write_i64(-300);
        assert_eq!(polorizer.bytes(), vec![0x04, 0x01, 0x2c]);

        let mut polorizer = Polorizer::new();
        polorizer.write_i64(i64::MIN);
        assert_eq!(
            polorizer.bytes(),
            vec![0x04, 0x80, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00]
        );
    }

    #[test]
    fn test_string() {
        let mut polorizer = Polorizer::new();
        polorizer.write_str("hello world");
        assert_eq!(
            polorizer.bytes(),
            vec![0x06, 0x68, 0x65, 0x6c, 0x6c, 0x6f, 0x20, 0x77, 0x6f, 0x72, 0x6c, 0x64]
        );
    }

    #[test]
    fn test_empty_renders_null() {
        assert_eq!(Polorizer::new().bytes(), vec![0x00]);
        assert_eq!(Polorizer::new().packed(), vec![0x0e, 0x0f]);
    }

    #[test]
    fn test_multiple_elements_render_pack() {
        let mut polorizer = Polorizer::new();
        polorizer.write_u64(1);
        polorizer.write_u64(2);
        assert_eq!(polorizer.bytes(), vec![0x0e, 0x2f, 0x03, 0x13, 0x01, 0x02]);
    }

    #[test]
    fn test_write_encoded_inlines_wire() {
        let mut polorizer = Polorizer::new();
        polorizer.write_encoded(&[0x06, b'b', b'a', b'r']).unwrap();
        polorizer.write_encoded(&[0x03, 0x02]).unwrap();
        polorizer.write_encoded(&[0x06, b'f', b'o', b'o']).unwrap();
        polorizer.write_encoded(&[0x03, 0x01]).unwrap();
        assert_eq!(
            polorizer.packed(),
            vec![0x0e, 0x4f, 0x06, 0x33, 0x46, 0x73, b'b', b'a', b'r', 0x02, b'f', b'o', b'o', 0x01]
        );
    }

    #[test]
    fn test_write_encoded_rejects_garbage() {
        let mut polorizer = Polorizer::new();
        assert!(polorizer.write_encoded(&[]).is_err());
        assert!(polorizer.is_empty());
    }
}
