//! # Documents
//!
//! A document is a string-keyed collection of encoded values. On the wire it
//! is a load of alternating `word` keys and `raw` values, emitted in byte
//! order of the keys. Insertion order never reaches the wire.

use crate::errors::WireError;
use crate::traits::{Depolorize, Polorize};
use crate::wire::{build_load, frame_element, parse_load, split_element, WireType};
use std::collections::BTreeMap;

/// String-keyed collection of encoded values.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Document {
    fields: BTreeMap<String, Vec<u8>>,
}

impl Document {
    /// Creates an empty document.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Decodes a standalone document element.
    pub fn from_bytes(data: &[u8]) -> Result<Self, WireError> {
        match split_element(data)? {
            (WireType::Doc, body) => Self::from_load(body),
            (WireType::Null, _) => Ok(Self::new()),
            (found, _) => Err(WireError::UnexpectedWire {
                expected: "document",
                found,
            }),
        }
    }

    /// Decodes a document from the load carried in its body.
    pub fn from_load(body: &[u8]) -> Result<Self, WireError> {
        let slots = parse_load(body)?;
        if slots.len() % 2 != 0 {
            return Err(WireError::MalformedDocument("unpaired key".to_string()));
        }

        let mut fields = BTreeMap::new();
        let mut previous: Option<String> = None;

        for pair in slots.chunks_exact(2) {
            let key = match pair[0] {
                (WireType::Word, body) => std::str::from_utf8(body)
                    .map_err(|_| WireError::InvalidUtf8)?
                    .to_owned(),
                (found, _) => {
                    return Err(WireError::MalformedDocument(format!(
                        "key must be a word, found {found}"
                    )))
                }
            };
            let value = match pair[1] {
                (WireType::Raw, body) => body.to_vec(),
                (found, _) => {
                    return Err(WireError::MalformedDocument(format!(
                        "value for '{key}' must be raw, found {found}"
                    )))
                }
            };

            if let Some(prev) = &previous {
                if prev.as_str() >= key.as_str() {
                    return Err(WireError::MalformedDocument(format!(
                        "key '{key}' is duplicated or out of order"
                    )));
                }
            }
            previous = Some(key.clone());
            fields.insert(key, value);
        }

        Ok(Self { fields })
    }

    /// Number of fields.
    #[must_use]
    pub fn len(&self) -> usize {
        self.fields.len()
    }

    /// Returns true if the document has no fields.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    /// Returns true if a field with `key` exists.
    #[must_use]
    pub fn contains(&self, key: &str) -> bool {
        self.fields.contains_key(key)
    }

    /// Stores an already encoded value under `key`, replacing any previous one.
    pub fn set_raw(&mut self, key: impl Into<String>, encoded: Vec<u8>) {
        self.fields.insert(key.into(), encoded);
    }

    /// Encodes and stores a value under `key`.
    pub fn set<T: Polorize + ?Sized>(&mut self, key: impl Into<String>, value: &T) -> Result<(), WireError> {
        let encoded = crate::polorize(value)?;
        self.set_raw(key, encoded);
        Ok(())
    }

    /// Encoded value stored under `key`.
    #[must_use]
    pub fn get_raw(&self, key: &str) -> Option<&[u8]> {
        self.fields.get(key).map(Vec::as_slice)
    }

    /// Decodes the value stored under `key` with the default depth limit.
    pub fn get<T: Depolorize>(&self, key: &str) -> Result<Option<T>, WireError> {
        self.get_with_depth(key, crate::DEFAULT_MAX_DEPTH)
    }

    /// Decodes the value stored under `key`, refusing nesting beyond `max_depth`.
    pub fn get_with_depth<T: Depolorize>(
        &self,
        key: &str,
        max_depth: usize,
    ) -> Result<Option<T>, WireError> {
        self.get_raw(key)
            .map(|raw| crate::depolorize_with_depth::<T>(raw, max_depth))
            .transpose()
    }

    /// Field names in wire order.
    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.fields.keys().map(String::as_str)
    }

    /// Fields in wire order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &[u8])> {
        self.fields.iter().map(|(k, v)| (k.as_str(), v.as_slice()))
    }

    /// Renders the document as a standalone element.
    #[must_use]
    pub fn bytes(&self) -> Vec<u8> {
        frame_element(WireType::Doc, &self.load())
    }

    pub(crate) fn load(&self) -> Vec<u8> {
        build_load(self.fields.iter().flat_map(|(key, value)| {
            [
                (WireType::Word, key.as_bytes()),
                (WireType::Raw, value.as_slice()),
            ]
        }))
    }
}

impl Polorize for Document {
    fn polorize(&self, polorizer: &mut crate::Polorizer) -> Result<(), WireError> {
        polorizer.write_document(self);
        Ok(())
    }
}

impl Depolorize for Document {
    fn depolorize(depolorizer: &mut crate::Depolorizer<'_>) -> Result<Self, WireError> {
        depolorizer.read_document()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_document_reference_bytes() {
        let mut document = Document::new();
        document.set("foo", &1u64).unwrap();
        document.set("bar", &2u64).unwrap();

        assert_eq!(
            document.bytes(),
            vec![
                0x0d, 0x5f, 0x06, 0x35, 0x56, 0x85, 0x01, b'b', b'a', b'r', 0x03, 0x02, b'f', b'o',
                b'o', 0x03, 0x01
            ]
        );
    }

    #[test]
    fn test_get_honours_depth_limit() {
        let mut document = Document::new();
        document.set("grid", &vec![vec![1u64, 2], vec![3]]).unwrap();

        assert_eq!(
            document.get_with_depth::<Vec<Vec<u64>>>("grid", 1),
            Err(WireError::TooDeep { max: 1 })
        );
        assert_eq!(
            document.get_with_depth::<Vec<Vec<u64>>>("grid", 2).unwrap(),
            Some(vec![vec![1, 2], vec![3]])
        );
        assert_eq!(document.get_with_depth::<u64>("missing", 0).unwrap(), None);
    }

    #[test]
    fn test_document_ignores_insertion_order() {
        let mut first = Document::new();
        first.set("alpha", "a").unwrap();
        first.set("beta", "b").unwrap();

        let mut second = Document::new();
        second.set("beta", "b").unwrap();
        second.set("alpha", "a").unwrap();

        assert_eq!(first.bytes(), second.bytes());
    }

    #[test]
    fn test_document_decode() {
        let mut document = Document::new();
        document.set("count", &7u64).unwrap();
        document.set("name", "logic").unwrap();

        let decoded = Document::from_bytes(&document.bytes()).unwrap();
        assert_eq!(decoded.get::<u64>("count").unwrap(), Some(7));
        assert_eq!(decoded.get::<String>("name").unwrap(), Some("logic".to_string()));
        assert_eq!(decoded.get::<u64>("missing").unwrap(), None);
    }

    #[test]
    fn test_document_rejects_unsorted_keys() {
        // foo before bar
        let body = build_load([
            (WireType::Word, &b"foo"[..]),
            (WireType::Raw, &[0x03, 0x01][..]),
            (WireType::Word, &b"bar"[..]),
            (WireType::Raw, &[0x03, 0x02][..]),
        ]);
        assert!(matches!(
            Document::from_load(&body),
            Err(WireError::MalformedDocument(_))
        ));
    }

    #[test]
    fn test_document_rejects_unpaired_key() {
        let body = build_load([(WireType::Word, &b"foo"[..])]);
        assert!(matches!(
            Document::from_load(&body),
            Err(WireError::MalformedDocument(_))
        ));
    }
}
