//! # Wire Types and Varints
//!
//! Every element on the wire is tagged with a 4-bit wire type. Compound
//! elements (packs and documents) carry a load: a varint header of
//! `(offset << 4) | wire` slots followed by the concatenated element bodies.

use crate::errors::WireError;
use std::fmt;

/// Wire type tag of a single encoded element.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum WireType {
    /// Absent value.
    Null = 0,
    /// Boolean false.
    False = 1,
    /// Boolean true.
    True = 2,
    /// Non-negative integer, minimal big-endian body.
    PosInt = 3,
    /// Negative integer, minimal big-endian magnitude.
    NegInt = 4,
    /// Embedded, already encoded element.
    Raw = 5,
    /// UTF-8 string or byte string.
    Word = 6,
    /// IEEE-754 double, big-endian.
    Float = 7,
    /// Key-sorted document of raw values.
    Doc = 13,
    /// Ordered sequence of elements.
    Pack = 14,
    /// Load prefix inside compound bodies.
    Load = 15,
}

impl WireType {
    /// Resolves a wire type from its numeric tag.
    pub fn from_tag(tag: u64) -> Result<Self, WireError> {
        let wire = match tag {
            0 => Self::Null,
            1 => Self::False,
            2 => Self::True,
            3 => Self::PosInt,
            4 => Self::NegInt,
            5 => Self::Raw,
            6 => Self::Word,
            7 => Self::Float,
            13 => Self::Doc,
            14 => Self::Pack,
            15 => Self::Load,
            other => return Err(WireError::InvalidWireType(other)),
        };
        Ok(wire)
    }

    /// Numeric tag of the wire type.
    #[must_use]
    pub const fn tag(self) -> u64 {
        self as u64
    }

    /// Returns true for wire types whose body is a load.
    #[must_use]
    pub const fn is_compound(self) -> bool {
        matches!(self, Self::Doc | Self::Pack)
    }
}

impl fmt::Display for WireType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Null => "null",
            Self::False => "false",
            Self::True => "true",
            Self::PosInt => "posint",
            Self::NegInt => "negint",
            Self::Raw => "raw",
            Self::Word => "word",
            Self::Float => "float",
            Self::Doc => "document",
            Self::Pack => "pack",
            Self::Load => "load",
        };
        f.write_str(name)
    }
}

// =============================================================================
// VARINTS (unsigned LEB128, minimal form only)
// =============================================================================

/// Appends `value` as an unsigned LEB128 varint.
pub fn encode_varint(buf: &mut Vec<u8>, mut value: u64) {
    while value >= 0x80 {
        buf.push((value as u8 & 0x7F) | 0x80);
        value >>= 7;
    }
    buf.push(value as u8);
}

/// Reads a minimal unsigned LEB128 varint, advancing the cursor.
pub fn decode_varint(cur: &mut &[u8]) -> Result<u64, WireError> {
    let mut result = 0u64;
    let mut shift = 0u32;

    loop {
        let (&byte, rest) = cur.split_first().ok_or(WireError::UnexpectedEof)?;
        *cur = rest;

        if shift == 63 && byte > 1 {
            return Err(WireError::VarintOverflow);
        }
        result |= u64::from(byte & 0x7F) << shift;

        if byte & 0x80 == 0 {
            // A zero terminator after a continuation is a padded encoding
            if byte == 0 && shift > 0 {
                return Err(WireError::NonMinimalVarint);
            }
            return Ok(result);
        }
        shift += 7;
    }
}

// =============================================================================
// ELEMENT FRAMING
// =============================================================================

/// Writes a standalone element: the wire tag followed by its body.
#[must_use]
pub fn frame_element(wire: WireType, body: &[u8]) -> Vec<u8> {
    let mut out = Vec::with_capacity(body.len() + 1);
    encode_varint(&mut out, wire.tag());
    out.extend_from_slice(body);
    out
}

/// Splits a standalone element into its wire type and body.
pub fn split_element(data: &[u8]) -> Result<(WireType, &[u8]), WireError> {
    let mut cur = data;
    let tag = decode_varint(&mut cur)?;
    let wire = WireType::from_tag(tag)?;
    if wire == WireType::Load {
        return Err(WireError::MalformedLoad("load tag outside compound body"));
    }
    Ok((wire, cur))
}

/// Builds a load from a sequence of `(wire, body)` slots.
#[must_use]
pub fn build_load<'a, I>(slots: I) -> Vec<u8>
where
    I: IntoIterator<Item = (WireType, &'a [u8])>,
{
    let mut header = Vec::new();
    let mut data = Vec::new();

    for (wire, body) in slots {
        encode_varint(&mut header, ((data.len() as u64) << 4) | wire.tag());
        data.extend_from_slice(body);
    }

    let mut out = Vec::with_capacity(header.len() + data.len() + 2);
    encode_varint(&mut out, ((header.len() as u64) << 4) | WireType::Load.tag());
    out.extend_from_slice(&header);
    out.extend_from_slice(&data);
    out
}

/// Parses a load into its `(wire, body)` slots.
pub fn parse_load(body: &[u8]) -> Result<Vec<(WireType, &[u8])>, WireError> {
    let mut cur = body;
    let prefix = decode_varint(&mut cur)?;
    if prefix & 0xF != WireType::Load.tag() {
        return Err(WireError::MalformedLoad("missing load prefix"));
    }

    let header_len = usize::try_from(prefix >> 4)
        .map_err(|_| WireError::MalformedLoad("header length overflow"))?;
    if header_len > cur.len() {
        return Err(WireError::UnexpectedEof);
    }
    let (mut header, data) = cur.split_at(header_len);

    let mut offsets: Vec<(usize, WireType)> = Vec::new();
    while !header.is_empty() {
        let slot = decode_varint(&mut header)?;
        let wire = WireType::from_tag(slot & 0xF)?;
        if wire == WireType::Load {
            return Err(WireError::MalformedLoad("nested load slot"));
        }
        let offset = usize::try_from(slot >> 4)
            .map_err(|_| WireError::MalformedLoad("offset overflow"))?;

        let expected_min = offsets.last().map_or(0, |(prev, _)| *prev);
        if offsets.is_empty() && offset != 0 {
            return Err(WireError::MalformedLoad("first slot must start at zero"));
        }
        if offset < expected_min || offset > data.len() {
            return Err(WireError::MalformedLoad("slot offset out of order"));
        }
        offsets.push((offset, wire));
    }

    if offsets.is_empty() && !data.is_empty() {
        return Err(WireError::MalformedLoad("data without header"));
    }

    let mut slots = Vec::with_capacity(offsets.len());
    for (i, (start, wire)) in offsets.iter().enumerate() {
        let end = offsets.get(i + 1).map_or(data.len(), |(next, _)| *next);
        slots.push((*wire, &data[*start..end]));
    }
    Ok(slots)
}
