//! # Typed Value Decoder
//!
//! Inverse of the value encoder for values with a declared [`TypeShape`].
//! The wire format carries no field types, so the shape drives the reader.
//! `null` decodes as the shape's zero value.
//!
//! Sequences arrive in their collapsed form: `null` is an empty list and a
//! lone non-pack element is a one-item list. A fixed array of length one
//! always reads its whole element as the single item.

use crate::domain::abi::TypeShape;
use crate::domain::values::{MapKey, Scalar, Value};
use shared_wire::depolorizer::{decode_float, decode_magnitude, decode_signed, decode_utf8};
use shared_wire::wire::{parse_load, split_element};
use shared_wire::{WireError, WireType};

/// Decodes a standalone element as a value of `shape`.
pub fn decode_value(data: &[u8], shape: &TypeShape, max_depth: usize) -> Result<Value, WireError> {
    let (wire, body) = split_element(data)?;
    ShapeReader { max_depth }.value(wire, body, shape, 0)
}

struct ShapeReader {
    max_depth: usize,
}

impl ShapeReader {
    fn descend(&self, depth: usize) -> Result<usize, WireError> {
        let next = depth + 1;
        if next > self.max_depth {
            return Err(WireError::TooDeep {
                max: self.max_depth,
            });
        }
        Ok(next)
    }

    fn value(&self, wire: WireType, body: &[u8], shape: &TypeShape, depth: usize) -> Result<Value, WireError> {
        let value = match shape {
            TypeShape::Bool => Value::Scalar(Scalar::Bool(read_bool(wire)?)),
            TypeShape::Int => Value::Scalar(Scalar::Int(decode_signed(wire, body)?)),
            TypeShape::Uint => Value::Scalar(Scalar::Uint(read_uint(wire, body)?)),
            TypeShape::Float => Value::Scalar(Scalar::Float(read_float(wire, body)?)),
            TypeShape::String => Value::Scalar(Scalar::String(read_string(wire, body)?)),
            TypeShape::Bytes => Value::Scalar(Scalar::Bytes(read_bytes(wire, body)?)),

            TypeShape::List(inner) => {
                let depth = self.descend(depth)?;
                let slots = read_sequence(wire, body)?;
                Value::List(
                    slots
                        .into_iter()
                        .map(|(w, b)| self.value(w, b, inner, depth))
                        .collect::<Result<_, _>>()?,
                )
            }

            TypeShape::Array(len, inner) => {
                let depth = self.descend(depth)?;
                let slots = read_array(wire, body, *len)?;
                if slots.len() != *len {
                    return Err(WireError::InvalidValue(format!(
                        "expected {len} items for {shape}, found {}",
                        slots.len()
                    )));
                }
                Value::List(
                    slots
                        .into_iter()
                        .map(|(w, b)| self.value(w, b, inner, depth))
                        .collect::<Result<_, _>>()?,
                )
            }

            TypeShape::Map(key_shape, value_shape) => {
                let depth = self.descend(depth)?;
                let slots = read_pack(wire, body)?;
                if slots.len() % 2 != 0 {
                    return Err(WireError::InvalidValue(format!(
                        "map {shape} has an unpaired key"
                    )));
                }
                let mut entries = Vec::with_capacity(slots.len() / 2);
                for pair in slots.chunks_exact(2) {
                    let (kw, kb) = pair[0];
                    let (vw, vb) = pair[1];
                    entries.push((
                        self.key(kw, kb, key_shape, depth)?,
                        self.value(vw, vb, value_shape, depth)?,
                    ));
                }
                Value::Map(entries)
            }
        };
        Ok(value)
    }

    fn key(&self, wire: WireType, body: &[u8], shape: &TypeShape, depth: usize) -> Result<MapKey, WireError> {
        let key = match shape {
            TypeShape::Bool => MapKey::Bool(read_bool(wire)?),
            TypeShape::Int => MapKey::Int(decode_signed(wire, body)?),
            TypeShape::Uint => MapKey::Uint(read_uint(wire, body)?),
            TypeShape::Float => MapKey::Float(read_float(wire, body)?),
            TypeShape::String => MapKey::String(read_string(wire, body)?),
            TypeShape::Bytes => MapKey::Bytes(read_bytes(wire, body)?),
            TypeShape::Array(len, inner) => {
                let depth = self.descend(depth)?;
                let slots = read_array(wire, body, *len)?;
                if slots.len() != *len {
                    return Err(WireError::InvalidValue(format!(
                        "expected {len} items for key {shape}, found {}",
                        slots.len()
                    )));
                }
                MapKey::Array(
                    slots
                        .into_iter()
                        .map(|(w, b)| self.key(w, b, inner, depth))
                        .collect::<Result<_, _>>()?,
                )
            }
            TypeShape::List(_) | TypeShape::Map(..) => {
                return Err(WireError::InvalidValue(format!("{shape} cannot be a map key")))
            }
        };
        Ok(key)
    }
}

fn read_bool(wire: WireType) -> Result<bool, WireError> {
    match wire {
        WireType::True => Ok(true),
        WireType::False | WireType::Null => Ok(false),
        found => Err(WireError::UnexpectedWire {
            expected: "bool",
            found,
        }),
    }
}

fn read_uint(wire: WireType, body: &[u8]) -> Result<u64, WireError> {
    match wire {
        WireType::PosInt => decode_magnitude(body),
        WireType::Null => Ok(0),
        found => Err(WireError::UnexpectedWire {
            expected: "posint",
            found,
        }),
    }
}

fn read_float(wire: WireType, body: &[u8]) -> Result<f64, WireError> {
    match wire {
        WireType::Float => decode_float(body),
        WireType::Null => Ok(0.0),
        found => Err(WireError::UnexpectedWire {
            expected: "float",
            found,
        }),
    }
}

fn read_string(wire: WireType, body: &[u8]) -> Result<String, WireError> {
    match wire {
        WireType::Word => decode_utf8(body),
        WireType::Null => Ok(String::new()),
        found => Err(WireError::UnexpectedWire {
            expected: "word",
            found,
        }),
    }
}

fn read_bytes(wire: WireType, body: &[u8]) -> Result<Vec<u8>, WireError> {
    match wire {
        WireType::Word => Ok(body.to_vec()),
        WireType::Null => Ok(Vec::new()),
        found => Err(WireError::UnexpectedWire {
            expected: "word",
            found,
        }),
    }
}

fn read_pack(wire: WireType, body: &[u8]) -> Result<Vec<(WireType, &[u8])>, WireError> {
    match wire {
        WireType::Pack => parse_load(body),
        WireType::Null => Ok(Vec::new()),
        found => Err(WireError::UnexpectedWire {
            expected: "pack",
            found,
        }),
    }
}

fn read_sequence(wire: WireType, body: &[u8]) -> Result<Vec<(WireType, &[u8])>, WireError> {
    match wire {
        WireType::Pack => parse_load(body),
        WireType::Null => Ok(Vec::new()),
        single => Ok(vec![(single, body)]),
    }
}

fn read_array(wire: WireType, body: &[u8], len: usize) -> Result<Vec<(WireType, &[u8])>, WireError> {
    if len == 1 {
        return Ok(vec![(wire, body)]);
    }
    read_sequence(wire, body)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::codec::values::encode_value;

    fn round_trip(value: &Value, shape: &str) -> Value {
        let shape: TypeShape = shape.parse().unwrap();
        let encoded = encode_value(value, None).unwrap();
        decode_value(&encoded, &shape, 16).unwrap()
    }

    #[test]
    fn test_scalars_by_shape() {
        assert_eq!(round_trip(&Value::from(100u64), "u64"), Value::from(100u64));
        assert_eq!(round_trip(&Value::from(-100i64), "i64"), Value::from(-100i64));
        assert_eq!(round_trip(&Value::from(true), "bool"), Value::from(true));
        assert_eq!(round_trip(&Value::from(2.5), "f64"), Value::from(2.5));
        assert_eq!(round_trip(&Value::from("hi"), "string"), Value::from("hi"));
        assert_eq!(round_trip(&Value::from(vec![1u8, 2]), "bytes"), Value::from(vec![1u8, 2]));
    }

    #[test]
    fn test_null_decodes_as_zero_value() {
        let null = [0x00];
        assert_eq!(decode_value(&null, &TypeShape::Uint, 4).unwrap(), Value::from(0u64));
        assert_eq!(decode_value(&null, &"[]u64".parse().unwrap(), 4).unwrap(), Value::list([]));
    }

    #[test]
    fn test_collections_by_shape() {
        let list = Value::list([Value::from(1u64), Value::from(2u64)]);
        assert_eq!(round_trip(&list, "[]u64"), list);
        assert_eq!(round_trip(&list, "[2]u64"), list);

        let map = Value::map([("bar", Value::from(2u64)), ("foo", Value::from(1u64))]);
        assert_eq!(round_trip(&map, "map[string]u64"), map);
    }

    #[test]
    fn test_collapsed_sequences() {
        assert_eq!(round_trip(&Value::list([]), "[]u64"), Value::list([]));
        assert_eq!(round_trip(&Value::list([]), "[0]u64"), Value::list([]));

        let single = Value::list([Value::from(7u64)]);
        assert_eq!(round_trip(&single, "[]u64"), single);
        assert_eq!(round_trip(&single, "[1]u64"), single);

        let nested = Value::list([Value::list([Value::from(1u64), Value::from(2u64)])]);
        assert_eq!(round_trip(&nested, "[1][]u64"), nested);

        let map = Value::map([("a", Value::from(1u64))]);
        assert_eq!(round_trip(&map, "map[string]u64"), map);
        assert_eq!(round_trip(&Value::map::<&str, _>([]), "map[string]u64"), Value::Map(vec![]));
    }

    #[test]
    fn test_array_length_enforced() {
        let encoded = encode_value(&Value::list([Value::from(1u64)]), None).unwrap();
        assert!(matches!(
            decode_value(&encoded, &"[2]u64".parse().unwrap(), 4),
            Err(WireError::InvalidValue(_))
        ));
    }

    #[test]
    fn test_wrong_wire_type() {
        let encoded = encode_value(&Value::from("x"), None).unwrap();
        assert!(matches!(
            decode_value(&encoded, &TypeShape::Uint, 4),
            Err(WireError::UnexpectedWire { .. })
        ));
    }

    #[test]
    fn test_depth_limit() {
        let nested = Value::list([Value::list([Value::from(1u64)])]);
        let encoded = encode_value(&nested, None).unwrap();
        let shape: TypeShape = "[][]u64".parse().unwrap();
        assert!(decode_value(&encoded, &shape, 2).is_ok());
        assert_eq!(decode_value(&encoded, &shape, 1), Err(WireError::TooDeep { max: 1 }));
    }
}
