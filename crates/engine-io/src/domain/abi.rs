//! # Call ABI
//!
//! Callsites, class definitions and the typed signatures that let a call
//! encoder check and decode arguments.
//!
//! ## Type Shape Grammar
//!
//! ```text
//! shape := "bool" | "i64" | "u64" | "f64" | "string" | "bytes"
//!        | "[]" shape            list of any length
//!        | "[" N "]" shape       array of exactly N
//!        | "map[" key "]" shape  map; key is a scalar or array of keys
//! ```

use crate::domain::value_objects::{CallsiteKind, ElementPtr};
use crate::domain::values::{MapKey, Scalar, Value};
use crate::errors::ShapeParseError;
use serde::{Deserialize, Serialize};
use shared_wire::{Depolorize, Depolorizer, Polorize, Polorizer, WireError};
use std::fmt;
use std::str::FromStr;

/// Deepest shape nesting the parser accepts.
const MAX_SHAPE_NESTING: usize = shared_wire::DEFAULT_MAX_DEPTH;

// =============================================================================
// TYPE SHAPES
// =============================================================================

/// Declared shape of a call input or output.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub enum TypeShape {
    /// `bool`
    Bool,
    /// `i64`
    Int,
    /// `u64`
    Uint,
    /// `f64`
    Float,
    /// `string`
    String,
    /// `bytes`
    Bytes,
    /// `[]T`
    List(Box<TypeShape>),
    /// `[N]T`
    Array(usize, Box<TypeShape>),
    /// `map[K]V`
    Map(Box<TypeShape>, Box<TypeShape>),
}

impl TypeShape {
    /// Returns true if the shape may be used as a map key.
    #[must_use]
    pub fn is_key(&self) -> bool {
        match self {
            TypeShape::List(_) | TypeShape::Map(..) => false,
            TypeShape::Array(_, inner) => inner.is_key(),
            _ => true,
        }
    }

    /// Checks that `value` conforms to this shape.
    ///
    /// References conform to every shape; they are checked once resolved.
    pub fn check(&self, value: &Value) -> Result<(), String> {
        match (self, value) {
            (_, Value::Reference(_)) => Ok(()),
            (TypeShape::Bool, Value::Scalar(Scalar::Bool(_)))
            | (TypeShape::Float, Value::Scalar(Scalar::Float(_)))
            | (TypeShape::String, Value::Scalar(Scalar::String(_)))
            | (TypeShape::Bytes, Value::Scalar(Scalar::Bytes(_)))
            | (TypeShape::Int, Value::Scalar(Scalar::Int(_)))
            | (TypeShape::Uint, Value::Scalar(Scalar::Uint(_))) => Ok(()),
            (TypeShape::Int, Value::Scalar(Scalar::Uint(v))) => i64::try_from(*v)
                .map(|_| ())
                .map_err(|_| format!("{v} overflows i64")),
            (TypeShape::Uint, Value::Scalar(Scalar::Int(v))) => u64::try_from(*v)
                .map(|_| ())
                .map_err(|_| format!("{v} is negative")),
            (TypeShape::List(inner), Value::List(items)) => check_items(inner, items),
            (TypeShape::Array(len, inner), Value::List(items)) => {
                if items.len() != *len {
                    return Err(format!("expected {len} items, found {}", items.len()));
                }
                check_items(inner, items)
            }
            (TypeShape::Map(key_shape, value_shape), Value::Map(entries)) => {
                for (key, entry) in entries {
                    key_shape
                        .check_key(key)
                        .map_err(|e| format!("key {key}: {e}"))?;
                    value_shape
                        .check(entry)
                        .map_err(|e| format!("value for {key}: {e}"))?;
                }
                Ok(())
            }
            (shape, value) => Err(format!("expected {shape}, found {}", value.shape_name())),
        }
    }

    /// Checks that `key` has exactly this shape.
    pub fn check_key(&self, key: &MapKey) -> Result<(), String> {
        match (self, key) {
            (TypeShape::Bool, MapKey::Bool(_))
            | (TypeShape::Int, MapKey::Int(_))
            | (TypeShape::Uint, MapKey::Uint(_))
            | (TypeShape::Float, MapKey::Float(_))
            | (TypeShape::String, MapKey::String(_))
            | (TypeShape::Bytes, MapKey::Bytes(_)) => Ok(()),
            (TypeShape::Array(len, inner), MapKey::Array(items)) => {
                if items.len() != *len {
                    return Err(format!("expected {len} items, found {}", items.len()));
                }
                items.iter().try_for_each(|item| inner.check_key(item))
            }
            (shape, key) => Err(format!("expected {shape}, found {}", key.shape_name())),
        }
    }
}

fn check_items(shape: &TypeShape, items: &[Value]) -> Result<(), String> {
    items
        .iter()
        .enumerate()
        .try_for_each(|(i, item)| shape.check(item).map_err(|e| format!("[{i}]: {e}")))
}

impl fmt::Display for TypeShape {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TypeShape::Bool => f.write_str("bool"),
            TypeShape::Int => f.write_str("i64"),
            TypeShape::Uint => f.write_str("u64"),
            TypeShape::Float => f.write_str("f64"),
            TypeShape::String => f.write_str("string"),
            TypeShape::Bytes => f.write_str("bytes"),
            TypeShape::List(inner) => write!(f, "[]{inner}"),
            TypeShape::Array(len, inner) => write!(f, "[{len}]{inner}"),
            TypeShape::Map(key, value) => write!(f, "map[{key}]{value}"),
        }
    }
}

impl FromStr for TypeShape {
    type Err = ShapeParseError;

    fn from_str(input: &str) -> Result<Self, Self::Err> {
        let fail = |reason| ShapeParseError {
            input: input.to_string(),
            reason,
        };
        let (shape, rest) = parse_shape(input.trim(), 0).map_err(fail)?;
        if !rest.is_empty() {
            return Err(fail("trailing characters"));
        }
        Ok(shape)
    }
}

fn parse_shape(input: &str, nesting: usize) -> Result<(TypeShape, &str), &'static str> {
    if nesting > MAX_SHAPE_NESTING {
        return Err("nesting too deep");
    }

    if let Some(rest) = input.strip_prefix("[]") {
        let (inner, rest) = parse_shape(rest, nesting + 1)?;
        return Ok((TypeShape::List(Box::new(inner)), rest));
    }

    if let Some(rest) = input.strip_prefix("map[") {
        let (key, rest) = parse_shape(rest, nesting + 1)?;
        if !key.is_key() {
            return Err("map key must be a scalar or an array of keys");
        }
        let rest = rest.strip_prefix(']').ok_or("unterminated map key")?;
        let (value, rest) = parse_shape(rest, nesting + 1)?;
        return Ok((TypeShape::Map(Box::new(key), Box::new(value)), rest));
    }

    if let Some(rest) = input.strip_prefix('[') {
        let end = rest.find(']').ok_or("unterminated array length")?;
        let len = rest[..end]
            .parse::<usize>()
            .map_err(|_| "invalid array length")?;
        let (inner, rest) = parse_shape(&rest[end + 1..], nesting + 1)?;
        return Ok((TypeShape::Array(len, Box::new(inner)), rest));
    }

    let end = input
        .find(|c: char| !c.is_ascii_alphanumeric())
        .unwrap_or(input.len());
    let shape = match &input[..end] {
        "bool" => TypeShape::Bool,
        "i64" => TypeShape::Int,
        "u64" => TypeShape::Uint,
        "f64" => TypeShape::Float,
        "string" => TypeShape::String,
        "bytes" => TypeShape::Bytes,
        "" => return Err("missing type"),
        _ => return Err("unknown type"),
    };
    Ok((shape, &input[end..]))
}

impl Serialize for TypeShape {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for TypeShape {
    fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        raw.parse().map_err(serde::de::Error::custom)
    }
}

impl Polorize for TypeShape {
    fn polorize(&self, polorizer: &mut Polorizer) -> Result<(), WireError> {
        polorizer.write_str(&self.to_string());
        Ok(())
    }
}

impl Depolorize for TypeShape {
    fn depolorize(depolorizer: &mut Depolorizer<'_>) -> Result<Self, WireError> {
        depolorizer
            .read_string()?
            .parse()
            .map_err(|e: ShapeParseError| WireError::InvalidValue(e.to_string()))
    }
}

// =============================================================================
// SIGNATURES
// =============================================================================

/// A labelled input or output.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct TypeField {
    /// Argument or result name.
    pub label: String,
    /// Declared shape.
    #[serde(rename = "type")]
    pub shape: TypeShape,
}

impl TypeField {
    /// Creates a field.
    #[must_use]
    pub fn new(label: impl Into<String>, shape: TypeShape) -> Self {
        Self {
            label: label.into(),
            shape,
        }
    }
}

impl Polorize for TypeField {
    fn polorize(&self, polorizer: &mut Polorizer) -> Result<(), WireError> {
        let mut pack = Polorizer::new();
        pack.write_str(&self.label);
        pack.polorize(&self.shape)?;
        polorizer.write_pack(pack);
        Ok(())
    }
}

impl Depolorize for TypeField {
    fn depolorize(depolorizer: &mut Depolorizer<'_>) -> Result<Self, WireError> {
        let mut pack = depolorizer.read_packed()?;
        Ok(Self {
            label: pack.read_string()?,
            shape: pack.depolorize()?,
        })
    }
}

/// Inputs and outputs of a callable element.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CallSignature {
    /// Declared inputs.
    #[serde(default)]
    pub inputs: Vec<TypeField>,
    /// Declared outputs.
    #[serde(default)]
    pub outputs: Vec<TypeField>,
}

impl CallSignature {
    /// Declared input with `label`.
    #[must_use]
    pub fn input(&self, label: &str) -> Option<&TypeField> {
        self.inputs.iter().find(|field| field.label == label)
    }
}

impl Polorize for CallSignature {
    fn polorize(&self, polorizer: &mut Polorizer) -> Result<(), WireError> {
        let mut pack = Polorizer::new();
        pack.polorize(&self.inputs)?;
        pack.polorize(&self.outputs)?;
        polorizer.write_pack(pack);
        Ok(())
    }
}

impl Depolorize for CallSignature {
    fn depolorize(depolorizer: &mut Depolorizer<'_>) -> Result<Self, WireError> {
        let mut pack = depolorizer.read_packed()?;
        Ok(Self {
            inputs: pack.depolorize()?,
            outputs: pack.depolorize()?,
        })
    }
}

// =============================================================================
// CALLSITES
// =============================================================================

/// Named entry point of a logic.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Callsite {
    /// Entry point name.
    pub name: String,
    /// Element implementing the entry point.
    pub ptr: ElementPtr,
    /// Access class.
    pub kind: CallsiteKind,
}

impl Callsite {
    /// Creates a callsite.
    #[must_use]
    pub fn new(name: impl Into<String>, ptr: ElementPtr, kind: CallsiteKind) -> Self {
        Self {
            name: name.into(),
            ptr,
            kind,
        }
    }
}

/// Named class definition of a logic.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Classdef {
    /// Class name.
    pub name: String,
    /// Element holding the definition.
    pub ptr: ElementPtr,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn shape(s: &str) -> TypeShape {
        s.parse().unwrap()
    }

    #[test]
    fn test_parse_grammar() {
        assert_eq!(shape("u64"), TypeShape::Uint);
        assert_eq!(shape("[]string"), TypeShape::List(Box::new(TypeShape::String)));
        assert_eq!(shape("[4]u64"), TypeShape::Array(4, Box::new(TypeShape::Uint)));
        assert_eq!(
            shape("map[string][]u64"),
            TypeShape::Map(
                Box::new(TypeShape::String),
                Box::new(TypeShape::List(Box::new(TypeShape::Uint)))
            )
        );
    }

    #[test]
    fn test_display_round_trips() {
        for text in ["bool", "[]bytes", "[2][3]i64", "map[[2]u64]map[string]f64"] {
            assert_eq!(shape(text).to_string(), text);
        }
    }

    #[test]
    fn test_parse_rejects() {
        for text in ["", "u32", "[]", "[x]u64", "map[[]u64]bool", "map[string", "u64u64 ", "string]"] {
            assert!(text.parse::<TypeShape>().is_err(), "accepted {text:?}");
        }
        let deep = format!("{}u64", "[]".repeat(MAX_SHAPE_NESTING + 2));
        assert!(deep.parse::<TypeShape>().is_err());
    }

    #[test]
    fn test_check_values() {
        assert!(shape("u64").check(&Value::from(5u64)).is_ok());
        assert!(shape("u64").check(&Value::from(5i64)).is_ok());
        assert!(shape("u64").check(&Value::from(-5i64)).is_err());
        assert!(shape("i64").check(&Value::from(u64::MAX)).is_err());
        assert!(shape("string").check(&Value::from(1u64)).is_err());
        assert!(shape("[2]bool")
            .check(&Value::list([Value::from(true), Value::from(false)]))
            .is_ok());
        assert!(shape("[2]bool").check(&Value::list([Value::from(true)])).is_err());
        assert!(shape("map[string]u64")
            .check(&Value::map([("a", Value::from(1u64))]))
            .is_ok());
        assert!(shape("map[u64]u64")
            .check(&Value::map([("a", Value::from(1u64))]))
            .is_err());
        assert!(shape("bytes").check(&Value::reference("anything")).is_ok());
    }

    #[test]
    fn test_signature_serde_and_wire() {
        let signature = CallSignature {
            inputs: vec![TypeField::new("amount", TypeShape::Uint)],
            outputs: vec![TypeField::new("ok", TypeShape::Bool)],
        };

        let json = serde_json::to_value(&signature).unwrap();
        assert_eq!(json["inputs"][0]["type"], "u64");
        assert_eq!(serde_json::from_value::<CallSignature>(json).unwrap(), signature);

        let encoded = shared_wire::polorize(&signature).unwrap();
        assert_eq!(shared_wire::depolorize::<CallSignature>(&encoded).unwrap(), signature);
    }
}
