//! # Values
//!
//! Dynamically shaped values accepted by the deterministic value encoder.
//!
//! | Shape | Wire form |
//! |-------|-----------|
//! | `Object` | document keyed by field name |
//! | `Map` | pack of key, value, key, value in canonical key order |
//! | `List` | pack in element order |
//! | `Scalar` | the scalar's own wire type |
//! | `Reference` | whatever the resolved value encodes to |

use std::collections::BTreeMap;
use std::fmt;

/// Named placeholder resolved at encode time.
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ReferenceValue(String);

impl ReferenceValue {
    /// Creates a reference to `name`.
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        Self(name.into())
    }

    /// Referenced name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ReferenceValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "ref<{}>", self.0)
    }
}

/// Leaf values.
#[derive(Clone, Debug, PartialEq)]
pub enum Scalar {
    /// Absent value.
    Null,
    /// Boolean.
    Bool(bool),
    /// Signed integer.
    Int(i64),
    /// Unsigned integer.
    Uint(u64),
    /// IEEE-754 double.
    Float(f64),
    /// UTF-8 text.
    String(String),
    /// Byte string.
    Bytes(Vec<u8>),
}

impl Scalar {
    /// Short shape name for diagnostics.
    #[must_use]
    pub const fn shape_name(&self) -> &'static str {
        match self {
            Scalar::Null => "null",
            Scalar::Bool(_) => "bool",
            Scalar::Int(_) => "i64",
            Scalar::Uint(_) => "u64",
            Scalar::Float(_) => "f64",
            Scalar::String(_) => "string",
            Scalar::Bytes(_) => "bytes",
        }
    }
}

/// Keys of a generic map. The variant order is the cross-kind precedence.
#[derive(Clone, Debug, PartialEq)]
pub enum MapKey {
    /// Boolean key.
    Bool(bool),
    /// Signed integer key.
    Int(i64),
    /// Unsigned integer key.
    Uint(u64),
    /// Float key. NaN cannot be ordered.
    Float(f64),
    /// Text key.
    String(String),
    /// Fixed-length byte key.
    Bytes(Vec<u8>),
    /// Fixed-length array key.
    Array(Vec<MapKey>),
}

impl MapKey {
    /// Short shape name for diagnostics.
    #[must_use]
    pub const fn shape_name(&self) -> &'static str {
        match self {
            MapKey::Bool(_) => "bool",
            MapKey::Int(_) => "i64",
            MapKey::Uint(_) => "u64",
            MapKey::Float(_) => "f64",
            MapKey::String(_) => "string",
            MapKey::Bytes(_) => "bytes",
            MapKey::Array(_) => "array",
        }
    }
}

impl fmt::Display for MapKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MapKey::Bool(v) => write!(f, "{v}"),
            MapKey::Int(v) => write!(f, "{v}"),
            MapKey::Uint(v) => write!(f, "{v}"),
            MapKey::Float(v) => write!(f, "{v}"),
            MapKey::String(v) => write!(f, "{v:?}"),
            MapKey::Bytes(v) => {
                write!(f, "0x")?;
                for byte in v {
                    write!(f, "{byte:02x}")?;
                }
                Ok(())
            }
            MapKey::Array(items) => {
                write!(f, "[")?;
                for (i, item) in items.iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{item}")?;
                }
                write!(f, "]")
            }
        }
    }
}

impl From<bool> for MapKey {
    fn from(v: bool) -> Self {
        MapKey::Bool(v)
    }
}

impl From<i64> for MapKey {
    fn from(v: i64) -> Self {
        MapKey::Int(v)
    }
}

impl From<u64> for MapKey {
    fn from(v: u64) -> Self {
        MapKey::Uint(v)
    }
}

impl From<&str> for MapKey {
    fn from(v: &str) -> Self {
        MapKey::String(v.to_string())
    }
}

impl From<String> for MapKey {
    fn from(v: String) -> Self {
        MapKey::String(v)
    }
}

/// A value to be encoded deterministically.
#[derive(Clone, Debug, PartialEq)]
pub enum Value {
    /// String-keyed record.
    Object(BTreeMap<String, Value>),
    /// Typed-key map. Entry order is irrelevant to the encoding.
    Map(Vec<(MapKey, Value)>),
    /// Ordered sequence.
    List(Vec<Value>),
    /// Leaf value.
    Scalar(Scalar),
    /// Placeholder resolved at encode time.
    Reference(ReferenceValue),
}

impl Value {
    /// The null value.
    #[must_use]
    pub const fn null() -> Self {
        Value::Scalar(Scalar::Null)
    }

    /// Builds an object from `(name, value)` pairs.
    pub fn object<K, I>(fields: I) -> Self
    where
        K: Into<String>,
        I: IntoIterator<Item = (K, Value)>,
    {
        Value::Object(fields.into_iter().map(|(k, v)| (k.into(), v)).collect())
    }

    /// Builds a map from `(key, value)` pairs.
    pub fn map<K, I>(entries: I) -> Self
    where
        K: Into<MapKey>,
        I: IntoIterator<Item = (K, Value)>,
    {
        Value::Map(entries.into_iter().map(|(k, v)| (k.into(), v)).collect())
    }

    /// Builds a list.
    pub fn list<I: IntoIterator<Item = Value>>(items: I) -> Self {
        Value::List(items.into_iter().collect())
    }

    /// Builds a reference to `name`.
    #[must_use]
    pub fn reference(name: impl Into<String>) -> Self {
        Value::Reference(ReferenceValue::new(name))
    }

    /// Short shape name for diagnostics.
    #[must_use]
    pub const fn shape_name(&self) -> &'static str {
        match self {
            Value::Object(_) => "object",
            Value::Map(_) => "map",
            Value::List(_) => "list",
            Value::Scalar(scalar) => scalar.shape_name(),
            Value::Reference(_) => "reference",
        }
    }

    /// The value as an unsigned integer, if it is one.
    #[must_use]
    pub fn as_u64(&self) -> Option<u64> {
        match self {
            Value::Scalar(Scalar::Uint(v)) => Some(*v),
            Value::Scalar(Scalar::Int(v)) => u64::try_from(*v).ok(),
            _ => None,
        }
    }

    /// The value as text, if it is text.
    #[must_use]
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::Scalar(Scalar::String(v)) => Some(v),
            _ => None,
        }
    }
}

impl From<Scalar> for Value {
    fn from(v: Scalar) -> Self {
        Value::Scalar(v)
    }
}

impl From<ReferenceValue> for Value {
    fn from(v: ReferenceValue) -> Self {
        Value::Reference(v)
    }
}

impl From<bool> for Value {
    fn from(v: bool) -> Self {
        Value::Scalar(Scalar::Bool(v))
    }
}

impl From<i64> for Value {
    fn from(v: i64) -> Self {
        Value::Scalar(Scalar::Int(v))
    }
}

impl From<u64> for Value {
    fn from(v: u64) -> Self {
        Value::Scalar(Scalar::Uint(v))
    }
}

impl From<f64> for Value {
    fn from(v: f64) -> Self {
        Value::Scalar(Scalar::Float(v))
    }
}

impl From<&str> for Value {
    fn from(v: &str) -> Self {
        Value::Scalar(Scalar::String(v.to_string()))
    }
}

impl From<String> for Value {
    fn from(v: String) -> Self {
        Value::Scalar(Scalar::String(v))
    }
}

impl From<Vec<u8>> for Value {
    fn from(v: Vec<u8>) -> Self {
        Value::Scalar(Scalar::Bytes(v))
    }
}

impl From<Vec<Value>> for Value {
    fn from(v: Vec<Value>) -> Self {
        Value::List(v)
    }
}
