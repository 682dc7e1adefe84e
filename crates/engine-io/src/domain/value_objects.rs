//! # Value Objects
//!
//! Immutable domain primitives shared by manifests, engines and drivers.
//! String enumerations are declared once through [`string_enum!`], which
//! derives the text, serde and canonical binary forms from one table.

use crate::errors::UnknownVariant;
use serde::{Deserialize, Serialize};
use shared_wire::{Depolorize, Depolorizer, Polorize, Polorizer, WireError};
use std::fmt;
use std::path::Path;
use std::str::FromStr;

pub use primitive_types::U256;

// =============================================================================
// STRING ENUMERATIONS
// =============================================================================

/// Declares a closed enumeration with a single string table.
///
/// Generates `ALL`, `as_str`, `Display`, `FromStr`, serde and
/// `Polorize`/`Depolorize` (as a `word`) from the table.
macro_rules! string_enum {
    (
        $(#[$meta:meta])*
        $vis:vis enum $name:ident {
            $( $(#[$vmeta:meta])* $variant:ident => $text:literal, )+
        }
    ) => {
        $(#[$meta])*
        #[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
        $vis enum $name {
            $( $(#[$vmeta])* $variant, )+
        }

        impl $name {
            /// Every variant in declaration order.
            pub const ALL: &'static [$name] = &[$($name::$variant),+];

            /// Canonical string form.
            #[must_use]
            pub const fn as_str(self) -> &'static str {
                match self {
                    $( $name::$variant => $text, )+
                }
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(self.as_str())
            }
        }

        impl FromStr for $name {
            type Err = UnknownVariant;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                match s {
                    $( $text => Ok($name::$variant), )+
                    _ => Err(UnknownVariant {
                        enumeration: stringify!($name),
                        value: s.to_string(),
                    }),
                }
            }
        }

        impl Serialize for $name {
            fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
                serializer.serialize_str(self.as_str())
            }
        }

        impl<'de> Deserialize<'de> for $name {
            fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
                let raw = String::deserialize(deserializer)?;
                raw.parse().map_err(serde::de::Error::custom)
            }
        }

        impl Polorize for $name {
            fn polorize(&self, polorizer: &mut Polorizer) -> Result<(), WireError> {
                polorizer.write_str(self.as_str());
                Ok(())
            }
        }

        impl Depolorize for $name {
            fn depolorize(depolorizer: &mut Depolorizer<'_>) -> Result<Self, WireError> {
                depolorizer
                    .read_string()?
                    .parse()
                    .map_err(|e: UnknownVariant| WireError::InvalidValue(e.to_string()))
            }
        }
    };
}

string_enum! {
    /// Execution engine families.
    pub enum EngineKind {
        /// PISA engine.
        Pisa => "PISA",
        /// MERU engine.
        Meru => "MERU",
    }
}

string_enum! {
    /// Wire encodings a manifest can be carried in.
    pub enum Encoding {
        /// Canonical binary encoding.
        Polo => "POLO",
        /// JSON document.
        Json => "JSON",
        /// YAML document.
        Yaml => "YAML",
    }
}

impl Encoding {
    /// Conventional file extension.
    #[must_use]
    pub const fn extension(self) -> &'static str {
        match self {
            Encoding::Polo => "polo",
            Encoding::Json => "json",
            Encoding::Yaml => "yaml",
        }
    }

    /// Encoding implied by a file's extension.
    #[must_use]
    pub fn from_path(path: &Path) -> Option<Self> {
        let extension = path.extension()?.to_str()?.to_ascii_lowercase();
        match extension.as_str() {
            "polo" => Some(Encoding::Polo),
            "json" => Some(Encoding::Json),
            "yaml" | "yml" => Some(Encoding::Yaml),
            _ => None,
        }
    }
}

string_enum! {
    /// Access class of a callsite.
    pub enum CallsiteKind {
        /// Runs once when the logic is deployed.
        Deployer => "deployer",
        /// Runs when a participant enlists with the logic.
        Enlister => "enlister",
        /// Externally callable.
        Invokable => "invokable",
        /// Externally callable with interaction context.
        Interactable => "interactable",
        /// Internal only.
        Local => "local",
    }
}

impl CallsiteKind {
    /// Returns true if the callsite can be reached from outside the logic.
    #[must_use]
    pub const fn is_external(self) -> bool {
        !matches!(self, CallsiteKind::Local)
    }
}

string_enum! {
    /// Lifetime class of a logic state element.
    pub enum ContextStateKind {
        /// State shared by the logic itself.
        Persistent => "persistent",
        /// State held per participant.
        Ephemeral => "ephemeral",
    }
}

// =============================================================================
// ELEMENT IDENTIFIERS
// =============================================================================

/// Producer-assigned pointer identifying a manifest element.
pub type ElementPtr = u64;

/// Fuel units consumed by engines.
pub type EngineFuel = u64;

/// Engine-defined element kind tag.
#[derive(Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ElementKind(String);

impl ElementKind {
    /// Creates a kind tag.
    #[must_use]
    pub fn new(kind: impl Into<String>) -> Self {
        Self(kind.into())
    }

    /// The tag as text.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for ElementKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "ElementKind({})", self.0)
    }
}

impl fmt::Display for ElementKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for ElementKind {
    fn from(kind: &str) -> Self {
        Self(kind.to_string())
    }
}

impl From<String> for ElementKind {
    fn from(kind: String) -> Self {
        Self(kind)
    }
}

impl Polorize for ElementKind {
    fn polorize(&self, polorizer: &mut Polorizer) -> Result<(), WireError> {
        polorizer.write_str(&self.0);
        Ok(())
    }
}

impl Depolorize for ElementKind {
    fn depolorize(depolorizer: &mut Depolorizer<'_>) -> Result<Self, WireError> {
        depolorizer.read_string().map(Self)
    }
}

// =============================================================================
// HASH (32 bytes)
// =============================================================================

/// A 32-byte digest (SHA-256 for manifests).
#[derive(Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct Hash(pub [u8; 32]);

impl Hash {
    /// The zero hash.
    pub const ZERO: Self = Self([0u8; 32]);

    /// Creates a hash from a slice. Returns None if wrong length.
    #[must_use]
    pub fn from_slice(slice: &[u8]) -> Option<Self> {
        <[u8; 32]>::try_from(slice).ok().map(Self)
    }

    /// Returns the underlying bytes.
    #[must_use]
    pub const fn as_bytes(&self) -> &[u8; 32] {
        &self.0
    }

    /// Returns true if this is the zero hash.
    #[must_use]
    pub fn is_zero(&self) -> bool {
        self.0 == [0u8; 32]
    }
}

impl fmt::Debug for Hash {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "0x")?;
        for byte in &self.0 {
            write!(f, "{byte:02x}")?;
        }
        Ok(())
    }
}

impl fmt::Display for Hash {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "0x")?;
        for byte in &self.0[..4] {
            write!(f, "{byte:02x}")?;
        }
        write!(f, "...")?;
        for byte in &self.0[28..] {
            write!(f, "{byte:02x}")?;
        }
        Ok(())
    }
}

impl From<[u8; 32]> for Hash {
    fn from(bytes: [u8; 32]) -> Self {
        Self(bytes)
    }
}

// =============================================================================
// ACCOUNT IDENTIFIERS
// =============================================================================

/// A 32-byte account address.
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default, Serialize, Deserialize)]
pub struct Address(pub [u8; 32]);

impl Address {
    /// The zero address.
    pub const ZERO: Self = Self([0u8; 32]);

    /// Returns the underlying bytes.
    #[must_use]
    pub const fn as_bytes(&self) -> &[u8; 32] {
        &self.0
    }
}

impl fmt::Debug for Address {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "0x")?;
        for byte in &self.0 {
            write!(f, "{byte:02x}")?;
        }
        Ok(())
    }
}

/// Identifier of a deployed logic: its account address plus an
/// engine-defined edition tag.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Default, Serialize, Deserialize)]
pub struct LogicId {
    /// Account holding the logic.
    pub address: Address,
    /// Edition of the logic at that address.
    pub edition: u64,
}

impl LogicId {
    /// Creates a logic identifier.
    #[must_use]
    pub const fn new(address: Address, edition: u64) -> Self {
        Self { address, edition }
    }
}
