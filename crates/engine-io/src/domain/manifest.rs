//! # Manifest
//!
//! The deployable artifact of a logic: a header naming the syntax version
//! and engine, followed by engine-typed elements addressed by pointer.
//!
//! A `Manifest` is immutable once built. Element order is preserved exactly
//! as produced, and pointers are unique.

use crate::domain::payload::ElementPayload;
use crate::domain::value_objects::{ElementKind, ElementPtr, EngineKind};
use crate::errors::SchemaError;
use serde::{Deserialize, Serialize};
use shared_wire::{Depolorize, Depolorizer, Polorize, Polorizer, WireError};
use std::collections::BTreeMap;

// =============================================================================
// HEADER
// =============================================================================

/// Engine descriptor of a manifest.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ManifestEngine {
    /// Engine family.
    pub kind: EngineKind,
    /// Engine-defined feature flags.
    #[serde(default)]
    pub flags: Vec<String>,
}

impl Polorize for ManifestEngine {
    fn polorize(&self, polorizer: &mut Polorizer) -> Result<(), WireError> {
        let mut pack = Polorizer::new();
        pack.polorize(&self.kind)?;
        pack.polorize(&self.flags)?;
        polorizer.write_pack(pack);
        Ok(())
    }
}

/// Manifest header.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ManifestHeader {
    /// Syntax version of the manifest.
    pub syntax: String,
    /// Target engine.
    pub engine: ManifestEngine,
}

impl ManifestHeader {
    /// Creates a header for `kind` without flags.
    #[must_use]
    pub fn new(syntax: impl Into<String>, kind: EngineKind) -> Self {
        Self {
            syntax: syntax.into(),
            engine: ManifestEngine {
                kind,
                flags: Vec::new(),
            },
        }
    }
}

impl Polorize for ManifestHeader {
    fn polorize(&self, polorizer: &mut Polorizer) -> Result<(), WireError> {
        let mut pack = Polorizer::new();
        pack.write_str(&self.syntax);
        pack.polorize(&self.engine)?;
        polorizer.write_pack(pack);
        Ok(())
    }
}

/// Header as read off the wire, before the engine kind is validated.
#[derive(Clone, Debug, PartialEq, Eq, Deserialize)]
pub(crate) struct RawHeader {
    pub syntax: String,
    pub engine: RawEngine,
}

#[derive(Clone, Debug, PartialEq, Eq, Deserialize)]
pub(crate) struct RawEngine {
    pub kind: String,
    #[serde(default)]
    pub flags: Vec<String>,
}

impl Depolorize for RawHeader {
    fn depolorize(depolorizer: &mut Depolorizer<'_>) -> Result<Self, WireError> {
        let mut header = depolorizer.read_packed()?;
        let syntax = header.read_string()?;
        let mut engine = header.read_packed()?;
        let raw = Self {
            syntax,
            engine: RawEngine {
                kind: engine.read_string()?,
                flags: engine.depolorize()?,
            },
        };
        if !header.is_done() || !engine.is_done() {
            return Err(WireError::TrailingData);
        }
        Ok(raw)
    }
}

// =============================================================================
// ELEMENTS
// =============================================================================

/// One addressable unit of a manifest.
#[derive(Clone, Debug)]
pub struct ManifestElement {
    /// Producer-assigned pointer.
    pub ptr: ElementPtr,
    /// Pointers this element depends on.
    pub deps: Vec<ElementPtr>,
    /// Engine-defined kind tag.
    pub kind: ElementKind,
    /// Engine-defined data.
    pub data: Box<dyn ElementPayload>,
}

impl ManifestElement {
    /// Creates an element.
    pub fn new(
        ptr: ElementPtr,
        deps: Vec<ElementPtr>,
        kind: impl Into<ElementKind>,
        data: impl ElementPayload,
    ) -> Self {
        Self {
            ptr,
            deps,
            kind: kind.into(),
            data: Box::new(data),
        }
    }
}

impl PartialEq for ManifestElement {
    fn eq(&self, other: &Self) -> bool {
        self.ptr == other.ptr
            && self.deps == other.deps
            && self.kind == other.kind
            && *self.data == *other.data
    }
}

// =============================================================================
// MANIFEST
// =============================================================================

/// Validated, immutable manifest.
#[derive(Clone, Debug, PartialEq)]
pub struct Manifest {
    header: ManifestHeader,
    elements: Vec<ManifestElement>,
    index: BTreeMap<ElementPtr, usize>,
}

impl Manifest {
    /// Builds a manifest, rejecting duplicate element pointers.
    pub fn new(header: ManifestHeader, elements: Vec<ManifestElement>) -> Result<Self, SchemaError> {
        let mut index = BTreeMap::new();
        for (position, element) in elements.iter().enumerate() {
            if index.insert(element.ptr, position).is_some() {
                return Err(SchemaError::DuplicateElement(element.ptr));
            }
        }
        Ok(Self {
            header,
            elements,
            index,
        })
    }

    /// Manifest header.
    #[must_use]
    pub fn header(&self) -> &ManifestHeader {
        &self.header
    }

    /// Syntax version.
    #[must_use]
    pub fn syntax(&self) -> &str {
        &self.header.syntax
    }

    /// Target engine family.
    #[must_use]
    pub fn engine(&self) -> EngineKind {
        self.header.engine.kind
    }

    /// Elements in manifest order.
    #[must_use]
    pub fn elements(&self) -> &[ManifestElement] {
        &self.elements
    }

    /// Number of elements.
    #[must_use]
    pub fn size(&self) -> usize {
        self.elements.len()
    }

    /// Element at `ptr`.
    #[must_use]
    pub fn element(&self, ptr: ElementPtr) -> Option<&ManifestElement> {
        self.index.get(&ptr).map(|&position| &self.elements[position])
    }
}
