//! # Dependency Table
//!
//! Adjacency-set implementation of `DependencyDriver`.

use crate::domain::logic::LogicElementTable;
use crate::domain::value_objects::{ElementPtr, Encoding};
use crate::errors::{CodecError, EngineError};
use crate::ports::outbound::DependencyDriver;
use serde::{Deserialize, Serialize};
use shared_wire::{Depolorize, Depolorizer, Polorize, Polorizer, WireError};
use std::collections::{BTreeMap, BTreeSet};

/// Element dependency graph stored as adjacency sets.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct DependencyTable {
    edges: BTreeMap<ElementPtr, BTreeSet<ElementPtr>>,
}

impl DependencyTable {
    /// Create an empty table.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Builds the graph of a compiled element table.
    #[must_use]
    pub fn from_elements(elements: &LogicElementTable) -> Self {
        let mut table = Self::new();
        for (ptr, element) in elements {
            table.insert(*ptr, &element.deps);
        }
        table
    }

    /// Decodes a table encoded with [`DependencyDriver::encode`].
    pub fn decode(data: &[u8], encoding: Encoding) -> Result<Self, EngineError> {
        let table = match encoding {
            Encoding::Polo => shared_wire::depolorize(data)?,
            Encoding::Json => serde_json::from_slice(data).map_err(CodecError::from)?,
            Encoding::Yaml => serde_yaml::from_slice(data).map_err(CodecError::from)?,
        };
        Ok(table)
    }
}

impl DependencyDriver for DependencyTable {
    fn insert(&mut self, ptr: ElementPtr, deps: &[ElementPtr]) {
        self.edges.entry(ptr).or_default().extend(deps.iter().copied());
    }

    fn remove(&mut self, ptr: ElementPtr) {
        self.edges.remove(&ptr);
        for deps in self.edges.values_mut() {
            deps.remove(&ptr);
        }
    }

    fn size(&self) -> usize {
        self.edges.len()
    }

    fn contains(&self, ptr: ElementPtr) -> bool {
        self.edges.contains_key(&ptr)
    }

    fn edges(&self, ptr: ElementPtr) -> Vec<ElementPtr> {
        self.edges
            .get(&ptr)
            .map(|deps| deps.iter().copied().collect())
            .unwrap_or_default()
    }

    fn dependencies(&self, ptr: ElementPtr) -> Vec<ElementPtr> {
        let mut seen = BTreeSet::new();
        let mut pending = self.edges(ptr);
        while let Some(next) = pending.pop() {
            if next != ptr && seen.insert(next) {
                pending.extend(self.edges(next));
            }
        }
        seen.into_iter().collect()
    }

    fn vertices(&self) -> Vec<ElementPtr> {
        self.edges.keys().copied().collect()
    }

    fn encode(&self, encoding: Encoding) -> Result<Vec<u8>, EngineError> {
        let encoded = match encoding {
            Encoding::Polo => shared_wire::polorize(self)?,
            Encoding::Json => serde_json::to_vec(self).map_err(CodecError::from)?,
            Encoding::Yaml => serde_yaml::to_string(self)
                .map_err(CodecError::from)?
                .into_bytes(),
        };
        Ok(encoded)
    }
}

impl Polorize for DependencyTable {
    fn polorize(&self, polorizer: &mut Polorizer) -> Result<(), WireError> {
        let mut vertices = Polorizer::new();
        for (ptr, deps) in &self.edges {
            let mut vertex = Polorizer::new();
            vertex.write_u64(*ptr);
            vertex.polorize(&deps.iter().copied().collect::<Vec<_>>())?;
            vertices.write_pack(vertex);
        }
        polorizer.write_pack(vertices);
        Ok(())
    }
}

impl Depolorize for DependencyTable {
    fn depolorize(depolorizer: &mut Depolorizer<'_>) -> Result<Self, WireError> {
        let mut vertices = depolorizer.read_packed()?;
        let mut table = Self::new();
        while !vertices.is_done() {
            let mut vertex = vertices.read_packed()?;
            let ptr = vertex.read_u64()?;
            let deps: Vec<ElementPtr> = vertex.depolorize()?;
            table.insert(ptr, &deps);
        }
        Ok(table)
    }
}
