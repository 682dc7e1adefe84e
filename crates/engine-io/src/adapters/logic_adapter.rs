//! # Logic Adapter
//!
//! `LogicDriver` over a compiled `LogicDescriptor`.

use crate::domain::abi::{Callsite, Classdef};
use crate::domain::logic::LogicElement;
use crate::domain::value_objects::{ContextStateKind, ElementPtr, EngineKind, Hash, LogicId};
use crate::ports::inbound::LogicDescriptor;
use crate::ports::outbound::LogicDriver;

/// A deployed logic held in memory.
#[derive(Debug)]
pub struct DescriptorLogic {
    id: LogicId,
    descriptor: LogicDescriptor,
    sealed: bool,
    asset: bool,
}

impl DescriptorLogic {
    /// Wraps a compiled descriptor.
    #[must_use]
    pub fn new(id: LogicId, descriptor: LogicDescriptor) -> Self {
        Self {
            id,
            descriptor,
            sealed: false,
            asset: false,
        }
    }

    /// Marks the logic as sealed.
    #[must_use]
    pub fn sealed(mut self) -> Self {
        self.sealed = true;
        self
    }

    /// Marks the logic as an asset logic.
    #[must_use]
    pub fn asset(mut self) -> Self {
        self.asset = true;
        self
    }

    /// Underlying descriptor.
    #[must_use]
    pub fn descriptor(&self) -> &LogicDescriptor {
        &self.descriptor
    }
}

impl LogicDriver for DescriptorLogic {
    fn logic_id(&self) -> LogicId {
        self.id
    }

    fn engine(&self) -> EngineKind {
        self.descriptor.engine
    }

    fn manifest_hash(&self) -> Hash {
        self.descriptor.manifest_hash
    }

    fn is_sealed(&self) -> bool {
        self.sealed
    }

    fn is_asset_logic(&self) -> bool {
        self.asset
    }

    fn is_interactive(&self) -> bool {
        self.descriptor.interactive
    }

    fn persistent_state(&self) -> Option<ElementPtr> {
        self.descriptor.ctx_state.get(ContextStateKind::Persistent)
    }

    fn ephemeral_state(&self) -> Option<ElementPtr> {
        self.descriptor.ctx_state.get(ContextStateKind::Ephemeral)
    }

    fn element_deps(&self, ptr: ElementPtr) -> Vec<ElementPtr> {
        self.descriptor.dependency.dependencies(ptr)
    }

    fn element(&self, ptr: ElementPtr) -> Option<LogicElement> {
        self.descriptor.elements.get(&ptr).cloned()
    }

    fn callsite(&self, name: &str) -> Option<Callsite> {
        self.descriptor.callsites.get(name).cloned()
    }

    fn classdef(&self, name: &str) -> Option<Classdef> {
        self.descriptor.classdefs.get(name).cloned()
    }
}
