//! # Adapters
//!
//! In-memory implementations of the outbound ports and a decode-only engine
//! runtime.

pub mod dependency;
pub mod logic_adapter;
pub mod state_adapter;
pub mod static_runtime;

pub use dependency::DependencyTable;
pub use logic_adapter::DescriptorLogic;
pub use state_adapter::InMemoryStorage;
pub use static_runtime::{EngineFailure, StaticRuntime, COMPILE_FUEL_PER_ELEMENT};
