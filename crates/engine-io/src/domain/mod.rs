//! # Domain Layer
//!
//! Pure types: manifests, payloads, values and call ABI.

pub mod abi;
pub mod logic;
pub mod manifest;
pub mod payload;
pub mod value_objects;
pub mod values;

pub use abi::*;
pub use logic::*;
pub use manifest::{Manifest, ManifestElement, ManifestEngine, ManifestHeader};
pub use payload::*;
pub use value_objects::*;
pub use values::*;
