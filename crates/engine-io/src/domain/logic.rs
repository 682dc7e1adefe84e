//! # Compiled Logic
//!
//! Engine-neutral pieces of a compiled logic: its element table, context
//! state layout and call results.

use crate::domain::value_objects::{ContextStateKind, ElementKind, ElementPtr, EngineFuel};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// A manifest element with its payload in canonical binary form.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct LogicElement {
    /// Engine-defined kind tag.
    pub kind: ElementKind,
    /// Pointers this element depends on.
    pub deps: Vec<ElementPtr>,
    /// Canonical binary payload.
    pub data: Vec<u8>,
}

/// Logic elements keyed by pointer.
pub type LogicElementTable = BTreeMap<ElementPtr, LogicElement>;

/// Which element holds each class of logic state.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContextStateMatrix(BTreeMap<ContextStateKind, ElementPtr>);

impl ContextStateMatrix {
    /// Creates an empty matrix.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Assigns the state element for `kind`.
    pub fn insert(&mut self, kind: ContextStateKind, ptr: ElementPtr) {
        self.0.insert(kind, ptr);
    }

    /// State element for `kind`.
    #[must_use]
    pub fn get(&self, kind: ContextStateKind) -> Option<ElementPtr> {
        self.0.get(&kind).copied()
    }

    /// Returns true if the logic declares persistent state.
    #[must_use]
    pub fn persistent(&self) -> bool {
        self.0.contains_key(&ContextStateKind::Persistent)
    }

    /// Returns true if the logic declares ephemeral state.
    #[must_use]
    pub fn ephemeral(&self) -> bool {
        self.0.contains_key(&ContextStateKind::Ephemeral)
    }
}

/// Result of an engine call.
///
/// A call succeeded exactly when its error payload is empty.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "RawCallResult")]
pub struct CallResult {
    fuel: EngineFuel,
    outputs: Vec<u8>,
    error: Vec<u8>,
}

#[derive(Deserialize)]
struct RawCallResult {
    fuel: EngineFuel,
    #[serde(default)]
    outputs: Vec<u8>,
    #[serde(default)]
    error: Vec<u8>,
}

impl TryFrom<RawCallResult> for CallResult {
    type Error = String;

    fn try_from(raw: RawCallResult) -> Result<Self, Self::Error> {
        if !raw.outputs.is_empty() && !raw.error.is_empty() {
            return Err("call result carries both outputs and an error".to_string());
        }
        Ok(Self {
            fuel: raw.fuel,
            outputs: raw.outputs,
            error: raw.error,
        })
    }
}

impl CallResult {
    /// A successful call.
    #[must_use]
    pub fn success(outputs: Vec<u8>, fuel: EngineFuel) -> Self {
        Self {
            fuel,
            outputs,
            error: Vec::new(),
        }
    }

    /// A failed call. An empty `error` is replaced by a null element.
    #[must_use]
    pub fn failure(error: Vec<u8>, fuel: EngineFuel) -> Self {
        let error = if error.is_empty() { vec![0x00] } else { error };
        Self {
            fuel,
            outputs: Vec::new(),
            error,
        }
    }

    /// Returns true if the call succeeded.
    #[must_use]
    pub fn ok(&self) -> bool {
        self.error.is_empty()
    }

    /// Fuel consumed.
    #[must_use]
    pub fn fuel(&self) -> EngineFuel {
        self.fuel
    }

    /// Encoded outputs.
    #[must_use]
    pub fn outputs(&self) -> &[u8] {
        &self.outputs
    }

    /// Encoded error.
    #[must_use]
    pub fn error(&self) -> &[u8] {
        &self.error
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_context_state_matrix() {
        let mut matrix = ContextStateMatrix::new();
        assert!(!matrix.persistent());

        matrix.insert(ContextStateKind::Persistent, 4);
        assert!(matrix.persistent());
        assert!(!matrix.ephemeral());
        assert_eq!(matrix.get(ContextStateKind::Persistent), Some(4));
    }

    #[test]
    fn test_call_result_ok_iff_error_empty() {
        let success = CallResult::success(vec![0x03, 0x01], 120);
        assert!(success.ok());
        assert_eq!(success.fuel(), 120);

        let failure = CallResult::failure(Vec::new(), 50);
        assert!(!failure.ok());
        assert!(failure.outputs().is_empty());
    }

    #[test]
    fn test_call_result_deserialize_rejects_outputs_with_error() {
        let failure = CallResult::failure(vec![0x06, 0x61], 9);
        let json = serde_json::to_string(&failure).unwrap();
        assert_eq!(serde_json::from_str::<CallResult>(&json).unwrap(), failure);

        let both = r#"{"fuel": 9, "outputs": [3, 1], "error": [6, 97]}"#;
        let err = serde_json::from_str::<CallResult>(both).unwrap_err();
        assert!(err.to_string().contains("both outputs and an error"));

        let success: CallResult = serde_json::from_str(r#"{"fuel": 4, "outputs": [3, 1]}"#).unwrap();
        assert!(success.ok());
    }
}
