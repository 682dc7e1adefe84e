//! # Call Encoding Tests
//!
//! Compiling a decoded manifest with a registered runtime and encoding calls
//! against the resulting logic.

mod common;

use common::*;
use engine_io::prelude::*;
use shared_wire::Document;
use std::collections::BTreeMap;

fn args(pairs: &[(&str, Value)]) -> NamedValues {
    pairs
        .iter()
        .map(|(k, v)| ((*k).to_string(), v.clone()))
        .collect()
}

fn transfer_args() -> NamedValues {
    args(&[("to", Value::from("alice")), ("amount", Value::from(100u64))])
}

fn deployed_logic() -> DescriptorLogic {
    let runtime = pisa_runtime();
    let (mut descriptor, _) = runtime.compile_manifest(&sample_manifest(), 10).unwrap();
    descriptor.callsites.insert(
        "Transfer".to_string(),
        Callsite::new("Transfer", 1, CallsiteKind::Invokable),
    );
    descriptor
        .callsites
        .insert("Setup".to_string(), Callsite::new("Setup", 1, CallsiteKind::Local));
    descriptor
        .callsites
        .insert("Limit".to_string(), Callsite::new("Limit", 0, CallsiteKind::Invokable));

    DescriptorLogic::new(LogicId::new(Address([7; 32]), 0), descriptor)
}

// =============================================================================
// COMPILATION
// =============================================================================

#[test]
fn test_compile_manifest() {
    let runtime = pisa_runtime();
    let manifest = sample_manifest();
    let (descriptor, fuel) = runtime.compile_manifest(&manifest, 10).unwrap();

    assert_eq!(fuel, 2);
    assert_eq!(descriptor.engine, EngineKind::Pisa);
    assert_eq!(descriptor.manifest_hash, manifest.hash().unwrap());
    assert_eq!(descriptor.manifest_raw, manifest.encode(Encoding::Polo).unwrap());
    assert_eq!(descriptor.elements.len(), 2);
    assert_eq!(descriptor.dependency.edges(1), vec![0]);
    assert_eq!(descriptor.elements[&0].kind.as_str(), "constant");
}

#[test]
fn test_compile_rejects_other_engine_and_low_fuel() {
    let meru = StaticRuntime::new(EngineKind::Meru, "0.1.0");
    assert!(matches!(
        meru.compile_manifest(&sample_manifest(), 10),
        Err(EngineError::Compile(_))
    ));
    assert!(matches!(
        pisa_runtime().compile_manifest(&sample_manifest(), 1),
        Err(EngineError::Compile(_))
    ));
}

#[test]
fn test_dependencies_round_trip_through_runtime() {
    let runtime = pisa_runtime();
    let (descriptor, _) = runtime.compile_manifest(&sample_manifest(), 10).unwrap();

    for encoding in Encoding::ALL {
        let encoded = descriptor.dependency.encode(*encoding).unwrap();
        let decoded = runtime.decode_dependencies(&encoded, *encoding).unwrap();
        assert_eq!(decoded.vertices(), vec![0, 1]);
        assert_eq!(decoded.dependencies(1), vec![0]);
    }
}

// =============================================================================
// LOGIC DRIVER
// =============================================================================

#[test]
fn test_descriptor_logic() {
    let logic = deployed_logic().sealed();

    assert!(logic.is_sealed());
    assert!(!logic.is_asset_logic());
    assert_eq!(logic.engine(), EngineKind::Pisa);
    assert_eq!(logic.element_deps(1), vec![0]);
    assert!(logic.element(9).is_none());
    assert_eq!(logic.callsite("Transfer").map(|c| c.ptr), Some(1));
    assert!(logic.classdef("Token").is_none());
    assert!(logic.persistent_state().is_none());
}

#[test]
fn test_spawn_is_unsupported() {
    let runtime = pisa_runtime();
    let logic = std::sync::Arc::new(deployed_logic());
    let storage = std::sync::Arc::new(InMemoryStorage::new(Address([1; 32]), logic.logic_id()));

    struct Env;
    impl EnvDriver for Env {
        fn timestamp(&self) -> i64 {
            0
        }
        fn cluster_id(&self) -> &str {
            "test"
        }
    }

    let result = runtime.spawn_instance(logic, 100, storage, std::sync::Arc::new(Env));
    assert!(matches!(result, Err(EngineError::Unsupported(_))));
}

// =============================================================================
// CALL ENCODERS
// =============================================================================

#[test]
fn test_runtime_and_manifest_encoders_agree() {
    let callsite = Callsite::new("Transfer", 1, CallsiteKind::Invokable);
    let logic = deployed_logic();

    let from_runtime = pisa_runtime().call_encoder(&logic, &callsite).unwrap();
    let from_manifest = sample_manifest().call_encoder(&callsite).unwrap();

    let a = from_runtime.encode_inputs(&transfer_args(), None).unwrap();
    let b = from_manifest.encode_inputs(&transfer_args(), None).unwrap();
    assert_eq!(a, b);

    let document = Document::from_bytes(&a).unwrap();
    assert_eq!(document.keys().collect::<Vec<_>>(), vec!["amount", "to"]);
    assert_eq!(document.get::<u64>("amount").unwrap(), Some(100));
}

#[test]
fn test_call_encoder_errors() {
    let runtime = pisa_runtime();
    let logic = deployed_logic();

    let missing = Callsite::new("Ghost", 9, CallsiteKind::Invokable);
    assert_eq!(
        runtime.call_encoder(&logic, &missing).err(),
        Some(CallError::ElementNotFound {
            callsite: "Ghost".to_string(),
            ptr: 9
        })
    );

    let constant = Callsite::new("Limit", 0, CallsiteKind::Invokable);
    assert!(matches!(
        runtime.call_encoder(&logic, &constant).err(),
        Some(CallError::NotCallable { ptr: 0, .. })
    ));
    assert!(matches!(
        sample_manifest().call_encoder(&constant),
        Err(CallError::NotCallable { ptr: 0, .. })
    ));
}

#[test]
fn test_decode_outputs() {
    let callsite = Callsite::new("Transfer", 1, CallsiteKind::Invokable);
    let encoder = sample_manifest().call_encoder(&callsite).unwrap();

    let mut document = Document::new();
    document.set("ok", &true).unwrap();
    let outputs = encoder.decode_outputs(&document.bytes()).unwrap();

    let mut expected = BTreeMap::new();
    expected.insert("ok".to_string(), Value::from(true));
    assert_eq!(outputs, expected);
}

#[test]
fn test_reference_arguments() {
    let callsite = Callsite::new("Transfer", 1, CallsiteKind::Invokable);
    let encoder = sample_manifest().call_encoder(&callsite).unwrap();

    let call = args(&[("to", Value::reference("owner")), ("amount", Value::from(100u64))]);
    let provider = |reference: &ReferenceValue| {
        (reference.name() == "owner").then(|| Value::from("alice"))
    };

    let resolved = encoder.encode_inputs(&call, Some(&provider)).unwrap();
    assert_eq!(resolved, encoder.encode_inputs(&transfer_args(), None).unwrap());
}

#[test]
fn test_reference_resolving_to_wrong_shape() {
    let callsite = Callsite::new("Transfer", 1, CallsiteKind::Invokable);
    let encoder = sample_manifest().call_encoder(&callsite).unwrap();

    let call = args(&[("to", Value::from("alice")), ("amount", Value::reference("amt"))]);
    let provider = |reference: &ReferenceValue| match reference.name() {
        "amt" => Some(Value::reference("raw")),
        "raw" => Some(Value::from("not-a-number")),
        _ => None,
    };

    let err = encoder.encode_inputs(&call, Some(&provider)).unwrap_err();
    assert!(matches!(
        err,
        CallError::ShapeMismatch { ref label, .. } if label == "amount"
    ));
}

// =============================================================================
// CALLDATA VALIDATION
// =============================================================================

#[test]
fn test_validate_calldata() {
    let runtime = pisa_runtime();
    let logic = deployed_logic();
    let encoder = sample_manifest()
        .call_encoder(&Callsite::new("Transfer", 1, CallsiteKind::Invokable))
        .unwrap();

    let valid = Interaction {
        callsite: "Transfer".to_string(),
        calldata: encoder.encode_inputs(&transfer_args(), None).unwrap(),
        fuel: 100,
    };
    assert!(runtime.validate_calldata(&logic, &valid).is_ok());

    let unknown = Interaction {
        callsite: "Mint".to_string(),
        calldata: Vec::new(),
        fuel: 100,
    };
    assert!(matches!(
        runtime.validate_calldata(&logic, &unknown),
        Err(EngineError::InvalidCalldata(_))
    ));

    let local = Interaction {
        callsite: "Setup".to_string(),
        calldata: Vec::new(),
        fuel: 100,
    };
    assert!(matches!(
        runtime.validate_calldata(&logic, &local),
        Err(EngineError::InvalidCalldata(_))
    ));

    let garbage = Interaction {
        callsite: "Transfer".to_string(),
        calldata: vec![0x03, 0x64],
        fuel: 100,
    };
    assert!(matches!(
        runtime.validate_calldata(&logic, &garbage),
        Err(EngineError::InvalidCalldata(_))
    ));
}
