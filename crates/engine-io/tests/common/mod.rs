//! Shared fixtures for the engine-io integration tests.

#![allow(dead_code)]

use engine_io::prelude::*;
use serde::{Deserialize, Serialize};
use shared_wire::{Depolorize, Depolorizer, Polorize, Polorizer, WireError};
use std::sync::{Arc, Once};

// =============================================================================
// PAYLOADS
// =============================================================================

/// A typed constant value.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Constant {
    #[serde(rename = "type")]
    pub ty: String,
    pub value: String,
}

impl Constant {
    pub fn new(ty: &str, value: &str) -> Self {
        Self {
            ty: ty.to_string(),
            value: value.to_string(),
        }
    }
}

impl Polorize for Constant {
    fn polorize(&self, polorizer: &mut Polorizer) -> Result<(), WireError> {
        let mut pack = Polorizer::new();
        pack.write_str(&self.ty);
        pack.write_str(&self.value);
        polorizer.write_pack(pack);
        Ok(())
    }
}

impl Depolorize for Constant {
    fn depolorize(depolorizer: &mut Depolorizer<'_>) -> Result<Self, WireError> {
        let mut pack = depolorizer.read_packed()?;
        Ok(Self {
            ty: pack.read_string()?,
            value: pack.read_string()?,
        })
    }
}

impl PayloadData for Constant {}

/// A callable routine.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Routine {
    pub name: String,
    #[serde(default)]
    pub signature: CallSignature,
    #[serde(default)]
    pub body: String,
}

impl Polorize for Routine {
    fn polorize(&self, polorizer: &mut Polorizer) -> Result<(), WireError> {
        let mut pack = Polorizer::new();
        pack.write_str(&self.name);
        pack.polorize(&self.signature)?;
        pack.write_str(&self.body);
        polorizer.write_pack(pack);
        Ok(())
    }
}

impl Depolorize for Routine {
    fn depolorize(depolorizer: &mut Depolorizer<'_>) -> Result<Self, WireError> {
        let mut pack = depolorizer.read_packed()?;
        Ok(Self {
            name: pack.read_string()?,
            signature: pack.depolorize()?,
            body: pack.read_string()?,
        })
    }
}

impl PayloadData for Routine {
    fn call_signature(&self) -> Option<&CallSignature> {
        Some(&self.signature)
    }
}

pub fn shape(s: &str) -> TypeShape {
    s.parse().unwrap()
}

pub fn transfer_routine() -> Routine {
    Routine {
        name: "Transfer".to_string(),
        signature: CallSignature {
            inputs: vec![
                TypeField::new("to", shape("string")),
                TypeField::new("amount", shape("u64")),
            ],
            outputs: vec![TypeField::new("ok", shape("bool"))],
        },
        body: "emit transfer".to_string(),
    }
}

// =============================================================================
// DRIVERS
// =============================================================================

/// Accepts every signature.
pub struct AcceptAll;

impl CryptoDriver for AcceptAll {
    fn validate_signature(&self, _signature: &[u8]) -> Result<(), EngineError> {
        Ok(())
    }

    fn verify_signature(&self, _data: &[u8], _signature: &[u8], _key: &[u8]) -> Result<bool, EngineError> {
        Ok(true)
    }
}

/// Fixed interaction.
pub struct Interaction {
    pub callsite: String,
    pub calldata: Vec<u8>,
    pub fuel: EngineFuel,
}

impl InteractionDriver for Interaction {
    fn kind(&self) -> &str {
        "LogicInvoke"
    }

    fn fuel_price(&self) -> U256 {
        U256::one()
    }

    fn fuel_limit(&self) -> EngineFuel {
        self.fuel
    }

    fn callsite(&self) -> &str {
        &self.callsite
    }

    fn calldata(&self) -> &[u8] {
        &self.calldata
    }
}

// =============================================================================
// BUILDERS
// =============================================================================

pub fn init_tracing() {
    static INIT: Once = Once::new();
    INIT.call_once(|| {
        let _ = tracing_subscriber::fmt()
            .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
            .with_test_writer()
            .try_init();
    });
}

pub fn pisa_runtime() -> StaticRuntime {
    StaticRuntime::new(EngineKind::Pisa, "0.4.0")
        .with_element_type::<Constant>("constant")
        .with_element_type::<Routine>("routine")
}

pub fn registry() -> Arc<RuntimeRegistry> {
    let registry = Arc::new(RuntimeRegistry::new());
    registry.register(EngineKind::Pisa, Arc::new(pisa_runtime()), Arc::new(AcceptAll));
    registry
}

pub fn codec() -> ManifestCodec {
    init_tracing();
    ManifestCodec::new(registry(), EngineIoConfig::default())
}

pub fn codec_with(config: EngineIoConfig) -> ManifestCodec {
    init_tracing();
    ManifestCodec::new(registry(), config)
}

pub fn sample_manifest() -> Manifest {
    Manifest::new(
        ManifestHeader::new("0.1.0", EngineKind::Pisa),
        vec![
            ManifestElement::new(0, vec![], "constant", Constant::new("u64", "0x2710")),
            ManifestElement::new(1, vec![0], "routine", transfer_routine()),
        ],
    )
    .unwrap()
}
