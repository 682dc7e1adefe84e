//! # Codec Layer
//!
//! Manifest envelopes, deterministic value encoding, typed value decoding
//! and call encoding.

pub mod call;
pub mod manifest;
pub mod ordering;
pub mod shapes;
pub mod values;

pub use call::ManifestCallEncoder;
pub use manifest::ManifestCodec;
pub use ordering::{compare_keys, sorted_entries};
pub use shapes::decode_value;
pub use values::{encode_value, EncoderConfig, ValueEncoder};
