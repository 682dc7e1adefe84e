//! # Ports Layer
//!
//! Hexagonal boundaries between the codecs and the engines/hosts around them.

pub mod inbound;
pub mod outbound;

pub use inbound::*;
pub use outbound::*;
