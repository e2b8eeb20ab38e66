//! Protocol layer: message dispatch and capability negotiation.

pub mod engine;
pub mod negotiation;

pub use engine::ProtocolEngine;
