//! Port definitions (trait abstractions) for external systems.
//!
//! Ports define the interfaces that the core domain expects from infrastructure.
//! They contain no implementation details and use only domain types.
//!
//! # Design Rules
//!
//! - No HTTP types in any signature
//! - No process or codec implementation details
//! - Generation is synchronous; async scheduling belongs to the gate

pub mod codec;
pub mod speech_generator;
pub mod status_emitter;

pub use codec::{AudioDecoder, AudioEncoder};
pub use speech_generator::SpeechGenerator;
#[cfg(test)]
pub use speech_generator::MockSpeechGenerator;
pub use status_emitter::{NoopStatusEmitter, StatusEmitter};
