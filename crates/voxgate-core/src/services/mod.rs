//! Application services orchestrating ports and core components.

mod speech;

pub use speech::{SpeechDeps, SpeechService};
