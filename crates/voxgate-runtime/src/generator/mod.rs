//! Speech generator backends.

mod command;
pub mod protocol;

pub use command::{CommandGenerator, CommandSpec};
