//! Out-of-band status reporting.
//!
//! - [`StatusBus`]: process-wide fan-out with snapshot and keep-alive
//! - [`StatusPublisher`]: non-blocking publishing from worker threads
//! - [`StatusMessage`]: the wire payload

mod bus;
mod message;
mod publisher;

pub use bus::{StatusBus, Subscription};
pub use message::{StatusFrame, StatusKind, StatusMessage};
pub use publisher::StatusPublisher;
