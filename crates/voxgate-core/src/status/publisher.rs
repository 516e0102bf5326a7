//! Thread-safe publishing into the status bus.
//!
//! Generation backends run on blocking threads where there is no async
//! context to drive the bus. [`StatusPublisher`] hands messages to a
//! dispatcher task over a queue and returns immediately. With no dispatcher
//! attached the message is only logged.

use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use tokio::sync::mpsc;
use tracing::debug;

use super::message::{StatusKind, StatusMessage};
use crate::ports::StatusEmitter;

/// Holds the sending half of the dispatcher queue, if one is attached.
#[derive(Debug, Default)]
pub(crate) struct DispatchSlot {
    sender: Mutex<Option<mpsc::UnboundedSender<StatusMessage>>>,
}

impl DispatchSlot {
    fn lock(&self) -> MutexGuard<'_, Option<mpsc::UnboundedSender<StatusMessage>>> {
        self.sender.lock().unwrap_or_else(PoisonError::into_inner)
    }

    pub(crate) fn attach(&self, sender: mpsc::UnboundedSender<StatusMessage>) {
        *self.lock() = Some(sender);
    }

    pub(crate) fn detach(&self) {
        self.lock().take();
    }

    /// Queue `status`, handing it back if nothing will consume it.
    fn dispatch(&self, status: StatusMessage) -> Option<StatusMessage> {
        match self.lock().as_ref() {
            Some(sender) => sender.send(status).err().map(|e| e.0),
            None => Some(status),
        }
    }
}

/// Cloneable, non-blocking publisher for synchronous code.
#[derive(Debug, Clone)]
pub struct StatusPublisher {
    slot: Arc<DispatchSlot>,
}

impl StatusPublisher {
    pub(crate) const fn new(slot: Arc<DispatchSlot>) -> Self {
        Self { slot }
    }

    /// Whether a dispatcher is currently attached.
    pub fn is_attached(&self) -> bool {
        self.slot.lock().as_ref().is_some_and(|tx| !tx.is_closed())
    }
}

impl StatusEmitter for StatusPublisher {
    fn emit(&self, message: &str, kind: StatusKind, progress: Option<f64>) {
        let status = StatusMessage::new(message, kind, progress);
        if let Some(status) = self.slot.dispatch(status) {
            debug!(
                kind = %status.kind,
                progress = ?status.progress,
                "Status (no dispatcher): {}",
                status.message
            );
        }
    }
}
