//! In-process status fan-out.
//!
//! [`StatusBus`] broadcasts [`StatusMessage`]s to every live subscriber. Each
//! subscriber owns an unbounded queue, so a slow reader never stalls the
//! publisher or other readers. The most recent message is kept as a snapshot
//! and replayed to late joiners.

use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError, Weak};
use std::time::Duration;

use futures_util::stream::{self, Stream};
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tracing::debug;

use super::message::{StatusFrame, StatusKind, StatusMessage};
use super::publisher::{DispatchSlot, StatusPublisher};
use crate::ports::StatusEmitter;

#[derive(Default)]
struct BusState {
    subscribers: HashMap<u64, mpsc::UnboundedSender<StatusMessage>>,
    current: Option<StatusMessage>,
    next_id: u64,
    closed: bool,
}

struct BusInner {
    state: Mutex<BusState>,
    dispatch: Arc<DispatchSlot>,
    keepalive: Duration,
}

impl BusInner {
    fn lock(&self) -> MutexGuard<'_, BusState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn deliver(&self, status: StatusMessage) {
        let mut state = self.lock();
        if state.closed {
            debug!(message = %status.message, "Status bus closed; message dropped");
            return;
        }

        let before = state.subscribers.len();
        state
            .subscribers
            .retain(|_, tx| tx.send(status.clone()).is_ok());
        let removed = before - state.subscribers.len();
        if removed > 0 {
            debug!(removed, "Dropped closed status subscribers");
        }

        state.current = Some(status);
    }
}

/// Shared status broadcaster.
///
/// Construct one at startup and pass clones to whatever needs to publish or
/// subscribe. Clones share state.
#[derive(Clone)]
pub struct StatusBus {
    inner: Arc<BusInner>,
}

impl std::fmt::Debug for StatusBus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("StatusBus")
            .field("subscribers", &self.subscriber_count())
            .field("keepalive", &self.inner.keepalive)
            .finish()
    }
}

impl StatusBus {
    /// Create a bus whose streams emit a keep-alive after `keepalive` of silence.
    pub fn new(keepalive: Duration) -> Self {
        Self {
            inner: Arc::new(BusInner {
                state: Mutex::new(BusState::default()),
                dispatch: Arc::new(DispatchSlot::default()),
                keepalive,
            }),
        }
    }

    /// Publish a message to every subscriber and remember it as the snapshot.
    ///
    /// Never blocks on subscribers and never fails; subscribers whose queue
    /// is closed are removed.
    pub fn publish(
        &self,
        message: impl Into<String>,
        kind: StatusKind,
        progress: Option<f64>,
    ) -> StatusMessage {
        let status = StatusMessage::new(message, kind, progress);
        self.inner.deliver(status.clone());
        status
    }

    /// Register a subscriber. The current snapshot, if any, is queued first.
    pub fn subscribe(&self) -> Subscription {
        let (tx, receiver) = mpsc::unbounded_channel();
        let mut state = self.inner.lock();

        if let Some(current) = &state.current {
            let _ = tx.send(current.clone());
        }

        let id = state.next_id;
        state.next_id += 1;
        if !state.closed {
            state.subscribers.insert(id, tx);
        }
        let subscribers = state.subscribers.len();
        drop(state);

        debug!(id, subscribers, "Status subscriber registered");

        Subscription {
            id,
            receiver,
            keepalive: self.inner.keepalive,
            bus: Arc::downgrade(&self.inner),
        }
    }

    /// Subscribe and return the live frame stream in one step.
    pub fn stream(&self) -> impl Stream<Item = StatusFrame> + Send + 'static {
        self.subscribe().into_stream()
    }

    /// The most recently published message.
    pub fn current(&self) -> Option<StatusMessage> {
        self.inner.lock().current.clone()
    }

    pub fn subscriber_count(&self) -> usize {
        self.inner.lock().subscribers.len()
    }

    /// A cloneable handle that can publish from any thread.
    ///
    /// Messages only reach subscribers while a dispatcher is attached
    /// (see [`StatusBus::spawn_dispatcher`]); otherwise they are logged.
    pub fn publisher(&self) -> StatusPublisher {
        StatusPublisher::new(Arc::clone(&self.inner.dispatch))
    }

    /// Start the task that drains [`StatusPublisher`] messages onto the bus.
    ///
    /// Must be called from within a tokio runtime. Replaces any previously
    /// attached dispatcher.
    pub fn spawn_dispatcher(&self) -> JoinHandle<()> {
        let (tx, mut rx) = mpsc::unbounded_channel::<StatusMessage>();
        self.inner.dispatch.attach(tx);

        let bus = Arc::downgrade(&self.inner);
        tokio::spawn(async move {
            while let Some(status) = rx.recv().await {
                let Some(inner) = bus.upgrade() else {
                    break;
                };
                inner.deliver(status);
            }
            debug!("Status dispatcher stopped");
        })
    }

    /// Tear the bus down: detach the dispatcher and end every subscriber stream.
    pub fn close(&self) {
        self.inner.dispatch.detach();

        let mut state = self.inner.lock();
        state.closed = true;
        state.current = None;
        let dropped = state.subscribers.len();
        state.subscribers.clear();
        drop(state);

        debug!(dropped, "Status bus closed");
    }
}

impl StatusEmitter for StatusBus {
    fn emit(&self, message: &str, kind: StatusKind, progress: Option<f64>) {
        self.publish(message, kind, progress);
    }
}

/// A registered subscriber. Dropping it unregisters from the bus.
#[derive(Debug)]
pub struct Subscription {
    id: u64,
    receiver: mpsc::UnboundedReceiver<StatusMessage>,
    keepalive: Duration,
    bus: Weak<BusInner>,
}

impl Subscription {
    /// Next message, or `None` once the bus has closed this subscriber.
    pub async fn recv(&mut self) -> Option<StatusMessage> {
        self.receiver.recv().await
    }

    /// Turn the subscription into a live stream of frames.
    ///
    /// Waits at most the keep-alive window for each message and yields
    /// [`StatusFrame::KeepAlive`] when it passes in silence. Ends when the
    /// subscriber is closed. Dropping the stream unregisters the subscriber.
    pub fn into_stream(self) -> impl Stream<Item = StatusFrame> + Send + 'static {
        stream::unfold(self, |mut sub| async move {
            match tokio::time::timeout(sub.keepalive, sub.receiver.recv()).await {
                Ok(Some(status)) => Some((StatusFrame::Message(status), sub)),
                Ok(None) => None,
                Err(_) => Some((StatusFrame::KeepAlive, sub)),
            }
        })
    }
}

impl Drop for Subscription {
    fn drop(&mut self) {
        if let Some(inner) = self.bus.upgrade() {
            let mut state = inner.lock();
            state.subscribers.remove(&self.id);
            let subscribers = state.subscribers.len();
            drop(state);
            debug!(id = self.id, subscribers, "Status subscriber removed");
        }
    }
}

impl std::fmt::Debug for BusInner {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BusInner").finish_non_exhaustive()
    }
}
