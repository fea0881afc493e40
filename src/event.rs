//! Gameplay events raised by nodes and delivered on flush.

use std::any::Any;
use std::collections::VecDeque;
use std::sync::Arc;

use tracing::debug;

/// Opaque event or trigger payload.
///
/// Payloads are shared, not copied: the same `Arc` travels from
/// `enqueue_ability` into every flow it starts and out to every
/// subscriber. Receivers downcast to the concrete type they expect.
pub type EventPayload = Arc<dyn Any + Send + Sync>;

/// Builds a payload from any sendable value.
pub fn payload<T: Any + Send + Sync>(value: T) -> EventPayload {
    Arc::new(value)
}

/// FIFO buffer between node logic and the outside world.
///
/// Nodes enqueue during execution; the system flushes at the points its
/// trigger mode selects. Flushing clones each payload `Arc` to every live
/// subscriber and drops channels whose receiver is gone.
#[derive(Default)]
pub struct EventQueue {
    cached: VecDeque<EventPayload>,
    subscribers: Vec<flume::Sender<EventPayload>>,
}

impl EventQueue {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn enqueue(&mut self, event: EventPayload) {
        self.cached.push_back(event);
    }

    /// Opens an unbounded channel that receives every flushed event from
    /// now on.
    pub fn subscribe(&mut self) -> flume::Receiver<EventPayload> {
        let (tx, rx) = flume::unbounded();
        self.subscribers.push(tx);
        rx
    }

    /// Delivers all cached events in enqueue order and empties the buffer.
    pub fn flush(&mut self) {
        while let Some(event) = self.cached.pop_front() {
            self.subscribers
                .retain(|subscriber| subscriber.send(Arc::clone(&event)).is_ok());
            if self.subscribers.is_empty() {
                debug!("event flushed with no subscribers");
            }
        }
    }

    pub fn len(&self) -> usize {
        self.cached.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cached.is_empty()
    }
}
