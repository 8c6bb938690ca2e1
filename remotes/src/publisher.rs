//! Fan-out of decoded events to subscribers
//!
//! Each codec owns one publisher. Delivery is at-most-once per subscriber in
//! emission order; a subscriber that cannot keep up loses events rather than
//! stalling the decoder.

use crate::event::RemoteEvent;
use log::trace;
use std::sync::Mutex;
use tokio::sync::mpsc;

/// Events buffered per subscriber before the publisher starts dropping
pub const SUBSCRIBER_BUFFER: usize = 32;

/// One subscriber's end of a codec event stream
pub struct Subscription {
    id: u64,
    rx: mpsc::Receiver<RemoteEvent>,
}

impl Subscription {
    /// Next event, or `None` once the publisher has closed
    pub async fn recv(&mut self) -> Option<RemoteEvent> {
        self.rx.recv().await
    }

    pub fn try_recv(&mut self) -> Option<RemoteEvent> {
        self.rx.try_recv().ok()
    }
}

struct Inner {
    next_id: u64,
    subscribers: Vec<(u64, mpsc::Sender<RemoteEvent>)>,
    closed: bool,
}

/// Broadcasts decoded events to any number of subscribers
pub struct Publisher {
    inner: Mutex<Inner>,
}

impl Default for Publisher {
    fn default() -> Self {
        Self::new()
    }
}

impl Publisher {
    pub fn new() -> Self {
        Publisher {
            inner: Mutex::new(Inner {
                next_id: 0,
                subscribers: Vec::new(),
                closed: false,
            }),
        }
    }

    /// Register a new subscriber. Subscribing to a closed publisher yields a
    /// stream that ends immediately.
    pub fn subscribe(&self) -> Subscription {
        let (tx, rx) = mpsc::channel(SUBSCRIBER_BUFFER);

        let mut inner = self.inner.lock().unwrap();
        let id = inner.next_id;
        inner.next_id += 1;

        if !inner.closed {
            inner.subscribers.push((id, tx));
        }

        Subscription { id, rx }
    }

    /// Release a subscription obtained from [`Publisher::subscribe`]
    pub fn unsubscribe(&self, subscription: Subscription) {
        let mut inner = self.inner.lock().unwrap();

        inner.subscribers.retain(|(id, _)| *id != subscription.id);
    }

    /// Deliver an event to every live subscriber without blocking. A full
    /// subscriber buffer drops the event for that subscriber only.
    pub fn emit(&self, event: &RemoteEvent) {
        let mut inner = self.inner.lock().unwrap();

        if inner.closed {
            return;
        }

        inner.subscribers.retain(|(id, tx)| {
            use mpsc::error::TrySendError;

            match tx.try_send(*event) {
                Ok(()) => true,
                Err(TrySendError::Full(_)) => {
                    trace!("subscriber {id} not keeping up, event dropped");
                    true
                }
                Err(TrySendError::Closed(_)) => false,
            }
        });
    }

    /// Release all subscribers; further emits are no-ops
    pub fn close(&self) {
        let mut inner = self.inner.lock().unwrap();

        inner.closed = true;
        inner.subscribers.clear();
    }

    pub fn subscriber_count(&self) -> usize {
        self.inner.lock().unwrap().subscribers.len()
    }
}
