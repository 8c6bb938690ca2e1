//! N-to-1 fan-in of codec event streams

use crate::event::RemoteEvent;
use crate::publisher::Subscription;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;

const MERGER_BUFFER: usize = 64;

/// Merges any number of codec subscriptions into a single stream.
///
/// Events appear in arrival order; per-input ordering is preserved, ordering
/// between inputs is whatever interleaving the forwarders produce.
pub struct Merger {
    rx: mpsc::Receiver<RemoteEvent>,
    forwarders: Vec<JoinHandle<()>>,
}

impl Merger {
    pub fn new(inputs: Vec<Subscription>) -> Self {
        let (tx, rx) = mpsc::channel(MERGER_BUFFER);

        let forwarders = inputs
            .into_iter()
            .map(|mut input| {
                let tx = tx.clone();

                tokio::spawn(async move {
                    while let Some(event) = input.recv().await {
                        if tx.send(event).await.is_err() {
                            break;
                        }
                    }
                })
            })
            .collect();

        Merger { rx, forwarders }
    }

    /// Next merged event, or `None` once every input has ended
    pub async fn recv(&mut self) -> Option<RemoteEvent> {
        self.rx.recv().await
    }

    /// Stop forwarding. Nothing is emitted once this returns; events still
    /// buffered are discarded.
    pub fn close(&mut self) {
        for forwarder in &self.forwarders {
            forwarder.abort();
        }

        self.rx.close();
        while self.rx.try_recv().is_ok() {}
    }
}

impl Drop for Merger {
    fn drop(&mut self) {
        for forwarder in &self.forwarders {
            forwarder.abort();
        }
    }
}
