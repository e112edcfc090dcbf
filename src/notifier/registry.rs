use super::LiveEvent;
use crate::constants::SUBSCRIBER_BUFFER;
use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use tokio::sync::mpsc;

type SubscriberId = u64;

/// Open live-update subscribers.
///
/// Each subscriber owns a bounded queue; a full or closed queue gets the
/// subscriber dropped without delaying delivery to the others.
#[derive(Debug, Default)]
pub struct SubscriberRegistry {
    next_id: AtomicU64,
    subscribers: Mutex<HashMap<SubscriberId, mpsc::Sender<LiveEvent>>>,
}

impl SubscriberRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> MutexGuard<'_, HashMap<SubscriberId, mpsc::Sender<LiveEvent>>> {
        self.subscribers.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Open a subscription. The connected marker is queued before the
    /// subscriber becomes visible to broadcasts.
    pub fn subscribe(self: &Arc<Self>) -> Subscription {
        let (tx, rx) = mpsc::channel(SUBSCRIBER_BUFFER);
        // fresh queue, cannot be full
        let _ = tx.try_send(LiveEvent::Connected);

        let id = self.next_id.fetch_add(1, Ordering::Relaxed);
        self.lock().insert(id, tx);
        tracing::debug!(subscriber = id, "subscriber connected");

        Subscription {
            id,
            rx,
            registry: Arc::clone(self),
        }
    }

    pub fn remove(&self, id: SubscriberId) -> bool {
        let removed = self.lock().remove(&id).is_some();
        if removed {
            tracing::debug!(subscriber = id, "subscriber removed");
        }
        removed
    }

    pub fn len(&self) -> usize {
        self.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Push `event` to every subscriber open at call time; returns how many
    /// accepted it
    pub fn broadcast(&self, event: &LiveEvent) -> usize {
        let snapshot: Vec<(SubscriberId, mpsc::Sender<LiveEvent>)> = self
            .lock()
            .iter()
            .map(|(id, tx)| (*id, tx.clone()))
            .collect();

        let mut delivered = 0;
        let mut failed = Vec::new();
        for (id, tx) in snapshot {
            match tx.try_send(event.clone()) {
                Ok(()) => delivered += 1,
                Err(e) => {
                    tracing::debug!(subscriber = id, error = %e, "dropping subscriber");
                    failed.push(id);
                }
            }
        }

        for id in failed {
            self.remove(id);
        }
        delivered
    }
}

/// Receiving end of one subscriber; dropping it unsubscribes
#[derive(Debug)]
pub struct Subscription {
    id: SubscriberId,
    rx: mpsc::Receiver<LiveEvent>,
    registry: Arc<SubscriberRegistry>,
}

impl Subscription {
    pub fn id(&self) -> SubscriberId {
        self.id
    }

    /// Next event, or `None` once the registry dropped this subscriber
    pub async fn recv(&mut self) -> Option<LiveEvent> {
        self.rx.recv().await
    }
}

impl Drop for Subscription {
    fn drop(&mut self) {
        self.registry.remove(self.id);
    }
}
