//! Fan-out of feed events to every connected real-time subscriber.
//!
//! The registry maps a subscriber handle to its own bounded delivery queue.
//! Publishing never waits: a subscriber whose queue is full misses the event,
//! and a subscriber whose receiver is gone is pruned on the next publish.

use std::collections::HashMap;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

use tokio::sync::mpsc::error::TrySendError;
use tokio::sync::{RwLock, mpsc};
use tracing::debug;
use uuid::Uuid;

use crate::domain::event::FeedEvent;

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FanoutStats {
    pub published: u64,
    pub delivered: u64,
    pub dropped: u64,
}

pub struct Subscription {
    pub id: Uuid,
    pub receiver: mpsc::Receiver<Arc<FeedEvent>>,
}

pub struct FanoutRegistry {
    subscribers: RwLock<HashMap<Uuid, mpsc::Sender<Arc<FeedEvent>>>>,
    buffer: usize,
    published: AtomicU64,
    delivered: AtomicU64,
    dropped: AtomicU64,
}

impl FanoutRegistry {
    /// `buffer` is the number of undelivered events kept per subscriber.
    pub fn new(buffer: usize) -> Self {
        Self {
            subscribers: RwLock::new(HashMap::new()),
            buffer: buffer.max(1),
            published: AtomicU64::new(0),
            delivered: AtomicU64::new(0),
            dropped: AtomicU64::new(0),
        }
    }

    pub async fn subscribe(&self) -> Subscription {
        let (sender, receiver) = mpsc::channel(self.buffer);
        let id = Uuid::new_v4();
        self.subscribers.write().await.insert(id, sender);
        debug!(subscriber = %id, "subscriber registered");
        Subscription { id, receiver }
    }

    pub async fn unsubscribe(&self, id: Uuid) -> bool {
        let removed = self.subscribers.write().await.remove(&id).is_some();
        if removed {
            debug!(subscriber = %id, "subscriber removed");
        }
        removed
    }

    /// Sends the event to every live subscriber and returns how many got it.
    pub async fn publish(&self, event: FeedEvent) -> usize {
        let topic = event.topic();
        let action = event.action();
        let event = Arc::new(event);
        let mut delivered = 0usize;
        let mut closed = Vec::new();

        {
            let subscribers = self.subscribers.read().await;
            for (id, sender) in subscribers.iter() {
                match sender.try_send(Arc::clone(&event)) {
                    Ok(()) => delivered += 1,
                    Err(TrySendError::Full(_)) => {
                        self.dropped.fetch_add(1, Ordering::Relaxed);
                        debug!(subscriber = %id, topic, "subscriber lagging, event dropped");
                    }
                    Err(TrySendError::Closed(_)) => closed.push(*id),
                }
            }
        }

        if !closed.is_empty() {
            let mut subscribers = self.subscribers.write().await;
            for id in &closed {
                subscribers.remove(id);
            }
            debug!(pruned = closed.len(), "disconnected subscribers pruned");
        }

        self.published.fetch_add(1, Ordering::Relaxed);
        self.delivered.fetch_add(delivered as u64, Ordering::Relaxed);
        debug!(topic, action, delivered, "event published");
        delivered
    }

    pub async fn subscriber_count(&self) -> usize {
        self.subscribers.read().await.len()
    }

    pub fn stats(&self) -> FanoutStats {
        FanoutStats {
            published: self.published.load(Ordering::Relaxed),
            delivered: self.delivered.load(Ordering::Relaxed),
            dropped: self.dropped.load(Ordering::Relaxed),
        }
    }
}
