//! Live subscriber hub — fan-out of store updates to streaming consumers
//!
//! The hub owns a registry of bounded delivery channels, one per
//! subscriber. Delivery is best-effort by contract: a subscriber whose
//! channel is full or closed is dropped from the registry instead of ever
//! blocking the producer. The registry has its own lock, held only while
//! mutating or iterating it, so subscriber churn never serializes with
//! store writes.

use crate::types::LogUpdate;
use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use tokio::sync::mpsc;
use tokio::sync::mpsc::error::TrySendError;
use tokio::sync::RwLock;
use tokio_stream::wrappers::ReceiverStream;

/// Registry of live subscribers
pub struct SubscriberHub {
    subscribers: RwLock<HashMap<u64, mpsc::Sender<LogUpdate>>>,
    next_token: AtomicU64,
    buffer: usize,
}

/// Handle held by a streaming consumer
///
/// Dropping the handle closes the channel; the hub prunes the dead sender
/// on the next broadcast. Call [`SubscriberHub::unsubscribe`] (or
/// [`LogStore::unsubscribe`](crate::LogStore::unsubscribe)) with the token
/// to remove it eagerly.
pub struct Subscriber {
    token: u64,
    rx: mpsc::Receiver<LogUpdate>,
}

impl Subscriber {
    /// Opaque registry token identifying this subscriber
    pub fn token(&self) -> u64 {
        self.token
    }

    /// Receive the next broadcast; `None` once unsubscribed or dropped
    /// by the hub
    pub async fn recv(&mut self) -> Option<LogUpdate> {
        self.rx.recv().await
    }

    /// Convert into a `Stream` of updates for stream-based transports
    pub fn into_stream(self) -> ReceiverStream<LogUpdate> {
        ReceiverStream::new(self.rx)
    }
}

impl SubscriberHub {
    pub(crate) fn new(buffer: usize) -> Self {
        Self {
            subscribers: RwLock::new(HashMap::new()),
            next_token: AtomicU64::new(1),
            buffer,
        }
    }

    /// Register a new subscriber and return its receiving handle
    pub async fn subscribe(&self) -> Subscriber {
        let (tx, rx) = mpsc::channel(self.buffer);
        let token = self.next_token.fetch_add(1, Ordering::Relaxed);

        let mut subs = self.subscribers.write().await;
        subs.insert(token, tx);
        tracing::debug!(token, total = subs.len(), "Subscriber registered");

        Subscriber { token, rx }
    }

    /// Remove a subscriber by token
    ///
    /// Idempotent, and safe to call concurrently with an in-flight
    /// broadcast — the broadcast may or may not still reach the
    /// subscriber being removed.
    pub async fn unsubscribe(&self, token: u64) {
        let mut subs = self.subscribers.write().await;
        if subs.remove(&token).is_some() {
            tracing::debug!(token, total = subs.len(), "Subscriber removed");
        }
    }

    /// Number of currently registered subscribers
    pub async fn subscriber_count(&self) -> usize {
        self.subscribers.read().await.len()
    }

    pub(crate) async fn has_subscribers(&self) -> bool {
        !self.subscribers.read().await.is_empty()
    }

    /// Deliver an update to every subscriber, dropping any whose channel
    /// is full or closed
    pub(crate) async fn broadcast(&self, update: LogUpdate) {
        let mut subs = self.subscribers.write().await;
        subs.retain(|token, tx| match tx.try_send(update.clone()) {
            Ok(()) => true,
            Err(TrySendError::Full(_)) => {
                tracing::warn!(token, "Dropping subscriber: delivery buffer full");
                false
            }
            Err(TrySendError::Closed(_)) => {
                tracing::debug!(token, "Dropping subscriber: channel closed");
                false
            }
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn update(count: usize) -> LogUpdate {
        LogUpdate {
            success: true,
            count,
            logs: Vec::new(),
        }
    }

    #[tokio::test]
    async fn test_subscribe_and_receive() {
        let hub = SubscriberHub::new(8);
        let mut sub = hub.subscribe().await;
        assert_eq!(hub.subscriber_count().await, 1);

        hub.broadcast(update(3)).await;
        let received = sub.recv().await.unwrap();
        assert!(received.success);
        assert_eq!(received.count, 3);
    }

    #[tokio::test]
    async fn test_broadcast_reaches_all_subscribers() {
        let hub = SubscriberHub::new(8);
        let mut a = hub.subscribe().await;
        let mut b = hub.subscribe().await;
        assert_ne!(a.token(), b.token());

        hub.broadcast(update(1)).await;
        assert_eq!(a.recv().await.unwrap().count, 1);
        assert_eq!(b.recv().await.unwrap().count, 1);
    }

    #[tokio::test]
    async fn test_unsubscribe_is_idempotent() {
        let hub = SubscriberHub::new(8);
        let sub = hub.subscribe().await;
        let token = sub.token();

        hub.unsubscribe(token).await;
        hub.unsubscribe(token).await;
        assert_eq!(hub.subscriber_count().await, 0);
    }

    #[tokio::test]
    async fn test_unsubscribed_handle_sees_end_of_stream() {
        let hub = SubscriberHub::new(8);
        let mut sub = hub.subscribe().await;
        hub.unsubscribe(sub.token()).await;

        hub.broadcast(update(1)).await;
        assert!(sub.recv().await.is_none());
    }

    #[tokio::test]
    async fn test_dropped_receiver_pruned_on_broadcast() {
        let hub = SubscriberHub::new(8);
        let sub = hub.subscribe().await;
        drop(sub);

        hub.broadcast(update(1)).await;
        assert_eq!(hub.subscriber_count().await, 0);
    }

    #[tokio::test]
    async fn test_slow_subscriber_dropped_when_buffer_full() {
        let hub = SubscriberHub::new(1);
        let mut slow = hub.subscribe().await;
        let mut live = hub.subscribe().await;

        // First broadcast fills both 1-slot buffers. The live subscriber
        // drains; the slow one does not and is dropped by the second
        // broadcast when its buffer is found full.
        hub.broadcast(update(1)).await;
        assert_eq!(live.recv().await.unwrap().count, 1);

        hub.broadcast(update(2)).await;
        assert_eq!(hub.subscriber_count().await, 1);

        assert_eq!(slow.recv().await.unwrap().count, 1);
        assert!(slow.recv().await.is_none());
        assert_eq!(live.recv().await.unwrap().count, 2);
    }

    #[tokio::test]
    async fn test_into_stream_yields_updates() {
        use tokio_stream::StreamExt;

        let hub = SubscriberHub::new(8);
        let sub = hub.subscribe().await;
        hub.broadcast(update(5)).await;

        let mut stream = sub.into_stream();
        let received = stream.next().await.unwrap();
        assert_eq!(received.count, 5);
    }
}
