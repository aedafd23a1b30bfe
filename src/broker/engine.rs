//! Broker engine
//!
//! [`Broker`] is the single object the transport layer talks to. It owns the
//! three item stores and the topic registry, and exposes the enqueue,
//! dequeue, subscribe, unsubscribe and publish operations.
//!
//! Concurrency and usage notes:
//! - `Broker` is `Send + Sync` and is meant to be shared as `Arc<Broker>`;
//!   it has no outer lock. Each store and each topic is guarded on its own.
//! - Only `publish` and `dequeue_wait` are async. Neither holds a store or
//!   registry lock across an await.

use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;

use bytes::Bytes;
use rand::Rng;
use serde::Serialize;
use tracing::{debug, info, warn};

use crate::broker::endpoint::{Endpoint, SubscriptionId};
use crate::broker::message::Message;
use crate::broker::publisher::{PublishReport, Publisher};
use crate::broker::queues::{End, QueueRegistry, QueueSizes};
use crate::broker::registry::TopicRegistry;
use crate::config::BrokerSettings;
use crate::utils::error::BrokerError;

/// Runtime knobs for the broker, usually built from [`BrokerSettings`].
#[derive(Debug, Clone)]
pub struct BrokerOptions {
    pub delivery_timeout: Duration,
    pub max_payload_bytes: usize,
    pub max_wait: Duration,
    pub max_fill: usize,
}

impl Default for BrokerOptions {
    fn default() -> Self {
        Self::from(&BrokerSettings::default())
    }
}

impl From<&BrokerSettings> for BrokerOptions {
    fn from(settings: &BrokerSettings) -> Self {
        Self {
            delivery_timeout: Duration::from_millis(settings.delivery_timeout_ms),
            max_payload_bytes: settings.max_payload_bytes,
            max_wait: Duration::from_millis(settings.max_wait_ms),
            max_fill: settings.max_fill,
        }
    }
}

/// Items inserted by `fill` between yields to the runtime.
const FILL_BATCH: usize = 1024;

#[derive(Debug, Default)]
struct Counters {
    published: AtomicU64,
    delivered: AtomicU64,
    dropped: AtomicU64,
}

/// Counts exposed on the health endpoint.
#[derive(Debug, Clone, Serialize)]
pub struct BrokerStats {
    pub queues: QueueSizes,
    pub topics: usize,
    pub subscriptions: usize,
    pub published: u64,
    pub delivered: u64,
    pub dropped: u64,
}

pub struct Broker {
    queues: QueueRegistry<Bytes>,
    topics: Arc<TopicRegistry>,
    publisher: Publisher,
    options: BrokerOptions,
    counters: Counters,
}

impl Broker {
    pub fn new(options: BrokerOptions) -> Self {
        let topics = Arc::new(TopicRegistry::new());
        Self {
            queues: QueueRegistry::new(),
            publisher: Publisher::new(Arc::clone(&topics), options.delivery_timeout),
            topics,
            options,
            counters: Counters::default(),
        }
    }

    pub fn options(&self) -> &BrokerOptions {
        &self.options
    }

    pub fn queues(&self) -> &QueueRegistry<Bytes> {
        &self.queues
    }

    pub fn topics(&self) -> &TopicRegistry {
        &self.topics
    }

    /// Inserts `payload` into the store named by `queue_type`.
    pub fn enqueue(
        &self,
        queue_type: &str,
        end: Option<End>,
        payload: Bytes,
    ) -> Result<(), BrokerError> {
        let store = self.queues.resolve(queue_type)?;
        self.check_payload(&payload)?;
        store.insert(end, payload)?;
        debug!(kind = %store.kind(), "enqueued");
        Ok(())
    }

    /// Removes one item without waiting. `Ok(None)` means the store was
    /// empty.
    pub fn dequeue(
        &self,
        queue_type: &str,
        end: Option<End>,
        offset: usize,
    ) -> Result<Option<Bytes>, BrokerError> {
        self.queues.resolve(queue_type)?.remove_at(end, offset)
    }

    /// Long-poll variant of [`Broker::dequeue`]. `wait` is capped at the
    /// configured maximum.
    pub async fn dequeue_wait(
        &self,
        queue_type: &str,
        end: Option<End>,
        offset: usize,
        wait: Duration,
    ) -> Result<Option<Bytes>, BrokerError> {
        let store = self.queues.resolve(queue_type)?;
        store
            .remove_wait(end, offset, wait.min(self.options.max_wait))
            .await
    }

    /// Inserts `count` synthetic items, random integers in `0..=1024`, at
    /// the store's default insert end. Meant for load testing.
    ///
    /// Yields to the runtime between batches. If the store stops growing
    /// part way, the error carries how many items went in.
    pub async fn fill(&self, queue_type: &str, count: usize) -> Result<usize, BrokerError> {
        let store = self.queues.resolve(queue_type)?;
        if count > self.options.max_fill {
            return Err(BrokerError::FillTooLarge {
                count,
                limit: self.options.max_fill,
            });
        }

        let mut inserted = 0;
        while inserted < count {
            let batch = (count - inserted).min(FILL_BATCH);
            {
                let mut rng = rand::thread_rng();
                for _ in 0..batch {
                    let value: u16 = rng.gen_range(0..=1024);
                    if let Err(e) = store.insert(None, Bytes::from(value.to_string())) {
                        warn!(kind = %store.kind(), inserted, "fill stopped: {e}");
                        return Err(BrokerError::FillInterrupted {
                            kind: store.kind(),
                            inserted,
                        });
                    }
                    inserted += 1;
                }
            }
            tokio::task::yield_now().await;
        }
        info!(kind = %store.kind(), count, "filled store with synthetic items");
        Ok(inserted)
    }

    pub fn subscribe(
        &self,
        topic: &str,
        endpoint: &Arc<dyn Endpoint>,
    ) -> Result<SubscriptionId, BrokerError> {
        if topic.is_empty() {
            return Err(BrokerError::InvalidTopic);
        }
        Ok(self.topics.subscribe(topic, endpoint))
    }

    pub fn unsubscribe(&self, subscription: SubscriptionId) -> bool {
        self.topics.unsubscribe(subscription)
    }

    /// Removes every subscription of a closed connection.
    pub fn disconnect(&self, subscriber: &str) -> usize {
        self.topics.unsubscribe_all(subscriber)
    }

    /// Delivers `payload` to every current subscriber of `topic` and returns
    /// how many deliveries succeeded.
    pub async fn publish(&self, topic: &str, payload: Bytes) -> Result<usize, BrokerError> {
        if topic.is_empty() {
            return Err(BrokerError::InvalidTopic);
        }
        self.check_payload(&payload)?;

        let message = Arc::new(Message::new(topic, payload));
        let PublishReport { delivered, dropped } = self.publisher.publish(message).await;

        self.counters.published.fetch_add(1, Ordering::Relaxed);
        self.counters
            .delivered
            .fetch_add(delivered as u64, Ordering::Relaxed);
        self.counters
            .dropped
            .fetch_add(dropped as u64, Ordering::Relaxed);
        Ok(delivered)
    }

    pub fn stats(&self) -> BrokerStats {
        BrokerStats {
            queues: self.queues.sizes(),
            topics: self.topics.topic_count(),
            subscriptions: self.topics.subscription_count(),
            published: self.counters.published.load(Ordering::Relaxed),
            delivered: self.counters.delivered.load(Ordering::Relaxed),
            dropped: self.counters.dropped.load(Ordering::Relaxed),
        }
    }

    fn check_payload(&self, payload: &Bytes) -> Result<(), BrokerError> {
        if payload.len() > self.options.max_payload_bytes {
            return Err(BrokerError::PayloadTooLarge {
                size: payload.len(),
                limit: self.options.max_payload_bytes,
            });
        }
        Ok(())
    }
}

impl Default for Broker {
    fn default() -> Self {
        Self::new(BrokerOptions::default())
    }
}

