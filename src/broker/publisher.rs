//! Publisher
//!
//! Fans a message out to a snapshot of a topic's subscribers. Deliveries run
//! concurrently, each bounded by `delivery_timeout`; an endpoint that fails
//! or times out is unsubscribed and the rest of the fan-out carries on.
//! Delivery is at most once and topics do not buffer.

use std::sync::Arc;
use std::time::Duration;

use futures::future::join_all;
use tracing::{debug, warn};

use crate::broker::message::Message;
use crate::broker::registry::TopicRegistry;
use crate::broker::topic::Subscriber;
use crate::utils::error::DeliveryError;

/// Outcome of one publish.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PublishReport {
    pub delivered: usize,
    pub dropped: usize,
}

pub struct Publisher {
    topic_registry: Arc<TopicRegistry>,
    delivery_timeout: Duration,
}

impl Publisher {
    pub fn new(topic_registry: Arc<TopicRegistry>, delivery_timeout: Duration) -> Self {
        Self {
            topic_registry,
            delivery_timeout,
        }
    }

    pub async fn publish(&self, message: Arc<Message>) -> PublishReport {
        let topic = message.topic.as_str();
        let subscribers = self.topic_registry.subscribers_of(topic);
        if subscribers.is_empty() {
            debug!(target: "publisher", topic = %topic, "no subscribers, message dropped");
            return PublishReport::default();
        }

        let deliveries = subscribers.into_iter().map(|subscriber| {
            let message = Arc::clone(&message);
            async move {
                let result = self.deliver(&subscriber, message).await;
                (subscriber, result)
            }
        });

        let mut report = PublishReport::default();
        for (subscriber, result) in join_all(deliveries).await {
            match result {
                Ok(()) => report.delivered += 1,
                Err(e) => {
                    warn!(
                        target: "publisher",
                        topic = %topic,
                        subscriber = %subscriber.id,
                        error = %e,
                        "delivery failed, removing subscriber"
                    );
                    self.topic_registry.remove_subscriber(topic, &subscriber);
                    report.dropped += 1;
                }
            }
        }

        debug!(
            target: "publisher",
            topic = %topic,
            delivered = report.delivered,
            dropped = report.dropped,
            "published"
        );
        report
    }

    async fn deliver(
        &self,
        subscriber: &Subscriber,
        message: Arc<Message>,
    ) -> Result<(), DeliveryError> {
        let endpoint = subscriber.endpoint().ok_or(DeliveryError::Closed)?;
        match tokio::time::timeout(self.delivery_timeout, endpoint.send(message)).await {
            Ok(result) => result,
            Err(_) => Err(DeliveryError::TimedOut(
                self.delivery_timeout.as_millis() as u64,
            )),
        }
    }
}
