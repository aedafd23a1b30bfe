use std::sync::Arc;

use dashmap::DashMap;
use dashmap::mapref::entry::Entry;
use tracing::debug;

use crate::broker::endpoint::{Endpoint, SubscriberId, SubscriptionId};
use crate::broker::topic::{Subscriber, Topic, TopicName};

#[derive(Debug, Clone)]
struct SubscriptionKey {
    topic: TopicName,
    subscriber: SubscriberId,
}

/// [`TopicRegistry`] maps topic names to their subscriber sets.
///
/// Topics are created on first subscribe and pruned when their last
/// subscriber leaves. Each topic has its own subscriber map, so work on one
/// topic never waits on another beyond a short shard lock here.
#[derive(Debug, Default)]
pub struct TopicRegistry {
    topics: DashMap<TopicName, Arc<Topic>>,
    subscriptions: DashMap<SubscriptionId, SubscriptionKey>,
}

impl TopicRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers `endpoint` under `topic`, creating the topic if needed.
    /// Subscribing the same endpoint twice returns the same handle.
    pub fn subscribe(&self, topic: &str, endpoint: &Arc<dyn Endpoint>) -> SubscriptionId {
        // The topic entry guard is held for the whole update, so the index and
        // the subscriber map change together and a prune cannot interleave.
        let entry = self.topics.entry(topic.to_string()).or_insert_with(|| {
            debug!(topic = %topic, "creating topic");
            Arc::new(Topic::new(topic))
        });
        let previous = entry.subscription_of(endpoint.id());
        let subscription = entry.subscribe(endpoint);
        if let Some(stale) = previous.filter(|p| *p != subscription) {
            self.subscriptions.remove(&stale);
        }
        self.subscriptions.insert(
            subscription,
            SubscriptionKey {
                topic: topic.to_string(),
                subscriber: endpoint.id().to_string(),
            },
        );
        drop(entry);

        debug!(topic = %topic, subscriber = %endpoint.id(), %subscription, "subscribed");
        subscription
    }

    /// Removes the subscription behind `handle`. Returns false if it was
    /// already gone.
    pub fn unsubscribe(&self, handle: SubscriptionId) -> bool {
        let Some(key) = self.subscriptions.get(&handle).map(|k| k.value().clone()) else {
            return false;
        };
        self.detach(&key.topic, &key.subscriber, handle)
    }

    /// Removes `subscriber` from one topic as part of a failed delivery.
    pub fn remove_subscriber(&self, topic: &str, subscriber: &Subscriber) -> bool {
        self.detach(topic, &subscriber.id, subscriber.subscription)
    }

    /// Drops every subscription held by `subscriber`. Used when a
    /// connection closes.
    pub fn unsubscribe_all(&self, subscriber: &str) -> usize {
        let handles: Vec<SubscriptionId> = self
            .subscriptions
            .iter()
            .filter(|entry| entry.value().subscriber == subscriber)
            .map(|entry| *entry.key())
            .collect();

        handles
            .into_iter()
            .filter(|handle| self.unsubscribe(*handle))
            .count()
    }

    /// Snapshot of the subscribers of `topic`; empty if the topic does not
    /// exist. Safe to iterate while others subscribe or unsubscribe.
    pub fn subscribers_of(&self, topic: &str) -> Vec<Subscriber> {
        self.get_topic(topic)
            .map(|t| t.snapshot())
            .unwrap_or_default()
    }

    pub fn get_topic(&self, name: &str) -> Option<Arc<Topic>> {
        self.topics.get(name).map(|entry| Arc::clone(&*entry))
    }

    pub fn list_topics(&self) -> Vec<TopicName> {
        self.topics.iter().map(|entry| entry.key().clone()).collect()
    }

    pub fn topic_count(&self) -> usize {
        self.topics.len()
    }

    pub fn subscription_count(&self) -> usize {
        self.subscriptions.len()
    }

    // Takes the topic entry lock before touching the index; `subscribe`
    // locks in the same order.
    fn detach(&self, topic: &str, subscriber: &str, handle: SubscriptionId) -> bool {
        let Entry::Occupied(found) = self.topics.entry(topic.to_string()) else {
            return false;
        };
        if !found.get().unsubscribe(subscriber, handle) {
            return false;
        }
        self.subscriptions.remove(&handle);
        debug!(topic = %topic, subscriber = %subscriber, "unsubscribed");

        if found.get().is_empty() {
            found.remove();
            debug!(topic = %topic, "pruned empty topic");
        }
        true
    }
}
