use std::fmt;
use std::sync::{Arc, Weak};

use dashmap::DashMap;
use dashmap::mapref::entry::Entry;

use crate::broker::endpoint::{Endpoint, SubscriberId, SubscriptionId};

pub type TopicName = String;

/// One subscription as seen by the broker: the handle plus a non-owning
/// reference to the endpoint. The transport keeps the endpoint alive.
#[derive(Clone)]
pub struct Subscriber {
    pub id: SubscriberId,
    pub subscription: SubscriptionId,
    endpoint: Weak<dyn Endpoint>,
}

impl Subscriber {
    fn new(endpoint: &Arc<dyn Endpoint>) -> Self {
        Self {
            id: endpoint.id().to_string(),
            subscription: SubscriptionId::new(),
            endpoint: Arc::downgrade(endpoint),
        }
    }

    /// `None` once the owning connection has gone away.
    pub fn endpoint(&self) -> Option<Arc<dyn Endpoint>> {
        self.endpoint.upgrade()
    }

    pub fn is_alive(&self) -> bool {
        self.endpoint.strong_count() > 0
    }
}

impl fmt::Debug for Subscriber {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Subscriber")
            .field("id", &self.id)
            .field("subscription", &self.subscription)
            .field("alive", &self.is_alive())
            .finish()
    }
}

/// A named channel and its current subscribers, at most one entry per
/// endpoint.
#[derive(Debug)]
pub struct Topic {
    name: TopicName,
    subscribers: DashMap<SubscriberId, Subscriber>,
}

impl Topic {
    pub fn new(name: impl Into<TopicName>) -> Self {
        Self {
            name: name.into(),
            subscribers: DashMap::new(),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Adds `endpoint`, or returns its existing subscription if it is
    /// already subscribed and still alive.
    pub fn subscribe(&self, endpoint: &Arc<dyn Endpoint>) -> SubscriptionId {
        match self.subscribers.entry(endpoint.id().to_string()) {
            Entry::Occupied(mut existing) => {
                if !existing.get().is_alive() {
                    existing.insert(Subscriber::new(endpoint));
                }
                existing.get().subscription
            }
            Entry::Vacant(slot) => slot.insert(Subscriber::new(endpoint)).subscription,
        }
    }

    /// Current handle held by `subscriber`, if any.
    pub fn subscription_of(&self, subscriber: &str) -> Option<SubscriptionId> {
        self.subscribers.get(subscriber).map(|s| s.subscription)
    }

    /// Removes the subscriber only if it still holds `subscription`.
    pub fn unsubscribe(&self, subscriber: &str, subscription: SubscriptionId) -> bool {
        self.subscribers
            .remove_if(subscriber, |_, s| s.subscription == subscription)
            .is_some()
    }

    /// Point-in-time copy of the subscriber set.
    pub fn snapshot(&self) -> Vec<Subscriber> {
        self.subscribers.iter().map(|s| s.value().clone()).collect()
    }

    pub fn len(&self) -> usize {
        self.subscribers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.subscribers.is_empty()
    }
}
