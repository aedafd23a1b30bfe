//! Subscriber endpoints.
//!
//! The broker never sees a concrete connection type. Anything that can take
//! a published [`Message`] and report success or failure can subscribe,
//! which keeps the topic registry and publisher usable with fake endpoints.

use std::fmt;
use std::sync::Arc;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::broker::message::Message;
use crate::utils::error::DeliveryError;

/// Identity of one live connection, stable for its lifetime.
pub type SubscriberId = String;

/// A live delivery target, owned by the transport layer.
#[async_trait]
pub trait Endpoint: Send + Sync {
    fn id(&self) -> &str;

    /// Hands `message` to the connection. Implementations may wait for
    /// buffer space; the publisher bounds that wait.
    async fn send(&self, message: Arc<Message>) -> Result<(), DeliveryError>;
}

/// Handle returned by `subscribe`, used to unsubscribe later.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SubscriptionId(Uuid);

impl SubscriptionId {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for SubscriptionId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for SubscriptionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}
