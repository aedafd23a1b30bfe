//! The broker core: item stores behind the queue registry, and the topic
//! registry with its publisher. Transports call into [`Broker`].

pub mod endpoint;
pub mod engine;
pub mod message;
pub mod publisher;
pub mod queues;
pub mod registry;
pub mod store;
pub mod topic;

pub use endpoint::{Endpoint, SubscriberId, SubscriptionId};
pub use engine::{Broker, BrokerOptions, BrokerStats};
pub use message::Message;
pub use queues::{End, QueueKind, QueueRegistry};
pub use registry::TopicRegistry;

#[cfg(test)]
mod tests;
