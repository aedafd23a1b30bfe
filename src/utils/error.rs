//! The `error` module defines the error types surfaced by the broker core.
//!
//! Dequeue-on-empty is deliberately absent: an empty store is an ordinary
//! `Ok(None)` result. Delivery failures have their own type because they
//! never leave the broadcaster.

use thiserror::Error;

use crate::broker::queues::{End, QueueKind};

/// Errors returned to callers of the broker boundary operations.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum BrokerError {
    #[error("unknown queue type '{0}', expected one of: list, queue, deque")]
    UnknownType(String),

    #[error("{kind} does not support the {end} end for this operation")]
    InvalidEnd { kind: QueueKind, end: End },

    #[error("{0} does not support offset reads")]
    OffsetUnsupported(QueueKind),

    #[error("topic name must not be empty")]
    InvalidTopic,

    #[error("payload of {size} bytes exceeds the limit of {limit} bytes")]
    PayloadTooLarge { size: usize, limit: usize },

    #[error("fill of {count} items exceeds the limit of {limit}")]
    FillTooLarge { count: usize, limit: usize },

    #[error("out of memory while inserting into {0}")]
    ResourceExhausted(QueueKind),

    #[error("out of memory while filling {kind}; {inserted} items were inserted")]
    FillInterrupted { kind: QueueKind, inserted: usize },
}

impl BrokerError {
    /// True when the caller is at fault and a retry with the same input
    /// cannot succeed.
    pub fn is_client_error(&self) -> bool {
        !matches!(
            self,
            BrokerError::ResourceExhausted(_) | BrokerError::FillInterrupted { .. }
        )
    }
}

/// Failure to hand a payload to one subscriber endpoint.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum DeliveryError {
    #[error("subscriber connection is closed")]
    Closed,

    #[error("delivery did not complete within {0} ms")]
    TimedOut(u64),

    #[error("failed to encode frame: {0}")]
    Encode(String),
}
