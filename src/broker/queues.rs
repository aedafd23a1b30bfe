//! Queue Registry
//!
//! The broker owns exactly three item stores, one per [`QueueKind`]. The
//! registry only routes a queue-type name to its store; ordering rules live
//! on [`QueueKind`] and the storage itself in [`ItemStore`].

use std::fmt;
use std::str::FromStr;

use bytes::Bytes;
use serde::{Deserialize, Serialize};

use crate::broker::store::ItemStore;
use crate::utils::error::BrokerError;

/// The three queueing disciplines the broker offers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum QueueKind {
    /// Insert at tail, remove from tail (LIFO).
    List,
    /// Insert at tail, remove from head (FIFO).
    Queue,
    /// Caller picks the end for every insert and remove.
    Deque,
}

/// One end of an item store.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum End {
    Head,
    Tail,
}

impl QueueKind {
    pub const ALL: [QueueKind; 3] = [QueueKind::List, QueueKind::Queue, QueueKind::Deque];

    pub fn as_str(&self) -> &'static str {
        match self {
            QueueKind::List => "list",
            QueueKind::Queue => "queue",
            QueueKind::Deque => "deque",
        }
    }

    /// Resolves the end an insert goes to. `list` and `queue` only accept
    /// the tail; a deque defaults to the tail.
    pub fn insert_end(&self, requested: Option<End>) -> Result<End, BrokerError> {
        match (self, requested) {
            (QueueKind::Deque, end) => Ok(end.unwrap_or(End::Tail)),
            (_, None | Some(End::Tail)) => Ok(End::Tail),
            (kind, Some(end)) => Err(BrokerError::InvalidEnd { kind: *kind, end }),
        }
    }

    /// Resolves the end a remove takes from. A deque defaults to the head so
    /// that unqualified use behaves like a FIFO queue.
    pub fn remove_end(&self, requested: Option<End>) -> Result<End, BrokerError> {
        match (self, requested) {
            (QueueKind::Deque, end) => Ok(end.unwrap_or(End::Head)),
            (QueueKind::List, None | Some(End::Tail)) => Ok(End::Tail),
            (QueueKind::Queue, None | Some(End::Head)) => Ok(End::Head),
            (kind, Some(end)) => Err(BrokerError::InvalidEnd { kind: *kind, end }),
        }
    }

    /// Whether removal at an offset from the removal end is allowed.
    pub fn supports_offset(&self) -> bool {
        !matches!(self, QueueKind::Queue)
    }
}

impl fmt::Display for QueueKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Case-sensitive: only `list`, `queue` and `deque` are accepted.
impl FromStr for QueueKind {
    type Err = BrokerError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "list" => Ok(QueueKind::List),
            "queue" => Ok(QueueKind::Queue),
            "deque" => Ok(QueueKind::Deque),
            other => Err(BrokerError::UnknownType(other.to_string())),
        }
    }
}

impl fmt::Display for End {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            End::Head => f.write_str("head"),
            End::Tail => f.write_str("tail"),
        }
    }
}

/// Instantaneous item counts, one per store.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct QueueSizes {
    pub list: usize,
    pub queue: usize,
    pub deque: usize,
}

/// Fixed mapping from [`QueueKind`] to its store, built once and shared for
/// the lifetime of the broker.
#[derive(Debug)]
pub struct QueueRegistry<T = Bytes> {
    list: ItemStore<T>,
    queue: ItemStore<T>,
    deque: ItemStore<T>,
}

impl<T> QueueRegistry<T> {
    pub fn new() -> Self {
        Self {
            list: ItemStore::new(QueueKind::List),
            queue: ItemStore::new(QueueKind::Queue),
            deque: ItemStore::new(QueueKind::Deque),
        }
    }

    pub fn store(&self, kind: QueueKind) -> &ItemStore<T> {
        match kind {
            QueueKind::List => &self.list,
            QueueKind::Queue => &self.queue,
            QueueKind::Deque => &self.deque,
        }
    }

    /// Routes a queue-type name to its store.
    pub fn resolve(&self, type_name: &str) -> Result<&ItemStore<T>, BrokerError> {
        let kind: QueueKind = type_name.parse()?;
        Ok(self.store(kind))
    }

    pub fn sizes(&self) -> QueueSizes {
        QueueSizes {
            list: self.list.len(),
            queue: self.queue.len(),
            deque: self.deque.len(),
        }
    }
}

impl<T> Default for QueueRegistry<T> {
    fn default() -> Self {
        Self::new()
    }
}
