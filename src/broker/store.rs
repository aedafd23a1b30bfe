//! Item Store
//!
//! An ordered sequence guarded by its own mutex. Every operation holds the
//! lock for exactly one `VecDeque` mutation, so a concurrent reader sees an
//! item either fully inserted or not at all, and a single item can only be
//! removed once. Nothing here awaits while the lock is held.

use std::collections::VecDeque;
use std::sync::{Mutex, MutexGuard, PoisonError};
use std::time::Duration;

use tokio::sync::Notify;
use tokio::time::Instant;

use crate::broker::queues::{End, QueueKind};
use crate::utils::error::BrokerError;

#[derive(Debug)]
pub struct ItemStore<T> {
    kind: QueueKind,
    items: Mutex<VecDeque<T>>,
    arrivals: Notify,
}

impl<T> ItemStore<T> {
    pub fn new(kind: QueueKind) -> Self {
        Self {
            kind,
            items: Mutex::new(VecDeque::new()),
            arrivals: Notify::new(),
        }
    }

    pub fn kind(&self) -> QueueKind {
        self.kind
    }

    /// Adds `item` at the end allowed by this store's discipline.
    ///
    /// Fails with `ResourceExhausted` if the sequence cannot grow, in which
    /// case the store is unchanged.
    pub fn insert(&self, end: Option<End>, item: T) -> Result<(), BrokerError> {
        let end = self.kind.insert_end(end)?;
        {
            let mut items = self.lock();
            items
                .try_reserve(1)
                .map_err(|_| BrokerError::ResourceExhausted(self.kind))?;
            match end {
                End::Head => items.push_front(item),
                End::Tail => items.push_back(item),
            }
        }
        self.arrivals.notify_waiters();
        Ok(())
    }

    /// Removes the item at the discipline's removal end. `Ok(None)` means
    /// the store was empty at call time.
    pub fn remove(&self, end: Option<End>) -> Result<Option<T>, BrokerError> {
        let end = self.kind.remove_end(end)?;
        let mut items = self.lock();
        Ok(match end {
            End::Head => items.pop_front(),
            End::Tail => items.pop_back(),
        })
    }

    /// Removes the item `offset` positions in from the removal end.
    ///
    /// `offset == 0` is the same as [`ItemStore::remove`]. An offset past
    /// the current length yields `Ok(None)`.
    pub fn remove_at(&self, end: Option<End>, offset: usize) -> Result<Option<T>, BrokerError> {
        if offset == 0 {
            return self.remove(end);
        }
        if !self.kind.supports_offset() {
            return Err(BrokerError::OffsetUnsupported(self.kind));
        }
        let end = self.kind.remove_end(end)?;
        let mut items = self.lock();
        let len = items.len();
        if offset >= len {
            return Ok(None);
        }
        let index = match end {
            End::Head => offset,
            End::Tail => len - 1 - offset,
        };
        Ok(items.remove(index))
    }

    /// Like [`ItemStore::remove_at`] but parks for up to `wait` until an
    /// item shows up.
    ///
    /// Each attempt is a single atomic removal, so dropping the returned
    /// future never leaves the store half-modified.
    pub async fn remove_wait(
        &self,
        end: Option<End>,
        offset: usize,
        wait: Duration,
    ) -> Result<Option<T>, BrokerError> {
        let deadline = Instant::now() + wait;
        loop {
            let notified = self.arrivals.notified();
            tokio::pin!(notified);
            // Register before checking so an insert between the check and
            // the await still wakes us.
            notified.as_mut().enable();

            if let Some(item) = self.remove_at(end, offset)? {
                return Ok(Some(item));
            }
            if tokio::time::timeout_at(deadline, notified).await.is_err() {
                return Ok(None);
            }
        }
    }

    /// Best-effort instantaneous count.
    pub fn len(&self) -> usize {
        self.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    // Every critical section is a single VecDeque call, so a poisoned lock
    // still guards a valid sequence.
    fn lock(&self) -> MutexGuard<'_, VecDeque<T>> {
        self.items.lock().unwrap_or_else(PoisonError::into_inner)
    }
}
