// Copyright (c) Microsoft Corporation.
// Licensed under the MIT License.

//! Per-key mutual exclusion for cache population.

use std::{
    collections::HashMap,
    sync::{Arc, Weak},
};

use parking_lot::{ArcMutexGuard, Mutex, RawMutex};

/// A table of locks keyed by cache key.
///
/// Each key gets its own lock on first use. The lock is removed from the table
/// once its last holder or waiter releases it, so the table only grows with the
/// number of keys currently being populated.
///
/// # Examples
///
/// ```
/// use memento::KeyLocks;
///
/// let locks = KeyLocks::new();
/// {
///     let _guard = locks.lock("a");
///     let _other = locks.lock("b"); // different keys do not contend
///     assert_eq!(locks.len(), 2);
/// }
/// assert!(locks.is_empty());
/// ```
#[derive(Debug, Default)]
pub struct KeyLocks {
    slots: Mutex<HashMap<String, Weak<Mutex<()>>>>,
}

impl KeyLocks {
    /// Creates an empty lock table.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Blocks until the lock for `key` is held by the caller.
    pub fn lock(&self, key: &str) -> KeyLockGuard<'_> {
        let slot = self.slot(key);
        KeyLockGuard {
            guard: Some(slot.lock_arc()),
            locks: self,
            key: key.to_owned(),
        }
    }

    /// Returns the number of keys that are locked or awaited.
    #[must_use]
    pub fn len(&self) -> usize {
        self.slots.lock().len()
    }

    /// Returns `true` if no key is locked or awaited.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.slots.lock().is_empty()
    }

    fn slot(&self, key: &str) -> Arc<Mutex<()>> {
        let mut slots = self.slots.lock();
        if let Some(slot) = slots.get(key).and_then(Weak::upgrade) {
            return slot;
        }

        let slot = Arc::new(Mutex::new(()));
        slots.insert(key.to_owned(), Arc::downgrade(&slot));
        slot
    }

    fn release(&self, key: &str) {
        let mut slots = self.slots.lock();
        if slots.get(key).is_some_and(|slot| slot.strong_count() == 0) {
            slots.remove(key);
        }
    }
}

/// Holds the lock for one key. Dropping the guard releases it.
pub struct KeyLockGuard<'a> {
    guard: Option<ArcMutexGuard<RawMutex, ()>>,
    locks: &'a KeyLocks,
    key: String,
}

impl std::fmt::Debug for KeyLockGuard<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("KeyLockGuard")
            .field("held", &self.guard.is_some())
            .field("locks", &self.locks)
            .field("key", &self.key)
            .finish()
    }
}

impl KeyLockGuard<'_> {
    /// Returns the key this guard holds.
    #[must_use]
    pub fn key(&self) -> &str {
        &self.key
    }
}

impl Drop for KeyLockGuard<'_> {
    fn drop(&mut self) {
        // The slot's strong count only reaches zero after the guard is gone.
        drop(self.guard.take());
        self.locks.release(&self.key);
    }
}
