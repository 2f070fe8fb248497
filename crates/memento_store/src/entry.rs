// Copyright (c) Microsoft Corporation.
// Licensed under the MIT License.

use std::{ops::Deref, time::Instant};

use crate::{Expiry, ItemPolicy};

/// A stored value with its insertion time and expiry.
///
/// Backends keep one `CacheEntry` per region-qualified key and consult
/// [`is_expired`](Self::is_expired) on every read.
///
/// # Examples
///
/// ```
/// use memento_store::{CacheEntry, ItemPolicy};
/// use std::time::{Duration, Instant};
///
/// let now = Instant::now();
/// let entry = CacheEntry::new("value", ItemPolicy::absolute_secs(60), now);
///
/// assert_eq!(*entry.value(), "value");
/// assert_eq!(entry.cached_at(), now);
/// assert!(entry.is_expired(now + Duration::from_secs(60)));
/// ```
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CacheEntry<V> {
    value: V,
    cached_at: Instant,
    expiry: Expiry,
}

impl<V> CacheEntry<V> {
    /// Creates an entry added at `now` under `policy`.
    pub fn new(value: V, policy: ItemPolicy, now: Instant) -> Self {
        Self {
            value,
            cached_at: now,
            expiry: policy.expiry(now),
        }
    }

    /// Returns a reference to the cached value.
    #[must_use]
    pub fn value(&self) -> &V {
        &self.value
    }

    /// Consumes the entry and returns the inner value.
    #[must_use]
    pub fn into_value(self) -> V {
        self.value
    }

    /// Returns the time at which the entry was added.
    #[must_use]
    pub fn cached_at(&self) -> Instant {
        self.cached_at
    }

    /// Returns the entry's expiry state.
    #[must_use]
    pub fn expiry(&self) -> &Expiry {
        &self.expiry
    }

    /// Returns `true` once the entry's deadline has been reached.
    #[must_use]
    pub fn is_expired(&self, now: Instant) -> bool {
        self.expiry.is_expired(now)
    }

    /// Records a successful read at `now`, re-arming a sliding deadline.
    pub fn touch(&mut self, now: Instant) {
        self.expiry.touch(now);
    }
}

impl<V> Deref for CacheEntry<V> {
    type Target = V;

    fn deref(&self) -> &Self::Target {
        &self.value
    }
}
