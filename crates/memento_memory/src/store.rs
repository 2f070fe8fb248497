// Copyright (c) Microsoft Corporation.
// Licensed under the MIT License.

//! In-memory store implementation using dashmap.

use std::{fmt::Debug, sync::Arc, time::Instant};

use dashmap::{DashMap, mapref::entry::Entry};
use memento_store::{CacheEntry, CacheStore, ItemPolicy, Result, region::normalize_region};
use tick::Clock;

use crate::builder::InMemoryStoreBuilder;

type EntryMap<V> = DashMap<String, CacheEntry<V>>;

/// A concurrent in-memory store with regions and per-entry expiration.
///
/// Unregioned entries and each region live in separate maps. Lock order is
/// always region table first, then entry map.
///
/// Clones share the same underlying maps.
///
/// # Examples
///
/// ```
/// use memento_memory::InMemoryStore;
/// use memento_store::{CacheStore, ItemPolicy};
/// use tick::runtime::InactiveClock;
///
/// let (clock, _driver) = InactiveClock::default().activate();
/// let store = InMemoryStore::new(clock);
///
/// assert!(store.add("k", 1, ItemPolicy::NoExpiration, Some("R1")).unwrap());
/// assert!(store.add("k", 2, ItemPolicy::NoExpiration, Some("R2")).unwrap());
/// assert_eq!(store.get("k", Some("R1")).unwrap(), Some(1));
/// assert_eq!(store.region_count(), 2);
/// ```
pub struct InMemoryStore<V> {
    inner: Arc<Inner<V>>,
}

struct Inner<V> {
    clock: Clock,
    name: Option<String>,
    unregioned: EntryMap<V>,
    regions: DashMap<String, EntryMap<V>>,
}

impl<V> Debug for InMemoryStore<V> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("InMemoryStore")
            .field("name", &self.inner.name)
            .field("unregioned", &self.inner.unregioned.len())
            .field("regions", &self.inner.regions.len())
            .finish_non_exhaustive()
    }
}

impl<V> Clone for InMemoryStore<V> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}

impl<V> InMemoryStore<V>
where
    V: Clone + Send + Sync,
{
    /// Creates a store with default settings that reads time from `clock`.
    #[must_use]
    pub fn new(clock: Clock) -> Self {
        InMemoryStoreBuilder::new(clock).build()
    }

    /// Creates a builder for configuring a store.
    #[must_use]
    pub fn builder(clock: Clock) -> InMemoryStoreBuilder<V> {
        InMemoryStoreBuilder::new(clock)
    }

    pub(crate) fn from_builder(builder: InMemoryStoreBuilder<V>) -> Self {
        let unregioned = builder.initial_capacity.map_or_else(DashMap::new, DashMap::with_capacity);
        Self {
            inner: Arc::new(Inner {
                clock: builder.clock,
                name: builder.name,
                unregioned,
                regions: DashMap::new(),
            }),
        }
    }

    /// Returns the configured name, if any.
    #[must_use]
    pub fn name(&self) -> Option<&str> {
        self.inner.name.as_deref()
    }

    /// Returns the number of regions that currently hold a sub-map.
    #[must_use]
    pub fn region_count(&self) -> usize {
        self.inner.regions.len()
    }

    /// Removes every entry, regioned or not.
    pub fn clear(&self) {
        self.inner.unregioned.clear();
        self.inner.regions.clear();
    }

    /// Removes all expired entries and drops regions left empty.
    ///
    /// Returns the number of entries removed.
    pub fn purge_expired(&self) -> usize {
        let now = self.now();
        let mut purged = purge_map(&self.inner.unregioned, now);
        self.inner.regions.retain(|_, map| {
            purged += purge_map(map, now);
            !map.is_empty()
        });
        purged
    }

    fn now(&self) -> Instant {
        self.inner.clock.instant()
    }

    /// Runs `f` on the map for `region` if it exists.
    fn read<R>(&self, region: Option<&str>, f: impl FnOnce(&EntryMap<V>) -> R) -> Option<R> {
        match normalize_region(region) {
            None => Some(f(&self.inner.unregioned)),
            Some(region) => self.inner.regions.get(region).map(|map| f(map.value())),
        }
    }

    /// Runs `f` on the map for `region`, creating it when missing.
    fn write<R>(&self, region: Option<&str>, f: impl FnOnce(&EntryMap<V>) -> R) -> R {
        match normalize_region(region) {
            None => f(&self.inner.unregioned),
            Some(region) => {
                if let Some(map) = self.inner.regions.get(region) {
                    return f(map.value());
                }
                let map = self.inner.regions.entry(region.to_owned()).or_default();
                f(map.value())
            }
        }
    }
}

fn purge_map<V>(map: &EntryMap<V>, now: Instant) -> usize {
    let mut purged = 0;
    map.retain(|_, entry| {
        let keep = !entry.is_expired(now);
        if !keep {
            purged += 1;
        }
        keep
    });
    purged
}

fn add_to<V>(map: &EntryMap<V>, key: &str, value: V, policy: ItemPolicy, now: Instant) -> bool {
    match map.entry(key.to_owned()) {
        Entry::Occupied(mut occupied) => {
            if occupied.get().is_expired(now) {
                occupied.insert(CacheEntry::new(value, policy, now));
                true
            } else {
                false
            }
        }
        Entry::Vacant(vacant) => {
            vacant.insert(CacheEntry::new(value, policy, now));
            true
        }
    }
}

fn get_from<V: Clone>(map: &EntryMap<V>, key: &str, now: Instant) -> Option<V> {
    if let Some(mut guard) = map.get_mut(key) {
        let entry = guard.value_mut();
        if !entry.is_expired(now) {
            entry.touch(now);
            return Some(entry.value().clone());
        }
    } else {
        return None;
    }

    map.remove_if(key, |_, entry| entry.is_expired(now));
    None
}

fn count_live<V>(map: &EntryMap<V>, now: Instant) -> u64 {
    map.iter().filter(|entry| !entry.is_expired(now)).count() as u64
}

impl<V> CacheStore<V> for InMemoryStore<V>
where
    V: Clone + Send + Sync,
{
    fn add(&self, key: &str, value: V, policy: ItemPolicy, region: Option<&str>) -> Result<bool> {
        let now = self.now();
        Ok(self.write(region, |map| add_to(map, key, value, policy, now)))
    }

    fn get(&self, key: &str, region: Option<&str>) -> Result<Option<V>> {
        let now = self.now();
        Ok(self.read(region, |map| get_from(map, key, now)).flatten())
    }

    fn contains(&self, key: &str, region: Option<&str>) -> Result<bool> {
        let now = self.now();
        Ok(self
            .read(region, |map| map.get(key).is_some_and(|entry| !entry.is_expired(now)))
            .unwrap_or(false))
    }

    fn delete(&self, key: &str, region: Option<&str>) -> Result<()> {
        self.read(region, |map| {
            map.remove(key);
        });
        if let Some(region) = normalize_region(region) {
            self.inner.regions.remove_if(region, |_, map| map.is_empty());
        }
        Ok(())
    }

    fn delete_region(&self, region: &str) -> Result<()> {
        if let Some(region) = normalize_region(Some(region)) {
            self.inner.regions.remove(region);
        }
        Ok(())
    }

    fn len(&self) -> Option<u64> {
        let now = self.now();
        let regioned: u64 = self.inner.regions.iter().map(|map| count_live(map.value(), now)).sum();
        Some(count_live(&self.inner.unregioned, now) + regioned)
    }
}
