// Copyright (c) Microsoft Corporation.
// Licensed under the MIT License.

//! Mock store for testing.
//!
//! [`MockStore`] is a flat key-value store that qualifies keys with the
//! region prefix token, records every operation and can be told to fail.
//! Entries never expire; use `memento_memory` when expiration matters.

use std::{collections::HashMap, sync::Arc};

use parking_lot::Mutex;

use crate::{
    CacheStore, Error, ItemPolicy, Result,
    region::{normalize_region, qualified_key, region_prefix},
};

/// Recorded store operation.
///
/// Keys are recorded exactly as the caller passed them, together with the region.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StoreOp<V> {
    /// An add operation.
    Add {
        /// The key being added.
        key: String,
        /// The value being added.
        value: V,
        /// The policy attached to the value.
        policy: ItemPolicy,
        /// The region, if any.
        region: Option<String>,
    },
    /// A get operation.
    Get {
        /// The key being read.
        key: String,
        /// The region, if any.
        region: Option<String>,
    },
    /// A contains operation.
    Contains {
        /// The key being probed.
        key: String,
        /// The region, if any.
        region: Option<String>,
    },
    /// A delete operation.
    Delete {
        /// The key being deleted.
        key: String,
        /// The region, if any.
        region: Option<String>,
    },
    /// A region delete operation.
    DeleteRegion(String),
}

type FailPredicate<V> = Box<dyn Fn(&StoreOp<V>) -> bool + Send + Sync>;

/// A configurable mock store for testing.
///
/// # Examples
///
/// ```
/// use memento_store::{CacheStore, ItemPolicy, testing::{MockStore, StoreOp}};
///
/// let store = MockStore::<i32>::new();
/// assert!(store.add("k", 1, ItemPolicy::NoExpiration, Some("R")).unwrap());
/// assert_eq!(store.get("k", Some("R")).unwrap(), Some(1));
/// assert_eq!(store.get("k", None).unwrap(), None);
///
/// store.fail_when(|op| matches!(op, StoreOp::Get { .. }));
/// assert!(store.get("k", Some("R")).is_err());
/// ```
pub struct MockStore<V> {
    data: Arc<Mutex<HashMap<String, (V, ItemPolicy)>>>,
    operations: Arc<Mutex<Vec<StoreOp<V>>>>,
    fail_when: Arc<Mutex<Option<FailPredicate<V>>>>,
}

impl<V: std::fmt::Debug> std::fmt::Debug for MockStore<V> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MockStore")
            .field("data", &self.data)
            .field("operations", &self.operations)
            .field("fail_when", &self.fail_when.lock().is_some())
            .finish()
    }
}

impl<V> Clone for MockStore<V> {
    fn clone(&self) -> Self {
        Self {
            data: Arc::clone(&self.data),
            operations: Arc::clone(&self.operations),
            fail_when: Arc::clone(&self.fail_when),
        }
    }
}

impl<V> Default for MockStore<V> {
    fn default() -> Self {
        Self::new()
    }
}

impl<V> MockStore<V> {
    /// Creates a new empty mock store.
    #[must_use]
    pub fn new() -> Self {
        Self {
            data: Arc::new(Mutex::new(HashMap::new())),
            operations: Arc::new(Mutex::new(Vec::new())),
            fail_when: Arc::new(Mutex::new(None)),
        }
    }

    /// Returns the number of stored entries across all regions.
    #[must_use]
    pub fn entry_count(&self) -> usize {
        self.data.lock().len()
    }

    /// Sets a predicate that decides which operations fail.
    pub fn fail_when<F>(&self, predicate: F)
    where
        F: Fn(&StoreOp<V>) -> bool + Send + Sync + 'static,
    {
        *self.fail_when.lock() = Some(Box::new(predicate));
    }

    /// Clears the failure predicate.
    pub fn clear_failures(&self) {
        *self.fail_when.lock() = None;
    }

    /// Clears all recorded operations.
    pub fn clear_operations(&self) {
        self.operations.lock().clear();
    }
}

impl<V: Clone> MockStore<V> {
    /// Returns a clone of all recorded operations.
    #[must_use]
    pub fn operations(&self) -> Vec<StoreOp<V>> {
        self.operations.lock().clone()
    }

    /// Returns the policy stored with `key` in `region`, if present.
    #[must_use]
    pub fn policy_of(&self, key: &str, region: Option<&str>) -> Option<ItemPolicy> {
        self.data.lock().get(qualified_key(key, region).as_ref()).map(|(_, policy)| *policy)
    }

    fn record(&self, op: StoreOp<V>) -> Result<()> {
        let should_fail = self.fail_when.lock().as_ref().is_some_and(|predicate| predicate(&op));
        self.operations.lock().push(op);
        if should_fail {
            Err(Error::from_message("mock store: injected failure"))
        } else {
            Ok(())
        }
    }
}

fn owned(region: Option<&str>) -> Option<String> {
    region.map(ToOwned::to_owned)
}

impl<V> CacheStore<V> for MockStore<V>
where
    V: Clone + Send + Sync,
{
    fn add(&self, key: &str, value: V, policy: ItemPolicy, region: Option<&str>) -> Result<bool> {
        self.record(StoreOp::Add {
            key: key.to_owned(),
            value: value.clone(),
            policy,
            region: owned(region),
        })?;

        let mut data = self.data.lock();
        let qualified = qualified_key(key, region).into_owned();
        if data.contains_key(&qualified) {
            return Ok(false);
        }
        data.insert(qualified, (value, policy));
        Ok(true)
    }

    fn get(&self, key: &str, region: Option<&str>) -> Result<Option<V>> {
        self.record(StoreOp::Get {
            key: key.to_owned(),
            region: owned(region),
        })?;
        Ok(self.data.lock().get(qualified_key(key, region).as_ref()).map(|(value, _)| value.clone()))
    }

    fn contains(&self, key: &str, region: Option<&str>) -> Result<bool> {
        self.record(StoreOp::Contains {
            key: key.to_owned(),
            region: owned(region),
        })?;
        Ok(self.data.lock().contains_key(qualified_key(key, region).as_ref()))
    }

    fn delete(&self, key: &str, region: Option<&str>) -> Result<()> {
        self.record(StoreOp::Delete {
            key: key.to_owned(),
            region: owned(region),
        })?;
        self.data.lock().remove(qualified_key(key, region).as_ref());
        Ok(())
    }

    fn delete_region(&self, region: &str) -> Result<()> {
        self.record(StoreOp::DeleteRegion(region.to_owned()))?;
        if let Some(region) = normalize_region(Some(region)) {
            let prefix = region_prefix(region);
            self.data.lock().retain(|key, _| !key.starts_with(&prefix));
        }
        Ok(())
    }

    fn len(&self) -> Option<u64> {
        Some(self.data.lock().len() as u64)
    }
}
