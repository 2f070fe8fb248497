// Copyright (c) Microsoft Corporation.
// Licensed under the MIT License.

//! Type-erased store wrapper.

use std::{fmt::Debug, sync::Arc};

use crate::{CacheStore, ItemPolicy, Result};

/// Extension trait for converting any `CacheStore` into a `DynamicStore`.
///
/// This trait is automatically implemented for all types that implement `CacheStore`.
pub trait DynamicStoreExt<V>: Sized {
    /// Converts this store into a `DynamicStore`.
    fn into_dynamic(self) -> DynamicStore<V>;
}

impl<V, S> DynamicStoreExt<V> for S
where
    S: CacheStore<V> + 'static,
{
    fn into_dynamic(self) -> DynamicStore<V> {
        DynamicStore::new(self)
    }
}

/// A clonable store with type erasure.
///
/// `DynamicStore` wraps a trait object in an `Arc`. Clones share the same
/// backend, which is how one store is handed to many cached call sites.
///
/// # Examples
///
/// ```
/// use memento_store::{CacheStore, DynamicStore, DynamicStoreExt};
///
/// fn share<S: CacheStore<String> + 'static>(store: S) -> (DynamicStore<String>, DynamicStore<String>) {
///     let dynamic = store.into_dynamic();
///     (dynamic.clone(), dynamic)
/// }
/// ```
pub struct DynamicStore<V>(Arc<dyn CacheStore<V>>);

impl<V> DynamicStore<V> {
    /// Creates a new dynamic store from any `CacheStore` implementation.
    pub fn new<S>(store: S) -> Self
    where
        S: CacheStore<V> + 'static,
    {
        Self(Arc::new(store))
    }
}

impl<V> Debug for DynamicStore<V> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DynamicStore").finish_non_exhaustive()
    }
}

impl<V> Clone for DynamicStore<V> {
    fn clone(&self) -> Self {
        Self(Arc::clone(&self.0))
    }
}

impl<V> CacheStore<V> for DynamicStore<V> {
    fn add(&self, key: &str, value: V, policy: ItemPolicy, region: Option<&str>) -> Result<bool> {
        self.0.add(key, value, policy, region)
    }

    fn get(&self, key: &str, region: Option<&str>) -> Result<Option<V>> {
        self.0.get(key, region)
    }

    fn contains(&self, key: &str, region: Option<&str>) -> Result<bool> {
        self.0.contains(key, region)
    }

    fn delete(&self, key: &str, region: Option<&str>) -> Result<()> {
        self.0.delete(key, region)
    }

    fn delete_region(&self, region: &str) -> Result<()> {
        self.0.delete_region(region)
    }

    fn len(&self) -> Option<u64> {
        self.0.len()
    }

    fn is_empty(&self) -> Option<bool> {
        self.0.is_empty()
    }
}
