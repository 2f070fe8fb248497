// Copyright (c) Microsoft Corporation.
// Licensed under the MIT License.

//! The core trait for cache storage backends.
//!
//! [`CacheStore`] defines the interface every backend implements. Each
//! operation is atomic on its own; sequences of operations are not.

use crate::{ItemPolicy, Result};

/// Trait for cache storage backends.
///
/// Keys are strings produced by a key builder and are scoped by an optional
/// region. Two identical keys in two different regions are distinct entries.
///
/// The required methods are `add`, `get`, `contains`, `delete` and
/// `delete_region`. The provided methods are:
/// - `add_optional`: skips `None` values, so "no result" is never cached
/// - `len`: returns `None` (not all stores track size)
/// - `is_empty`: delegates to `len`
pub trait CacheStore<V>: Send + Sync {
    /// Adds `value` under `key` in `region`.
    ///
    /// Returns `Ok(false)` if a live entry already exists for that key in that
    /// region. Existing entries are never overwritten by `add`.
    fn add(&self, key: &str, value: V, policy: ItemPolicy, region: Option<&str>) -> Result<bool>;

    /// Gets the value stored under `key` in `region`.
    ///
    /// Expired entries are reported as missing. A successful read re-arms a
    /// sliding expiration.
    fn get(&self, key: &str, region: Option<&str>) -> Result<Option<V>>;

    /// Returns `true` if a live entry exists under `key` in `region`.
    ///
    /// Unlike [`get`](Self::get), this does not count as an access for sliding expiration.
    fn contains(&self, key: &str, region: Option<&str>) -> Result<bool>;

    /// Deletes the entry under `key` in `region`. Deleting a missing entry is not an error.
    fn delete(&self, key: &str, region: Option<&str>) -> Result<()>;

    /// Deletes every entry added under `region` and nothing else.
    ///
    /// A blank region name does not address any region and is ignored.
    fn delete_region(&self, region: &str) -> Result<()>;

    /// Adds `value` if it is `Some`.
    ///
    /// A `None` value is a no-op that reports `Ok(false)`, so a computation that
    /// produced no result is retried on the next call instead of being cached.
    fn add_optional(&self, key: &str, value: Option<V>, policy: ItemPolicy, region: Option<&str>) -> Result<bool> {
        match value {
            Some(value) => self.add(key, value, policy, region),
            None => Ok(false),
        }
    }

    /// Returns the number of entries, if supported.
    ///
    /// Returns `None` for implementations that don't track size.
    fn len(&self) -> Option<u64> {
        None
    }

    /// Returns `true` if the store contains no entries.
    ///
    /// Returns `None` for implementations that don't track size.
    fn is_empty(&self) -> Option<bool> {
        self.len().map(|len| len == 0)
    }
}
