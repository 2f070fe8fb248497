// Copyright (c) Microsoft Corporation.
// Licensed under the MIT License.

#![cfg_attr(coverage_nightly, feature(coverage_attribute))]
#![cfg_attr(docsrs, feature(doc_cfg))]

//! Storage abstractions for method-result caching.
//!
//! This crate defines the [`CacheStore`] trait that every storage backend implements,
//! the [`ItemPolicy`] expiration rules attached to stored values, [`CacheEntry`] for
//! backends that keep per-entry metadata, and the [`Error`] type for failed operations.
//!
//! # Regions
//!
//! Every operation takes an optional region. A region is a named partition of the key
//! space that can be deleted in bulk with [`CacheStore::delete_region`]. The same key
//! in two regions addresses two independent entries. See [`region`] for the helpers
//! flat backends use to encode regions into keys.
//!
//! # Implementing a Store
//!
//! ```
//! use std::collections::HashMap;
//! use std::sync::Mutex;
//!
//! use memento_store::{CacheStore, Error, ItemPolicy, Result, region::{qualified_key, region_prefix}};
//!
//! #[derive(Default)]
//! struct SimpleStore(Mutex<HashMap<String, String>>);
//!
//! impl CacheStore<String> for SimpleStore {
//!     fn add(&self, key: &str, value: String, _policy: ItemPolicy, region: Option<&str>) -> Result<bool> {
//!         let mut map = self.0.lock().map_err(|_| Error::from_message("poisoned"))?;
//!         let key = qualified_key(key, region).into_owned();
//!         if map.contains_key(&key) {
//!             return Ok(false);
//!         }
//!         map.insert(key, value);
//!         Ok(true)
//!     }
//!
//!     fn get(&self, key: &str, region: Option<&str>) -> Result<Option<String>> {
//!         let map = self.0.lock().map_err(|_| Error::from_message("poisoned"))?;
//!         Ok(map.get(qualified_key(key, region).as_ref()).cloned())
//!     }
//!
//!     fn contains(&self, key: &str, region: Option<&str>) -> Result<bool> {
//!         Ok(self.get(key, region)?.is_some())
//!     }
//!
//!     fn delete(&self, key: &str, region: Option<&str>) -> Result<()> {
//!         let mut map = self.0.lock().map_err(|_| Error::from_message("poisoned"))?;
//!         map.remove(qualified_key(key, region).as_ref());
//!         Ok(())
//!     }
//!
//!     fn delete_region(&self, region: &str) -> Result<()> {
//!         let prefix = region_prefix(region);
//!         let mut map = self.0.lock().map_err(|_| Error::from_message("poisoned"))?;
//!         map.retain(|key, _| !key.starts_with(&prefix));
//!         Ok(())
//!     }
//! }
//!
//! let store = SimpleStore::default();
//! assert!(store.add("k", "v".to_string(), ItemPolicy::NoExpiration, None).unwrap());
//! assert!(!store.add("k", "w".to_string(), ItemPolicy::NoExpiration, None).unwrap());
//! ```
//!
//! # Features
//!
//! - `test-util`: enables [`testing::MockStore`], a recording store with failure injection.

mod dynamic;
mod entry;
pub mod error;
mod policy;
pub mod region;
mod store;
#[cfg(any(feature = "test-util", test))]
pub mod testing;

#[doc(inline)]
pub use dynamic::{DynamicStore, DynamicStoreExt};
#[doc(inline)]
pub use entry::CacheEntry;
#[doc(inline)]
pub use error::{Error, Result};
#[doc(inline)]
pub use policy::{Expiry, ItemPolicy};
#[doc(inline)]
pub use store::CacheStore;
