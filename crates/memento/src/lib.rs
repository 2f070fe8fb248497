// Copyright (c) Microsoft Corporation.
// Licensed under the MIT License.

#![cfg_attr(coverage_nightly, feature(coverage_attribute))]
#![cfg_attr(docsrs, feature(doc_cfg))]

//! Method-result caching with deterministic keys, per-key population locks and region invalidation.
//!
//! This crate wraps expensive, deterministic method calls:
//! - Keys are derived from a [`CallSite`] and the call's arguments by a [`KeyBuilder`]
//! - A missing value is computed at most once per key at a time, across threads
//! - `None` results and errors are never cached
//! - Results carry an absolute or sliding expiration and can live in named regions
//! - Named settings contexts switch caching or its logging off per call site
//!
//! Storage is pluggable through [`CacheStore`]; `memento_memory` provides an
//! in-process store.
//!
//! # Examples
//!
//! ```
//! use memento::{CallSite, MethodCache};
//! use memento_memory::InMemoryStore;
//! use tick::ClockControl;
//!
//! let control = ClockControl::new();
//! let cache = MethodCache::<u64, _>::new(InMemoryStore::new(control.to_clock()));
//!
//! let site = CallSite::new("Reports", "total").with_parameters(["customer", "year"]);
//! let total = cache
//!     .cached(site.clone())
//!     .region("reports")
//!     .sliding_expiration_secs(300)
//!     .build()?;
//! let recompute = cache
//!     .invalidating(site)
//!     .region("reports")
//!     .invalidate_region()
//!     .build()?;
//!
//! assert_eq!(total.get_or_insert(&["contoso".into(), 2024.into()], || 17), 17);
//! assert_eq!(total.get_or_insert(&["contoso".into(), 2024.into()], || 0), 17);
//!
//! recompute.invoke(&[], || ());
//! assert_eq!(total.get_or_insert(&["contoso".into(), 2024.into()], || 18), 18);
//! # Ok::<(), memento::ConfigError>(())
//! ```
//!
//! # Settings
//!
//! Call sites resolve their [`CacheSettings`] from a [`SettingsRepository`] by
//! context name. Unknown or blank contexts fall back to the defaults, which
//! enable both caching and logging.
//!
//! ```
//! use std::sync::Arc;
//!
//! use memento::{CacheSettings, CallSite, MethodCache, SettingsRepository};
//! use memento_store::testing::MockStore;
//!
//! let repository = Arc::new(SettingsRepository::new());
//! repository.add("live", CacheSettings::disabled());
//!
//! let cache = MethodCache::<i32, _>::with_settings(MockStore::new(), repository);
//! let quote = cache.cached(CallSite::new("Prices", "quote")).context("live").build()?;
//!
//! assert_eq!(quote.get_or_insert(&[], || 1), 1);
//! assert_eq!(quote.get_or_insert(&[], || 2), 2);
//! assert_eq!(cache.store().entry_count(), 0);
//! # Ok::<(), memento::ConfigError>(())
//! ```
//!
//! # Logging
//!
//! Cache decisions are emitted as `tracing` events with the `memento` target.
//! Hits, misses and bypasses are logged at `DEBUG`, insertions and invalidations
//! at `INFO`. Store faults are logged at `WARN` and the call proceeds without the
//! cache.
//!
//! # Features
//!
//! - `serde`: derives `Serialize` and `Deserialize` for [`CacheSettings`].

mod cache;
mod cached;
mod call_site;
mod error;
mod invalidation;
mod key;
mod key_builder;
mod locks;
mod settings;
mod telemetry;
#[cfg(test)]
mod testing;

#[doc(inline)]
pub use cache::MethodCache;
#[doc(inline)]
pub use cached::{CachedMethod, CachedMethodBuilder, LockScope};
#[doc(inline)]
pub use call_site::CallSite;
#[doc(inline)]
pub use error::{ConfigError, ConfigErrorKind};
#[doc(inline)]
pub use invalidation::{InvalidatingMethod, InvalidatingMethodBuilder};
#[doc(inline)]
pub use key::{CacheKey, KeyArg};
#[doc(inline)]
pub use key_builder::{KeyBehavior, KeyBuilder, KeyOptions};
#[doc(inline)]
pub use locks::{KeyLockGuard, KeyLocks};
#[doc(inline)]
pub use memento_macros::CacheKey;
#[doc(inline)]
pub use memento_store::{CacheStore, DynamicStore, DynamicStoreExt, ItemPolicy};
#[doc(inline)]
pub use settings::{CacheSettings, SettingsRepository};
