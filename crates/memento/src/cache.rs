// Copyright (c) Microsoft Corporation.
// Licensed under the MIT License.

//! The shared entry point that owns the store, the settings and the key locks.

use std::{fmt::Debug, marker::PhantomData, sync::Arc};

use memento_store::{CacheStore, DynamicStore, ItemPolicy};

use crate::{
    CacheSettings, CallSite, CachedMethodBuilder, InvalidatingMethodBuilder, KeyLocks, SettingsRepository,
    telemetry::{self, CacheOperation},
};

const DIRECT_ACCESS_NAME: &str = "method_cache";

#[derive(Debug)]
enum Settings {
    Global,
    Shared(Arc<SettingsRepository>),
}

impl Settings {
    fn repository(&self) -> &SettingsRepository {
        match self {
            Self::Global => SettingsRepository::global(),
            Self::Shared(repository) => repository,
        }
    }
}

pub(crate) struct Inner<V, S> {
    pub(crate) store: S,
    settings: Settings,
    pub(crate) locks: KeyLocks,
    _value: PhantomData<fn() -> V>,
}

/// Method-result cache over an injected store.
///
/// A `MethodCache` owns a [`CacheStore`], a [`SettingsRepository`] and a table of
/// per-key population locks. Call sites are built from it with
/// [`cached`](Self::cached) and [`invalidating`](Self::invalidating), and all call
/// sites built from one `MethodCache` share its locks. Two call sites that derive
/// the same key therefore never populate it concurrently.
///
/// Clones share the same store, settings and locks.
///
/// # Examples
///
/// ```
/// use memento::{CallSite, MethodCache};
/// use memento_memory::InMemoryStore;
/// use tick::runtime::InactiveClock;
///
/// let (clock, _driver) = InactiveClock::default().activate();
/// let cache = MethodCache::<String, _>::new(InMemoryStore::new(clock));
///
/// let greet = cache
///     .cached(CallSite::new("Greeter", "greet").with_parameter("name"))
///     .absolute_expiration_secs(60)
///     .build()
///     .unwrap();
///
/// let first = greet.get_or_insert(&["ada".into()], || "hello ada".to_string());
/// let second = greet.get_or_insert(&["ada".into()], || unreachable!());
/// assert_eq!(first, second);
/// ```
pub struct MethodCache<V, S = DynamicStore<V>> {
    pub(crate) inner: Arc<Inner<V, S>>,
}

impl<V, S: Debug> Debug for MethodCache<V, S> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MethodCache")
            .field("store", &self.inner.store)
            .field("settings", &self.inner.settings)
            .field("locks", &self.inner.locks)
            .finish()
    }
}

impl<V, S> Clone for MethodCache<V, S> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}

impl<V, S> MethodCache<V, S>
where
    V: Clone + Send + Sync + 'static,
    S: CacheStore<V>,
{
    /// Creates a cache that resolves settings from [`SettingsRepository::global`].
    #[must_use]
    pub fn new(store: S) -> Self {
        Self::from_parts(store, Settings::Global)
    }

    /// Creates a cache that resolves settings from `settings`.
    #[must_use]
    pub fn with_settings(store: S, settings: Arc<SettingsRepository>) -> Self {
        Self::from_parts(store, Settings::Shared(settings))
    }

    fn from_parts(store: S, settings: Settings) -> Self {
        Self {
            inner: Arc::new(Inner {
                store,
                settings,
                locks: KeyLocks::new(),
                _value: PhantomData,
            }),
        }
    }

    /// Starts building a caching call site.
    #[must_use]
    pub fn cached(&self, call_site: CallSite) -> CachedMethodBuilder<V, S> {
        CachedMethodBuilder::new(self.clone(), call_site)
    }

    /// Starts building a call site that invalidates cached results after it runs.
    #[must_use]
    pub fn invalidating(&self, call_site: CallSite) -> InvalidatingMethodBuilder<V, S> {
        InvalidatingMethodBuilder::new(self.clone(), call_site)
    }

    /// Returns the underlying store.
    #[must_use]
    pub fn store(&self) -> &S {
        &self.inner.store
    }

    /// Returns the repository settings are resolved from.
    #[must_use]
    pub fn settings_repository(&self) -> &SettingsRepository {
        self.inner.settings.repository()
    }

    /// Returns the settings for `context`, falling back to the repository default.
    #[must_use]
    pub fn resolve_settings(&self, context: Option<&str>) -> Arc<CacheSettings> {
        self.settings_repository().resolve(context)
    }

    /// Looks up `key` in `region`.
    ///
    /// A store fault is logged and reported as a miss.
    #[must_use]
    pub fn try_get(&self, key: &str, region: Option<&str>) -> Option<V> {
        self.inner.lookup(DIRECT_ACCESS_NAME, key, region)
    }

    /// Stores `value` under `key` in `region` unless a live entry already exists.
    ///
    /// Returns `false` for `None`, for an existing entry and for a store fault.
    pub fn populate(&self, key: &str, value: Option<V>, policy: ItemPolicy, region: Option<&str>) -> bool {
        self.inner.store_value(DIRECT_ACCESS_NAME, key, value, policy, region)
    }

    /// Removes `key` from `region`.
    pub fn invalidate(&self, key: &str, region: Option<&str>) {
        self.inner.remove(DIRECT_ACCESS_NAME, key, region);
    }

    /// Removes every entry in `region`.
    pub fn invalidate_region(&self, region: &str) {
        self.inner.remove_region(DIRECT_ACCESS_NAME, region);
    }
}

impl<V, S> Inner<V, S>
where
    S: CacheStore<V>,
{
    pub(crate) fn resolve(&self, context: Option<&str>) -> Arc<CacheSettings> {
        self.settings.repository().resolve(context)
    }

    pub(crate) fn lookup(&self, name: &str, key: &str, region: Option<&str>) -> Option<V> {
        match self.store.get(key, region) {
            Ok(value) => value,
            Err(error) => {
                telemetry::record_fault(name, CacheOperation::Get, key, region, &error);
                None
            }
        }
    }

    pub(crate) fn store_value(&self, name: &str, key: &str, value: Option<V>, policy: ItemPolicy, region: Option<&str>) -> bool {
        match self.store.add_optional(key, value, policy, region) {
            Ok(added) => added,
            Err(error) => {
                telemetry::record_fault(name, CacheOperation::Insert, key, region, &error);
                false
            }
        }
    }

    pub(crate) fn remove(&self, name: &str, key: &str, region: Option<&str>) -> bool {
        match self.store.delete(key, region) {
            Ok(()) => true,
            Err(error) => {
                telemetry::record_fault(name, CacheOperation::Invalidate, key, region, &error);
                false
            }
        }
    }

    pub(crate) fn remove_region(&self, name: &str, region: &str) -> bool {
        match self.store.delete_region(region) {
            Ok(()) => true,
            Err(error) => {
                telemetry::record_fault(name, CacheOperation::InvalidateRegion, "", Some(region), &error);
                false
            }
        }
    }
}
