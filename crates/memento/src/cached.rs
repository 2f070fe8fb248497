// Copyright (c) Microsoft Corporation.
// Licensed under the MIT License.

//! Compute-if-absent call sites.

use std::{
    convert::Infallible,
    fmt::Debug,
    sync::{Arc, OnceLock},
};

use memento_store::{CacheStore, ItemPolicy, region::qualified_key};
use parking_lot::{ReentrantMutex, ReentrantMutexGuard};

use crate::{
    CacheSettings, CallSite, ConfigError, ConfigErrorKind, KeyArg, KeyBehavior, KeyBuilder, KeyLockGuard, KeyOptions, MethodCache,
    telemetry::{self, CacheActivity, CacheOperation},
};

/// Scope of the lock taken while a missing value is computed.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum LockScope {
    /// One lock per key, shared by every call site built from the same [`MethodCache`].
    ///
    /// Callers computing different keys never wait for each other.
    #[default]
    PerKey,

    /// One re-entrant lock per call site.
    ///
    /// Every miss on the call site is serialized, whatever its key, and two call
    /// sites deriving the same key can compute it concurrently. A computation may
    /// call back into the same call site on its own thread, so recursive methods
    /// do not deadlock.
    CallSite,
}

/// Builder for a [`CachedMethod`].
///
/// Created with [`MethodCache::cached`].
#[derive(Debug)]
pub struct CachedMethodBuilder<V, S> {
    cache: MethodCache<V, S>,
    call_site: CallSite,
    key_options: KeyOptions,
    region: Option<String>,
    context: Option<String>,
    absolute_expiration_secs: i64,
    sliding_expiration_secs: i64,
    lock_scope: LockScope,
}

impl<V, S> CachedMethodBuilder<V, S>
where
    V: Clone + Send + Sync + 'static,
    S: CacheStore<V>,
{
    pub(crate) fn new(cache: MethodCache<V, S>, call_site: CallSite) -> Self {
        Self {
            cache,
            call_site,
            key_options: KeyOptions::new(),
            region: None,
            context: None,
            absolute_expiration_secs: 0,
            sliding_expiration_secs: 0,
            lock_scope: LockScope::default(),
        }
    }

    /// Uses `prefix` instead of `"{type}.{method}"` at the start of every key.
    #[must_use]
    pub fn key_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.key_options = self.key_options.prefix(prefix);
        self
    }

    /// Restricts the key to a comma-separated list of parameter names.
    #[must_use]
    pub fn key_parameters(mut self, parameters: impl Into<String>) -> Self {
        self.key_options = self.key_options.parameters(parameters);
        self
    }

    /// Leaves every argument out of the key, so all calls share one entry.
    #[must_use]
    pub fn ignore_parameters(mut self) -> Self {
        self.key_options = self.key_options.behavior(KeyBehavior::IgnoreParameters);
        self
    }

    /// Stores results in `region`.
    #[must_use]
    pub fn region(mut self, region: impl Into<String>) -> Self {
        self.region = Some(region.into());
        self
    }

    /// Resolves settings from `context` instead of the call site's default context.
    #[must_use]
    pub fn context(mut self, context: impl Into<String>) -> Self {
        self.context = Some(context.into());
        self
    }

    /// Expires results `seconds` after they were stored. Zero disables absolute expiration.
    #[must_use]
    pub fn absolute_expiration_secs(mut self, seconds: i64) -> Self {
        self.absolute_expiration_secs = seconds;
        self
    }

    /// Expires results after `seconds` without a read. Zero disables sliding expiration.
    #[must_use]
    pub fn sliding_expiration_secs(mut self, seconds: i64) -> Self {
        self.sliding_expiration_secs = seconds;
        self
    }

    /// Sets the scope of the population lock.
    #[must_use]
    pub fn lock_scope(mut self, scope: LockScope) -> Self {
        self.lock_scope = scope;
        self
    }

    /// Validates the configuration and builds the call site.
    ///
    /// # Errors
    ///
    /// Returns a [`ConfigError`] when an expiration is negative, when both
    /// expirations are set, or when the key parameters do not match the call site.
    pub fn build(self) -> Result<CachedMethod<V, S>, ConfigError> {
        let policy = expiration_policy(self.absolute_expiration_secs, self.sliding_expiration_secs)?;
        let key_builder = KeyBuilder::validated(&self.call_site, &self.key_options)?;

        let lock = match self.lock_scope {
            LockScope::PerKey => PopulationLock::PerKey,
            LockScope::CallSite => PopulationLock::CallSite(ReentrantMutex::new(())),
        };

        Ok(CachedMethod {
            name: self.call_site.qualified_name(),
            context: self.context.or_else(|| self.call_site.context().map(ToOwned::to_owned)),
            cache: self.cache,
            key_builder,
            region: self.region,
            policy,
            lock,
            settings: OnceLock::new(),
        })
    }
}

fn expiration_policy(absolute_secs: i64, sliding_secs: i64) -> Result<ItemPolicy, ConfigError> {
    let (Ok(absolute), Ok(sliding)) = (u64::try_from(absolute_secs), u64::try_from(sliding_secs)) else {
        return Err(ConfigError::new(ConfigErrorKind::NegativeExpiration));
    };

    match (absolute, sliding) {
        (0, sliding) => Ok(ItemPolicy::sliding_secs(sliding)),
        (absolute, 0) => Ok(ItemPolicy::absolute_secs(absolute)),
        _ => Err(ConfigError::new(ConfigErrorKind::ConflictingExpiration)),
    }
}

#[derive(Debug)]
enum PopulationLock {
    PerKey,
    CallSite(ReentrantMutex<()>),
}

/// A cached call site.
///
/// Wraps calls to one method: results are looked up by a key derived from the
/// arguments and computed at most once per key at a time. `None` results and
/// errors are never cached. When the resolved settings disable caching, every
/// call runs the computation directly and the store is not touched.
///
/// Settings are resolved on first use and kept for the lifetime of the call site.
///
/// # Examples
///
/// ```
/// use memento::{CallSite, MethodCache};
/// use memento_store::testing::MockStore;
///
/// let cache = MethodCache::<u64, _>::new(MockStore::new());
/// let square = cache
///     .cached(CallSite::new("Math", "square").with_parameter("n"))
///     .build()
///     .unwrap();
///
/// assert_eq!(square.build_key(&[12_u64.into()]), "Math.square n = '12'");
/// assert_eq!(square.get_or_insert(&[12_u64.into()], || 144), 144);
/// assert_eq!(square.get_or_insert(&[12_u64.into()], || 0), 144);
/// ```
pub struct CachedMethod<V, S> {
    cache: MethodCache<V, S>,
    name: String,
    context: Option<String>,
    key_builder: KeyBuilder,
    region: Option<String>,
    policy: ItemPolicy,
    lock: PopulationLock,
    settings: OnceLock<Arc<CacheSettings>>,
}

impl<V, S: Debug> Debug for CachedMethod<V, S> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CachedMethod")
            .field("name", &self.name)
            .field("context", &self.context)
            .field("key_builder", &self.key_builder)
            .field("region", &self.region)
            .field("policy", &self.policy)
            .field("lock", &self.lock)
            .finish_non_exhaustive()
    }
}

impl<V, S> CachedMethod<V, S>
where
    V: Clone + Send + Sync + 'static,
    S: CacheStore<V>,
{
    /// Returns the cached value for `args`, computing and storing it on a miss.
    pub fn get_or_insert(&self, args: &[KeyArg<'_>], f: impl FnOnce() -> V) -> V {
        let Ok(value) = self.compute_if_absent(args, || Ok::<_, Infallible>(f()), |value| Some(value.clone()), |value| value);
        value
    }

    /// Like [`get_or_insert`](Self::get_or_insert) for fallible computations.
    ///
    /// # Errors
    ///
    /// Returns the computation's error unchanged. Nothing is cached in that case.
    pub fn try_get_or_insert<E>(&self, args: &[KeyArg<'_>], f: impl FnOnce() -> Result<V, E>) -> Result<V, E> {
        self.compute_if_absent(args, f, |value| Some(value.clone()), |value| value)
    }

    /// Like [`get_or_insert`](Self::get_or_insert) for computations that may produce no result.
    ///
    /// A `None` result is returned but not cached, so the next call computes again.
    pub fn optionally_get_or_insert(&self, args: &[KeyArg<'_>], f: impl FnOnce() -> Option<V>) -> Option<V> {
        let Ok(value) = self.compute_if_absent(args, || Ok::<_, Infallible>(f()), Clone::clone, Some);
        value
    }

    /// The general form: a fallible computation that may produce no result.
    ///
    /// # Errors
    ///
    /// Returns the computation's error unchanged. Nothing is cached in that case.
    pub fn try_optionally_get_or_insert<E>(&self, args: &[KeyArg<'_>], f: impl FnOnce() -> Result<Option<V>, E>) -> Result<Option<V>, E> {
        self.compute_if_absent(args, f, Clone::clone, Some)
    }

    /// Renders the key for `args`.
    #[must_use]
    pub fn build_key(&self, args: &[KeyArg<'_>]) -> String {
        self.key_builder.build(args)
    }

    /// Returns the region results are stored in.
    #[must_use]
    pub fn region(&self) -> Option<&str> {
        self.region.as_deref()
    }

    /// Returns the expiration policy attached to stored results.
    #[must_use]
    pub fn policy(&self) -> ItemPolicy {
        self.policy
    }

    /// Returns the settings context, if any.
    #[must_use]
    pub fn context(&self) -> Option<&str> {
        self.context.as_deref()
    }

    /// Returns the settings this call site runs with, resolving them on first use.
    #[must_use]
    pub fn settings(&self) -> &CacheSettings {
        self.settings.get_or_init(|| self.cache.inner.resolve(self.context.as_deref()))
    }

    /// Returns the key builder.
    #[must_use]
    pub fn key_builder(&self) -> &KeyBuilder {
        &self.key_builder
    }

    fn compute_if_absent<T, E>(
        &self,
        args: &[KeyArg<'_>],
        f: impl FnOnce() -> Result<T, E>,
        to_cached: impl FnOnce(&T) -> Option<V>,
        from_cached: impl FnOnce(V) -> T,
    ) -> Result<T, E> {
        let settings = self.settings();
        let region = self.region.as_deref();

        if !settings.cache_enabled() {
            telemetry::record(settings, &self.name, CacheOperation::Get, CacheActivity::Bypassed, "", region);
            return f();
        }

        let key = self.key_builder.build(args);
        let inner = &self.cache.inner;

        if let Some(value) = inner.lookup(&self.name, &key, region) {
            telemetry::record(settings, &self.name, CacheOperation::Get, CacheActivity::Hit, &key, region);
            return Ok(from_cached(value));
        }

        let _guard = self.acquire(&key, region);

        if let Some(value) = inner.lookup(&self.name, &key, region) {
            telemetry::record(settings, &self.name, CacheOperation::Get, CacheActivity::Hit, &key, region);
            return Ok(from_cached(value));
        }

        telemetry::record(settings, &self.name, CacheOperation::Get, CacheActivity::Miss, &key, region);
        let result = f()?;

        match to_cached(&result) {
            Some(value) => {
                if inner.store_value(&self.name, &key, Some(value), self.policy, region) {
                    telemetry::record(settings, &self.name, CacheOperation::Insert, CacheActivity::Inserted, &key, region);
                }
            }
            None => telemetry::record(settings, &self.name, CacheOperation::Insert, CacheActivity::NotCached, &key, region),
        }

        Ok(result)
    }

    fn acquire(&self, key: &str, region: Option<&str>) -> PopulationGuard<'_> {
        match &self.lock {
            PopulationLock::PerKey => PopulationGuard::Key {
                _guard: self.cache.inner.locks.lock(&qualified_key(key, region)),
            },
            PopulationLock::CallSite(mutex) => PopulationGuard::CallSite { _guard: mutex.lock() },
        }
    }
}

// Held for its drop only.
enum PopulationGuard<'a> {
    Key { _guard: KeyLockGuard<'a> },
    CallSite { _guard: ReentrantMutexGuard<'a, ()> },
}
