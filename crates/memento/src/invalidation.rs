// Copyright (c) Microsoft Corporation.
// Licensed under the MIT License.

//! Call sites that remove cached results after they run.

use std::{
    convert::Infallible,
    fmt::Debug,
    sync::{Arc, OnceLock},
};

use memento_store::{CacheStore, region::qualified_key};

use crate::{
    CacheSettings, CallSite, ConfigError, ConfigErrorKind, KeyArg, KeyBehavior, KeyBuilder, KeyOptions, MethodCache,
    telemetry::{self, CacheActivity, CacheOperation},
};

/// Builder for an [`InvalidatingMethod`].
///
/// Created with [`MethodCache::invalidating`]. The key options must match those
/// of the cached call site whose entries should be removed.
#[derive(Debug)]
pub struct InvalidatingMethodBuilder<V, S> {
    cache: MethodCache<V, S>,
    call_site: CallSite,
    key_options: KeyOptions,
    region: Option<String>,
    whole_region: bool,
    context: Option<String>,
}

impl<V, S> InvalidatingMethodBuilder<V, S>
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
            whole_region: false,
            context: None,
        }
    }

    /// Uses `prefix` instead of `"{type}.{method}"` at the start of the key.
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

    /// Leaves every argument out of the key.
    #[must_use]
    pub fn ignore_parameters(mut self) -> Self {
        self.key_options = self.key_options.behavior(KeyBehavior::IgnoreParameters);
        self
    }

    /// Removes entries from `region`.
    #[must_use]
    pub fn region(mut self, region: impl Into<String>) -> Self {
        self.region = Some(region.into());
        self
    }

    /// Removes every entry of the region instead of a single key.
    #[must_use]
    pub fn invalidate_region(mut self) -> Self {
        self.whole_region = true;
        self
    }

    /// Resolves settings from `context` instead of the call site's default context.
    #[must_use]
    pub fn context(mut self, context: impl Into<String>) -> Self {
        self.context = Some(context.into());
        self
    }

    /// Validates the configuration and builds the call site.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigErrorKind::MissingRegion`] when region invalidation is
    /// requested without a non-blank region, and the key builder errors otherwise.
    pub fn build(self) -> Result<InvalidatingMethod<V, S>, ConfigError> {
        let target = if self.whole_region {
            match self.region.filter(|region| !region.trim().is_empty()) {
                Some(region) => Target::Region(region),
                None => return Err(ConfigError::new(ConfigErrorKind::MissingRegion)),
            }
        } else {
            Target::Key {
                key_builder: KeyBuilder::validated(&self.call_site, &self.key_options)?,
                region: self.region,
            }
        };

        Ok(InvalidatingMethod {
            name: self.call_site.qualified_name(),
            context: self.context.or_else(|| self.call_site.context().map(ToOwned::to_owned)),
            cache: self.cache,
            target,
            settings: OnceLock::new(),
        })
    }
}

#[derive(Debug)]
enum Target {
    Key { key_builder: KeyBuilder, region: Option<String> },
    Region(String),
}

/// A call site that invalidates cached results.
///
/// The wrapped computation always runs first. Only when it succeeds is the key
/// derived from the arguments, or the whole region, removed from the store.
/// Nothing is removed when the resolved settings disable caching.
///
/// A key is removed while holding its population lock, so a computation already
/// in flight for that key finishes storing before the entry is deleted. Settings
/// are resolved on first use and kept for the lifetime of the call site.
///
/// # Examples
///
/// ```
/// use memento::{CallSite, MethodCache};
/// use memento_store::testing::MockStore;
///
/// let cache = MethodCache::<String, _>::new(MockStore::new());
/// let site = CallSite::new("Users", "name").with_parameter("id");
///
/// let name = cache.cached(site.clone()).build().unwrap();
/// let rename = cache.invalidating(site).build().unwrap();
///
/// assert_eq!(name.get_or_insert(&[7.into()], || "ada".to_string()), "ada");
/// rename.invoke(&[7.into()], || { /* write the new name */ });
/// assert_eq!(name.get_or_insert(&[7.into()], || "grace".to_string()), "grace");
/// ```
pub struct InvalidatingMethod<V, S> {
    cache: MethodCache<V, S>,
    name: String,
    context: Option<String>,
    target: Target,
    settings: OnceLock<Arc<CacheSettings>>,
}

impl<V, S: Debug> Debug for InvalidatingMethod<V, S> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("InvalidatingMethod")
            .field("name", &self.name)
            .field("context", &self.context)
            .field("target", &self.target)
            .finish_non_exhaustive()
    }
}

impl<V, S> InvalidatingMethod<V, S>
where
    V: Clone + Send + Sync + 'static,
    S: CacheStore<V>,
{
    /// Runs `f`, then invalidates.
    pub fn invoke<T>(&self, args: &[KeyArg<'_>], f: impl FnOnce() -> T) -> T {
        let Ok(value) = self.try_invoke(args, || Ok::<_, Infallible>(f()));
        value
    }

    /// Runs `f`, then invalidates if it succeeded.
    ///
    /// # Errors
    ///
    /// Returns the computation's error unchanged. Nothing is invalidated in that case.
    pub fn try_invoke<T, E>(&self, args: &[KeyArg<'_>], f: impl FnOnce() -> Result<T, E>) -> Result<T, E> {
        let result = f()?;

        let settings = self.settings();
        if !settings.cache_enabled() {
            return Ok(result);
        }

        let inner = &self.cache.inner;
        match &self.target {
            Target::Key { key_builder, region } => {
                let key = key_builder.build(args);
                let region = region.as_deref();
                let _guard = inner.locks.lock(&qualified_key(&key, region));
                if inner.remove(&self.name, &key, region) {
                    telemetry::record(settings, &self.name, CacheOperation::Invalidate, CacheActivity::Invalidated, &key, region);
                }
            }
            Target::Region(region) => {
                if inner.remove_region(&self.name, region) {
                    telemetry::record(
                        settings,
                        &self.name,
                        CacheOperation::InvalidateRegion,
                        CacheActivity::Invalidated,
                        "",
                        Some(region),
                    );
                }
            }
        }

        Ok(result)
    }

    /// Returns the key `args` would invalidate, or `None` in region mode.
    #[must_use]
    pub fn build_key(&self, args: &[KeyArg<'_>]) -> Option<String> {
        match &self.target {
            Target::Key { key_builder, .. } => Some(key_builder.build(args)),
            Target::Region(_) => None,
        }
    }

    /// Returns the region entries are removed from.
    #[must_use]
    pub fn region(&self) -> Option<&str> {
        match &self.target {
            Target::Key { region, .. } => region.as_deref(),
            Target::Region(region) => Some(region),
        }
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

    /// Returns `true` if the whole region is invalidated.
    #[must_use]
    pub fn invalidates_region(&self) -> bool {
        matches!(self.target, Target::Region(_))
    }
}
