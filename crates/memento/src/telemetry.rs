// Copyright (c) Microsoft Corporation.
// Licensed under the MIT License.

//! Structured logging of cache decisions.
//!
//! Every event carries the call site name, the operation, the activity and the
//! key. Field names must match the constants below.

use std::fmt::Display;

use crate::CacheSettings;

pub(crate) const TARGET: &str = "memento";
#[cfg(test)]
pub(crate) const CACHE_NAME: &str = "cache.name";
#[cfg(test)]
pub(crate) const CACHE_OPERATION_NAME: &str = "cache.operation";
#[cfg(test)]
pub(crate) const CACHE_ACTIVITY_NAME: &str = "cache.activity";
#[cfg(test)]
pub(crate) const CACHE_KEY_NAME: &str = "cache.key";
#[cfg(test)]
pub(crate) const CACHE_REGION_NAME: &str = "cache.region";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum CacheOperation {
    Get,
    Insert,
    Invalidate,
    InvalidateRegion,
}

impl CacheOperation {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Get => "cache.get",
            Self::Insert => "cache.insert",
            Self::Invalidate => "cache.invalidate",
            Self::InvalidateRegion => "cache.invalidate_region",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum CacheActivity {
    Hit,
    Miss,
    Bypassed,
    Inserted,
    NotCached,
    Invalidated,
    Error,
}

impl CacheActivity {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Hit => "cache.hit",
            Self::Miss => "cache.miss",
            Self::Bypassed => "cache.bypassed",
            Self::Inserted => "cache.inserted",
            Self::NotCached => "cache.not_cached",
            Self::Invalidated => "cache.invalidated",
            Self::Error => "cache.error",
        }
    }
}

/// Emits a cache decision unless `settings` disable cache logging.
pub(crate) fn record(settings: &CacheSettings, name: &str, operation: CacheOperation, activity: CacheActivity, key: &str, region: Option<&str>) {
    if settings.disable_cache_logging() {
        return;
    }

    let operation = operation.as_str();
    let activity_name = activity.as_str();

    // Tracing level must be constant, so we use a macro to select the appropriate level.
    macro_rules! emit_event {
        ($level:ident) => {
            tracing::$level!(
                target: TARGET,
                {
                    cache.name = name,
                    cache.operation = operation,
                    cache.activity = activity_name,
                    cache.key = key,
                    cache.region = region,
                },
                "cache.event"
            )
        };
    }

    match activity {
        CacheActivity::Hit | CacheActivity::Miss | CacheActivity::Bypassed | CacheActivity::NotCached => emit_event!(debug),
        CacheActivity::Inserted | CacheActivity::Invalidated => emit_event!(info),
        CacheActivity::Error => emit_event!(warn),
    }
}

/// Emits a store fault. Faults are reported regardless of settings.
pub(crate) fn record_fault(name: &str, operation: CacheOperation, key: &str, region: Option<&str>, error: &dyn Display) {
    tracing::warn!(
        target: TARGET,
        {
            cache.name = name,
            cache.operation = operation.as_str(),
            cache.activity = CacheActivity::Error.as_str(),
            cache.key = key,
            cache.region = region,
            error = %error,
        },
        "cache store fault, continuing without cache"
    );
}
