// Copyright (c) Microsoft Corporation.
// Licensed under the MIT License.

//! Configuration errors detected when call sites are built.

use std::fmt::{self, Display, Formatter};

/// The reason a cache configuration was rejected.
#[derive(Clone, Debug, PartialEq, Eq)]
#[non_exhaustive]
pub enum ConfigErrorKind {
    /// An absolute or sliding expiration was negative.
    NegativeExpiration,

    /// Both an absolute and a sliding expiration were set.
    ConflictingExpiration,

    /// A settings context with this name is already registered.
    DuplicateContext(String),

    /// The key parameter filter names a parameter the call site does not declare.
    UnknownKeyParameter(String),

    /// The call site declares the same parameter name twice.
    DuplicateParameter(String),

    /// Region invalidation was requested without naming a region.
    MissingRegion,
}

impl Display for ConfigErrorKind {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        match self {
            Self::NegativeExpiration => f.write_str("cache expiration values cannot be negative"),
            Self::ConflictingExpiration => f.write_str("only one of absolute and sliding expiration may be set"),
            Self::DuplicateContext(name) => write!(f, "cache context '{name}' is already registered"),
            Self::UnknownKeyParameter(name) => write!(f, "key parameter '{name}' is not a parameter of the method"),
            Self::DuplicateParameter(name) => write!(f, "parameter '{name}' is declared more than once"),
            Self::MissingRegion => f.write_str("region invalidation requires a region"),
        }
    }
}

/// A cache configuration that cannot be used.
///
/// Returned when building a cached call site or registering settings. These errors
/// surface at setup time and never from a call.
///
/// # Examples
///
/// ```
/// use memento::{ConfigErrorKind, SettingsRepository, CacheSettings};
///
/// let repository = SettingsRepository::new();
/// repository.register("orders", CacheSettings::default()).unwrap();
///
/// let error = repository.register("orders", CacheSettings::default()).unwrap_err();
/// assert_eq!(error.kind(), &ConfigErrorKind::DuplicateContext("orders".to_string()));
/// ```
#[ohno::error]
#[display("invalid cache configuration: {kind}")]
pub struct ConfigError {
    kind: ConfigErrorKind,
}

impl ConfigError {
    /// Returns the reason the configuration was rejected.
    #[must_use]
    pub fn kind(&self) -> &ConfigErrorKind {
        &self.kind
    }
}
