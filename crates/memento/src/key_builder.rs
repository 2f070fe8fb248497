// Copyright (c) Microsoft Corporation.
// Licensed under the MIT License.

//! Deterministic cache keys from a call site and its arguments.
//!
//! A key is a prefix followed by one `" {name} = '{value}'"` fragment per
//! selected parameter, in declaration order:
//!
//! ```
//! use memento::{CallSite, KeyBuilder, KeyOptions};
//!
//! let site = CallSite::new("shop.Orders", "find").with_parameters(["customer", "page"]);
//! let builder = KeyBuilder::new(&site, &KeyOptions::new());
//!
//! assert_eq!(
//!     builder.build(&["alice".into(), 2_u32.into()]),
//!     "shop.Orders.find customer = 'alice' page = '2'"
//! );
//! ```

use std::{collections::HashSet, fmt::Write};

use crate::{CallSite, ConfigError, ConfigErrorKind, KeyArg};

/// How arguments take part in a key.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum KeyBehavior {
    /// Selected parameters are rendered after the prefix.
    #[default]
    Default,

    /// No parameter is rendered; every call shares the prefix as its key.
    IgnoreParameters,
}

/// Options controlling key construction for one call site.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct KeyOptions {
    prefix: Option<String>,
    parameters: Option<String>,
    behavior: KeyBehavior,
}

impl KeyOptions {
    /// Creates options that render every parameter after the default prefix.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Replaces the default `"{type}.{method}"` prefix. Blank prefixes are ignored.
    #[must_use]
    pub fn prefix(mut self, prefix: impl Into<String>) -> Self {
        self.prefix = Some(prefix.into());
        self
    }

    /// Restricts the key to a comma-separated list of parameter names.
    ///
    /// The listed order does not matter. Parameters are always rendered in
    /// declaration order.
    #[must_use]
    pub fn parameters(mut self, parameters: impl Into<String>) -> Self {
        self.parameters = Some(parameters.into());
        self
    }

    /// Sets the key behavior.
    #[must_use]
    pub fn behavior(mut self, behavior: KeyBehavior) -> Self {
        self.behavior = behavior;
        self
    }

    fn filter(&self) -> Option<Vec<&str>> {
        let items: Vec<&str> = self
            .parameters
            .as_deref()?
            .split(',')
            .map(str::trim)
            .filter(|item| !item.is_empty())
            .collect();
        (!items.is_empty()).then_some(items)
    }
}

/// Renders cache keys for one call site.
///
/// Built once, then used for every call. Rendering is a pure function of the
/// arguments. Arguments missing at the end of the slice render as null.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct KeyBuilder {
    prefix: String,
    selected: Vec<(usize, String)>,
}

impl KeyBuilder {
    /// Creates a key builder.
    ///
    /// Filter entries that name no declared parameter are ignored. Use
    /// [`KeyBuilder::validated`] to reject them instead.
    #[must_use]
    pub fn new(call_site: &CallSite, options: &KeyOptions) -> Self {
        let prefix = match options.prefix.as_deref() {
            Some(prefix) if !prefix.trim().is_empty() => prefix.to_owned(),
            _ => call_site.qualified_name(),
        };

        let selected = match options.behavior {
            KeyBehavior::IgnoreParameters => Vec::new(),
            KeyBehavior::Default => {
                let filter = options.filter();
                call_site
                    .parameters()
                    .enumerate()
                    .filter(|(_, name)| filter.as_ref().is_none_or(|filter| filter.contains(name)))
                    .map(|(index, name)| (index, name.to_owned()))
                    .collect()
            }
        };

        Self { prefix, selected }
    }

    /// Creates a key builder after checking the call site and the filter.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigErrorKind::DuplicateParameter`] if the call site declares a
    /// parameter name twice, and [`ConfigErrorKind::UnknownKeyParameter`] if the
    /// filter names a parameter the call site does not declare.
    pub fn validated(call_site: &CallSite, options: &KeyOptions) -> Result<Self, ConfigError> {
        let mut declared = HashSet::new();
        for name in call_site.parameters() {
            if !declared.insert(name) {
                return Err(ConfigError::new(ConfigErrorKind::DuplicateParameter(name.to_owned())));
            }
        }

        if options.behavior == KeyBehavior::Default
            && let Some(filter) = options.filter()
            && let Some(unknown) = filter.iter().find(|name| !declared.contains(*name))
        {
            return Err(ConfigError::new(ConfigErrorKind::UnknownKeyParameter((*unknown).to_owned())));
        }

        Ok(Self::new(call_site, options))
    }

    /// Renders the key for one call.
    ///
    /// Each [`CacheKey`](crate::CacheKey) argument is asked for its key exactly once.
    #[must_use]
    pub fn build(&self, args: &[KeyArg<'_>]) -> String {
        if self.selected.is_empty() {
            return self.prefix.clone();
        }

        let mut key = self.prefix.clone();
        for (index, name) in &self.selected {
            let arg = args.get(*index).copied().unwrap_or(KeyArg::Null);
            // Writing to a String cannot fail.
            let _ = write!(key, " {name} = '{arg}'");
        }
        key
    }

    /// Returns the key prefix.
    #[must_use]
    pub fn prefix(&self) -> &str {
        &self.prefix
    }

    /// Returns the names of the parameters that take part in the key, in declaration order.
    pub fn parameters_used(&self) -> impl ExactSizeIterator<Item = &str> {
        self.selected.iter().map(|(_, name)| name.as_str())
    }
}
