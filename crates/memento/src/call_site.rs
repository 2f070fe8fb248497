// Copyright (c) Microsoft Corporation.
// Licensed under the MIT License.

/// Static description of a cached method.
///
/// A call site names the declaring type, the method and its parameters in
/// declaration order. It can also carry a type-level default settings context
/// that applies to every method of the type unless a call site overrides it.
///
/// # Examples
///
/// ```
/// use memento::CallSite;
///
/// let site = CallSite::new("shop::Orders", "find")
///     .with_parameters(["customer", "status"])
///     .with_context("orders");
///
/// assert_eq!(site.qualified_name(), "shop::Orders.find");
/// assert_eq!(site.parameters().collect::<Vec<_>>(), ["customer", "status"]);
/// assert_eq!(site.context(), Some("orders"));
/// ```
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CallSite {
    type_name: String,
    method_name: String,
    parameters: Vec<String>,
    context: Option<String>,
}

impl CallSite {
    /// Creates a call site for `method_name` on `type_name` with no parameters.
    #[must_use]
    pub fn new(type_name: impl Into<String>, method_name: impl Into<String>) -> Self {
        Self {
            type_name: type_name.into(),
            method_name: method_name.into(),
            parameters: Vec::new(),
            context: None,
        }
    }

    /// Creates a call site for `method_name` declared on `T`, using its full type path.
    ///
    /// ```
    /// use memento::CallSite;
    ///
    /// struct Catalog;
    ///
    /// let site = CallSite::for_type::<Catalog>("lookup");
    /// assert!(site.type_name().ends_with("Catalog"));
    /// ```
    #[must_use]
    pub fn for_type<T: ?Sized>(method_name: impl Into<String>) -> Self {
        Self::new(std::any::type_name::<T>(), method_name)
    }

    /// Appends parameters in declaration order.
    #[must_use]
    pub fn with_parameters<I, P>(mut self, parameters: I) -> Self
    where
        I: IntoIterator<Item = P>,
        P: Into<String>,
    {
        self.parameters.extend(parameters.into_iter().map(Into::into));
        self
    }

    /// Appends a single parameter.
    #[must_use]
    pub fn with_parameter(mut self, name: impl Into<String>) -> Self {
        self.parameters.push(name.into());
        self
    }

    /// Sets the type-level default settings context.
    #[must_use]
    pub fn with_context(mut self, context: impl Into<String>) -> Self {
        self.context = Some(context.into());
        self
    }

    /// Returns the declaring type name.
    #[must_use]
    pub fn type_name(&self) -> &str {
        &self.type_name
    }

    /// Returns the method name.
    #[must_use]
    pub fn method_name(&self) -> &str {
        &self.method_name
    }

    /// Returns `"{type_name}.{method_name}"`.
    #[must_use]
    pub fn qualified_name(&self) -> String {
        format!("{}.{}", self.type_name, self.method_name)
    }

    /// Returns the parameter names in declaration order.
    pub fn parameters(&self) -> impl ExactSizeIterator<Item = &str> {
        self.parameters.iter().map(String::as_str)
    }

    /// Returns the type-level default context, if any.
    #[must_use]
    pub fn context(&self) -> Option<&str> {
        self.context.as_deref()
    }
}
