// Copyright (c) Microsoft Corporation.
// Licensed under the MIT License.

//! Argument values as seen by the key builder.

use std::fmt::{self, Debug, Display, Formatter};

/// A type that derives its own cache key fragment.
///
/// Implement this for argument types whose `Display` output is unsuitable as part
/// of a cache key, or that have no `Display` at all. The returned string is used
/// verbatim.
///
/// # Examples
///
/// ```
/// use memento::{CacheKey, KeyArg};
///
/// struct CustomerId {
///     tenant: u32,
///     id: u64,
/// }
///
/// impl CacheKey for CustomerId {
///     fn cache_key(&self) -> String {
///         format!("{}/{}", self.tenant, self.id)
///     }
/// }
///
/// let customer = CustomerId { tenant: 7, id: 42 };
/// assert_eq!(KeyArg::keyed(&customer).to_string(), "7/42");
/// ```
///
/// # Deriving
///
/// `#[derive(CacheKey)]` concatenates the `Display` output of the fields marked
/// `#[cache_key]`, in declaration order and without separators. Unmarked fields
/// do not take part.
///
/// ```
/// use memento::{CacheKey, KeyArg};
///
/// #[derive(CacheKey)]
/// struct Search {
///     #[cache_key]
///     tenant: u32,
///     page_size: usize,
///     #[cache_key]
///     term: String,
/// }
///
/// let search = Search { tenant: 7, page_size: 50, term: "boots".to_string() };
/// assert_eq!(search.cache_key(), "7boots");
/// assert_eq!(KeyArg::keyed(&search).to_string(), "7boots");
/// ```
pub trait CacheKey {
    /// Returns the key fragment for this value.
    fn cache_key(&self) -> String;
}

/// One runtime argument of a cached call.
///
/// The variant is picked once through a `From` conversion, so rendering never
/// inspects types at call time. `Null` renders as an empty string.
///
/// # Examples
///
/// ```
/// use memento::KeyArg;
///
/// let args: [KeyArg<'_>; 4] = ["abc".into(), 42_i32.into(), None::<&str>.into(), true.into()];
/// let rendered: Vec<String> = args.iter().map(ToString::to_string).collect();
/// assert_eq!(rendered, ["abc", "42", "", "true"]);
/// ```
#[derive(Clone, Copy)]
pub enum KeyArg<'a> {
    /// An absent value.
    Null,
    /// A string.
    Str(&'a str),
    /// A signed integer.
    Int(i64),
    /// An unsigned integer.
    UInt(u64),
    /// A floating-point number.
    Float(f64),
    /// A boolean.
    Bool(bool),
    /// A character.
    Char(char),
    /// A value that renders its own key fragment.
    Keyed(&'a dyn CacheKey),
    /// Any other value, rendered with `Display`.
    Display(&'a dyn Display),
}

impl<'a> KeyArg<'a> {
    /// Wraps a value that implements [`CacheKey`].
    #[must_use]
    pub fn keyed(value: &'a dyn CacheKey) -> Self {
        Self::Keyed(value)
    }

    /// Wraps any displayable value.
    #[must_use]
    pub fn display(value: &'a dyn Display) -> Self {
        Self::Display(value)
    }

    /// Returns `true` for [`KeyArg::Null`].
    #[must_use]
    pub fn is_null(&self) -> bool {
        matches!(self, Self::Null)
    }
}

impl Display for KeyArg<'_> {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        match self {
            Self::Null => Ok(()),
            Self::Str(value) => f.write_str(value),
            Self::Int(value) => Display::fmt(value, f),
            Self::UInt(value) => Display::fmt(value, f),
            Self::Float(value) => Display::fmt(value, f),
            Self::Bool(value) => Display::fmt(value, f),
            Self::Char(value) => Display::fmt(value, f),
            Self::Keyed(value) => f.write_str(&value.cache_key()),
            Self::Display(value) => Display::fmt(value, f),
        }
    }
}

impl Debug for KeyArg<'_> {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        match self {
            Self::Null => f.write_str("Null"),
            Self::Str(value) => f.debug_tuple("Str").field(value).finish(),
            Self::Int(value) => f.debug_tuple("Int").field(value).finish(),
            Self::UInt(value) => f.debug_tuple("UInt").field(value).finish(),
            Self::Float(value) => f.debug_tuple("Float").field(value).finish(),
            Self::Bool(value) => f.debug_tuple("Bool").field(value).finish(),
            Self::Char(value) => f.debug_tuple("Char").field(value).finish(),
            Self::Keyed(_) => f.write_str("Keyed(..)"),
            Self::Display(_) => f.write_str("Display(..)"),
        }
    }
}

macro_rules! key_arg_from {
    ($variant:ident($target:ty): $($source:ty),+) => {
        $(
            impl From<$source> for KeyArg<'_> {
                fn from(value: $source) -> Self {
                    Self::$variant(<$target>::from(value))
                }
            }
        )+
    };
}

key_arg_from!(Int(i64): i8, i16, i32, i64);
key_arg_from!(UInt(u64): u8, u16, u32, u64);
key_arg_from!(Float(f64): f64);
key_arg_from!(Bool(bool): bool);
key_arg_from!(Char(char): char);

impl From<isize> for KeyArg<'_> {
    fn from(value: isize) -> Self {
        Self::Int(value as i64)
    }
}

impl From<usize> for KeyArg<'_> {
    fn from(value: usize) -> Self {
        Self::UInt(value as u64)
    }
}

impl<'a> From<&'a str> for KeyArg<'a> {
    fn from(value: &'a str) -> Self {
        Self::Str(value)
    }
}

impl<'a> From<&'a String> for KeyArg<'a> {
    fn from(value: &'a String) -> Self {
        Self::Str(value)
    }
}

impl<'a, T> From<Option<T>> for KeyArg<'a>
where
    T: Into<Self>,
{
    fn from(value: Option<T>) -> Self {
        value.map_or(Self::Null, Into::into)
    }
}
