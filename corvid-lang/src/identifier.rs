//! Interned names: identifiers, type names, field and alternative names.
//!
//! Names are cached to avoid duplication: two [`Name`]s spelled the same
//! way are the same object in memory, which keeps `HashMap<Name, _>`
//! lookups (the environment, the type-variable renaming tables, the
//! linker's offset table) cheap to hash and compare.
//!
//! # Examples
//! ```
//! # use corvid_lang::identifier::Name;
//! let foo = Name::new("foo");
//! let also_foo = Name::new("foo");
//! assert_eq!(foo, also_foo);
//! assert_eq!(foo.strong_count(), 3); // one for each binding, one for the cache.
//! ```
use std::{
    collections::HashMap,
    fmt::{self, Display, Formatter},
    hash::Hash,
    sync::{Arc, OnceLock, RwLock},
};

use serde::{de::Visitor, Deserialize, Serialize};

/// In-use names.
static NAME_CACHE: OnceLock<RwLock<HashMap<String, Name>>> = OnceLock::new();

fn name_cache<'a>() -> &'a RwLock<HashMap<String, Name>> {
    NAME_CACHE.get_or_init(|| RwLock::new(HashMap::new()))
}

/// An interned name: a variable, a type, a record field, or a union
/// alternative.
///
/// See the [module-level documentation](index.html) for more information.
#[derive(Clone, Debug, Eq, PartialEq, PartialOrd, Ord, Hash)]
pub struct Name(Arc<str>);

impl Name {
    /// Creates a new name or returns a clone of an existing one from the
    /// cache.
    pub fn new<T: AsRef<str>>(text: T) -> Self {
        let text = text.as_ref();
        let cache = name_cache().read().unwrap();
        if let Some(existing) = cache.get(text) {
            return existing.clone();
        }
        drop(cache);

        let mut cache = name_cache().write().unwrap();
        if let Some(existing) = cache.get(text) {
            return existing.clone();
        }
        let fresh = Name(Arc::from(text));
        cache.insert(text.to_string(), fresh.clone());
        fresh
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn strong_count(&self) -> usize {
        Arc::strong_count(&self.0)
    }

    /// A constructor/type name starts with an upper-case letter
    /// (spec.md §4.3: "upper-case-initial identifiers are reserved for
    /// type names").
    pub fn is_constructor_name(&self) -> bool {
        self.0.chars().next().is_some_and(char::is_uppercase)
    }
}

impl AsRef<str> for Name {
    fn as_ref(&self) -> &str {
        self.as_str()
    }
}

impl From<&str> for Name {
    fn from(text: &str) -> Self {
        Name::new(text)
    }
}

impl From<String> for Name {
    fn from(text: String) -> Self {
        Name::new(text)
    }
}

impl Display for Name {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl Serialize for Name {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        serializer.serialize_str(self.as_str())
    }
}

impl<'de> Deserialize<'de> for Name {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        deserializer.deserialize_str(NameVisitor)
    }
}

struct NameVisitor;

impl<'de> Visitor<'de> for NameVisitor {
    type Value = Name;

    fn expecting(&self, formatter: &mut Formatter<'_>) -> fmt::Result {
        formatter.write_str("a UTF-8 string")
    }

    fn visit_str<E>(self, v: &str) -> Result<Self::Value, E>
    where
        E: serde::de::Error,
    {
        Ok(Name::new(v))
    }

    fn visit_string<E>(self, v: String) -> Result<Self::Value, E>
    where
        E: serde::de::Error,
    {
        self.visit_str(&v)
    }
}

/// Returns a fresh type-variable-style name by index: `a`, `b`, ...,
/// `z`, `aa`, `ab`, ... This matches the bijective base-26 numbering
/// `types/typecheck/infer.go`'s `newVar` uses for generating fresh
/// type variables during instantiation.
pub fn fresh_var_name(index: usize) -> String {
    let mut n = index + 1;
    let mut letters = Vec::new();
    while n > 0 {
        let rem = (n - 1) % 26;
        letters.push((b'a' + rem as u8) as char);
        n = (n - 1) / 26;
    }
    letters.iter().rev().collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn interning_dedups() {
        let a = Name::new("foo");
        let b = Name::new("foo");
        assert_eq!(a, b);
        assert!(Arc::ptr_eq(&a.0, &b.0));
    }

    #[test]
    fn constructor_name_detection() {
        assert!(Name::new("List").is_constructor_name());
        assert!(!Name::new("list").is_constructor_name());
        assert!(!Name::new("_x").is_constructor_name());
    }

    #[test]
    fn fresh_names_are_bijective_base26() {
        assert_eq!(fresh_var_name(0), "a");
        assert_eq!(fresh_var_name(25), "z");
        assert_eq!(fresh_var_name(26), "aa");
        assert_eq!(fresh_var_name(27), "ab");
    }
}
