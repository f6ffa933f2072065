//! # Immutable binding snapshot.
//!
//! [`Bindings`] holds the name→value pairs placeholders are substituted with.
//! It is captured **once** at startup ([`Bindings::from_env`]) and passed by
//! reference to the renderer and supervisor, so late environment mutation can
//! never reorder the bootstrap.
//!
//! An absent value and an empty value are the same thing: missing. Credentials
//! are never defaulted silently.

use std::collections::HashMap;

/// Immutable snapshot of placeholder bindings.
#[derive(Clone, Debug, Default)]
pub struct Bindings {
    values: HashMap<String, String>,
}

impl Bindings {
    /// Creates an empty set of bindings.
    pub fn new() -> Self {
        Self::default()
    }

    /// Captures the current process environment as a snapshot.
    ///
    /// Invalid-unicode entries are skipped; placeholder names are valid
    /// unicode by construction, so such entries could never match anyway.
    pub fn from_env() -> Self {
        Self {
            values: std::env::vars().collect(),
        }
    }

    /// Adds a binding, replacing any previous value for the name.
    pub fn insert(&mut self, name: impl Into<String>, value: impl Into<String>) {
        self.values.insert(name.into(), value.into());
    }

    /// Builder-style [`Bindings::insert`].
    pub fn with(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.insert(name, value);
        self
    }

    /// Resolves a name to its value.
    ///
    /// Returns `None` when the name is absent **or** bound to an empty string;
    /// both fail closed at render time.
    pub fn resolve(&self, name: &str) -> Option<&str> {
        match self.values.get(name) {
            Some(v) if !v.is_empty() => Some(v.as_str()),
            _ => None,
        }
    }

    /// Returns every name from `names` that does not resolve, preserving order.
    pub fn missing<'a, I>(&self, names: I) -> Vec<String>
    where
        I: IntoIterator<Item = &'a str>,
    {
        names
            .into_iter()
            .filter(|n| self.resolve(n).is_none())
            .map(str::to_string)
            .collect()
    }

    /// Number of bindings in the snapshot (empty values included).
    pub fn len(&self) -> usize {
        self.values.len()
    }

    /// True if the snapshot holds no bindings at all.
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_value_does_not_resolve() {
        let b = Bindings::new().with("USER", "alice").with("PASS", "");
        assert_eq!(b.resolve("USER"), Some("alice"));
        assert_eq!(b.resolve("PASS"), None);
        assert_eq!(b.resolve("HOST"), None);
    }

    #[test]
    fn missing_preserves_order() {
        let b = Bindings::new().with("B", "x");
        assert_eq!(b.missing(["A", "B", "C"]), vec!["A", "C"]);
    }
}
