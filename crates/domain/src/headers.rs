//! HTTP header types
//!
//! Headers are kept as an ordered list so they reach the transport in
//! a deterministic order, while lookups and overrides are
//! case-insensitive as required by HTTP semantics.

use serde::{Deserialize, Serialize};

use crate::method::HttpMethod;

/// An ordered, case-insensitive header mapping.
///
/// A value of `None` marks a header as explicitly suppressed: it stays
/// in the mapping (so later merges cannot resurrect it) but is never
/// written to the transport.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct HeaderMap {
    items: Vec<(String, Option<String>)>,
}

impl HeaderMap {
    /// Creates an empty header mapping.
    #[must_use]
    pub const fn new() -> Self {
        Self { items: Vec::new() }
    }

    /// Sets a header, replacing any existing entry whose name matches
    /// case-insensitively. The new name's casing wins.
    pub fn set(&mut self, name: impl Into<String>, value: impl Into<String>) {
        self.set_raw(name, Some(value.into()));
    }

    /// Sets a header to an explicit value or marks it suppressed with
    /// `None`.
    pub fn set_raw(&mut self, name: impl Into<String>, value: Option<String>) {
        let name = name.into();
        match self
            .items
            .iter_mut()
            .find(|(existing, _)| existing.eq_ignore_ascii_case(&name))
        {
            Some(entry) => *entry = (name, value),
            None => self.items.push((name, value)),
        }
    }

    /// Returns the value of a header, if present and not suppressed.
    #[must_use]
    pub fn get(&self, name: &str) -> Option<&str> {
        self.items
            .iter()
            .find(|(existing, _)| existing.eq_ignore_ascii_case(name))
            .and_then(|(_, value)| value.as_deref())
    }

    /// Returns true if a header with the given name exists, suppressed
    /// or not.
    #[must_use]
    pub fn contains(&self, name: &str) -> bool {
        self.items
            .iter()
            .any(|(existing, _)| existing.eq_ignore_ascii_case(name))
    }

    /// Removes every entry whose name matches case-insensitively.
    pub fn remove(&mut self, name: &str) {
        self.items
            .retain(|(existing, _)| !existing.eq_ignore_ascii_case(name));
    }

    /// Merges another mapping into this one; entries from `other`
    /// override same-named entries case-insensitively.
    pub fn merge(&mut self, other: &Self) {
        for (name, value) in &other.items {
            self.set_raw(name.clone(), value.clone());
        }
    }

    /// Returns an iterator over the entries in mapping order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, Option<&str>)> {
        self.items
            .iter()
            .map(|(name, value)| (name.as_str(), value.as_deref()))
    }

    /// Returns the number of entries.
    #[must_use]
    #[allow(clippy::missing_const_for_fn)] // Vec::len is not const in stable
    pub fn len(&self) -> usize {
        self.items.len()
    }

    /// Returns true if there are no entries.
    #[must_use]
    #[allow(clippy::missing_const_for_fn)] // Vec::is_empty is not const in stable
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}

impl FromIterator<(String, String)> for HeaderMap {
    fn from_iter<T: IntoIterator<Item = (String, String)>>(iter: T) -> Self {
        let mut map = Self::new();
        for (name, value) in iter {
            map.set(name, value);
        }
        map
    }
}

/// Request headers partitioned into a common bucket plus per-method
/// override buckets.
///
/// Before a request reaches the transport the buckets are flattened
/// into a single [`HeaderMap`] for the resolved method.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct HeaderBuckets {
    /// Headers applied to every method.
    #[serde(default)]
    pub common: HeaderMap,
    #[serde(default)]
    methods: Vec<(HttpMethod, HeaderMap)>,
}

impl HeaderBuckets {
    /// Creates an empty set of buckets.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            common: HeaderMap::new(),
            methods: Vec::new(),
        }
    }

    /// Returns the override bucket for a method, creating it if absent.
    pub fn for_method(&mut self, method: HttpMethod) -> &mut HeaderMap {
        if let Some(index) = self.methods.iter().position(|(m, _)| *m == method) {
            return &mut self.methods[index].1;
        }
        self.methods.push((method, HeaderMap::new()));
        // Just pushed, so the list cannot be empty.
        let index = self.methods.len() - 1;
        &mut self.methods[index].1
    }

    /// Returns the override bucket for a method, if one exists.
    #[must_use]
    pub fn method_bucket(&self, method: HttpMethod) -> Option<&HeaderMap> {
        self.methods
            .iter()
            .find(|(m, _)| *m == method)
            .map(|(_, bucket)| bucket)
    }

    /// Flattens the buckets into one mapping for the given method:
    /// common headers first, then the method bucket overriding
    /// duplicates case-insensitively.
    #[must_use]
    pub fn flatten(&self, method: HttpMethod) -> HeaderMap {
        let mut flat = self.common.clone();
        if let Some(bucket) = self.method_bucket(method) {
            flat.merge(bucket);
        }
        flat
    }
}
