//! Filter parameters driving search and browse views.
//!
//! A [`FilterSet`] is an ordered list of named, optional string values. Absence of a key
//! means "no constraint"; two sets are equal when their present keys carry equal values,
//! regardless of insertion order.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Ordered set of named, optional filter values.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct FilterSet {
    entries: Vec<(String, Option<String>)>,
}

impl FilterSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder form of [`FilterSet::set`].
    pub fn with<V: Into<String>>(mut self, name: impl Into<String>, value: Option<V>) -> Self {
        self.set(name, value);
        self
    }

    /// Set or clear a filter. Empty strings are stored as absent.
    pub fn set<V: Into<String>>(&mut self, name: impl Into<String>, value: Option<V>) {
        let name = name.into();
        let value = value.map(Into::into).filter(|v| !v.is_empty());
        match self.entries.iter_mut().find(|(key, _)| *key == name) {
            Some(entry) => entry.1 = value,
            None => self.entries.push((name, value)),
        }
    }

    pub fn get(&self, name: &str) -> Option<&str> {
        self.entries
            .iter()
            .find(|(key, _)| key == name)
            .and_then(|(_, value)| value.as_deref())
    }

    /// Present filters in insertion order.
    pub fn present(&self) -> impl Iterator<Item = (&str, &str)> {
        self.entries
            .iter()
            .filter_map(|(key, value)| value.as_deref().map(|v| (key.as_str(), v)))
    }

    pub fn is_unconstrained(&self) -> bool {
        self.present().next().is_none()
    }

    /// Mark every filter absent, keeping the key order.
    pub fn clear(&mut self) {
        for entry in &mut self.entries {
            entry.1 = None;
        }
    }

    /// Trimmed value of `key`, or `None` when it is absent or blank.
    pub fn subject(&self, key: &str) -> Option<&str> {
        self.get(key).map(str::trim).filter(|v| !v.is_empty())
    }

    fn constraints(&self) -> BTreeMap<&str, &str> {
        self.present().collect()
    }
}

impl PartialEq for FilterSet {
    fn eq(&self, other: &Self) -> bool {
        self.constraints() == other.constraints()
    }
}

impl Eq for FilterSet {}
