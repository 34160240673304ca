//! A single INI section
//!
//! Options live in an [`IndexMap`], so iteration follows first-insertion
//! order. Overwriting an option keeps its slot; removing one shifts the later
//! options down without disturbing their relative order.

use indexmap::IndexMap;

/// Ordered option → raw value mapping
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Section {
    entries: IndexMap<String, String>,
}

impl Section {
    pub fn new() -> Self {
        Self::default()
    }

    /// Raw value of an option in this section only
    pub fn get(&self, option: &str) -> Option<&str> {
        self.entries.get(option).map(String::as_str)
    }

    pub fn contains(&self, option: &str) -> bool {
        self.entries.contains_key(option)
    }

    /// Insert or overwrite; true when the option was not present before
    pub(crate) fn insert(&mut self, option: impl Into<String>, value: impl Into<String>) -> bool {
        self.entries.insert(option.into(), value.into()).is_none()
    }

    pub(crate) fn remove(&mut self, option: &str) -> bool {
        self.entries.shift_remove(option).is_some()
    }

    /// Insertion position of an option
    pub fn position(&self, option: &str) -> Option<usize> {
        self.entries.get_index_of(option)
    }

    /// Option names in insertion order
    pub fn options(&self) -> impl Iterator<Item = &str> {
        self.entries.keys().map(String::as_str)
    }

    /// `(option, raw value)` pairs in insertion order
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.entries.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub(crate) fn as_map(&self) -> &IndexMap<String, String> {
        &self.entries
    }
}
