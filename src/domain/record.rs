//! Core record model shared by both pipeline phases.
//!
//! A `SchoolRecord` is an ordered field-name → value mapping rather than a
//! fixed struct: portals differ in which columns they expose, and the store's
//! column set is simply the union of every field seen, in first-seen order.

use serde::{Deserialize, Serialize};

/// One school, as extracted from a listing row and later enriched in place.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SchoolRecord {
    fields: Vec<(String, String)>,
}

impl SchoolRecord {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, name: &str) -> Option<&str> {
        self.fields
            .iter()
            .find(|(n, _)| n == name)
            .map(|(_, v)| v.as_str())
    }

    /// Set a field, overwriting any existing value. New fields keep insertion
    /// order, which is what drives column order in the store.
    pub fn set(&mut self, name: impl Into<String>, value: impl Into<String>) {
        let name = name.into();
        let value = value.into();
        match self.fields.iter_mut().find(|(n, _)| *n == name) {
            Some((_, v)) => *v = value,
            None => self.fields.push((name, value)),
        }
    }

    /// Monotonic merge: fill the field only if it is currently absent or
    /// empty. Returns whether the value was written.
    pub fn set_if_empty(&mut self, name: &str, value: impl Into<String>) -> bool {
        if self.is_field_empty(name) {
            self.set(name, value);
            true
        } else {
            false
        }
    }

    pub fn is_field_empty(&self, name: &str) -> bool {
        self.get(name).is_none_or(|v| v.trim().is_empty())
    }

    pub fn field_names(&self) -> impl Iterator<Item = &str> {
        self.fields.iter().map(|(n, _)| n.as_str())
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }
}

/// Grade-level labels constraining which listing rows are collected.
///
/// An empty set accepts everything. A row matches when any label occurs,
/// case-insensitively, in the row's category field.
#[derive(Debug, Clone, Default)]
pub struct FilterSet {
    labels: Vec<String>,
}

impl FilterSet {
    pub fn new<I, S>(labels: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            labels: labels.into_iter().map(Into::into).collect(),
        }
    }

    pub fn empty() -> Self {
        Self::default()
    }

    pub fn is_empty(&self) -> bool {
        self.labels.is_empty()
    }

    pub fn labels(&self) -> &[String] {
        &self.labels
    }

    pub fn matches(&self, category: &str) -> bool {
        if self.labels.is_empty() {
            return true;
        }
        let category = category.to_lowercase();
        self.labels
            .iter()
            .any(|label| category.contains(&label.to_lowercase()))
    }
}

/// Ordered collection of records plus the union of their field names.
///
/// Records are only ever appended or mutated in place; columns are only ever
/// added. Missing values render as empty cells when persisted.
#[derive(Debug, Clone, Default)]
pub struct RecordStore {
    columns: Vec<String>,
    records: Vec<SchoolRecord>,
}

impl RecordStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_parts(columns: Vec<String>, records: Vec<SchoolRecord>) -> Self {
        let mut store = Self {
            columns,
            records: Vec::new(),
        };
        for record in records {
            store.push(record);
        }
        store
    }

    pub fn push(&mut self, record: SchoolRecord) {
        self.absorb_columns(&record);
        self.records.push(record);
    }

    /// Register a column without touching any record, so the header exists
    /// before the first value does (enrichment placeholders).
    pub fn ensure_column(&mut self, name: &str) {
        if !self.columns.iter().any(|c| c == name) {
            self.columns.push(name.to_string());
        }
    }

    fn absorb_columns(&mut self, record: &SchoolRecord) {
        for name in record.field_names() {
            if !self.columns.iter().any(|c| c == name) {
                self.columns.push(name.to_string());
            }
        }
    }

    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &SchoolRecord> {
        self.records.iter()
    }

    pub fn iter_mut(&mut self) -> impl Iterator<Item = &mut SchoolRecord> {
        self.records.iter_mut()
    }

    pub fn get(&self, index: usize) -> Option<&SchoolRecord> {
        self.records.get(index)
    }

    pub fn get_mut(&mut self, index: usize) -> Option<&mut SchoolRecord> {
        self.records.get_mut(index)
    }
}
