//! Ordered bound-parameter set
//!
//! Placeholder names are derived from column names and prefixed with `:`.
//! Entries keep insertion order; placeholder first-appearance order in the
//! statement text equals entry order, which is what lets drivers bind
//! positionally.

use crate::{Error, Result, Value};

/// Marker prefixing every placeholder name
pub const PLACEHOLDER_MARKER: char = ':';

/// Ordered mapping of placeholder name to bound value
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Parameters {
    entries: Vec<(String, Value)>,
}

impl Parameters {
    pub fn new() -> Self {
        Self::default()
    }

    /// Placeholder text for a column name, e.g. `:username`
    pub fn placeholder(column: &str) -> String {
        format!("{}{}", PLACEHOLDER_MARKER, column)
    }

    /// Append a binding for `column`. Duplicate names are rejected: a second
    /// binding under the same placeholder would silently shadow the first at
    /// the driver.
    pub fn push(&mut self, column: &str, value: Value) -> Result<()> {
        let name = Self::placeholder(column);
        if self.entries.iter().any(|(n, _)| *n == name) {
            return Err(Error::duplicate_column(column));
        }
        self.entries.push((name, value));
        Ok(())
    }

    /// Zip columns with values positionally: the identifier at position `i`
    /// binds the value at position `i`.
    pub fn zip<S: AsRef<str>>(columns: &[S], values: &[Value]) -> Result<Self> {
        if columns.len() != values.len() {
            return Err(Error::CountMismatch {
                columns: columns.len(),
                values: values.len(),
            });
        }
        let mut params = Self::new();
        for (column, value) in columns.iter().zip(values.iter()) {
            params.push(column.as_ref(), value.clone())?;
        }
        Ok(params)
    }

    /// Look up a binding by placeholder, with or without the marker
    pub fn get(&self, placeholder: &str) -> Option<&Value> {
        let name = placeholder.strip_prefix(PLACEHOLDER_MARKER).unwrap_or(placeholder);
        let name = Self::placeholder(name);
        self.entries
            .iter()
            .find(|(n, _)| *n == name)
            .map(|(_, v)| v)
    }

    /// Iterate bindings in insertion order
    pub fn iter(&self) -> impl Iterator<Item = (&str, &Value)> {
        self.entries.iter().map(|(n, v)| (n.as_str(), v))
    }

    /// Iterate bound values in insertion order
    pub fn values(&self) -> impl Iterator<Item = &Value> {
        self.entries.iter().map(|(_, v)| v)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
