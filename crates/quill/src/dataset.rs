//! Ordered column/value sets for INSERT and UPDATE.

use crate::connection::Connection;
use crate::value::{Value, convert_types};

/// A single entry in a [`DataSet`].
#[derive(Debug, Clone, PartialEq)]
pub enum DataEntry {
    /// A value, converted to a literal through the connection
    Value(Value),
    /// A SQL expression emitted verbatim (e.g. `NOW()`, `count + 1`)
    Literal(String),
}

impl DataEntry {
    pub(crate) fn render(&self, conn: &dyn Connection) -> String {
        match self {
            DataEntry::Value(v) => convert_types(v, conn),
            DataEntry::Literal(expr) => expr.clone(),
        }
    }
}

/// Column → value pairs, kept in insertion order.
///
/// Adding a column that is already present replaces its entry in place, so
/// the column keeps its original position.
///
/// # Example
/// ```ignore
/// let data = DataSet::new()
///     .add("username", "alice")
///     .add("age", 30)
///     .add_literal("created_at", "NOW()");
/// ```
#[derive(Debug, Clone, Default, PartialEq)]
pub struct DataSet {
    entries: Vec<(String, DataEntry)>,
}

impl DataSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add (or replace) a value.
    pub fn add(mut self, column: impl Into<String>, value: impl Into<Value>) -> Self {
        self.insert(column.into(), DataEntry::Value(value.into()));
        self
    }

    /// Add (or replace) a literal SQL expression.
    ///
    /// # Safety
    ///
    /// This directly concatenates SQL. The caller must ensure safety.
    pub fn add_literal(mut self, column: impl Into<String>, expr: impl Into<String>) -> Self {
        self.insert(column.into(), DataEntry::Literal(expr.into()));
        self
    }

    /// In-place variant of [`DataSet::add`].
    pub fn set(&mut self, column: impl Into<String>, value: impl Into<Value>) -> &mut Self {
        self.insert(column.into(), DataEntry::Value(value.into()));
        self
    }

    fn insert(&mut self, column: String, entry: DataEntry) {
        match self.entries.iter_mut().find(|(c, _)| *c == column) {
            Some(slot) => slot.1 = entry,
            None => self.entries.push((column, entry)),
        }
    }

    pub fn get(&self, column: &str) -> Option<&DataEntry> {
        self.entries.iter().find(|(c, _)| c == column).map(|(_, e)| e)
    }

    pub fn remove(&mut self, column: &str) -> Option<DataEntry> {
        let idx = self.entries.iter().position(|(c, _)| c == column)?;
        Some(self.entries.remove(idx).1)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Column names in order.
    pub fn columns(&self) -> Vec<&str> {
        self.entries.iter().map(|(c, _)| c.as_str()).collect()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &DataEntry)> {
        self.entries.iter().map(|(c, e)| (c.as_str(), e))
    }
}

impl<K, V> FromIterator<(K, V)> for DataSet
where
    K: Into<String>,
    V: Into<Value>,
{
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut data = DataSet::new();
        for (k, v) in iter {
            data.set(k, v);
        }
        data
    }
}
