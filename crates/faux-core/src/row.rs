//! Row representation.
//!
//! A `Row` is an ordered sequence of values matching a table's column
//! order. `NamedRow` pairs a row with its schema for name-based access.

use std::fmt;
use std::sync::Arc;

use crate::schema::Schema;
use crate::value::Value;

/// A single row of values.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Row {
    /// The values in this row, in column order.
    values: Vec<Value>,
}

impl Row {
    /// Creates a new row with the given values.
    pub fn new(values: Vec<Value>) -> Self {
        Self { values }
    }

    /// Creates a row with all NULL values.
    pub fn nulls(num_columns: usize) -> Self {
        Self {
            values: vec![Value::Null; num_columns],
        }
    }

    /// Returns the number of columns in this row.
    pub fn num_columns(&self) -> usize {
        self.values.len()
    }

    /// Returns true if this row has no values.
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Returns the value at the given index.
    pub fn get(&self, index: usize) -> Option<&Value> {
        self.values.get(index)
    }

    /// Sets the value at the given index.
    pub fn set(&mut self, index: usize, value: Value) {
        if index < self.values.len() {
            self.values[index] = value;
        }
    }

    /// Appends a value to this row.
    pub fn push(&mut self, value: Value) {
        self.values.push(value);
    }

    /// Returns an iterator over the values.
    pub fn iter(&self) -> impl Iterator<Item = &Value> {
        self.values.iter()
    }

    /// Returns the values as a slice.
    pub fn values(&self) -> &[Value] {
        &self.values
    }

    /// Consumes the row and returns the values.
    pub fn into_values(self) -> Vec<Value> {
        self.values
    }

    /// Creates a row from a slice of values.
    pub fn from_slice(values: &[Value]) -> Self {
        Self {
            values: values.to_vec(),
        }
    }
}

impl From<Vec<Value>> for Row {
    fn from(values: Vec<Value>) -> Self {
        Self::new(values)
    }
}

impl IntoIterator for Row {
    type Item = Value;
    type IntoIter = std::vec::IntoIter<Value>;

    fn into_iter(self) -> Self::IntoIter {
        self.values.into_iter()
    }
}

impl fmt::Display for Row {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "(")?;
        for (i, value) in self.values.iter().enumerate() {
            if i > 0 {
                write!(f, ", ")?;
            }
            write!(f, "{}", value)?;
        }
        write!(f, ")")
    }
}

/// A row with an associated schema for name-based access.
#[derive(Debug, Clone)]
pub struct NamedRow {
    /// The row data.
    pub row: Row,
    /// The schema.
    pub schema: Arc<Schema>,
}

impl NamedRow {
    /// Creates a new named row.
    pub fn new(row: Row, schema: Arc<Schema>) -> Self {
        Self { row, schema }
    }

    /// Returns the value for a column by name.
    pub fn value(&self, name: &str) -> Option<&Value> {
        self.schema.index_of(name).and_then(|i| self.row.get(i))
    }

    /// Returns the number of columns.
    pub fn num_columns(&self) -> usize {
        self.row.num_columns()
    }
}
