//! Query results returned by the connection facade.

use std::sync::Arc;

use faux_core::{NamedRow, Row, Schema, Value};

/// An ordered set of rows with their schema.
#[derive(Debug, Clone)]
pub struct RowSet {
    /// Schema of the rows.
    pub schema: Arc<Schema>,
    /// Rows in insertion order.
    pub rows: Vec<Row>,
}

impl RowSet {
    /// Creates a new row set.
    pub fn new(schema: Arc<Schema>, rows: Vec<Row>) -> Self {
        Self { schema, rows }
    }

    /// Creates an empty row set with the given schema.
    pub fn empty(schema: Arc<Schema>) -> Self {
        Self {
            schema,
            rows: Vec::new(),
        }
    }

    /// Returns the number of rows.
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    /// Returns true if there are no rows.
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Returns an iterator over the rows.
    pub fn iter(&self) -> impl Iterator<Item = &Row> {
        self.rows.iter()
    }

    /// Returns the first row, if any.
    pub fn first(&self) -> Option<&Row> {
        self.rows.first()
    }

    /// Returns the value at `(row, column)` by column name.
    pub fn value(&self, row: usize, column: &str) -> Option<&Value> {
        let idx = self.schema.index_of(column)?;
        self.rows.get(row).and_then(|r| r.get(idx))
    }

    /// Returns the row at the given index paired with the schema for
    /// name-based access.
    pub fn named(&self, row: usize) -> Option<NamedRow> {
        self.rows
            .get(row)
            .cloned()
            .map(|r| NamedRow::new(r, self.schema.clone()))
    }
}

impl IntoIterator for RowSet {
    type Item = Row;
    type IntoIter = std::vec::IntoIter<Row>;

    fn into_iter(self) -> Self::IntoIter {
        self.rows.into_iter()
    }
}
