//! Per-table row storage.
//!
//! `TableStore` holds the rows of a single table in insertion order with
//! a primary-key hash index on top. Insertion order is what scans and
//! finds yield, so results are stable and deterministic.

use std::collections::HashMap;

use parking_lot::RwLock;

use crate::error::{StoreError, StoreResult};
use crate::row::Row;
use crate::schema::TableDef;
use crate::value::Value;

/// Per-table row store.
#[derive(Debug)]
pub struct TableStore {
    /// Table definition.
    def: TableDef,
    /// Row data and indexes.
    inner: RwLock<TableInner>,
}

#[derive(Debug, Default)]
struct TableInner {
    /// Rows in insertion order.
    rows: Vec<Row>,
    /// Primary-key values to row position.
    index: HashMap<Vec<Value>, usize>,
    /// Next value handed out for the identity column.
    next_identity: i64,
}

impl TableStore {
    /// Creates a new empty table store.
    pub fn new(def: TableDef) -> Self {
        Self {
            def,
            inner: RwLock::new(TableInner {
                rows: Vec::new(),
                index: HashMap::new(),
                next_identity: 1,
            }),
        }
    }

    /// Returns the table definition.
    pub fn def(&self) -> &TableDef {
        &self.def
    }

    /// Returns the table name.
    pub fn name(&self) -> &str {
        &self.def.name
    }

    /// Returns the number of rows in the table.
    pub fn row_count(&self) -> usize {
        self.inner.read().rows.len()
    }

    /// Returns true if the table is empty.
    pub fn is_empty(&self) -> bool {
        self.inner.read().rows.is_empty()
    }

    /// Inserts a row, returning its primary-key values.
    ///
    /// The identity column, if the table has one, is auto-assigned when
    /// the incoming value is NULL. The store is left unchanged when any
    /// validation fails.
    pub fn insert(&self, mut row: Row) -> StoreResult<Vec<Value>> {
        if row.num_columns() != self.def.schema.len() {
            return Err(StoreError::SchemaMismatch(format!(
                "table '{}' expects {} columns, got {}",
                self.def.name,
                self.def.schema.len(),
                row.num_columns()
            )));
        }

        let mut inner = self.inner.write();

        if let Some(idx) = self.def.identity_column() {
            match row.get(idx) {
                Some(Value::Null) | None => {
                    row.set(idx, Value::Int(inner.next_identity));
                    inner.next_identity += 1;
                }
                Some(Value::Int(v)) => {
                    // Keep auto-assignment ahead of explicit keys.
                    inner.next_identity = inner.next_identity.max(v + 1);
                }
                Some(other) => {
                    return Err(StoreError::SchemaMismatch(format!(
                        "identity column in table '{}' requires INT, got {}",
                        self.def.name, other
                    )));
                }
            }
        }

        for (i, column) in self.def.schema.columns().iter().enumerate() {
            // Arity was checked above, so the index is always in range.
            let Some(value) = row.get(i) else { continue };
            if value.is_null() {
                if !column.nullable {
                    return Err(StoreError::MissingColumn {
                        table: self.def.name.clone(),
                        column: column.name.clone(),
                    });
                }
                continue;
            }
            if value.data_type() != Some(column.data_type) {
                return Err(StoreError::SchemaMismatch(format!(
                    "column '{}' in table '{}' expects {}, got {}",
                    column.name, self.def.name, column.data_type, value
                )));
            }
        }

        let key = self.key_of(&row);
        if !key.is_empty() {
            if inner.index.contains_key(&key) {
                return Err(StoreError::DuplicatePrimaryKey {
                    table: self.def.name.clone(),
                    key: key[0].clone(),
                });
            }
            let pos = inner.rows.len();
            inner.index.insert(key.clone(), pos);
        }
        inner.rows.push(row);

        Ok(key)
    }

    /// Gets a row by primary key values.
    pub fn get(&self, key_values: &[Value]) -> Option<Row> {
        let inner = self.inner.read();
        inner
            .index
            .get(key_values)
            .and_then(|&pos| inner.rows.get(pos))
            .cloned()
    }

    /// Deletes a row by primary key values. Returns true if a row was
    /// removed.
    pub fn delete(&self, key_values: &[Value]) -> bool {
        let mut inner = self.inner.write();
        let Some(pos) = inner.index.remove(key_values) else {
            return false;
        };
        inner.rows.remove(pos);
        // Positions after the removed row shift down by one.
        for slot in inner.index.values_mut() {
            if *slot > pos {
                *slot -= 1;
            }
        }
        true
    }

    /// Scans all rows in insertion order.
    ///
    /// The iterator is derived from a snapshot of the current state, so
    /// it is finite and a fresh call restarts from the beginning.
    pub fn scan(&self) -> ScanIter {
        ScanIter::new(self.inner.read().rows.clone())
    }

    /// Removes all rows. The identity counter is reset as well.
    pub fn clear(&self) {
        let mut inner = self.inner.write();
        inner.rows.clear();
        inner.index.clear();
        inner.next_identity = 1;
    }

    /// Extracts the primary-key values from a row.
    fn key_of(&self, row: &Row) -> Vec<Value> {
        self.def
            .primary_key
            .iter()
            .map(|&i| row.get(i).cloned().unwrap_or(Value::Null))
            .collect()
    }
}

/// Snapshot iterator over table rows in insertion order.
#[derive(Debug)]
pub struct ScanIter {
    rows: Vec<Row>,
    position: usize,
}

impl ScanIter {
    fn new(rows: Vec<Row>) -> Self {
        Self { rows, position: 0 }
    }

    /// Returns the number of rows in the snapshot.
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    /// Returns true if the snapshot has no rows.
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Collects the remaining rows into a vector.
    pub fn collect_rows(self) -> Vec<Row> {
        self.rows.into_iter().skip(self.position).collect()
    }
}

impl Iterator for ScanIter {
    type Item = Row;

    fn next(&mut self) -> Option<Self::Item> {
        if self.position < self.rows.len() {
            let row = self.rows[self.position].clone();
            self.position += 1;
            Some(row)
        } else {
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::{Column, Schema};
    use crate::value::DataType;

    fn unicorn_store() -> TableStore {
        let schema = Schema::new(vec![
            Column::identity("id"),
            Column::not_null("name", DataType::Text),
        ]);
        TableStore::new(TableDef::new("unicorns", schema).with_primary_key(vec![0]))
    }

    #[test]
    fn test_insert_and_get() {
        let store = unicorn_store();

        let key = store
            .insert(Row::new(vec![Value::int(1), Value::text("edward")]))
            .unwrap();
        assert_eq!(key, vec![Value::int(1)]);

        let row = store.get(&[Value::int(1)]).unwrap();
        assert_eq!(row.get(1), Some(&Value::text("edward")));
        assert!(store.get(&[Value::int(2)]).is_none());
    }

    #[test]
    fn test_insert_duplicate_key() {
        let store = unicorn_store();

        store
            .insert(Row::new(vec![Value::int(1), Value::text("edward")]))
            .unwrap();
        let result = store.insert(Row::new(vec![Value::int(1), Value::text("gary")]));

        assert!(matches!(
            result,
            Err(StoreError::DuplicatePrimaryKey { .. })
        ));
        // Failed insert leaves the table untouched
        assert_eq!(store.row_count(), 1);
    }

    #[test]
    fn test_identity_auto_assign() {
        let store = unicorn_store();

        let k1 = store
            .insert(Row::new(vec![Value::Null, Value::text("edward")]))
            .unwrap();
        let k2 = store
            .insert(Row::new(vec![Value::Null, Value::text("gary")]))
            .unwrap();

        assert_eq!(k1, vec![Value::int(1)]);
        assert_eq!(k2, vec![Value::int(2)]);
    }

    #[test]
    fn test_identity_skips_explicit_keys() {
        let store = unicorn_store();

        store
            .insert(Row::new(vec![Value::int(10), Value::text("edward")]))
            .unwrap();
        let key = store
            .insert(Row::new(vec![Value::Null, Value::text("gary")]))
            .unwrap();

        assert_eq!(key, vec![Value::int(11)]);
    }

    #[test]
    fn test_missing_required_column() {
        let store = unicorn_store();

        let result = store.insert(Row::new(vec![Value::int(1), Value::Null]));
        assert!(matches!(result, Err(StoreError::MissingColumn { .. })));
        assert!(store.is_empty());
    }

    #[test]
    fn test_arity_mismatch() {
        let store = unicorn_store();

        let result = store.insert(Row::new(vec![Value::int(1)]));
        assert!(matches!(result, Err(StoreError::SchemaMismatch(_))));
    }

    #[test]
    fn test_type_mismatch() {
        let store = unicorn_store();

        let result = store.insert(Row::new(vec![Value::int(1), Value::boolean(true)]));
        assert!(matches!(result, Err(StoreError::SchemaMismatch(_))));
    }

    #[test]
    fn test_scan_insertion_order() {
        let store = unicorn_store();

        for name in ["edward", "gary", "bella"] {
            store
                .insert(Row::new(vec![Value::Null, Value::text(name)]))
                .unwrap();
        }

        let names: Vec<_> = store
            .scan()
            .map(|row| row.get(1).cloned().unwrap())
            .collect();
        assert_eq!(
            names,
            vec![Value::text("edward"), Value::text("gary"), Value::text("bella")]
        );

        // A fresh scan restarts from the beginning
        assert_eq!(store.scan().count(), 3);
    }

    #[test]
    fn test_delete_reindexes() {
        let store = unicorn_store();

        for name in ["edward", "gary", "bella"] {
            store
                .insert(Row::new(vec![Value::Null, Value::text(name)]))
                .unwrap();
        }

        assert!(store.delete(&[Value::int(2)]));
        assert!(!store.delete(&[Value::int(2)]));
        assert_eq!(store.row_count(), 2);

        // Remaining rows are still reachable by key after the shift.
        let row = store.get(&[Value::int(3)]).unwrap();
        assert_eq!(row.get(1), Some(&Value::text("bella")));
    }

    #[test]
    fn test_clear() {
        let store = unicorn_store();
        store
            .insert(Row::new(vec![Value::Null, Value::text("edward")]))
            .unwrap();

        store.clear();
        assert!(store.is_empty());
        assert_eq!(store.scan().count(), 0);

        // Identity restarts after clear
        let key = store
            .insert(Row::new(vec![Value::Null, Value::text("gary")]))
            .unwrap();
        assert_eq!(key, vec![Value::int(1)]);
    }
}
