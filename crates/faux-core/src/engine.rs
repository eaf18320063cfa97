//! Storage engine managing all tables.
//!
//! `StorageEngine` is the entry point for storage operations. It owns the
//! catalog and the per-table row stores, and enforces referential
//! integrity by consulting the catalog before every mutating operation.

use std::collections::HashMap;
use std::sync::Arc;

use parking_lot::RwLock;

use crate::catalog::Catalog;
use crate::error::{StoreError, StoreResult};
use crate::row::Row;
use crate::schema::TableDef;
use crate::table::{ScanIter, TableStore};
use crate::value::Value;

/// Storage engine that manages all tables of one isolated instance.
#[derive(Debug, Default)]
pub struct StorageEngine {
    /// Schema registry.
    catalog: Catalog,
    /// Table stores by name.
    tables: RwLock<HashMap<String, Arc<TableStore>>>,
}

impl StorageEngine {
    /// Creates a new empty storage engine.
    pub fn new() -> Self {
        Self {
            catalog: Catalog::new(),
            tables: RwLock::new(HashMap::new()),
        }
    }

    /// Returns a reference to the catalog.
    pub fn catalog(&self) -> &Catalog {
        &self.catalog
    }

    /// Defines a new table.
    pub fn create_table(&self, def: TableDef) -> StoreResult<()> {
        self.catalog.define(def.clone())?;

        let store = Arc::new(TableStore::new(def.clone()));
        let mut tables = self.tables.write();
        tables.insert(def.name, store);

        Ok(())
    }

    /// Checks if a table exists.
    pub fn table_exists(&self, name: &str) -> bool {
        self.catalog.table_exists(name)
    }

    /// Lists all table names.
    pub fn list_tables(&self) -> Vec<String> {
        self.catalog.list_tables()
    }

    /// Gets a table definition.
    pub fn table_def(&self, name: &str) -> StoreResult<TableDef> {
        self.catalog.resolve(name)
    }

    /// Inserts a row, returning its primary-key values.
    ///
    /// Foreign-key values are checked eagerly: every relation in which
    /// this table is the child must resolve to an existing parent row.
    pub fn insert_row(&self, table: &str, row: Row) -> StoreResult<Vec<Value>> {
        let store = self.table_store(table)?;
        self.check_foreign_keys(table, &row)?;
        store.insert(row)
    }

    /// Gets a row by primary key.
    pub fn get_by_key(&self, table: &str, key_values: &[Value]) -> StoreResult<Option<Row>> {
        let store = self.table_store(table)?;
        Ok(store.get(key_values))
    }

    /// Deletes a row by primary key. Returns true if a row was removed.
    pub fn delete_by_key(&self, table: &str, key_values: &[Value]) -> StoreResult<bool> {
        let store = self.table_store(table)?;
        Ok(store.delete(key_values))
    }

    /// Scans all rows of a table in insertion order.
    pub fn scan(&self, table: &str) -> StoreResult<ScanIter> {
        let store = self.table_store(table)?;
        Ok(store.scan())
    }

    /// Returns the number of rows in a table.
    pub fn row_count(&self, table: &str) -> StoreResult<usize> {
        let store = self.table_store(table)?;
        Ok(store.row_count())
    }

    /// Deletes all rows from a table, keeping its definition.
    pub fn truncate_table(&self, table: &str) -> StoreResult<usize> {
        let store = self.table_store(table)?;
        let count = store.row_count();
        store.clear();
        Ok(count)
    }

    /// Drops every table and its rows, clearing the schema registry.
    pub fn drop_all_tables(&self) {
        let mut tables = self.tables.write();
        tables.clear();
        self.catalog.drop_all();
    }

    /// Returns statistics about the engine.
    pub fn stats(&self) -> EngineStats {
        let tables = self.tables.read();
        EngineStats {
            table_count: tables.len(),
            total_rows: tables.values().map(|t| t.row_count()).sum(),
        }
    }

    /// Gets a table store, failing if the table is not defined.
    pub(crate) fn table_store(&self, name: &str) -> StoreResult<Arc<TableStore>> {
        let tables = self.tables.read();
        tables
            .get(name)
            .cloned()
            .ok_or_else(|| StoreError::UnknownTable(name.to_string()))
    }

    /// Verifies that every non-null foreign-key value in `row` references
    /// an existing parent row.
    fn check_foreign_keys(&self, table: &str, row: &Row) -> StoreResult<()> {
        for (parent_table, relation) in self.catalog.relations_into(table) {
            let child_def = self.catalog.resolve(table)?;
            let Some(fk_idx) = child_def.schema.index_of(&relation.child_column) else {
                return Err(StoreError::UnknownColumn {
                    table: table.to_string(),
                    column: relation.child_column.clone(),
                });
            };

            let fk_value = row.get(fk_idx).cloned().unwrap_or(Value::Null);
            if fk_value.is_null() {
                continue;
            }

            let parent = self.table_store(&parent_table)?;
            if parent.get(std::slice::from_ref(&fk_value)).is_none() {
                return Err(StoreError::ReferentialIntegrity {
                    table: table.to_string(),
                    column: relation.child_column.clone(),
                    key: fk_value,
                });
            }
        }
        Ok(())
    }
}

/// Engine statistics.
#[derive(Debug, Clone, Default)]
pub struct EngineStats {
    /// Number of defined tables.
    pub table_count: usize,
    /// Total number of rows across all tables.
    pub total_rows: usize,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::{Column, Relation, Schema};
    use crate::value::DataType;

    fn setup_engine() -> StorageEngine {
        let engine = StorageEngine::new();

        let unicorns = Schema::new(vec![
            Column::identity("id"),
            Column::not_null("name", DataType::Text),
        ]);
        engine
            .create_table(
                TableDef::new("unicorns", unicorns)
                    .with_primary_key(vec![0])
                    .with_relation(Relation::new("powers", "powers", "unicorn_id")),
            )
            .unwrap();

        let powers = Schema::new(vec![
            Column::identity("id"),
            Column::not_null("description", DataType::Text),
            Column::nullable("unicorn_id", DataType::Int),
        ]);
        engine
            .create_table(TableDef::new("powers", powers).with_primary_key(vec![0]))
            .unwrap();

        engine
    }

    #[test]
    fn test_engine_create_table() {
        let engine = setup_engine();
        assert!(engine.table_exists("unicorns"));
        assert!(engine.table_exists("powers"));
        assert_eq!(engine.list_tables().len(), 2);
    }

    #[test]
    fn test_engine_insert_and_get() {
        let engine = setup_engine();

        let key = engine
            .insert_row("unicorns", Row::new(vec![Value::Null, Value::text("edward")]))
            .unwrap();

        let row = engine.get_by_key("unicorns", &key).unwrap().unwrap();
        assert_eq!(row.get(1), Some(&Value::text("edward")));
    }

    #[test]
    fn test_engine_unknown_table() {
        let engine = setup_engine();
        let result = engine.insert_row("goblins", Row::new(vec![Value::Null]));
        assert!(matches!(result, Err(StoreError::UnknownTable(_))));
    }

    #[test]
    fn test_engine_foreign_key_enforced() {
        let engine = setup_engine();

        // No unicorn with id 99 exists
        let result = engine.insert_row(
            "powers",
            Row::new(vec![Value::Null, Value::text("karate"), Value::int(99)]),
        );
        assert!(matches!(
            result,
            Err(StoreError::ReferentialIntegrity { .. })
        ));
        assert_eq!(engine.row_count("powers").unwrap(), 0);
    }

    #[test]
    fn test_engine_foreign_key_null_allowed() {
        let engine = setup_engine();

        engine
            .insert_row(
                "powers",
                Row::new(vec![Value::Null, Value::text("karate"), Value::Null]),
            )
            .unwrap();
        assert_eq!(engine.row_count("powers").unwrap(), 1);
    }

    #[test]
    fn test_engine_foreign_key_satisfied() {
        let engine = setup_engine();

        let key = engine
            .insert_row("unicorns", Row::new(vec![Value::Null, Value::text("edward")]))
            .unwrap();
        engine
            .insert_row(
                "powers",
                Row::new(vec![Value::Null, Value::text("karate"), key[0].clone()]),
            )
            .unwrap();
        assert_eq!(engine.row_count("powers").unwrap(), 1);
    }

    #[test]
    fn test_engine_truncate() {
        let engine = setup_engine();

        for i in 0..5 {
            engine
                .insert_row(
                    "unicorns",
                    Row::new(vec![Value::Null, Value::text(format!("u{}", i))]),
                )
                .unwrap();
        }

        let deleted = engine.truncate_table("unicorns").unwrap();
        assert_eq!(deleted, 5);
        assert_eq!(engine.scan("unicorns").unwrap().count(), 0);
    }

    #[test]
    fn test_engine_drop_all() {
        let engine = setup_engine();
        engine
            .insert_row("unicorns", Row::new(vec![Value::Null, Value::text("edward")]))
            .unwrap();

        engine.drop_all_tables();
        assert!(!engine.table_exists("unicorns"));
        assert!(matches!(
            engine.scan("unicorns"),
            Err(StoreError::UnknownTable(_))
        ));
    }

    #[test]
    fn test_engine_stats() {
        let engine = setup_engine();
        engine
            .insert_row("unicorns", Row::new(vec![Value::Null, Value::text("edward")]))
            .unwrap();

        let stats = engine.stats();
        assert_eq!(stats.table_count, 2);
        assert_eq!(stats.total_rows, 1);
    }
}
