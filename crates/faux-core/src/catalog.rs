//! Schema registry.
//!
//! The catalog holds table definitions: columns, primary keys, and
//! parent-to-child relations. Relation targets are resolved lazily so
//! parents can be defined before their child tables exist; any operation
//! that traverses a relation goes through [`Catalog::resolve_relation`]
//! and fails before touching a row if the target is still undefined.

use std::collections::HashMap;

use parking_lot::RwLock;

use crate::error::{StoreError, StoreResult};
use crate::schema::{Relation, TableDef};

/// Table catalog holding all schema definitions.
#[derive(Debug, Default)]
pub struct Catalog {
    /// Table definitions by name.
    tables: RwLock<HashMap<String, TableDef>>,
    /// Next table ID.
    next_table_id: RwLock<u64>,
}

impl Catalog {
    /// Creates a new empty catalog.
    pub fn new() -> Self {
        Self {
            tables: RwLock::new(HashMap::new()),
            next_table_id: RwLock::new(1),
        }
    }

    /// Registers a table definition.
    pub fn define(&self, mut def: TableDef) -> StoreResult<()> {
        let mut tables = self.tables.write();

        if tables.contains_key(&def.name) {
            return Err(StoreError::DuplicateTable(def.name));
        }

        // Primary key and relation columns must name real columns.
        for &idx in &def.primary_key {
            if def.schema.column(idx).is_none() {
                return Err(StoreError::SchemaMismatch(format!(
                    "primary key index {} out of range for table '{}'",
                    idx, def.name
                )));
            }
        }

        let mut next_id = self.next_table_id.write();
        def.table_id = *next_id;
        *next_id += 1;

        tables.insert(def.name.clone(), def);
        Ok(())
    }

    /// Resolves a table definition by name.
    pub fn resolve(&self, name: &str) -> StoreResult<TableDef> {
        let tables = self.tables.read();
        tables
            .get(name)
            .cloned()
            .ok_or_else(|| StoreError::UnknownTable(name.to_string()))
    }

    /// Checks if a table is defined.
    pub fn table_exists(&self, name: &str) -> bool {
        let tables = self.tables.read();
        tables.contains_key(name)
    }

    /// Lists all table names.
    pub fn list_tables(&self) -> Vec<String> {
        let tables = self.tables.read();
        tables.keys().cloned().collect()
    }

    /// Returns the number of defined tables.
    pub fn table_count(&self) -> usize {
        let tables = self.tables.read();
        tables.len()
    }

    /// Resolves a relation declared on `parent`, verifying that the child
    /// table it targets is defined.
    pub fn resolve_relation(&self, parent: &str, relation: &str) -> StoreResult<Relation> {
        let tables = self.tables.read();
        let def = tables
            .get(parent)
            .ok_or_else(|| StoreError::UnknownTable(parent.to_string()))?;

        let rel = def
            .relation(relation)
            .ok_or_else(|| StoreError::UnknownRelation {
                table: parent.to_string(),
                relation: relation.to_string(),
            })?;

        if !tables.contains_key(&rel.child_table) {
            return Err(StoreError::UnknownRelationTarget {
                relation: rel.name.clone(),
                table: rel.child_table.clone(),
            });
        }

        Ok(rel.clone())
    }

    /// Returns every relation in which `child` is the child table, paired
    /// with the name of the parent table declaring it.
    pub fn relations_into(&self, child: &str) -> Vec<(String, Relation)> {
        let tables = self.tables.read();
        let mut result = Vec::new();
        for def in tables.values() {
            for rel in &def.relations {
                if rel.child_table == child {
                    result.push((def.name.clone(), rel.clone()));
                }
            }
        }
        result
    }

    /// Drops every table definition.
    pub fn drop_all(&self) {
        let mut tables = self.tables.write();
        tables.clear();
    }
}
