//! Store error types.

use thiserror::Error;

use crate::value::Value;

/// Errors raised by the row store, schema registry, and query executor.
#[derive(Debug, Clone, Error)]
pub enum StoreError {
    /// A table with this name is already defined.
    #[error("table already exists: {0}")]
    DuplicateTable(String),

    /// No table with this name is defined.
    #[error("table not found: {0}")]
    UnknownTable(String),

    /// A row with this primary key already exists.
    #[error("duplicate primary key {key} in table '{table}'")]
    DuplicatePrimaryKey {
        /// Table name.
        table: String,
        /// Colliding key value.
        key: Value,
    },

    /// A required column was NULL or absent.
    #[error("missing value for column '{column}' in table '{table}'")]
    MissingColumn {
        /// Table name.
        table: String,
        /// Column name.
        column: String,
    },

    /// A column name does not exist in the table's schema.
    #[error("unknown column '{column}' in table '{table}'")]
    UnknownColumn {
        /// Table name.
        table: String,
        /// Column name.
        column: String,
    },

    /// A relation names a child table that is not defined.
    #[error("relation '{relation}' targets undefined table '{table}'")]
    UnknownRelationTarget {
        /// Relation name.
        relation: String,
        /// Missing child table name.
        table: String,
    },

    /// No relation with this name is declared on the table.
    #[error("table '{table}' has no relation '{relation}'")]
    UnknownRelation {
        /// Parent table name.
        table: String,
        /// Relation name.
        relation: String,
    },

    /// A foreign-key value references a non-existent parent row.
    #[error("foreign key '{column}'={key} in table '{table}' references a missing row")]
    ReferentialIntegrity {
        /// Child table name.
        table: String,
        /// Foreign-key column name.
        column: String,
        /// Dangling key value.
        key: Value,
    },

    /// Row shape does not match the table schema.
    #[error("schema mismatch: {0}")]
    SchemaMismatch(String),
}

/// Store result type.
pub type StoreResult<T> = Result<T, StoreError>;
