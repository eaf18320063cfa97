//! Table, column, and relation definitions.
//!
//! These types describe the shape of tables held by the row store:
//! columns with types and nullability, primary keys, and parent-to-child
//! relations used for eager inclusion.

use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::value::DataType;

/// A column definition.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Column {
    /// Column name.
    pub name: String,
    /// Data type.
    pub data_type: DataType,
    /// Whether NULL is allowed.
    pub nullable: bool,
    /// Whether values are auto-assigned when omitted. Only meaningful for
    /// an `Int` column that is the table's single primary-key column.
    pub identity: bool,
}

impl Column {
    /// Creates a new non-nullable column.
    pub fn not_null(name: impl Into<String>, data_type: DataType) -> Self {
        Self {
            name: name.into(),
            data_type,
            nullable: false,
            identity: false,
        }
    }

    /// Creates a new nullable column.
    pub fn nullable(name: impl Into<String>, data_type: DataType) -> Self {
        Self {
            name: name.into(),
            data_type,
            nullable: true,
            identity: false,
        }
    }

    /// Creates an identity column: non-nullable `Int` whose value is
    /// auto-assigned at insert when omitted.
    pub fn identity(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            data_type: DataType::Int,
            nullable: false,
            identity: true,
        }
    }
}

impl fmt::Display for Column {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}: {}{}{}",
            self.name,
            self.data_type,
            if self.nullable { "" } else { " NOT NULL" },
            if self.identity { " IDENTITY" } else { "" },
        )
    }
}

/// Schema describes the ordered column set of a table.
///
/// Serialized as the plain column list; the name index is rebuilt on
/// deserialization.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(into = "Vec<Column>", from = "Vec<Column>")]
pub struct Schema {
    /// Columns in declaration order.
    columns: Vec<Column>,
    /// Index by column name for fast lookup.
    index: HashMap<String, usize>,
}

impl Schema {
    /// Creates an empty schema.
    pub fn empty() -> Self {
        Self {
            columns: Vec::new(),
            index: HashMap::new(),
        }
    }

    /// Creates a schema from a list of columns.
    pub fn new(columns: Vec<Column>) -> Self {
        let mut schema = Self {
            columns: Vec::with_capacity(columns.len()),
            index: HashMap::new(),
        };
        for column in columns {
            schema.add_column(column);
        }
        schema
    }

    /// Adds a column to the schema.
    pub fn add_column(&mut self, column: Column) {
        self.index.insert(column.name.clone(), self.columns.len());
        self.columns.push(column);
    }

    /// Returns the number of columns.
    pub fn len(&self) -> usize {
        self.columns.len()
    }

    /// Returns true if the schema has no columns.
    pub fn is_empty(&self) -> bool {
        self.columns.is_empty()
    }

    /// Returns the columns.
    pub fn columns(&self) -> &[Column] {
        &self.columns
    }

    /// Returns the column at the given index.
    pub fn column(&self, index: usize) -> Option<&Column> {
        self.columns.get(index)
    }

    /// Finds a column by name.
    pub fn column_by_name(&self, name: &str) -> Option<&Column> {
        self.index.get(name).and_then(|&i| self.columns.get(i))
    }

    /// Finds the index of a column by name.
    pub fn index_of(&self, name: &str) -> Option<usize> {
        self.index.get(name).copied()
    }
}

impl Default for Schema {
    fn default() -> Self {
        Self::empty()
    }
}

impl From<Vec<Column>> for Schema {
    fn from(columns: Vec<Column>) -> Self {
        Self::new(columns)
    }
}

impl From<Schema> for Vec<Column> {
    fn from(schema: Schema) -> Self {
        schema.columns
    }
}

impl fmt::Display for Schema {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[")?;
        for (i, column) in self.columns.iter().enumerate() {
            if i > 0 {
                write!(f, ", ")?;
            }
            write!(f, "{}", column)?;
        }
        write!(f, "]")
    }
}

/// A reference-counted schema for sharing.
pub type SchemaRef = Arc<Schema>;

/// A parent-to-child relation.
///
/// Declared on the parent table: rows of `child_table` reference a parent
/// row by carrying the parent's primary-key value in `child_column`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Relation {
    /// Relation name, used to request eager inclusion.
    pub name: String,
    /// Child table name.
    pub child_table: String,
    /// Foreign-key column in the child table.
    pub child_column: String,
}

impl Relation {
    /// Creates a new relation.
    pub fn new(
        name: impl Into<String>,
        child_table: impl Into<String>,
        child_column: impl Into<String>,
    ) -> Self {
        Self {
            name: name.into(),
            child_table: child_table.into(),
            child_column: child_column.into(),
        }
    }
}

/// A table definition: name, schema, primary key, and relations.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TableDef {
    /// Table name.
    pub name: String,
    /// Column set.
    pub schema: SchemaRef,
    /// Primary key column indices.
    pub primary_key: Vec<usize>,
    /// Relations to child tables.
    pub relations: Vec<Relation>,
    /// Table ID, assigned by the catalog.
    #[serde(skip)]
    pub table_id: u64,
}

impl TableDef {
    /// Creates a new table definition.
    pub fn new(name: impl Into<String>, schema: Schema) -> Self {
        Self {
            name: name.into(),
            schema: Arc::new(schema),
            primary_key: Vec::new(),
            relations: Vec::new(),
            table_id: 0,
        }
    }

    /// Sets the primary key columns.
    pub fn with_primary_key(mut self, columns: Vec<usize>) -> Self {
        self.primary_key = columns;
        self
    }

    /// Adds a relation to a child table.
    pub fn with_relation(mut self, relation: Relation) -> Self {
        self.relations.push(relation);
        self
    }

    /// Checks if the table has a primary key.
    pub fn has_primary_key(&self) -> bool {
        !self.primary_key.is_empty()
    }

    /// Returns the primary key column names.
    pub fn primary_key_columns(&self) -> Vec<&str> {
        self.primary_key
            .iter()
            .filter_map(|&i| self.schema.column(i).map(|c| c.name.as_str()))
            .collect()
    }

    /// Returns the identity column index, if the primary key is a single
    /// `Int` identity column.
    pub fn identity_column(&self) -> Option<usize> {
        match self.primary_key.as_slice() {
            [idx] => {
                let col = self.schema.column(*idx)?;
                (col.identity && col.data_type == DataType::Int).then_some(*idx)
            }
            _ => None,
        }
    }

    /// Finds a relation by name.
    pub fn relation(&self, name: &str) -> Option<&Relation> {
        self.relations.iter().find(|r| r.name == name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn unicorn_schema() -> Schema {
        Schema::new(vec![
            Column::identity("id"),
            Column::not_null("name", DataType::Text),
        ])
    }

    #[test]
    fn test_schema_lookup() {
        let schema = unicorn_schema();
        assert_eq!(schema.len(), 2);
        assert_eq!(schema.index_of("id"), Some(0));
        assert_eq!(schema.index_of("name"), Some(1));
        assert!(schema.column_by_name("missing").is_none());
    }

    #[test]
    fn test_table_def_builders() {
        let def = TableDef::new("unicorns", unicorn_schema())
            .with_primary_key(vec![0])
            .with_relation(Relation::new("powers", "powers", "unicorn_id"));

        assert!(def.has_primary_key());
        assert_eq!(def.primary_key_columns(), vec!["id"]);
        assert_eq!(def.relation("powers").unwrap().child_table, "powers");
        assert!(def.relation("friends").is_none());
    }

    #[test]
    fn test_identity_column() {
        let def = TableDef::new("unicorns", unicorn_schema()).with_primary_key(vec![0]);
        assert_eq!(def.identity_column(), Some(0));

        // Non-identity primary key
        let schema = Schema::new(vec![
            Column::not_null("id", DataType::Int),
            Column::not_null("name", DataType::Text),
        ]);
        let def = TableDef::new("t", schema).with_primary_key(vec![0]);
        assert_eq!(def.identity_column(), None);
    }

    #[test]
    fn test_column_display() {
        let col = Column::identity("id");
        assert_eq!(col.to_string(), "id: INT NOT NULL IDENTITY");
    }
}
