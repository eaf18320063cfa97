//! Predicate-based reads and relation-aware writes.
//!
//! The executor layers `find`, `find_with_includes`, and
//! `insert_with_relations` on top of [`StorageEngine`], resolving column
//! names and relations through the catalog before touching any row.

use std::collections::HashMap;

use crate::engine::StorageEngine;
use crate::error::{StoreError, StoreResult};
use crate::row::Row;
use crate::value::Value;

/// Comparison operators supported by predicates.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CompareOp {
    /// Equal.
    Eq,
    /// Not equal.
    NotEq,
    /// Less than.
    Lt,
    /// Less than or equal.
    LtEq,
    /// Greater than.
    Gt,
    /// Greater than or equal.
    GtEq,
}

impl CompareOp {
    fn matches(self, left: &Value, right: &Value) -> bool {
        match self {
            CompareOp::Eq => left == right,
            CompareOp::NotEq => left != right,
            CompareOp::Lt => left < right,
            CompareOp::LtEq => left <= right,
            CompareOp::Gt => left > right,
            CompareOp::GtEq => left >= right,
        }
    }
}

/// A single comparison over a named column.
#[derive(Debug, Clone)]
struct Term {
    column: String,
    op: CompareOp,
    value: Value,
}

/// A conjunction of comparisons over column values.
///
/// An empty predicate matches every row.
#[derive(Debug, Clone, Default)]
pub struct Predicate {
    terms: Vec<Term>,
}

impl Predicate {
    /// Creates a predicate that matches every row.
    pub fn all() -> Self {
        Self::default()
    }

    /// Adds a comparison term.
    pub fn and(mut self, column: impl Into<String>, op: CompareOp, value: impl Into<Value>) -> Self {
        self.terms.push(Term {
            column: column.into(),
            op,
            value: value.into(),
        });
        self
    }

    /// Shorthand for a single equality test.
    pub fn eq(column: impl Into<String>, value: impl Into<Value>) -> Self {
        Self::all().and(column, CompareOp::Eq, value)
    }

    /// Returns true if the predicate has no terms.
    pub fn is_empty(&self) -> bool {
        self.terms.is_empty()
    }
}

/// A parent row with its eagerly loaded children, one entry per requested
/// relation.
#[derive(Debug, Clone)]
pub struct IncludedRow {
    /// The parent row.
    pub row: Row,
    /// Child rows by relation name.
    pub children: HashMap<String, Vec<Row>>,
}

impl IncludedRow {
    /// Returns the child rows loaded for a relation.
    pub fn children(&self, relation: &str) -> &[Row] {
        self.children
            .get(relation)
            .map(Vec::as_slice)
            .unwrap_or_default()
    }
}

impl StorageEngine {
    /// Finds rows matching a predicate, in insertion order.
    pub fn find(&self, table: &str, predicate: &Predicate) -> StoreResult<Vec<Row>> {
        let def = self.table_def(table)?;

        // Resolve column names once, before scanning.
        let mut resolved = Vec::with_capacity(predicate.terms.len());
        for term in &predicate.terms {
            let idx = def
                .schema
                .index_of(&term.column)
                .ok_or_else(|| StoreError::UnknownColumn {
                    table: table.to_string(),
                    column: term.column.clone(),
                })?;
            resolved.push((idx, term.op, &term.value));
        }

        let matched = self
            .scan(table)?
            .filter(|row| {
                resolved.iter().all(|&(idx, op, value)| {
                    row.get(idx).map_or(false, |v| op.matches(v, value))
                })
            })
            .collect();
        Ok(matched)
    }

    /// Finds rows matching a predicate and eagerly loads child rows for
    /// each named relation.
    ///
    /// A parent with no matching children yields an empty child vector,
    /// not an error. Relations are traversed strictly parent to child.
    pub fn find_with_includes(
        &self,
        table: &str,
        predicate: &Predicate,
        relations: &[&str],
    ) -> StoreResult<Vec<IncludedRow>> {
        let def = self.table_def(table)?;

        // Fail before reading any row if a relation does not resolve.
        let mut resolved = Vec::with_capacity(relations.len());
        for name in relations {
            let relation = self.catalog().resolve_relation(table, name)?;
            let child_def = self.table_def(&relation.child_table)?;
            let fk_idx = child_def
                .schema
                .index_of(&relation.child_column)
                .ok_or_else(|| StoreError::UnknownColumn {
                    table: relation.child_table.clone(),
                    column: relation.child_column.clone(),
                })?;
            resolved.push((relation, fk_idx));
        }

        let parents = self.find(table, predicate)?;
        let mut result = Vec::with_capacity(parents.len());

        for row in parents {
            let parent_key = def
                .primary_key
                .first()
                .and_then(|&i| row.get(i))
                .cloned()
                .unwrap_or(Value::Null);

            let mut children = HashMap::new();
            for (relation, fk_idx) in &resolved {
                let matching: Vec<Row> = self
                    .scan(&relation.child_table)?
                    .filter(|child| child.get(*fk_idx) == Some(&parent_key))
                    .collect();
                children.insert(relation.name.clone(), matching);
            }

            result.push(IncludedRow { row, children });
        }

        Ok(result)
    }

    /// Inserts a parent row together with child rows, all or nothing.
    ///
    /// Each child row's foreign-key column is stamped with the parent's
    /// primary-key value before insertion. If any insert fails, rows
    /// inserted by this call are removed again via compensating deletes
    /// and the first error is returned.
    pub fn insert_with_relations(
        &self,
        table: &str,
        row: Row,
        children: Vec<(String, Vec<Row>)>,
    ) -> StoreResult<Vec<Value>> {
        // Resolve every relation up front so a bad name cannot leave a
        // half-inserted graph behind.
        let mut resolved = Vec::with_capacity(children.len());
        for (name, rows) in children {
            let relation = self.catalog().resolve_relation(table, &name)?;
            let child_def = self.table_def(&relation.child_table)?;
            let fk_idx = child_def
                .schema
                .index_of(&relation.child_column)
                .ok_or_else(|| StoreError::UnknownColumn {
                    table: relation.child_table.clone(),
                    column: relation.child_column.clone(),
                })?;
            resolved.push((relation, fk_idx, rows));
        }

        let parent_key = self.insert_row(table, row)?;
        let parent_value = parent_key.first().cloned().unwrap_or(Value::Null);

        // Track inserted children for rollback.
        let mut inserted: Vec<(String, Vec<Value>)> = Vec::new();

        for (relation, fk_idx, rows) in resolved {
            for mut child in rows {
                child.set(fk_idx, parent_value.clone());
                match self.insert_row(&relation.child_table, child) {
                    Ok(key) => inserted.push((relation.child_table.clone(), key)),
                    Err(e) => {
                        self.rollback_inserts(table, &parent_key, &inserted);
                        return Err(e);
                    }
                }
            }
        }

        Ok(parent_key)
    }

    /// Best-effort compensating deletes for a failed graph insert.
    fn rollback_inserts(&self, table: &str, parent_key: &[Value], inserted: &[(String, Vec<Value>)]) {
        for (child_table, key) in inserted.iter().rev() {
            if let Err(e) = self.delete_by_key(child_table, key) {
                tracing::warn!(table = %child_table, error = %e, "rollback delete failed");
            }
        }
        if let Err(e) = self.delete_by_key(table, parent_key) {
            tracing::warn!(table = %table, error = %e, "rollback delete failed");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::{Column, Relation, Schema, TableDef};
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

    fn unicorn(name: &str) -> Row {
        Row::new(vec![Value::Null, Value::text(name)])
    }

    fn power(description: &str) -> Row {
        Row::new(vec![Value::Null, Value::text(description), Value::Null])
    }

    #[test]
    fn test_find_equality() {
        let engine = setup_engine();
        engine.insert_row("unicorns", unicorn("edward")).unwrap();
        engine.insert_row("unicorns", unicorn("gary")).unwrap();

        let rows = engine
            .find("unicorns", &Predicate::eq("name", "edward"))
            .unwrap();
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].get(1), Some(&Value::text("edward")));
    }

    #[test]
    fn test_find_conjunction() {
        let engine = setup_engine();
        for name in ["edward", "gary", "bella"] {
            engine.insert_row("unicorns", unicorn(name)).unwrap();
        }

        let predicate = Predicate::all()
            .and("id", CompareOp::Gt, 1i64)
            .and("name", CompareOp::NotEq, "bella");
        let rows = engine.find("unicorns", &predicate).unwrap();
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].get(1), Some(&Value::text("gary")));
    }

    #[test]
    fn test_find_empty_predicate_insertion_order() {
        let engine = setup_engine();
        for name in ["edward", "gary", "bella"] {
            engine.insert_row("unicorns", unicorn(name)).unwrap();
        }

        let rows = engine.find("unicorns", &Predicate::all()).unwrap();
        let names: Vec<_> = rows.iter().map(|r| r.get(1).cloned().unwrap()).collect();
        assert_eq!(
            names,
            vec![Value::text("edward"), Value::text("gary"), Value::text("bella")]
        );
    }

    #[test]
    fn test_find_unknown_column() {
        let engine = setup_engine();
        let result = engine.find("unicorns", &Predicate::eq("horn_length", 3i64));
        assert!(matches!(result, Err(StoreError::UnknownColumn { .. })));
    }

    #[test]
    fn test_insert_with_relations() {
        let engine = setup_engine();

        let key = engine
            .insert_with_relations(
                "unicorns",
                unicorn("edward"),
                vec![("powers".to_string(), vec![power("piercing the enemy")])],
            )
            .unwrap();
        assert_eq!(key, vec![Value::int(1)]);

        // Child carries the parent's key
        let powers = engine.find("powers", &Predicate::all()).unwrap();
        assert_eq!(powers.len(), 1);
        assert_eq!(powers[0].get(2), Some(&Value::int(1)));
    }

    #[test]
    fn test_insert_with_relations_rollback() {
        let engine = setup_engine();

        // Occupy power id 1 so the child insert below collides.
        engine
            .insert_row(
                "powers",
                Row::new(vec![Value::int(1), Value::text("existing"), Value::Null]),
            )
            .unwrap();

        let colliding = Row::new(vec![Value::int(1), Value::text("karate"), Value::Null]);
        let result = engine.insert_with_relations(
            "unicorns",
            unicorn("edward"),
            vec![("powers".to_string(), vec![colliding])],
        );
        assert!(matches!(
            result,
            Err(StoreError::DuplicatePrimaryKey { .. })
        ));

        // Parent was rolled back, pre-existing child untouched
        assert_eq!(engine.row_count("unicorns").unwrap(), 0);
        assert_eq!(engine.row_count("powers").unwrap(), 1);
    }

    #[test]
    fn test_insert_with_relations_unknown_relation() {
        let engine = setup_engine();

        let result = engine.insert_with_relations(
            "unicorns",
            unicorn("edward"),
            vec![("friends".to_string(), vec![power("karate")])],
        );
        assert!(matches!(result, Err(StoreError::UnknownRelation { .. })));
        assert_eq!(engine.row_count("unicorns").unwrap(), 0);
    }

    #[test]
    fn test_find_with_includes() {
        let engine = setup_engine();

        engine
            .insert_with_relations(
                "unicorns",
                unicorn("edward"),
                vec![(
                    "powers".to_string(),
                    vec![power("piercing the enemy"), power("karate")],
                )],
            )
            .unwrap();
        engine.insert_row("unicorns", unicorn("gary")).unwrap();

        let results = engine
            .find_with_includes("unicorns", &Predicate::eq("name", "edward"), &["powers"])
            .unwrap();
        assert_eq!(results.len(), 1);

        let included = &results[0];
        assert_eq!(included.row.get(1), Some(&Value::text("edward")));
        let powers = included.children("powers");
        assert_eq!(powers.len(), 2);
        assert_eq!(powers[0].get(1), Some(&Value::text("piercing the enemy")));
        assert_eq!(powers[1].get(1), Some(&Value::text("karate")));
    }

    #[test]
    fn test_find_with_includes_no_children() {
        let engine = setup_engine();
        engine.insert_row("unicorns", unicorn("gary")).unwrap();

        let results = engine
            .find_with_includes("unicorns", &Predicate::all(), &["powers"])
            .unwrap();
        assert_eq!(results.len(), 1);
        assert!(results[0].children("powers").is_empty());
    }

    #[test]
    fn test_find_with_includes_unknown_relation_fails_fast() {
        let engine = setup_engine();
        engine.insert_row("unicorns", unicorn("edward")).unwrap();

        let result = engine.find_with_includes("unicorns", &Predicate::all(), &["friends"]);
        assert!(matches!(result, Err(StoreError::UnknownRelation { .. })));
    }
}
