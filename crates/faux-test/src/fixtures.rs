//! Schema fixtures shared across integration tests.
//!
//! The canonical test domain is a herd of unicorns, each with a set of
//! unique powers. `unicorns` is the parent table; `powers` carries a
//! nullable `unicorn_id` foreign key back to it.

use faux_conn::{Connection, ConnectionConfig};
use faux_core::{Column, DataType, Relation, Row, Schema, TableDef, Value};

/// Table definition for `unicorns(id identity pk, name text)`.
pub fn unicorns_table() -> TableDef {
    let schema = Schema::new(vec![
        Column::identity("id"),
        Column::not_null("name", DataType::Text),
    ]);
    TableDef::new("unicorns", schema)
        .with_primary_key(vec![0])
        .with_relation(Relation::new("powers", "powers", "unicorn_id"))
}

/// Table definition for `powers(id identity pk, description text, unicorn_id fk)`.
pub fn powers_table() -> TableDef {
    let schema = Schema::new(vec![
        Column::identity("id"),
        Column::not_null("description", DataType::Text),
        Column::nullable("unicorn_id", DataType::Int),
    ]);
    TableDef::new("powers", schema).with_primary_key(vec![0])
}

/// A connection with both tables defined and no rows.
pub fn empty_herd() -> Connection {
    crate::init_tracing();
    let conn = Connection::create_transient();
    conn.define_table(unicorns_table())
        .and_then(|()| conn.define_table(powers_table()))
        .unwrap_or_else(|e| panic!("fixture schema failed: {e}"));
    conn
}

/// Configuration that defines both tables and seeds one unicorn named
/// "gary" with a "karate" power.
pub fn seeded_config() -> ConnectionConfig {
    ConnectionConfig::new()
        .with_table(unicorns_table())
        .with_table(powers_table())
        .with_seed(|conn| {
            conn.insert_with_relations(
                "unicorns",
                unicorn_row("gary"),
                vec![("powers".to_string(), vec![power_row("karate")])],
            )?;
            Ok(())
        })
}

/// A unicorn row with identity left for the store to assign.
pub fn unicorn_row(name: &str) -> Row {
    Row::new(vec![Value::Null, Value::text(name)])
}

/// A power row with identity and foreign key left unassigned.
pub fn power_row(description: &str) -> Row {
    Row::new(vec![Value::Null, Value::text(description), Value::Null])
}
