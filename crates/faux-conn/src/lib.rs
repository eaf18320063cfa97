//! # FauxDB Connection Layer
//!
//! Transient, isolated in-memory database connections for testing
//! code written against a relational store.
//!
//! ```text
//! ┌───────────────────────────────────────────────┐
//! │                 Connection                    │
//! │   create_transient / create_with / dispose    │
//! ├───────────────────────────────────────────────┤
//! │            faux-core StorageEngine            │
//! │       (private to this connection only)       │
//! └───────────────────────────────────────────────┘
//! ```
//!
//! Each connection owns its own storage engine, so two connections can
//! never observe each other's tables or rows. Dropping a connection
//! disposes it.
//!
//! ## Example
//!
//! ```
//! use faux_conn::Connection;
//! use faux_core::{Column, DataType, Row, Schema, TableDef, Value};
//!
//! let conn = Connection::create_transient();
//!
//! let schema = Schema::new(vec![
//!     Column::identity("id"),
//!     Column::not_null("name", DataType::Text),
//! ]);
//! conn.define_table(TableDef::new("unicorns", schema).with_primary_key(vec![0]))?;
//!
//! let key = conn.insert("unicorns", Row::new(vec![Value::Null, Value::text("edward")]))?;
//! assert_eq!(key, vec![Value::int(1)]);
//! # Ok::<(), faux_conn::ConnError>(())
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]

mod connection;
mod error;
mod result;

pub use connection::{Connection, ConnectionConfig, ConnectionId, ConnectionState, SeedFn};
pub use error::{ConnError, ConnResult};
pub use result::RowSet;
