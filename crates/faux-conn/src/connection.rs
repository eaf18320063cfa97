//! Transient connection facade.
//!
//! A `Connection` is one isolated in-memory database instance. Every
//! call to [`Connection::create_transient`] yields a fresh instance with
//! no schema and no rows, fully independent of all other instances; the
//! embedding object-relational layer holds it wherever it would hold a
//! real database connection.

use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};

use parking_lot::RwLock;

use faux_core::{IncludedRow, Predicate, Row, StorageEngine, TableDef, Value};

use super::error::{ConnError, ConnResult};
use super::result::RowSet;

/// Counter backing connection ID allocation.
static NEXT_CONNECTION_ID: AtomicU64 = AtomicU64::new(1);

/// Unique connection identifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ConnectionId(u64);

impl ConnectionId {
    fn next() -> Self {
        Self(NEXT_CONNECTION_ID.fetch_add(1, Ordering::SeqCst))
    }

    /// Returns the numeric ID.
    pub fn as_u64(&self) -> u64 {
        self.0
    }
}

impl fmt::Display for ConnectionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "conn_{}", self.0)
    }
}

/// Connection state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConnectionState {
    /// Connection is usable.
    Open,
    /// Connection was disposed; all operations fail.
    Disposed,
}

/// Seed hook run after a configured connection's schema is created.
pub type SeedFn = Arc<dyn Fn(&Connection) -> ConnResult<()> + Send + Sync>;

/// Connection configuration: table definitions applied at creation and
/// an optional seed hook to populate initial rows.
#[derive(Default, Clone)]
pub struct ConnectionConfig {
    /// Tables defined when the connection is created, in order.
    tables: Vec<TableDef>,
    /// Seed hook, run once after the schema is in place.
    seed: Option<SeedFn>,
}

impl ConnectionConfig {
    /// Creates an empty configuration.
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a table definition.
    pub fn with_table(mut self, def: TableDef) -> Self {
        self.tables.push(def);
        self
    }

    /// Sets the seed hook.
    pub fn with_seed<F>(mut self, seed: F) -> Self
    where
        F: Fn(&Connection) -> ConnResult<()> + Send + Sync + 'static,
    {
        self.seed = Some(Arc::new(seed));
        self
    }
}

impl fmt::Debug for ConnectionConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ConnectionConfig")
            .field("tables", &self.tables.len())
            .field("seed", &self.seed.is_some())
            .finish()
    }
}

/// One isolated, independently lifecycled in-memory database.
pub struct Connection {
    /// Connection ID.
    id: ConnectionId,
    /// The storage engine owned by this connection.
    engine: Arc<StorageEngine>,
    /// Lifecycle state.
    state: RwLock<ConnectionState>,
    /// Number of operations issued.
    statements: AtomicU64,
    /// When the connection was created.
    created_at: Instant,
}

impl Connection {
    /// Creates a fresh, empty, isolated connection.
    pub fn create_transient() -> Self {
        let id = ConnectionId::next();
        tracing::debug!(%id, "created transient connection");
        Self {
            id,
            engine: Arc::new(StorageEngine::new()),
            state: RwLock::new(ConnectionState::Open),
            statements: AtomicU64::new(0),
            created_at: Instant::now(),
        }
    }

    /// Creates a transient connection, applies the configured table
    /// definitions, and runs the seed hook if one is set.
    pub fn create_with(config: ConnectionConfig) -> ConnResult<Self> {
        let conn = Self::create_transient();
        for def in &config.tables {
            conn.define_table(def.clone())?;
        }
        if let Some(seed) = &config.seed {
            seed(&conn)?;
            tracing::debug!(id = %conn.id, "seed hook applied");
        }
        Ok(conn)
    }

    /// Returns the connection ID.
    pub fn id(&self) -> ConnectionId {
        self.id
    }

    /// Returns the current state.
    pub fn state(&self) -> ConnectionState {
        *self.state.read()
    }

    /// Returns time since the connection was created.
    pub fn uptime(&self) -> Duration {
        self.created_at.elapsed()
    }

    /// Returns the number of operations issued on this connection.
    pub fn statement_count(&self) -> u64 {
        self.statements.load(Ordering::Relaxed)
    }

    // =========================================================================
    // Schema
    // =========================================================================

    /// Defines a table on this connection.
    pub fn define_table(&self, def: TableDef) -> ConnResult<()> {
        let engine = self.engine()?;
        tracing::debug!(id = %self.id, table = %def.name, "define table");
        engine.create_table(def)?;
        Ok(())
    }

    /// Checks if a table is defined.
    pub fn table_exists(&self, table: &str) -> ConnResult<bool> {
        Ok(self.engine()?.table_exists(table))
    }

    /// Lists all defined table names.
    pub fn list_tables(&self) -> ConnResult<Vec<String>> {
        Ok(self.engine()?.list_tables())
    }

    // =========================================================================
    // Data Operations
    // =========================================================================

    /// Inserts a row, returning its primary-key values.
    pub fn insert(&self, table: &str, row: Row) -> ConnResult<Vec<Value>> {
        let engine = self.engine()?;
        Ok(engine.insert_row(table, row)?)
    }

    /// Inserts a parent row with child rows, all or nothing.
    pub fn insert_with_relations(
        &self,
        table: &str,
        row: Row,
        children: Vec<(String, Vec<Row>)>,
    ) -> ConnResult<Vec<Value>> {
        let engine = self.engine()?;
        Ok(engine.insert_with_relations(table, row, children)?)
    }

    /// Gets a row by primary key.
    pub fn get(&self, table: &str, key: &[Value]) -> ConnResult<Option<Row>> {
        let engine = self.engine()?;
        Ok(engine.get_by_key(table, key)?)
    }

    /// Scans all rows of a table in insertion order.
    pub fn scan(&self, table: &str) -> ConnResult<RowSet> {
        let engine = self.engine()?;
        let schema = engine.table_def(table)?.schema;
        let rows = engine.scan(table)?.collect();
        Ok(RowSet::new(schema, rows))
    }

    /// Finds rows matching a predicate, in insertion order.
    pub fn find(&self, table: &str, predicate: &Predicate) -> ConnResult<RowSet> {
        let engine = self.engine()?;
        let schema = engine.table_def(table)?.schema;
        let rows = engine.find(table, predicate)?;
        Ok(RowSet::new(schema, rows))
    }

    /// Finds rows matching a predicate with child rows eagerly loaded for
    /// each named relation.
    pub fn find_with_includes(
        &self,
        table: &str,
        predicate: &Predicate,
        relations: &[&str],
    ) -> ConnResult<Vec<IncludedRow>> {
        let engine = self.engine()?;
        Ok(engine.find_with_includes(table, predicate, relations)?)
    }

    /// Returns the number of rows in a table.
    pub fn row_count(&self, table: &str) -> ConnResult<usize> {
        Ok(self.engine()?.row_count(table)?)
    }

    // =========================================================================
    // Lifecycle
    // =========================================================================

    /// Drops all tables, rows, and schema definitions. The connection
    /// stays open and can be redefined from scratch.
    pub fn reset(&self) -> ConnResult<()> {
        let engine = self.engine()?;
        engine.drop_all_tables();
        tracing::debug!(id = %self.id, "connection reset");
        Ok(())
    }

    /// Releases all resources held by this connection. Every subsequent
    /// operation fails with `UseAfterDispose`.
    pub fn dispose(&self) -> ConnResult<()> {
        let mut state = self.state.write();
        if *state == ConnectionState::Disposed {
            return Err(ConnError::UseAfterDispose { id: self.id });
        }
        *state = ConnectionState::Disposed;
        self.engine.drop_all_tables();
        tracing::debug!(id = %self.id, "connection disposed");
        Ok(())
    }

    /// Returns the engine, failing once the connection is disposed.
    fn engine(&self) -> ConnResult<Arc<StorageEngine>> {
        if *self.state.read() == ConnectionState::Disposed {
            return Err(ConnError::UseAfterDispose { id: self.id });
        }
        self.statements.fetch_add(1, Ordering::Relaxed);
        Ok(self.engine.clone())
    }
}

impl fmt::Debug for Connection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Connection")
            .field("id", &self.id)
            .field("state", &self.state())
            .finish()
    }
}

impl Drop for Connection {
    fn drop(&mut self) {
        let _ = self.dispose();
    }
}
