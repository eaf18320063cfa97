//! # faux-core
//!
//! In-memory relational store for FauxDB.
//!
//! This crate implements the storage half of FauxDB: typed tables of
//! rows keyed by primary key, a schema registry holding table and
//! relation definitions, and a small query executor for predicate reads,
//! eager inclusion, and all-or-nothing graph inserts.
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │                     Query Executor                           │
//! │  (find / find_with_includes / insert_with_relations)        │
//! └─────────────────────────────────────────────────────────────┘
//!                               │
//!                               ▼
//! ┌─────────────────────────────────────────────────────────────┐
//! │                     StorageEngine                            │
//! │  ┌─────────────┐              ┌──────────────┐              │
//! │  │   Catalog   │              │  TableStore  │              │
//! │  │  (schemas,  │              │  (rows in    │              │
//! │  │  relations) │              │  insert order)│             │
//! │  └─────────────┘              └──────────────┘              │
//! └─────────────────────────────────────────────────────────────┘
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]

mod catalog;
mod engine;
mod error;
mod executor;
mod row;
mod schema;
mod table;
mod value;

pub use catalog::Catalog;
pub use engine::{EngineStats, StorageEngine};
pub use error::{StoreError, StoreResult};
pub use executor::{CompareOp, IncludedRow, Predicate};
pub use row::{NamedRow, Row};
pub use schema::{Column, Relation, Schema, SchemaRef, TableDef};
pub use table::{ScanIter, TableStore};
pub use value::{DataType, Value};
