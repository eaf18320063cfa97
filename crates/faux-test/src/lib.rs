//! # faux-test
//!
//! Integration tests for FauxDB.
//!
//! This crate contains:
//! - End-to-end scenario tests against the connection facade
//! - Shared schema fixtures used across test files

#![warn(missing_docs)]
#![warn(clippy::all)]

use std::sync::Once;

/// Shared schema fixtures
pub mod fixtures;

static TRACING_INIT: Once = Once::new();

/// Installs a tracing subscriber for test output.
///
/// Safe to call from every test; only the first call installs the
/// subscriber.
pub fn init_tracing() {
    TRACING_INIT.call_once(|| {
        let _ = tracing_subscriber::fmt()
            .with_max_level(tracing::Level::DEBUG)
            .with_test_writer()
            .try_init();
    });
}
