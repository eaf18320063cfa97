//! Connection error types.

use thiserror::Error;

use faux_core::StoreError;

use super::connection::ConnectionId;

/// Errors raised by the connection facade.
#[derive(Debug, Clone, Error)]
pub enum ConnError {
    /// An underlying store operation failed.
    #[error("store error: {0}")]
    Store(#[from] StoreError),

    /// The connection was already disposed.
    #[error("connection {id} used after dispose")]
    UseAfterDispose {
        /// The disposed connection.
        id: ConnectionId,
    },

    /// A seed hook failed while populating a new connection.
    #[error("seed error: {0}")]
    Seed(String),
}

/// Connection result type.
pub type ConnResult<T> = Result<T, ConnError>;
