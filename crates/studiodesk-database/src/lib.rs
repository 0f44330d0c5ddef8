//! # studiodesk-database
//!
//! PostgreSQL connection management, the repositories the alert engine
//! reads from and writes to, and the [`AlertStore`] abstraction with its
//! PostgreSQL and in-memory implementations.

pub mod connection;
pub mod migration;
pub mod repositories;
pub mod store;

pub use connection::DatabasePool;
pub use store::{AlertInbox, AlertStore, MemoryAlertStore, PgAlertStore, StoreOp};

use studiodesk_core::error::{AppError, ErrorKind};

/// Map a sqlx error to an [`AppError`], flagging connectivity problems as
/// [`ErrorKind::ServiceUnavailable`].
pub(crate) fn db_error(context: &str, err: sqlx::Error) -> AppError {
    let kind = match &err {
        sqlx::Error::PoolTimedOut | sqlx::Error::PoolClosed | sqlx::Error::Io(_) => {
            ErrorKind::ServiceUnavailable
        }
        _ => ErrorKind::Database,
    };
    AppError::with_source(kind, format!("{context}: {err}"), err)
}
