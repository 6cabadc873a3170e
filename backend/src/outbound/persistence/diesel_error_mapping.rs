//! Diesel and pool error mapping shared by every repository.
//!
//! Repositories pass their port error constructors so each adapter keeps its
//! own error type while the classification lives in one place.

use diesel::result::{DatabaseErrorKind, Error as DieselError};
use tracing::debug;

use super::pool::PoolError;

/// Map a pool failure to the repository's connection error.
pub fn map_pool_error<E>(error: PoolError, connection: impl FnOnce(String) -> E) -> E {
    let message = match error {
        PoolError::Checkout { message } | PoolError::Build { message } => message,
    };
    connection(message)
}

/// Map a Diesel failure to the repository's connection or query error.
///
/// Closed connections are connection errors; everything else is a query
/// error labelled with `operation`.
pub fn map_diesel_error<E>(
    error: DieselError,
    operation: &str,
    query: impl FnOnce(String) -> E,
    connection: impl FnOnce(String) -> E,
) -> E {
    match &error {
        DieselError::DatabaseError(kind, info) => {
            debug!(?kind, message = info.message(), %operation, "diesel operation failed");
        }
        _ => debug!(%error, %operation, "diesel operation failed"),
    }

    match error {
        DieselError::DatabaseError(DatabaseErrorKind::ClosedConnection, _) => {
            connection(format!("{operation}: database connection error"))
        }
        DieselError::DatabaseError(_, info) => {
            query(format!("{operation}: {}", info.message()))
        }
        other => query(format!("{operation}: {other}")),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[derive(Debug, PartialEq, Eq)]
    enum Mapped {
        Query(String),
        Connection(String),
    }

    #[rstest]
    fn pool_errors_become_connection_errors() {
        let mapped = map_pool_error(PoolError::checkout("timed out"), Mapped::Connection);
        assert_eq!(mapped, Mapped::Connection("timed out".to_owned()));
    }

    #[rstest]
    fn closed_connections_are_connection_errors() {
        let error = DieselError::DatabaseError(
            DatabaseErrorKind::ClosedConnection,
            Box::new("server closed the connection".to_owned()),
        );
        let mapped = map_diesel_error(error, "lookup", Mapped::Query, Mapped::Connection);
        assert_eq!(
            mapped,
            Mapped::Connection("lookup: database connection error".to_owned())
        );
    }

    #[rstest]
    fn other_failures_are_query_errors() {
        let mapped = map_diesel_error(DieselError::NotFound, "lookup", Mapped::Query, Mapped::Connection);
        assert_eq!(mapped, Mapped::Query("lookup: Record not found".to_owned()));
    }
}
