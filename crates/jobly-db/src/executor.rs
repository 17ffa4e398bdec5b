//! The store executor seam.
//!
//! Repositories never reach for a global connection: they are handed something that
//! implements [`Executor`]. That can be a plain `tokio_postgres::Client`, a
//! transaction, a pooled connection, an [`InstrumentedExecutor`](crate::InstrumentedExecutor)
//! wrapping any of these, or a scripted fake in tests.

use crate::error::{DbError, DbResult};
use crate::record::Record;
use crate::value::SqlValue;
use tokio_postgres::types::ToSql;

/// Runs one statement with `$1, $2, ...` placeholders and returns its rows.
///
/// `params[i]` is bound to `$(i + 1)`. Statements that modify data are expected to use
/// `RETURNING` so that "matched zero rows" shows up as an empty result.
pub trait Executor: Send + Sync {
    /// Execute a statement and return all rows.
    fn query(
        &self,
        sql: &str,
        params: &[SqlValue],
    ) -> impl std::future::Future<Output = DbResult<Vec<Record>>> + Send;

    /// Execute a statement and return the first row, if any.
    ///
    /// Semantics:
    /// - 0 rows: returns `Ok(None)`
    /// - 1 or more rows: returns `Ok(Some(first_row))`
    fn query_opt(
        &self,
        sql: &str,
        params: &[SqlValue],
    ) -> impl std::future::Future<Output = DbResult<Option<Record>>> + Send {
        async move {
            let rows = self.query(sql, params).await?;
            Ok(rows.into_iter().next())
        }
    }

    /// Return a cancellation token for the underlying connection, if supported.
    fn cancel_token(&self) -> Option<tokio_postgres::CancelToken> {
        None
    }
}

pub(crate) fn param_refs(params: &[SqlValue]) -> Vec<&(dyn ToSql + Sync)> {
    params.iter().map(|p| p as &(dyn ToSql + Sync)).collect()
}

fn decode_rows(rows: &[tokio_postgres::Row]) -> DbResult<Vec<Record>> {
    rows.iter().map(Record::from_row).collect()
}

impl Executor for tokio_postgres::Client {
    async fn query(&self, sql: &str, params: &[SqlValue]) -> DbResult<Vec<Record>> {
        let rows = tokio_postgres::Client::query(self, sql, &param_refs(params))
            .await
            .map_err(DbError::from_db_error)?;
        decode_rows(&rows)
    }

    fn cancel_token(&self) -> Option<tokio_postgres::CancelToken> {
        Some(tokio_postgres::Client::cancel_token(self))
    }
}

impl Executor for tokio_postgres::Transaction<'_> {
    async fn query(&self, sql: &str, params: &[SqlValue]) -> DbResult<Vec<Record>> {
        let rows = tokio_postgres::Transaction::query(self, sql, &param_refs(params))
            .await
            .map_err(DbError::from_db_error)?;
        decode_rows(&rows)
    }

    fn cancel_token(&self) -> Option<tokio_postgres::CancelToken> {
        Some(tokio_postgres::Transaction::cancel_token(self))
    }
}

impl<E: Executor> Executor for &E {
    async fn query(&self, sql: &str, params: &[SqlValue]) -> DbResult<Vec<Record>> {
        (*self).query(sql, params).await
    }

    fn cancel_token(&self) -> Option<tokio_postgres::CancelToken> {
        (*self).cancel_token()
    }
}
