//! Statement logging, timing and timeouts.
//!
//! [`InstrumentedExecutor`] wraps any [`Executor`] and reports each statement through
//! `tracing` under the `jobly_db::sql` target:
//!
//! - `DEBUG` before execution, with the SQL text and the number of bound values;
//! - `DEBUG` after execution, with the row count (or the error) and the duration;
//! - `WARN` when the duration exceeds the slow-query threshold.
//!
//! Bound values are never logged.

use crate::error::{DbError, DbResult};
use crate::executor::Executor;
use crate::record::Record;
use crate::value::SqlValue;
use std::time::{Duration, Instant};

const SQL_TARGET: &str = "jobly_db::sql";

/// Configuration for statement instrumentation.
#[derive(Debug, Clone, Default)]
pub struct MonitorConfig {
    /// Statement timeout. `None` means no timeout (default).
    pub query_timeout: Option<Duration>,
    /// Slow statement threshold for `WARN` logging.
    pub slow_query_threshold: Option<Duration>,
    /// Truncate logged SQL (in chars). `None` means no truncation.
    pub max_sql_length: Option<usize>,
}

impl MonitorConfig {
    pub fn new() -> Self {
        Self::default()
    }

    /// Statements exceeding this duration are abandoned with [`DbError::Timeout`] and
    /// a best-effort server-side cancel is sent.
    pub fn with_query_timeout(mut self, timeout: Duration) -> Self {
        self.query_timeout = Some(timeout);
        self
    }

    pub fn with_slow_query_threshold(mut self, threshold: Duration) -> Self {
        self.slow_query_threshold = Some(threshold);
        self
    }

    pub fn with_max_sql_length(mut self, len: usize) -> Self {
        self.max_sql_length = Some(len);
        self
    }
}

/// Truncate `sql` to at most `max` characters, appending `...` when shortened.
pub(crate) fn truncate_sql(sql: &str, max: Option<usize>) -> String {
    match max {
        Some(max) => match sql.char_indices().nth(max) {
            Some((cut, _)) => format!("{}...", &sql[..cut]),
            None => sql.to_string(),
        },
        None => sql.to_string(),
    }
}

/// An executor wrapper that logs, times and optionally bounds every statement.
pub struct InstrumentedExecutor<E> {
    inner: E,
    config: MonitorConfig,
}

impl<E: Executor> InstrumentedExecutor<E> {
    pub fn new(inner: E) -> Self {
        Self {
            inner,
            config: MonitorConfig::default(),
        }
    }

    pub fn with_config(mut self, config: MonitorConfig) -> Self {
        self.config = config;
        self
    }

    pub fn config(&self) -> &MonitorConfig {
        &self.config
    }

    pub fn inner(&self) -> &E {
        &self.inner
    }

    pub fn into_inner(self) -> E {
        self.inner
    }

    async fn execute_with_timeout<T, F>(&self, future: F) -> DbResult<T>
    where
        F: std::future::Future<Output = DbResult<T>> + Send,
    {
        match self.config.query_timeout {
            Some(timeout) => {
                tokio::pin!(future);
                tokio::select! {
                    result = &mut future => result,
                    _ = tokio::time::sleep(timeout) => {
                        tracing::warn!(
                            target: SQL_TARGET,
                            timeout_ms = timeout.as_millis() as u64,
                            "statement timed out"
                        );
                        if let Some(cancel_token) = self.inner.cancel_token() {
                            tokio::spawn(async move {
                                let _ = cancel_token.cancel_query(tokio_postgres::NoTls).await;
                            });
                        }
                        Err(DbError::Timeout(timeout))
                    }
                }
            }
            None => future.await,
        }
    }
}

impl<E: Executor> Executor for InstrumentedExecutor<E> {
    async fn query(&self, sql: &str, params: &[SqlValue]) -> DbResult<Vec<Record>> {
        let shown = truncate_sql(sql, self.config.max_sql_length);
        tracing::debug!(target: SQL_TARGET, sql = %shown, params = params.len(), "executing statement");

        let start = Instant::now();
        let result = self
            .execute_with_timeout(self.inner.query(sql, params))
            .await;
        let elapsed = start.elapsed();
        let elapsed_ms = elapsed.as_millis() as u64;

        match &result {
            Ok(rows) => {
                tracing::debug!(target: SQL_TARGET, rows = rows.len(), elapsed_ms, "statement completed");
            }
            Err(err) => {
                tracing::debug!(target: SQL_TARGET, error = %err, elapsed_ms, "statement failed");
            }
        }

        if let Some(threshold) = self.config.slow_query_threshold {
            if elapsed > threshold {
                tracing::warn!(
                    target: SQL_TARGET,
                    sql = %shown,
                    elapsed_ms,
                    threshold_ms = threshold.as_millis() as u64,
                    "slow statement"
                );
            }
        }

        result
    }

    fn cancel_token(&self) -> Option<tokio_postgres::CancelToken> {
        self.inner.cancel_token()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::FakeExecutor;

    #[test]
    fn truncate_respects_char_boundaries() {
        assert_eq!(truncate_sql("SELECT 1", Some(20)), "SELECT 1");
        assert_eq!(truncate_sql("SELECT 1", Some(6)), "SELECT...");
        assert_eq!(truncate_sql("ééé", Some(1)), "é...");
        assert_eq!(truncate_sql("SELECT 1", None), "SELECT 1");
    }

    #[tokio::test]
    async fn passes_statements_through() {
        let fake = FakeExecutor::new();
        fake.push_rows(vec![Record::new().with("id", 1)]);

        let exec = InstrumentedExecutor::new(&fake)
            .with_config(MonitorConfig::new().with_slow_query_threshold(Duration::from_secs(5)));
        let rows = exec
            .query("SELECT id FROM jobs WHERE id = $1", &[SqlValue::Int(1)])
            .await
            .unwrap();

        assert_eq!(rows.len(), 1);
        let calls = fake.calls();
        assert_eq!(calls.len(), 1);
        assert_eq!(calls[0].sql, "SELECT id FROM jobs WHERE id = $1");
        assert_eq!(calls[0].params, vec![SqlValue::Int(1)]);
    }

    #[tokio::test]
    async fn errors_are_returned_unchanged() {
        let fake = FakeExecutor::new();
        fake.push_error(DbError::not_found("scripted"));

        let exec = InstrumentedExecutor::new(&fake);
        let err = exec.query("SELECT 1", &[]).await.unwrap_err();
        assert!(err.is_not_found());
    }

    #[tokio::test]
    async fn times_out_slow_statements() {
        let fake = FakeExecutor::new().with_delay(Duration::from_millis(200));
        fake.push_rows(vec![]);

        let exec = InstrumentedExecutor::new(&fake)
            .with_config(MonitorConfig::new().with_query_timeout(Duration::from_millis(10)));
        let err = exec.query("SELECT pg_sleep(1)", &[]).await.unwrap_err();
        assert!(err.is_timeout());
    }
}
