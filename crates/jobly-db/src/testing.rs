//! Scripted executor for unit tests.

use crate::error::{DbError, DbResult};
use crate::executor::Executor;
use crate::record::Record;
use crate::value::SqlValue;
use std::collections::VecDeque;
use std::sync::Mutex;
use std::time::Duration;

/// One statement as the repository issued it.
#[derive(Debug, Clone, PartialEq)]
pub struct Call {
    pub sql: String,
    pub params: Vec<SqlValue>,
}

/// Replays queued responses in order and records every call.
///
/// When the queue runs dry, statements return no rows.
#[derive(Default)]
pub struct FakeExecutor {
    responses: Mutex<VecDeque<DbResult<Vec<Record>>>>,
    calls: Mutex<Vec<Call>>,
    delay: Option<Duration>,
}

impl FakeExecutor {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = Some(delay);
        self
    }

    pub fn push_rows(&self, rows: Vec<Record>) -> &Self {
        self.responses.lock().unwrap().push_back(Ok(rows));
        self
    }

    pub fn push_error(&self, err: DbError) -> &Self {
        self.responses.lock().unwrap().push_back(Err(err));
        self
    }

    pub fn calls(&self) -> Vec<Call> {
        self.calls.lock().unwrap().clone()
    }

    pub fn last_call(&self) -> Call {
        self.calls().pop().expect("no statement was executed")
    }
}

impl Executor for FakeExecutor {
    async fn query(&self, sql: &str, params: &[SqlValue]) -> DbResult<Vec<Record>> {
        self.calls.lock().unwrap().push(Call {
            sql: sql.to_string(),
            params: params.to_vec(),
        });
        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }
        let next = self.responses.lock().unwrap().pop_front();
        next.unwrap_or_else(|| Ok(Vec::new()))
    }
}
