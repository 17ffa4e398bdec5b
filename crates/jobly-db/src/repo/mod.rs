//! Repositories: fixed statement templates plus the compiled clauses, executed
//! through an injected [`Executor`](crate::Executor).
//!
//! Each method issues one statement (two for `get`, which also loads the related
//! record). Nothing here opens transactions or retries.

mod company;
mod job;

pub use company::CompanyRepository;
pub use job::JobRepository;

use crate::error::{DbError, DbResult};
use crate::record::{FromRecord, Record};

/// Map the row a `RETURNING` statement produced, or report that nothing matched.
fn returned<T: FromRecord>(row: Option<Record>, not_found: impl FnOnce() -> String) -> DbResult<T> {
    match row {
        Some(record) => T::from_record(&record),
        None => Err(DbError::not_found(not_found())),
    }
}

fn map_all<T: FromRecord>(rows: &[Record]) -> DbResult<Vec<T>> {
    rows.iter().map(T::from_record).collect()
}
