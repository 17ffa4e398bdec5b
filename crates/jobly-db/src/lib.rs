//! # jobly-db
//!
//! PostgreSQL data access for the Jobly job board.
//!
//! ## Features
//!
//! - **Partial updates**: a field → value request compiles to a `SET` fragment with
//!   `$1, $2, ...` placeholders, checked against a per-entity allow-list
//! - **Filtered searches**: optional job/company criteria compile to a `WHERE` fragment
//! - **Repositories**: create, find, get, update and remove jobs and companies
//! - **Injected executor**: pass a client, a transaction, a pooled connection or a fake
//! - **Instrumentation**: statement logging via `tracing`, slow-query warnings, timeouts
//!
//! ```ignore
//! use jobly_db::{DbConfig, JobFilter, JobRepository, create_pool};
//!
//! let pool = create_pool(&DbConfig::from_env()?)?;
//! let jobs = JobRepository::new(&pool)
//!     .find_all(Some(&JobFilter::new().min_salary(50000).title("engineer")))
//!     .await?;
//! ```

pub mod clause;
pub mod config;
pub mod error;
pub mod executor;
pub mod fields;
pub mod filter;
pub mod models;
pub mod monitor;
pub mod record;
pub mod repo;
pub mod update;
pub mod value;

#[cfg(feature = "pool")]
pub mod pool;

#[cfg(test)]
mod testing;

pub use clause::{CompiledClause, ParamList, placeholder};
pub use config::DbConfig;
pub use error::{DbError, DbResult};
pub use executor::Executor;
pub use fields::{FieldAllowList, FieldTranslation, quote_column};
pub use filter::{CompanyFilter, JobFilter, WhereBuilder, compile_company_filter, compile_job_filter};
pub use models::{
    COMPANY_UPDATE, Company, CompanyDetail, CompanyJob, JOB_UPDATE, Job, JobDetail, JobListing,
    NewCompany, NewJob,
};
pub use monitor::{InstrumentedExecutor, MonitorConfig};
pub use record::{FromRecord, Record};
pub use repo::{CompanyRepository, JobRepository};
pub use update::{PartialUpdate, UpdateSchema, compile_partial_update};
pub use value::{FromValue, SqlValue};

#[cfg(feature = "pool")]
pub use pool::{PoolClient, create_pool, create_pool_with_tls};
