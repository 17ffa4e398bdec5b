//! Connection pool utilities

use crate::config::DbConfig;
use crate::error::{DbError, DbResult};
use crate::executor::Executor;
use crate::record::Record;
use crate::value::SqlValue;
use deadpool_postgres::{Manager, ManagerConfig, Pool, PoolBuilder, RecyclingMethod};
use tokio_postgres::NoTls;
use tokio_postgres::Socket;
use tokio_postgres::tls::{MakeTlsConnect, TlsConnect};

/// Create a connection pool from a [`DbConfig`] using `NoTls`.
///
/// # Example
///
/// ```ignore
/// let config = jobly_db::DbConfig::from_env()?;
/// let pool = jobly_db::create_pool(&config)?;
/// let jobs = jobly_db::JobRepository::new(&pool).find_all(None).await?;
/// ```
pub fn create_pool(config: &DbConfig) -> DbResult<Pool> {
    create_pool_with_tls(config, NoTls)
}

/// Create a connection pool using a custom TLS connector.
pub fn create_pool_with_tls<T>(config: &DbConfig, tls: T) -> DbResult<Pool>
where
    T: MakeTlsConnect<Socket> + Clone + Sync + Send + 'static,
    T::Stream: Sync + Send,
    T::TlsConnect: Sync + Send,
    <T::TlsConnect as TlsConnect<Socket>>::Future: Send,
{
    let max_size = config.max_pool_size;
    create_pool_with_manager_config(config, tls, default_manager_config(), |builder| {
        builder.max_size(max_size)
    })
}

/// Create a connection pool with an injected `deadpool_postgres::ManagerConfig` and
/// `PoolBuilder` customization.
pub fn create_pool_with_manager_config<T>(
    config: &DbConfig,
    tls: T,
    manager_config: ManagerConfig,
    configure_pool: impl FnOnce(PoolBuilder) -> PoolBuilder,
) -> DbResult<Pool>
where
    T: MakeTlsConnect<Socket> + Clone + Sync + Send + 'static,
    T::Stream: Sync + Send,
    T::TlsConnect: Sync + Send,
    <T::TlsConnect as TlsConnect<Socket>>::Future: Send,
{
    let pg_config: tokio_postgres::Config = config
        .database_url
        .parse()
        .map_err(|e: tokio_postgres::Error| DbError::Connection(e.to_string()))?;

    let mgr = Manager::from_config(pg_config, tls, manager_config);
    configure_pool(Pool::builder(mgr))
        .build()
        .map_err(|e| DbError::Pool(e.to_string()))
}

fn default_manager_config() -> ManagerConfig {
    ManagerConfig {
        recycling_method: RecyclingMethod::Fast,
    }
}

/// A connection checked out of the pool.
pub struct PoolClient(deadpool_postgres::Client);

impl PoolClient {
    pub fn new(client: deadpool_postgres::Client) -> Self {
        Self(client)
    }

    pub fn into_inner(self) -> deadpool_postgres::Client {
        self.0
    }
}

impl std::ops::Deref for PoolClient {
    type Target = deadpool_postgres::Client;

    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

impl Executor for PoolClient {
    async fn query(&self, sql: &str, params: &[SqlValue]) -> DbResult<Vec<Record>> {
        let client: &tokio_postgres::Client = &self.0;
        Executor::query(client, sql, params).await
    }

    fn cancel_token(&self) -> Option<tokio_postgres::CancelToken> {
        Some(self.0.cancel_token())
    }
}

/// Each statement checks out its own connection and returns it afterwards.
impl Executor for Pool {
    async fn query(&self, sql: &str, params: &[SqlValue]) -> DbResult<Vec<Record>> {
        let client = PoolClient::new(self.get().await?);
        Executor::query(&client, sql, params).await
    }
}
