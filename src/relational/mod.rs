//! Self-managed `PostgreSQL` backend: a bounded connection pool plus
//! per-statement transactional execution.

mod executor;
mod params;

use deadpool_postgres::{Config as PgConfig, Object, PoolConfig, Runtime};
use tokio_postgres::NoTls;
use tracing::debug;

use crate::config::EndpointConfig;
use crate::error::SqlFacadeError;

/// Upper bound on concurrent connections; sized for a low-traffic service
/// and not tunable at runtime. The pool starts empty and grows on demand,
/// so the effective floor is one connection on first use.
const MAX_CONNECTIONS: usize = 5;

/// Pooled relational endpoint. Built once from the configuration current at
/// first use; the endpoint is immutable for the life of the pool.
#[derive(Debug)]
pub struct RelationalBackend {
    pool: deadpool_postgres::Pool,
}

impl RelationalBackend {
    /// Build the pool from an endpoint configuration.
    ///
    /// Pool construction validates configuration only; an unreachable
    /// endpoint or rejected credentials surface as `ConnectionError` at the
    /// first checkout instead.
    ///
    /// # Errors
    /// Returns `SqlFacadeError::ConnectionError` if the pool cannot be
    /// created from the given configuration.
    pub fn new(config: &EndpointConfig) -> Result<Self, SqlFacadeError> {
        let mut pg = PgConfig::new();
        pg.host = Some(config.host.clone());
        pg.port = Some(config.port);
        pg.dbname = Some(config.dbname.clone());
        pg.user = Some(config.user.clone());
        pg.password = Some(config.password.clone());
        // Server-side bound on statement execution; the session option rides
        // along on every pooled connection.
        pg.options = Some(format!(
            "-c statement_timeout={}",
            config.statement_timeout.as_millis()
        ));

        let mut pool_config = PoolConfig::new(MAX_CONNECTIONS);
        pool_config.timeouts.wait = Some(config.acquire_timeout);
        pg.pool = Some(pool_config);

        let pool = pg
            .create_pool(Some(Runtime::Tokio1), NoTls)
            .map_err(|e| {
                SqlFacadeError::ConnectionError(format!("Failed to create Postgres pool: {e}"))
            })?;

        debug!(
            host = %config.host,
            port = config.port,
            dbname = %config.dbname,
            max_connections = MAX_CONNECTIONS,
            "created relational pool"
        );
        Ok(Self { pool })
    }

    /// Check one connection out of the pool. Blocks until a slot frees, up
    /// to the configured acquire timeout, then fails; never creates
    /// connections beyond the pool bound. The returned object hands its
    /// connection back on drop, on every exit path.
    ///
    /// # Errors
    /// `PoolError` when the pool is exhausted past the wait bound or the
    /// endpoint refuses the connection.
    pub async fn acquire(&self) -> Result<Object, SqlFacadeError> {
        Ok(self.pool.get().await?)
    }
}
