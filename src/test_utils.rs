//! Test utilities for provisioning an embedded `PostgreSQL` instance.
//!
//! Only compiled with the `test-utils` feature; the bundled server lets the
//! live pool properties (bounded capacity, post-failure checkout accounting)
//! be exercised without any external database.

use std::sync::LazyLock;
use std::time::Duration;

use postgresql_embedded::PostgreSQL;
use tokio::runtime::Runtime;

use crate::config::EndpointConfig;

/// Shared runtime for server lifecycle calls, so the embedded instance's
/// background tasks outlive any per-test runtime.
static SHARED_RUNTIME: LazyLock<Runtime> =
    LazyLock::new(|| Runtime::new().expect("Failed to create tokio runtime for test utilities"));

/// A running embedded `PostgreSQL` instance and a facade endpoint
/// configuration pointing at it.
pub struct EmbeddedPostgres {
    pub postgresql: PostgreSQL,
    /// Working endpoint configuration; tests may tighten its timeouts.
    pub config: EndpointConfig,
}

/// Set up an embedded `PostgreSQL` instance and create `dbname` on it.
///
/// # Errors
/// Returns an error if the embedded server cannot be set up or started, or
/// if database creation fails.
pub fn setup_postgres_embedded(
    dbname: &str,
) -> Result<EmbeddedPostgres, Box<dyn std::error::Error>> {
    SHARED_RUNTIME.block_on(async {
        let mut postgresql = PostgreSQL::default();
        postgresql.setup().await?;
        postgresql.start().await?;
        postgresql.create_database(dbname).await?;

        let settings = postgresql.settings();
        let config = EndpointConfig {
            host: settings.host.clone(),
            port: settings.port,
            dbname: dbname.to_string(),
            user: settings.username.clone(),
            password: settings.password.clone(),
            acquire_timeout: Duration::from_secs(5),
            statement_timeout: Duration::from_secs(30),
        };

        Ok(EmbeddedPostgres { postgresql, config })
    })
}

/// Stop a previously started embedded `PostgreSQL` instance.
pub fn stop_postgres_embedded(postgres: EmbeddedPostgres) {
    let EmbeddedPostgres { postgresql, .. } = postgres;
    SHARED_RUNTIME.block_on(async move {
        let _ = postgresql.stop().await;
    });
}
