use std::sync::Arc;

use tokio::sync::OnceCell;
use tracing::debug;

use crate::config::{self, EndpointConfig, HostedConfig};
use crate::error::SqlFacadeError;
use crate::facade::TableFacade;
use crate::hosted::HostedClient;
use crate::query_spec::QuerySpec;
use crate::relational::RelationalBackend;
use crate::results::Envelope;
use crate::types::{BackendKind, RowValues};

/// Composition root and backend selector.
///
/// Which backend answers is re-decided on every terminal call from the
/// current environment, never cached, so operators can flip backends by
/// changing configuration alone. The expensive handles themselves (the
/// connection pool, the hosted HTTP client) are built lazily on first use
/// and memoized for the life of the process.
///
/// Cloning is cheap; clones share the memoized handles.
#[derive(Debug, Clone, Default)]
pub struct Database {
    inner: Arc<DatabaseInner>,
}

#[derive(Debug, Default)]
struct DatabaseInner {
    relational: OnceCell<RelationalBackend>,
    hosted: OnceCell<HostedClient>,
}

enum Backend<'a> {
    Relational(&'a RelationalBackend),
    Hosted(&'a HostedClient),
}

impl Database {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Obtain the facade for a table. Pure constructor: no I/O, no backend
    /// decision; both happen at the terminal call.
    #[must_use]
    pub fn table(&self, name: &str) -> TableFacade {
        TableFacade::new(self.clone(), name)
    }

    /// The backend a terminal call issued right now would route to.
    #[must_use]
    pub fn selected_backend(&self) -> BackendKind {
        BackendKind::for_host(config::current_relational_host().as_deref())
    }

    pub(crate) async fn run(&self, spec: QuerySpec) -> Result<Envelope, SqlFacadeError> {
        match self.resolve().await? {
            Backend::Relational(backend) => backend.run(&spec).await,
            Backend::Hosted(client) => client.run(&spec).await,
        }
    }

    pub(crate) async fn run_insert(
        &self,
        table: &str,
        row: Vec<(String, RowValues)>,
    ) -> Result<Envelope, SqlFacadeError> {
        match self.resolve().await? {
            Backend::Relational(backend) => backend.run_insert(table, &row).await,
            Backend::Hosted(client) => client.run_insert(table, &row).await,
        }
    }

    async fn resolve(&self) -> Result<Backend<'_>, SqlFacadeError> {
        let kind = self.selected_backend();
        debug!(?kind, "routing database call");
        match kind {
            BackendKind::Relational => {
                let backend = self
                    .inner
                    .relational
                    .get_or_try_init(|| async {
                        let config = EndpointConfig::from_env()?;
                        RelationalBackend::new(&config)
                    })
                    .await?;
                Ok(Backend::Relational(backend))
            }
            BackendKind::Hosted => {
                let client = self
                    .inner
                    .hosted
                    .get_or_try_init(|| async { HostedClient::new(HostedConfig::from_env()?) })
                    .await?;
                Ok(Backend::Hosted(client))
            }
        }
    }
}
