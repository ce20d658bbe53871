use thiserror::Error;

/// Error taxonomy for the facade.
///
/// Three families matter to callers: configuration problems found when a
/// backend handle is first built, connection problems (unreachable endpoint,
/// rejected credentials, exhausted pool), and statement problems (malformed
/// SQL, constraint violations, bind-time type mismatches). The facade never
/// retries and never recovers silently; every failure propagates as one of
/// these variants with the pool's accounting left intact.
#[derive(Debug, Error)]
pub enum SqlFacadeError {
    #[error(transparent)]
    StatementError(#[from] tokio_postgres::Error),

    /// Pool checkout failure: exhausted within the wait bound, or the
    /// endpoint refused the connection. Connection-family from the caller's
    /// point of view.
    #[error(transparent)]
    PoolError(#[from] deadpool::managed::PoolError<tokio_postgres::Error>),

    #[error(transparent)]
    HostedTransportError(#[from] reqwest::Error),

    #[error("Configuration error: {0}")]
    ConfigError(String),

    #[error("Connection error: {0}")]
    ConnectionError(String),

    #[error("Hosted backend error: {0}")]
    HostedError(String),
}
