use std::time::Duration;

use crate::error::SqlFacadeError;

/// Environment variable naming the relational endpoint host. Its presence is
/// also the backend-selection signal: set means "relational facade answers".
pub const ENV_DB_HOST: &str = "DB_HOST";
const ENV_DB_PORT: &str = "DB_PORT";
const ENV_DB_NAME: &str = "DB_NAME";
const ENV_DB_USER: &str = "DB_USER";
const ENV_DB_PASSWORD: &str = "DB_PASSWORD";
const ENV_DB_ACQUIRE_TIMEOUT: &str = "DB_ACQUIRE_TIMEOUT_SECS";
const ENV_DB_STATEMENT_TIMEOUT: &str = "DB_STATEMENT_TIMEOUT_SECS";

const ENV_HOSTED_URL: &str = "SUPABASE_URL";
const ENV_HOSTED_KEY: &str = "SUPABASE_KEY";

const DEFAULT_PORT: u16 = 5432;
/// Default bound on pool-checkout wait and on statement execution time.
/// The upstream design had no bound at all; 30s is deliberately generous
/// for a low-traffic service while still preventing indefinite blocking.
const DEFAULT_TIMEOUT_SECS: u64 = 30;

/// Connection settings for the self-managed relational endpoint.
///
/// Immutable once the pool has been created from it; changing the endpoint
/// mid-flight requires a process restart.
#[derive(Debug, Clone)]
pub struct EndpointConfig {
    pub host: String,
    pub port: u16,
    pub dbname: String,
    pub user: String,
    pub password: String,
    /// Maximum time to wait for a pooled connection to free up.
    pub acquire_timeout: Duration,
    /// Server-side `statement_timeout` applied to every session.
    pub statement_timeout: Duration,
}

impl EndpointConfig {
    /// Read the endpoint from process environment.
    ///
    /// # Errors
    /// Returns `SqlFacadeError::ConfigError` if a required variable is
    /// missing or a numeric variable fails to parse.
    pub fn from_env() -> Result<Self, SqlFacadeError> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    pub(crate) fn from_lookup<F>(lookup: F) -> Result<Self, SqlFacadeError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let required = |name: &str| -> Result<String, SqlFacadeError> {
            lookup(name)
                .filter(|v| !v.is_empty())
                .ok_or_else(|| SqlFacadeError::ConfigError(format!("{name} is required")))
        };

        let port = match lookup(ENV_DB_PORT) {
            Some(raw) if !raw.is_empty() => raw.parse::<u16>().map_err(|_| {
                SqlFacadeError::ConfigError(format!("{ENV_DB_PORT} is not a valid port: {raw}"))
            })?,
            _ => DEFAULT_PORT,
        };

        Ok(EndpointConfig {
            host: required(ENV_DB_HOST)?,
            port,
            dbname: required(ENV_DB_NAME)?,
            user: required(ENV_DB_USER)?,
            password: required(ENV_DB_PASSWORD)?,
            acquire_timeout: timeout_from(&lookup, ENV_DB_ACQUIRE_TIMEOUT)?,
            statement_timeout: timeout_from(&lookup, ENV_DB_STATEMENT_TIMEOUT)?,
        })
    }
}

/// Settings for the hosted PostgREST backend (URL + service key).
#[derive(Debug, Clone)]
pub struct HostedConfig {
    pub url: String,
    pub key: String,
}

impl HostedConfig {
    /// Read hosted-service settings from process environment.
    ///
    /// # Errors
    /// Returns `SqlFacadeError::ConfigError` if the URL or key is missing;
    /// with no relational host configured either, there is no usable backend.
    pub fn from_env() -> Result<Self, SqlFacadeError> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    pub(crate) fn from_lookup<F>(lookup: F) -> Result<Self, SqlFacadeError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let required = |name: &str| -> Result<String, SqlFacadeError> {
            lookup(name)
                .filter(|v| !v.is_empty())
                .ok_or_else(|| {
                    SqlFacadeError::ConfigError(format!(
                        "either {ENV_DB_HOST} or ({ENV_HOSTED_URL} and {ENV_HOSTED_KEY}) must be set; {name} is missing"
                    ))
                })
        };

        Ok(HostedConfig {
            url: required(ENV_HOSTED_URL)?.trim_end_matches('/').to_string(),
            key: required(ENV_HOSTED_KEY)?,
        })
    }
}

/// Current relational host, re-read from the environment on every call so
/// operators can flip backends without a restart.
#[must_use]
pub fn current_relational_host() -> Option<String> {
    std::env::var(ENV_DB_HOST).ok().filter(|v| !v.is_empty())
}

fn timeout_from<F>(lookup: &F, name: &str) -> Result<Duration, SqlFacadeError>
where
    F: Fn(&str) -> Option<String>,
{
    match lookup(name) {
        Some(raw) if !raw.is_empty() => {
            let secs = raw.parse::<u64>().map_err(|_| {
                SqlFacadeError::ConfigError(format!("{name} is not a valid number of seconds: {raw}"))
            })?;
            Ok(Duration::from_secs(secs))
        }
        _ => Ok(Duration::from_secs(DEFAULT_TIMEOUT_SECS)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn vars<'a>(pairs: &'a [(&'a str, &'a str)]) -> impl Fn(&str) -> Option<String> + 'a {
        move |name| {
            pairs
                .iter()
                .find(|(k, _)| *k == name)
                .map(|(_, v)| (*v).to_string())
        }
    }

    #[test]
    fn endpoint_defaults_port_and_timeouts() {
        let cfg = EndpointConfig::from_lookup(vars(&[
            ("DB_HOST", "db.internal"),
            ("DB_NAME", "tracker"),
            ("DB_USER", "app"),
            ("DB_PASSWORD", "secret"),
        ]))
        .unwrap();
        assert_eq!(cfg.port, 5432);
        assert_eq!(cfg.acquire_timeout, Duration::from_secs(30));
        assert_eq!(cfg.statement_timeout, Duration::from_secs(30));
    }

    #[test]
    fn endpoint_missing_field_is_config_error() {
        let err = EndpointConfig::from_lookup(vars(&[("DB_HOST", "db.internal")])).unwrap_err();
        assert!(matches!(err, SqlFacadeError::ConfigError(_)));
    }

    #[test]
    fn endpoint_rejects_bad_port() {
        let err = EndpointConfig::from_lookup(vars(&[
            ("DB_HOST", "db.internal"),
            ("DB_PORT", "not-a-port"),
            ("DB_NAME", "tracker"),
            ("DB_USER", "app"),
            ("DB_PASSWORD", "secret"),
        ]))
        .unwrap_err();
        assert!(matches!(err, SqlFacadeError::ConfigError(_)));
    }

    #[test]
    fn hosted_url_is_trimmed() {
        let cfg = HostedConfig::from_lookup(vars(&[
            ("SUPABASE_URL", "https://proj.supabase.co/"),
            ("SUPABASE_KEY", "anon-key"),
        ]))
        .unwrap();
        assert_eq!(cfg.url, "https://proj.supabase.co");
    }

    #[test]
    fn hosted_missing_key_is_config_error() {
        let err =
            HostedConfig::from_lookup(vars(&[("SUPABASE_URL", "https://x.co")])).unwrap_err();
        assert!(matches!(err, SqlFacadeError::ConfigError(_)));
    }
}
