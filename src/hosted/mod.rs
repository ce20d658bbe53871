//! Hosted PostgREST backend (e.g. Supabase).
//!
//! Translates the same query specification the relational facade renders to
//! SQL into REST query parameters and headers, and parses the JSON array
//! response into the shared envelope, so callers cannot tell the backends
//! apart.

use std::time::Duration;

use reqwest::header::{HeaderMap, HeaderValue};
use serde_json::{Map as JsonMap, Value as JsonValue};
use tracing::debug;

use crate::config::HostedConfig;
use crate::error::SqlFacadeError;
use crate::query_spec::{OperationKind, Predicate, QuerySpec};
use crate::results::{Envelope, FacadeRow};
use crate::types::RowValues;

const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);
/// Ask PostgREST to echo affected rows back, matching `RETURNING *`.
const PREFER_REPRESENTATION: &str = "return=representation";

/// HTTP client for the hosted service, memoized by the composition root
/// because construction (TLS setup, header assembly) is comparatively
/// expensive.
#[derive(Debug)]
pub struct HostedClient {
    http: reqwest::Client,
    base_url: String,
}

impl HostedClient {
    /// Build the client from hosted-service settings.
    ///
    /// # Errors
    /// Returns `SqlFacadeError::ConfigError` if the service key is not a
    /// valid header value, or a transport error if the client cannot be
    /// constructed.
    pub fn new(config: HostedConfig) -> Result<Self, SqlFacadeError> {
        let mut headers = HeaderMap::new();
        let mut auth = |name: &'static str, value: String| -> Result<(), SqlFacadeError> {
            let header = HeaderValue::from_str(&value).map_err(|_| {
                SqlFacadeError::ConfigError(format!("{name} header value is not valid"))
            })?;
            headers.insert(name, header);
            Ok(())
        };
        auth("apikey", config.key.clone())?;
        auth("authorization", format!("Bearer {}", config.key))?;

        let http = reqwest::Client::builder()
            .default_headers(headers)
            .timeout(REQUEST_TIMEOUT)
            .build()?;

        debug!(base_url = %config.url, "created hosted client");
        Ok(Self {
            http,
            base_url: config.url,
        })
    }

    /// Run one deferred statement against the REST surface.
    pub(crate) async fn run(&self, spec: &QuerySpec) -> Result<Envelope, SqlFacadeError> {
        let url = self.table_url(&spec.table);
        let pairs = request_pairs(spec);
        debug!(table = %spec.table, ?pairs, "executing hosted request");

        match spec.operation {
            OperationKind::Select => {
                let response = self.http.get(&url).query(&pairs).send().await?;
                parse_rows(response).await
            }
            OperationKind::Update => {
                let response = self
                    .http
                    .patch(&url)
                    .query(&pairs)
                    .header("prefer", PREFER_REPRESENTATION)
                    .json(&assignments_body(&spec.assignments))
                    .send()
                    .await?;
                parse_rows(response).await
            }
            // Delete reports an empty envelope either way; don't ask the
            // service to echo the removed rows.
            OperationKind::Delete => {
                let response = self.http.delete(&url).query(&pairs).send().await?;
                check_status(response).await?;
                Ok(Envelope::default())
            }
        }
    }

    /// Insert one row, echoing it back for parity with `RETURNING *`.
    pub(crate) async fn run_insert(
        &self,
        table: &str,
        row: &[(String, RowValues)],
    ) -> Result<Envelope, SqlFacadeError> {
        let url = self.table_url(table);
        debug!(table = %table, "executing hosted insert");
        let response = self
            .http
            .post(&url)
            .header("prefer", PREFER_REPRESENTATION)
            .json(&assignments_body(row))
            .send()
            .await?;
        parse_rows(response).await
    }

    fn table_url(&self, table: &str) -> String {
        format!("{}/rest/v1/{table}", self.base_url)
    }
}

/// Render a specification as PostgREST query pairs: one filter pair per
/// predicate, plus `select`, `order`, `limit`, and `offset` for selects.
fn request_pairs(spec: &QuerySpec) -> Vec<(String, String)> {
    let mut pairs = Vec::new();

    if spec.operation == OperationKind::Select {
        let projection = if spec.columns.is_empty() {
            "*".to_string()
        } else {
            spec.columns.join(",")
        };
        pairs.push(("select".to_string(), projection));
    }

    for predicate in &spec.predicates {
        pairs.push(match predicate {
            Predicate::Eq { column, value } => (column.clone(), format!("eq.{}", literal(value))),
            Predicate::Neq { column, value } => (column.clone(), format!("neq.{}", literal(value))),
            Predicate::IsNull { column } => (column.clone(), "is.null".to_string()),
            Predicate::Is { column, value } => (column.clone(), format!("is.{}", literal(value))),
            Predicate::In { column, values } => {
                let elements: Vec<String> = values.iter().map(in_element).collect();
                (column.clone(), format!("in.({})", elements.join(",")))
            }
        });
    }

    // Ordering and windows apply to selects only, exactly as the SQL
    // renderer ignores them for update/delete; emitting them here would make
    // a windowed mutation chain behave differently per backend.
    if spec.operation == OperationKind::Select {
        if let Some(order) = &spec.order {
            let direction = if order.descending { "desc" } else { "asc" };
            pairs.push(("order".to_string(), format!("{}.{direction}", order.column)));
        }
        if let Some(window) = &spec.window {
            pairs.push(("limit".to_string(), window.limit.max(0).to_string()));
            pairs.push(("offset".to_string(), window.offset.max(0).to_string()));
        }
    }
    pairs
}

/// A filter value in PostgREST textual form.
fn literal(value: &RowValues) -> String {
    match value {
        RowValues::Int(i) => i.to_string(),
        RowValues::Float(f) => f.to_string(),
        RowValues::Text(s) => s.clone(),
        RowValues::Bool(b) => b.to_string(),
        RowValues::Timestamp(dt) => dt.format("%Y-%m-%dT%H:%M:%S").to_string(),
        RowValues::Null => "null".to_string(),
        RowValues::JSON(v) => v.to_string(),
        RowValues::Blob(_) => String::new(),
    }
}

/// `in.(...)` elements: text values are double-quoted so commas and
/// parentheses inside them don't split the list.
fn in_element(value: &RowValues) -> String {
    match value {
        RowValues::Text(s) => format!("\"{}\"", s.replace('"', "\\\"")),
        other => literal(other),
    }
}

fn assignments_body(assignments: &[(String, RowValues)]) -> JsonValue {
    let mut body = JsonMap::new();
    for (column, value) in assignments {
        body.insert(column.clone(), to_json(value));
    }
    JsonValue::Object(body)
}

fn to_json(value: &RowValues) -> JsonValue {
    match value {
        RowValues::Int(i) => JsonValue::from(*i),
        RowValues::Float(f) => JsonValue::from(*f),
        RowValues::Text(s) => JsonValue::String(s.clone()),
        RowValues::Bool(b) => JsonValue::Bool(*b),
        RowValues::Timestamp(dt) => JsonValue::String(dt.format("%Y-%m-%dT%H:%M:%S").to_string()),
        RowValues::Null => JsonValue::Null,
        // Text form, matching the relational write path's serialization.
        RowValues::JSON(v) => JsonValue::String(v.to_string()),
        RowValues::Blob(bytes) => JsonValue::String(String::from_utf8_lossy(bytes).into_owned()),
    }
}

async fn check_status(response: reqwest::Response) -> Result<reqwest::Response, SqlFacadeError> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }
    let body = response.text().await.unwrap_or_default();
    Err(SqlFacadeError::HostedError(format!(
        "service returned {status}: {body}"
    )))
}

async fn parse_rows(response: reqwest::Response) -> Result<Envelope, SqlFacadeError> {
    let response = check_status(response).await?;
    let body: JsonValue = response.json().await?;
    let JsonValue::Array(objects) = body else {
        return Err(SqlFacadeError::HostedError(format!(
            "expected a JSON array response, got: {body}"
        )));
    };

    let mut data = Vec::with_capacity(objects.len());
    for object in objects {
        let JsonValue::Object(fields) = object else {
            return Err(SqlFacadeError::HostedError(
                "expected row objects in response array".to_string(),
            ));
        };
        let mut columns = Vec::with_capacity(fields.len());
        let mut values = Vec::with_capacity(fields.len());
        for (column, value) in fields {
            columns.push(column);
            values.push(RowValues::from_json(value));
        }
        data.push(FacadeRow::new(std::sync::Arc::new(columns), values));
    }
    Ok(Envelope::new(data))
}
