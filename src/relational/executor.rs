use std::collections::HashMap;
use std::sync::Arc;

use chrono::NaiveDateTime;
use serde_json::Value as JsonValue;
use tracing::debug;

use super::RelationalBackend;
use super::params::as_sql_refs;
use crate::error::SqlFacadeError;
use crate::query_spec::{OperationKind, QuerySpec, render_insert};
use crate::results::{Envelope, FacadeRow};
use crate::types::RowValues;

impl RelationalBackend {
    /// Render and run one deferred statement. One transaction per terminal
    /// call: prepared, executed, committed; an error return drops the
    /// transaction (rolling it back) and the pooled object (returning the
    /// connection) before propagating.
    ///
    /// # Errors
    /// `StatementError` for prepare/bind/execution failures, `PoolError` or
    /// `ConnectionError` when no connection can be checked out.
    pub async fn run(&self, spec: &QuerySpec) -> Result<Envelope, SqlFacadeError> {
        let (sql, params) = spec.render();
        debug!(table = %spec.table, sql = %sql, params = params.len(), "executing statement");

        let mut client = self.acquire().await?;
        let tx = client.transaction().await?;
        let stmt = tx.prepare(&sql).await?;
        let refs = as_sql_refs(&params);

        let envelope = match spec.operation {
            OperationKind::Select | OperationKind::Update => {
                let rows = tx.query(&stmt, &refs).await?;
                rows_to_envelope(&rows)?
            }
            // Delete returns no rows; mirror the hosted client's empty data.
            OperationKind::Delete => {
                tx.execute(&stmt, &refs).await?;
                Envelope::default()
            }
        };
        tx.commit().await?;
        Ok(envelope)
    }

    /// Insert one row immediately, returning it via `RETURNING *`.
    ///
    /// # Errors
    /// Same families as [`RelationalBackend::run`].
    pub async fn run_insert(
        &self,
        table: &str,
        row: &[(String, RowValues)],
    ) -> Result<Envelope, SqlFacadeError> {
        let (sql, params) = render_insert(table, row);
        debug!(table = %table, sql = %sql, params = params.len(), "executing insert");

        let mut client = self.acquire().await?;
        let tx = client.transaction().await?;
        let stmt = tx.prepare(&sql).await?;
        let rows = tx.query(&stmt, &as_sql_refs(&params)).await?;
        let envelope = rows_to_envelope(&rows)?;
        tx.commit().await?;
        Ok(envelope)
    }

    /// Run a batch of statements inside one committed transaction. No
    /// parameters; intended for schema setup in tests and tooling.
    ///
    /// # Errors
    /// Same families as [`RelationalBackend::run`].
    pub async fn batch(&self, sql: &str) -> Result<(), SqlFacadeError> {
        let mut client = self.acquire().await?;
        let tx = client.transaction().await?;
        tx.batch_execute(sql).await?;
        tx.commit().await?;
        Ok(())
    }
}

fn rows_to_envelope(rows: &[tokio_postgres::Row]) -> Result<Envelope, SqlFacadeError> {
    let Some(first) = rows.first() else {
        return Ok(Envelope::default());
    };

    let columns: Arc<Vec<String>> = Arc::new(
        first
            .columns()
            .iter()
            .map(|col| col.name().to_string())
            .collect(),
    );
    let index: Arc<HashMap<String, usize>> = Arc::new(
        columns
            .iter()
            .enumerate()
            .map(|(i, name)| (name.clone(), i))
            .collect(),
    );

    let mut data = Vec::with_capacity(rows.len());
    for row in rows {
        let mut values = Vec::with_capacity(columns.len());
        for i in 0..columns.len() {
            values.push(extract_value(row, i)?);
        }
        data.push(FacadeRow::with_index(
            columns.clone(),
            values,
            index.clone(),
        ));
    }
    Ok(Envelope::new(data))
}

/// Pull one column out of a driver row as a `RowValues`, keyed off the
/// column's declared type. Unknown types fall back to text.
fn extract_value(row: &tokio_postgres::Row, idx: usize) -> Result<RowValues, SqlFacadeError> {
    let type_name = row.columns()[idx].type_().name();
    match type_name {
        "int2" => {
            let val: Option<i16> = row.try_get(idx)?;
            Ok(val.map_or(RowValues::Null, |v| RowValues::Int(i64::from(v))))
        }
        "int4" => {
            let val: Option<i32> = row.try_get(idx)?;
            Ok(val.map_or(RowValues::Null, |v| RowValues::Int(i64::from(v))))
        }
        "int8" => {
            let val: Option<i64> = row.try_get(idx)?;
            Ok(val.map_or(RowValues::Null, RowValues::Int))
        }
        "float4" => {
            let val: Option<f32> = row.try_get(idx)?;
            Ok(val.map_or(RowValues::Null, |v| RowValues::Float(f64::from(v))))
        }
        "float8" => {
            let val: Option<f64> = row.try_get(idx)?;
            Ok(val.map_or(RowValues::Null, RowValues::Float))
        }
        "bool" => {
            let val: Option<bool> = row.try_get(idx)?;
            Ok(val.map_or(RowValues::Null, RowValues::Bool))
        }
        "timestamp" | "timestamptz" => {
            let val: Option<NaiveDateTime> = row.try_get(idx)?;
            Ok(val.map_or(RowValues::Null, RowValues::Timestamp))
        }
        "json" | "jsonb" => {
            let val: Option<JsonValue> = row.try_get(idx)?;
            Ok(val.map_or(RowValues::Null, RowValues::JSON))
        }
        "bytea" => {
            let val: Option<Vec<u8>> = row.try_get(idx)?;
            Ok(val.map_or(RowValues::Null, RowValues::Blob))
        }
        _ => {
            let val: Option<String> = row.try_get(idx)?;
            Ok(val.map_or(RowValues::Null, RowValues::Text))
        }
    }
}
