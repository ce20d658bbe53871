use crate::builder::QueryBuilder;
use crate::database::Database;
use crate::error::SqlFacadeError;
use crate::query_spec::{OperationKind, QuerySpec};
use crate::results::Envelope;
use crate::types::RowValues;

/// Per-table entry point for query operations.
///
/// Constructed by [`Database::table`] with no I/O. `select`, `update`, and
/// `delete` return a deferred [`QueryBuilder`]; `insert` has no deferred
/// chain and executes immediately.
#[derive(Debug)]
pub struct TableFacade {
    db: Database,
    table: String,
}

impl TableFacade {
    pub(crate) fn new(db: Database, table: &str) -> Self {
        Self {
            db,
            table: table.to_string(),
        }
    }

    /// Start a SELECT over the given projection; an empty slice (or `"*"`)
    /// selects all columns.
    #[must_use]
    pub fn select(&self, columns: &[&str]) -> QueryBuilder {
        let mut spec = QuerySpec::new(&self.table, OperationKind::Select);
        spec.columns = columns
            .iter()
            .copied()
            .filter(|c| *c != "*")
            .map(str::to_string)
            .collect();
        QueryBuilder::new(self.db.clone(), spec)
    }

    /// Start an UPDATE with the given column assignments, applied in call
    /// order. JSON- and array-valued assignments are bound as serialized
    /// text.
    #[must_use]
    pub fn update<I, K>(&self, assignments: I) -> QueryBuilder
    where
        I: IntoIterator<Item = (K, RowValues)>,
        K: Into<String>,
    {
        let mut spec = QuerySpec::new(&self.table, OperationKind::Update);
        spec.assignments = assignments
            .into_iter()
            .map(|(column, value)| (column.into(), value))
            .collect();
        QueryBuilder::new(self.db.clone(), spec)
    }

    /// Start a DELETE. With no predicate chained this deletes every row in
    /// the table; production callers are expected to always chain one.
    #[must_use]
    pub fn delete(&self) -> QueryBuilder {
        QueryBuilder::new(
            self.db.clone(),
            QuerySpec::new(&self.table, OperationKind::Delete),
        )
    }

    /// Insert one row and return it via `RETURNING *`. Executes immediately;
    /// there is no deferred chain for insert. JSON- and array-valued columns
    /// are bound as serialized text, mirroring the update path.
    ///
    /// # Errors
    /// Propagates configuration, connection, and statement errors from the
    /// selected backend.
    pub async fn insert<I, K>(&self, row: I) -> Result<Envelope, SqlFacadeError>
    where
        I: IntoIterator<Item = (K, RowValues)>,
        K: Into<String>,
    {
        let row: Vec<(String, RowValues)> = row
            .into_iter()
            .map(|(column, value)| (column.into(), value))
            .collect();
        self.db.run_insert(&self.table, row).await
    }

    /// The table this facade addresses.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.table
    }
}
