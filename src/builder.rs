use crate::database::Database;
use crate::error::SqlFacadeError;
use crate::query_spec::{OrderClause, PageWindow, Predicate, QuerySpec};
use crate::results::Envelope;
use crate::types::RowValues;

/// The value `is_filter` treats as a request for a literal `IS NULL` clause.
/// Kept verbatim for parity with the hosted client's idiom; a consequence is
/// that the literal string `"null"` can never itself be matched through
/// `is_filter`.
const NULL_SENTINEL: &str = "null";

/// Fluent builder for one deferred `select`/`update`/`delete` statement.
///
/// Each chain call takes the builder by value and returns it, so the
/// accumulated specification is write-once and consumed exactly once by
/// [`QueryBuilder::execute`]. No I/O happens until the terminal call, which
/// is also when the backend is chosen.
#[derive(Debug)]
pub struct QueryBuilder {
    db: Database,
    spec: QuerySpec,
}

impl QueryBuilder {
    pub(crate) fn new(db: Database, spec: QuerySpec) -> Self {
        Self { db, spec }
    }

    /// Append an equality condition. The value is bound as-is; no type
    /// coercion is performed.
    #[must_use]
    pub fn eq(mut self, column: &str, value: RowValues) -> Self {
        self.spec.predicates.push(Predicate::Eq {
            column: column.to_string(),
            value,
        });
        self
    }

    /// Append a not-equal condition.
    #[must_use]
    pub fn neq(mut self, column: &str, value: RowValues) -> Self {
        self.spec.predicates.push(Predicate::Neq {
            column: column.to_string(),
            value,
        });
        self
    }

    /// Append an `IS` condition. The sentinel text `"null"` selects a
    /// literal `IS NULL` clause with no bound parameter; any other value is
    /// bound as `IS $n`.
    #[must_use]
    pub fn is_filter(mut self, column: &str, value: RowValues) -> Self {
        let predicate = match &value {
            RowValues::Text(s) if s == NULL_SENTINEL => Predicate::IsNull {
                column: column.to_string(),
            },
            _ => Predicate::Is {
                column: column.to_string(),
                value,
            },
        };
        self.spec.predicates.push(predicate);
        self
    }

    /// Append an `IN (...)` condition with one bound parameter per element.
    /// An empty list matches no rows rather than producing invalid SQL.
    #[must_use]
    pub fn in_list(mut self, column: &str, values: Vec<RowValues>) -> Self {
        self.spec.predicates.push(Predicate::In {
            column: column.to_string(),
            values,
        });
        self
    }

    /// Page the result by a 0-indexed inclusive range: `range(0, 9)` is
    /// `LIMIT 10 OFFSET 0`. An inverted range (`end < start`) matches
    /// nothing.
    #[must_use]
    pub fn range(mut self, start: i64, end: i64) -> Self {
        self.spec.window = Some(PageWindow {
            limit: end - start + 1,
            offset: start,
        });
        self
    }

    /// Set the ordering clause. At most one is retained; a second call
    /// overwrites the first.
    #[must_use]
    pub fn order(mut self, column: &str, descending: bool) -> Self {
        self.spec.order = Some(OrderClause {
            column: column.to_string(),
            descending,
        });
        self
    }

    /// The accumulated specification, for logging or inspection.
    #[must_use]
    pub fn spec(&self) -> &QuerySpec {
        &self.spec
    }

    /// Terminal call: pick the backend, render and run the statement, and
    /// wrap the returned rows.
    ///
    /// # Errors
    /// Propagates configuration, connection, and statement errors from the
    /// selected backend. A failed statement never leaks its connection.
    pub async fn execute(self) -> Result<Envelope, SqlFacadeError> {
        self.db.run(self.spec).await
    }
}
