//! The accumulated, not-yet-executed description of one database operation,
//! and its rendering into one parameterized SQL statement.
//!
//! Every bound value becomes a `$n` placeholder; nothing caller-supplied is
//! ever interpolated into the statement text. Table and column names come
//! from call sites only and are inserted as raw identifiers.

use crate::types::RowValues;

/// The operation a builder chain was seeded with.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OperationKind {
    Select,
    Update,
    Delete,
}

/// One WHERE-clause condition. Conditions are AND-joined in chain order.
#[derive(Debug, Clone, PartialEq)]
pub enum Predicate {
    Eq { column: String, value: RowValues },
    Neq { column: String, value: RowValues },
    /// Literal `IS NULL`, selected by the `"null"` sentinel (no parameter).
    IsNull { column: String },
    /// `IS $n` with a bound parameter, for any non-sentinel value.
    Is { column: String, value: RowValues },
    /// `IN (...)` with one parameter per element. Empty element lists render
    /// an always-false clause instead of invalid SQL.
    In { column: String, values: Vec<RowValues> },
}

/// Single retained ordering clause; a later `order` call overwrites it.
#[derive(Debug, Clone, PartialEq)]
pub struct OrderClause {
    pub column: String,
    pub descending: bool,
}

/// LIMIT/OFFSET window derived from a 0-indexed inclusive range.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageWindow {
    /// May be non-positive when the range was inverted; rendering clamps it
    /// to `LIMIT 0` so the statement matches nothing.
    pub limit: i64,
    pub offset: i64,
}

/// Write-once state of a single builder chain, consumed exactly once by the
/// terminal call.
#[derive(Debug, Clone)]
pub struct QuerySpec {
    pub table: String,
    pub operation: OperationKind,
    /// Projected columns; empty means all (`*`).
    pub columns: Vec<String>,
    pub predicates: Vec<Predicate>,
    pub order: Option<OrderClause>,
    pub window: Option<PageWindow>,
    /// Update assignments, in call order. SET parameters are numbered before
    /// WHERE parameters at render time.
    pub assignments: Vec<(String, RowValues)>,
}

impl QuerySpec {
    #[must_use]
    pub fn new(table: impl Into<String>, operation: OperationKind) -> Self {
        QuerySpec {
            table: table.into(),
            operation,
            columns: Vec::new(),
            predicates: Vec::new(),
            order: None,
            window: None,
            assignments: Vec::new(),
        }
    }

    /// Render the statement and its positional parameters.
    ///
    /// - `select`: `SELECT <cols> FROM <table> [WHERE ...] [ORDER BY ...]
    ///   [LIMIT ...] [OFFSET ...]`
    /// - `update`: `UPDATE <table> SET ... [WHERE ...] RETURNING *`
    /// - `delete`: `DELETE FROM <table> [WHERE ...]` — with no predicates
    ///   this deletes every row; supplying a predicate is the caller's
    ///   responsibility.
    #[must_use]
    pub fn render(&self) -> (String, Vec<RowValues>) {
        match self.operation {
            OperationKind::Select => self.render_select(),
            OperationKind::Update => self.render_update(),
            OperationKind::Delete => self.render_delete(),
        }
    }

    fn render_select(&self) -> (String, Vec<RowValues>) {
        let columns = if self.columns.is_empty() {
            "*".to_string()
        } else {
            self.columns.join(", ")
        };
        let mut sql = format!("SELECT {columns} FROM {}", self.table);
        let mut params = Vec::new();
        let mut counter = 1;
        push_where(&self.predicates, &mut sql, &mut params, &mut counter);

        if let Some(order) = &self.order {
            let direction = if order.descending { "DESC" } else { "ASC" };
            sql.push_str(&format!(" ORDER BY {} {direction}", order.column));
        }
        if let Some(window) = &self.window {
            sql.push_str(&format!(
                " LIMIT {} OFFSET {}",
                window.limit.max(0),
                window.offset.max(0)
            ));
        }
        (sql, params)
    }

    fn render_update(&self) -> (String, Vec<RowValues>) {
        let mut sql = format!("UPDATE {} SET ", self.table);
        let mut params = Vec::with_capacity(self.assignments.len());
        let mut counter = 1;

        let set_parts: Vec<String> = self
            .assignments
            .iter()
            .map(|(column, value)| {
                let part = format!("{column} = ${counter}");
                params.push(value.clone().into_bound());
                counter += 1;
                part
            })
            .collect();
        sql.push_str(&set_parts.join(", "));

        push_where(&self.predicates, &mut sql, &mut params, &mut counter);
        sql.push_str(" RETURNING *");
        (sql, params)
    }

    fn render_delete(&self) -> (String, Vec<RowValues>) {
        let mut sql = format!("DELETE FROM {}", self.table);
        let mut params = Vec::new();
        let mut counter = 1;
        push_where(&self.predicates, &mut sql, &mut params, &mut counter);
        (sql, params)
    }
}

/// Render `INSERT INTO <table> (...) VALUES (...) RETURNING *`.
///
/// Column order follows the input so the statement text is deterministic.
/// JSON- and array-valued columns are bound as serialized text, mirroring
/// the update path.
#[must_use]
pub fn render_insert(table: &str, row: &[(String, RowValues)]) -> (String, Vec<RowValues>) {
    let columns: Vec<&str> = row.iter().map(|(column, _)| column.as_str()).collect();
    let placeholders: Vec<String> = (1..=row.len()).map(|i| format!("${i}")).collect();
    let params: Vec<RowValues> = row
        .iter()
        .map(|(_, value)| value.clone().into_bound())
        .collect();
    let sql = format!(
        "INSERT INTO {table} ({}) VALUES ({}) RETURNING *",
        columns.join(", "),
        placeholders.join(", ")
    );
    (sql, params)
}

fn push_where(
    predicates: &[Predicate],
    sql: &mut String,
    params: &mut Vec<RowValues>,
    counter: &mut usize,
) {
    if predicates.is_empty() {
        return;
    }
    let clauses: Vec<String> = predicates
        .iter()
        .map(|predicate| render_predicate(predicate, params, counter))
        .collect();
    sql.push_str(" WHERE ");
    sql.push_str(&clauses.join(" AND "));
}

fn render_predicate(
    predicate: &Predicate,
    params: &mut Vec<RowValues>,
    counter: &mut usize,
) -> String {
    let mut bind = |value: &RowValues| -> String {
        params.push(value.clone());
        let placeholder = format!("${counter}");
        *counter += 1;
        placeholder
    };

    match predicate {
        Predicate::Eq { column, value } => format!("{column} = {}", bind(value)),
        Predicate::Neq { column, value } => format!("{column} != {}", bind(value)),
        Predicate::IsNull { column } => format!("{column} IS NULL"),
        Predicate::Is { column, value } => format!("{column} IS {}", bind(value)),
        Predicate::In { column, values } => {
            if values.is_empty() {
                // `IN ()` is invalid SQL; an empty set matches no rows.
                "1=0".to_string()
            } else {
                let placeholders: Vec<String> = values.iter().map(&mut bind).collect();
                format!("{column} IN ({})", placeholders.join(", "))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn select_defaults_to_star() {
        let spec = QuerySpec::new("problems", OperationKind::Select);
        let (sql, params) = spec.render();
        assert_eq!(sql, "SELECT * FROM problems");
        assert!(params.is_empty());
    }

    #[test]
    fn predicates_are_and_joined_in_chain_order() {
        let mut spec = QuerySpec::new("problems", OperationKind::Select);
        spec.predicates.push(Predicate::Eq {
            column: "difficulty".into(),
            value: RowValues::Text("Easy".into()),
        });
        spec.predicates.push(Predicate::Neq {
            column: "status".into(),
            value: RowValues::Text("archived".into()),
        });
        let (sql, params) = spec.render();
        assert_eq!(
            sql,
            "SELECT * FROM problems WHERE difficulty = $1 AND status != $2"
        );
        assert_eq!(params.len(), 2);
    }

    #[test]
    fn empty_in_list_matches_nothing() {
        let mut spec = QuerySpec::new("problems", OperationKind::Select);
        spec.predicates.push(Predicate::In {
            column: "id".into(),
            values: vec![],
        });
        let (sql, params) = spec.render();
        assert_eq!(sql, "SELECT * FROM problems WHERE 1=0");
        assert!(params.is_empty());
    }

    #[test]
    fn update_numbers_set_parameters_before_where() {
        let mut spec = QuerySpec::new("user_progress", OperationKind::Update);
        spec.assignments
            .push(("status".into(), RowValues::Text("solved".into())));
        spec.assignments.push(("attempts".into(), RowValues::Int(3)));
        spec.predicates.push(Predicate::Eq {
            column: "problem_id".into(),
            value: RowValues::Int(42),
        });
        let (sql, params) = spec.render();
        assert_eq!(
            sql,
            "UPDATE user_progress SET status = $1, attempts = $2 WHERE problem_id = $3 RETURNING *"
        );
        assert_eq!(params[2], RowValues::Int(42));
    }

    #[test]
    fn delete_without_predicates_is_unconditional() {
        let spec = QuerySpec::new("company_tags", OperationKind::Delete);
        let (sql, params) = spec.render();
        assert_eq!(sql, "DELETE FROM company_tags");
        assert!(params.is_empty());
    }

    #[test]
    fn insert_renders_returning_star_and_serializes_json() {
        let row = vec![
            ("title".to_string(), RowValues::Text("Two Sum".into())),
            (
                "topics".to_string(),
                RowValues::JSON(serde_json::json!(["Array", "DP"])),
            ),
        ];
        let (sql, params) = render_insert("problems", &row);
        assert_eq!(
            sql,
            "INSERT INTO problems (title, topics) VALUES ($1, $2) RETURNING *"
        );
        assert_eq!(params[1], RowValues::Text(r#"["Array","DP"]"#.to_string()));
    }
}
