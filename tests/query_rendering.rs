//! Statement-rendering properties, checked through the public fluent
//! surface. None of these touch a live backend: `Database::table` and the
//! chain calls are pure, and `QueryBuilder::spec` exposes the accumulated
//! specification for rendering.

use sql_facade::prelude::*;
use sql_facade::query_spec::render_insert;

fn db() -> Database {
    Database::new()
}

#[test]
fn bound_parameter_count_matches_predicate_values() {
    let builder = db()
        .table("problems")
        .select(&["*"])
        .eq("difficulty", RowValues::Text("Easy".into()))
        .neq("status", RowValues::Text("archived".into()))
        .in_list(
            "id",
            vec![RowValues::Int(1), RowValues::Int(2), RowValues::Int(3)],
        );
    let (sql, params) = builder.spec().render();

    // One parameter per individual value, counting each IN element.
    assert_eq!(params.len(), 5);
    for placeholder in ["$1", "$2", "$3", "$4", "$5"] {
        assert!(sql.contains(placeholder), "missing {placeholder} in {sql}");
    }
    // No literal values leak into the statement text.
    assert!(!sql.contains("Easy"));
    assert!(!sql.contains("archived"));
}

#[test]
fn empty_in_list_renders_always_false_clause() {
    let builder = db().table("problems").select(&["*"]).in_list("id", vec![]);
    let (sql, params) = builder.spec().render();
    assert_eq!(sql, "SELECT * FROM problems WHERE 1=0");
    assert!(params.is_empty());
}

#[test]
fn range_is_inclusive_and_zero_indexed() {
    let first_page = db().table("problems").select(&["*"]).range(0, 9);
    let (sql, _) = first_page.spec().render();
    assert!(sql.ends_with("LIMIT 10 OFFSET 0"), "unexpected: {sql}");

    let second_page = db().table("problems").select(&["*"]).range(10, 19);
    let (sql, _) = second_page.spec().render();
    assert!(sql.ends_with("LIMIT 10 OFFSET 10"), "unexpected: {sql}");
}

#[test]
fn inverted_range_matches_nothing() {
    let builder = db().table("problems").select(&["*"]).range(10, 5);
    let (sql, _) = builder.spec().render();
    assert!(sql.ends_with("LIMIT 0 OFFSET 10"), "unexpected: {sql}");
}

#[test]
fn later_order_call_overwrites_earlier() {
    let builder = db()
        .table("problems")
        .select(&["*"])
        .order("id", false)
        .order("title", true);
    let (sql, _) = builder.spec().render();
    assert!(sql.ends_with("ORDER BY title DESC"), "unexpected: {sql}");
    assert!(!sql.contains("ORDER BY id"));
}

#[test]
fn projection_list_is_rendered_verbatim() {
    let builder = db().table("problems").select(&["id", "title"]);
    let (sql, _) = builder.spec().render();
    assert_eq!(sql, "SELECT id, title FROM problems");
}

#[test]
fn is_filter_null_sentinel_takes_no_parameter() {
    let builder = db()
        .table("user_progress")
        .select(&["*"])
        .is_filter("solved_at", RowValues::Text("null".into()));
    let (sql, params) = builder.spec().render();
    assert_eq!(sql, "SELECT * FROM user_progress WHERE solved_at IS NULL");
    assert!(params.is_empty());
}

#[test]
fn is_filter_non_sentinel_value_is_bound() {
    let builder = db()
        .table("user_progress")
        .select(&["*"])
        .is_filter("flagged", RowValues::Bool(true));
    let (sql, params) = builder.spec().render();
    assert_eq!(sql, "SELECT * FROM user_progress WHERE flagged IS $1");
    assert_eq!(params, vec![RowValues::Bool(true)]);
}

#[test]
fn update_orders_set_parameters_before_where_parameters() {
    let builder = db()
        .table("user_progress")
        .update(vec![
            ("status", RowValues::Text("solved".into())),
            ("attempts", RowValues::Int(2)),
        ])
        .eq("user_id", RowValues::Int(11))
        .eq("problem_id", RowValues::Int(42));
    let (sql, params) = builder.spec().render();

    assert_eq!(
        sql,
        "UPDATE user_progress SET status = $1, attempts = $2 \
         WHERE user_id = $3 AND problem_id = $4 RETURNING *"
    );
    assert_eq!(params[0], RowValues::Text("solved".into()));
    assert_eq!(params[3], RowValues::Int(42));
}

#[test]
fn update_serializes_json_assignments_to_text() {
    let builder = db().table("problems").update(vec![(
        "topics",
        RowValues::JSON(serde_json::json!(["Array", "DP"])),
    )]);
    let (_, params) = builder.spec().render();
    assert_eq!(params[0], RowValues::Text(r#"["Array","DP"]"#.to_string()));
}

#[test]
fn delete_renders_where_clause_when_predicated() {
    let builder = db()
        .table("company_tags")
        .delete()
        .eq("problem_id", RowValues::Int(7));
    let (sql, params) = builder.spec().render();
    assert_eq!(sql, "DELETE FROM company_tags WHERE problem_id = $1");
    assert_eq!(params.len(), 1);
}

#[test]
fn insert_statement_returns_all_columns_and_serializes_json() {
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
    // The JSON text round-trips unchanged through the bound parameter.
    assert_eq!(params[1], RowValues::Text(r#"["Array","DP"]"#.to_string()));
}

#[test]
fn table_facade_construction_is_pure() {
    // No configuration is consulted until a terminal call.
    let facade = db().table("problems");
    assert_eq!(facade.name(), "problems");
}
