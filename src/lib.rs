//! Fluent table facade over two interchangeable database backends.
//!
//! Application code addresses tables through one fluent interface
//! (`select`/`insert`/`update`/`delete` plus `eq`/`neq`/`is_filter`/`in_list`/
//! `range`/`order`) and never learns which backend answered: a self-managed
//! `PostgreSQL` instance behind a bounded connection pool, or a hosted
//! PostgREST service (e.g. Supabase). The backend decision is re-made on
//! every terminal call from live configuration, so operators can migrate
//! between backends without a redeploy.
//!
//! ```no_run
//! use sql_facade::prelude::*;
//!
//! # async fn demo() -> Result<(), SqlFacadeError> {
//! let db = Database::new();
//! let response = db
//!     .table("problems")
//!     .select(&["id", "title"])
//!     .eq("difficulty", RowValues::Text("Easy".into()))
//!     .order("id", false)
//!     .range(0, 9)
//!     .execute()
//!     .await?;
//! for row in &response.data {
//!     let _ = row.get("title");
//! }
//! # Ok(())
//! # }
//! ```

pub mod builder;
pub mod config;
pub mod database;
pub mod error;
pub mod facade;
pub mod hosted;
pub mod prelude;
pub mod query_spec;
pub mod relational;
pub mod results;
#[cfg(feature = "test-utils")]
pub mod test_utils;
pub mod types;

pub use builder::QueryBuilder;
pub use config::{EndpointConfig, HostedConfig};
pub use database::Database;
pub use error::SqlFacadeError;
pub use facade::TableFacade;
pub use query_spec::{OperationKind, Predicate, QuerySpec};
pub use results::{Envelope, FacadeRow};
pub use types::{BackendKind, RowValues};
