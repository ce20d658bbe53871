//! Convenient imports for common functionality.

pub use crate::builder::QueryBuilder;
pub use crate::config::{EndpointConfig, HostedConfig};
pub use crate::database::Database;
pub use crate::error::SqlFacadeError;
pub use crate::facade::TableFacade;
pub use crate::query_spec::{OperationKind, Predicate, QuerySpec};
pub use crate::results::{Envelope, FacadeRow};
pub use crate::types::{BackendKind, RowValues};
