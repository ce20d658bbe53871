//! Live pool properties against an embedded `PostgreSQL` instance: the pool
//! never grows past its bound, and a failed statement still hands its
//! connection back. Requires the `test-utils` feature.

#![cfg(feature = "test-utils")]

use std::time::Duration;

use sql_facade::prelude::*;
use sql_facade::relational::RelationalBackend;
use sql_facade::test_utils::{setup_postgres_embedded, stop_postgres_embedded};
use tokio::runtime::Runtime;

const CAPACITY: usize = 5;

#[test]
fn pool_stays_bounded_and_survives_failed_statements(
) -> Result<(), Box<dyn std::error::Error>> {
    let mut embedded = setup_postgres_embedded("facade_pool_test")?;
    // Short wait bound so the exhaustion check fails fast instead of
    // blocking for the default 30s.
    embedded.config.acquire_timeout = Duration::from_millis(300);
    let backend = RelationalBackend::new(&embedded.config)?;

    let rt = Runtime::new()?;
    rt.block_on(async {
        backend
            .batch(
                "CREATE TABLE probes (
                    id BIGSERIAL NOT NULL PRIMARY KEY,
                    name TEXT NOT NULL
                );",
            )
            .await?;

        // A statement against a missing table fails with a statement error...
        let bad = QuerySpec::new("no_such_table", OperationKind::Select);
        let err = backend.run(&bad).await.unwrap_err();
        assert!(
            matches!(err, SqlFacadeError::StatementError(_)),
            "unexpected error family: {err}"
        );

        // ...and its connection went back to the pool: capacity+1 sequential
        // operations all succeed without the pool ever reporting exhaustion.
        for i in 0..=CAPACITY {
            let row = vec![("name".to_string(), RowValues::Text(format!("probe-{i}")))];
            let inserted = backend.run_insert("probes", &row).await?;
            assert_eq!(inserted.len(), 1);
        }
        let all = backend
            .run(&QuerySpec::new("probes", OperationKind::Select))
            .await?;
        assert_eq!(all.len(), CAPACITY + 1);

        // Checkouts beyond capacity fail after the wait bound rather than
        // silently creating extra connections.
        let mut held = Vec::with_capacity(CAPACITY);
        for _ in 0..CAPACITY {
            held.push(backend.acquire().await?);
        }
        let err = backend.acquire().await.unwrap_err();
        assert!(
            matches!(err, SqlFacadeError::PoolError(_)),
            "unexpected error family: {err}"
        );

        // Releasing one slot makes checkout succeed again.
        held.pop();
        let reclaimed = backend.acquire().await?;
        drop(reclaimed);
        drop(held);

        Ok::<_, SqlFacadeError>(())
    })?;

    stop_postgres_embedded(embedded);
    Ok(())
}
