use std::time::Instant;

use serde::Serialize;
use serde_json::Value;
use tracing::info;

use crate::db::pool::DbPool;
use crate::db::rows;
use crate::query::{validate, QueryError};

/// Result of running a query: the statement that ran, its rows, and the
/// wall time of the database call in milliseconds.
#[derive(Debug, Serialize)]
pub struct QueryOutcome {
    pub sql: String,
    pub data: Vec<Value>,
    #[serde(rename = "executionTime")]
    pub execution_time_ms: u64,
}

/// Executes a statement on the pool and maps the rows to JSON objects.
///
/// The statement is re-validated here no matter where it came from, so a
/// caller that bypasses extraction still cannot run a mutation.
pub async fn execute(pool: &DbPool, sql: &str) -> Result<QueryOutcome, QueryError> {
    let validated = validate::validate(sql)?;

    let pool = pool.clone();
    let statement = validated.as_str().to_string();
    let started = Instant::now();

    let data = tokio::task::spawn_blocking(move || -> Result<Vec<Value>, QueryError> {
        let conn = pool
            .get()
            .map_err(|e| QueryError::ExecutionFailed(e.to_string()))?;
        let mut stmt = conn
            .prepare(&statement)
            .map_err(|e| QueryError::ExecutionFailed(e.to_string()))?;
        rows::rows_to_json(&mut stmt).map_err(|e| QueryError::ExecutionFailed(e.to_string()))
    })
    .await
    .map_err(|e| QueryError::ExecutionFailed(e.to_string()))??;

    let execution_time_ms = started.elapsed().as_millis() as u64;
    info!(
        rows = data.len(),
        execution_time_ms, "Query executed successfully"
    );

    Ok(QueryOutcome {
        sql: validated.into_inner(),
        data,
        execution_time_ms,
    })
}

#[cfg(test)]
mod tests {
    use r2d2::Pool;
    use serde_json::json;

    use super::*;
    use crate::db::migrate;
    use crate::db::pool::SqliteConnectionManager;

    fn fleet_pool(dir: &tempfile::TempDir) -> DbPool {
        let path = dir.path().join("exec-test.db");
        let manager = SqliteConnectionManager::new(path.to_string_lossy().into_owned());
        let pool = Pool::builder().max_size(2).build(manager).unwrap();
        migrate::run(&pool).unwrap();

        let conn = pool.get().unwrap();
        conn.execute_batch(
            "INSERT INTO drivers (name) VALUES ('Alice'), ('Bob');
             INSERT INTO devices (identifier, driver_id) VALUES ('DEV001', 1);",
        )
        .unwrap();
        pool
    }

    #[tokio::test]
    async fn returns_rows_and_the_statement_that_ran() {
        let dir = tempfile::TempDir::new().unwrap();
        let pool = fleet_pool(&dir);

        let outcome = execute(&pool, "SELECT id, name FROM drivers ORDER BY id")
            .await
            .unwrap();
        assert_eq!(outcome.sql, "SELECT id, name FROM drivers ORDER BY id");
        assert_eq!(outcome.data.len(), 2);
        assert_eq!(outcome.data[0]["name"], json!("Alice"));
    }

    #[tokio::test]
    async fn rejects_mutations_before_touching_the_database() {
        let dir = tempfile::TempDir::new().unwrap();
        let pool = fleet_pool(&dir);

        let err = execute(&pool, "DELETE FROM drivers").await.unwrap_err();
        assert!(matches!(err, QueryError::NotSelect));

        let err = execute(&pool, "SELECT 1; DROP TABLE drivers").await.unwrap_err();
        assert!(matches!(err, QueryError::ForbiddenKeyword(_)));

        // Both drivers still present.
        let conn = pool.get().unwrap();
        let count: i64 = conn
            .query_row("SELECT COUNT(*) FROM drivers", [], |row| row.get(0))
            .unwrap();
        assert_eq!(count, 2);
    }

    #[tokio::test]
    async fn database_errors_surface_as_execution_failed() {
        let dir = tempfile::TempDir::new().unwrap();
        let pool = fleet_pool(&dir);

        let err = execute(&pool, "SELECT * FROM no_such_table").await.unwrap_err();
        match err {
            QueryError::ExecutionFailed(msg) => assert!(msg.contains("no_such_table")),
            other => panic!("expected ExecutionFailed, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn empty_result_sets_are_fine() {
        let dir = tempfile::TempDir::new().unwrap();
        let pool = fleet_pool(&dir);

        let outcome = execute(&pool, "SELECT * FROM positions").await.unwrap();
        assert!(outcome.data.is_empty());
    }
}
