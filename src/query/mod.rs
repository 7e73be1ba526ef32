pub mod exec;
pub mod extract;
pub mod prompt;
pub mod schema;
pub mod validate;

use std::error::Error;
use std::fmt;

use tracing::{info, warn};

use crate::db::pool::DbPool;
use crate::llm::LlmManager;

pub use exec::QueryOutcome;

/// Sampling temperature for SQL generation. Kept low so the same question
/// tends to produce the same statement.
pub const SQL_TEMPERATURE: f32 = 0.1;

/// Everything that can go wrong between a natural language question and a
/// result set. All variants are terminal; the pipeline never retries.
#[derive(Debug)]
pub enum QueryError {
    NoSqlFound,
    EmptyQuery,
    NotSelect,
    ForbiddenKeyword(&'static str),
    ExecutionFailed(String),
    ServiceUnavailable(String),
}

impl QueryError {
    /// Stable variant name, carried in error responses so clients can
    /// branch without parsing messages.
    pub fn kind(&self) -> &'static str {
        match self {
            QueryError::NoSqlFound => "NoSqlFound",
            QueryError::EmptyQuery => "EmptyQuery",
            QueryError::NotSelect => "NotSelect",
            QueryError::ForbiddenKeyword(_) => "ForbiddenKeyword",
            QueryError::ExecutionFailed(_) => "ExecutionFailed",
            QueryError::ServiceUnavailable(_) => "ServiceUnavailable",
        }
    }
}

impl fmt::Display for QueryError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            QueryError::NoSqlFound => {
                write!(f, "Could not extract a SQL query from the model response")
            }
            QueryError::EmptyQuery => write!(f, "Generated query is empty"),
            QueryError::NotSelect => write!(f, "Only SELECT queries are allowed"),
            QueryError::ForbiddenKeyword(keyword) => {
                write!(f, "Query contains forbidden keyword '{}'", keyword)
            }
            QueryError::ExecutionFailed(msg) => write!(f, "Query execution failed: {}", msg),
            QueryError::ServiceUnavailable(msg) => {
                write!(f, "Text completion service unavailable: {}", msg)
            }
        }
    }
}

impl Error for QueryError {}

/// Answers a natural language question end to end: prompt the model,
/// extract the statement, validate it, run it.
pub async fn answer_question(
    llm: &LlmManager,
    pool: &DbPool,
    question: &str,
) -> Result<QueryOutcome, QueryError> {
    info!(question, "Processing natural language query");

    let system = prompt::system_prompt();
    let user = prompt::user_prompt(question);

    let completion = llm
        .complete(&system, &user, SQL_TEMPERATURE)
        .await
        .map_err(|e| QueryError::ServiceUnavailable(e.to_string()))?;

    let candidate = match extract::extract_sql_query(&completion) {
        Some(candidate) => candidate,
        None => {
            warn!(%completion, "No SQL statement found in model response");
            return Err(QueryError::NoSqlFound);
        }
    };
    info!(sql = %candidate, "Extracted SQL from model response");

    let validated = validate::validate(&candidate).map_err(|e| {
        warn!(sql = %candidate, error = %e, "Generated query rejected");
        e
    })?;

    exec::execute(pool, validated.as_str()).await
}

#[cfg(test)]
mod tests {
    use async_trait::async_trait;
    use r2d2::Pool;
    use serde_json::json;

    use super::*;
    use crate::db::migrate;
    use crate::db::pool::SqliteConnectionManager;
    use crate::llm::{Completion, LlmError};

    struct CannedCompletion(&'static str);

    #[async_trait]
    impl Completion for CannedCompletion {
        async fn complete(
            &self,
            _system: &str,
            _prompt: &str,
            _temperature: f32,
        ) -> Result<String, LlmError> {
            Ok(self.0.to_string())
        }
    }

    struct FailingCompletion;

    #[async_trait]
    impl Completion for FailingCompletion {
        async fn complete(
            &self,
            _system: &str,
            _prompt: &str,
            _temperature: f32,
        ) -> Result<String, LlmError> {
            Err(LlmError::ConnectionError("connection refused".to_string()))
        }
    }

    fn manager(text: &'static str) -> LlmManager {
        LlmManager::from_backend(Box::new(CannedCompletion(text)))
    }

    fn fleet_pool(dir: &tempfile::TempDir) -> DbPool {
        let path = dir.path().join("pipeline-test.db");
        let pool_manager = SqliteConnectionManager::new(path.to_string_lossy().into_owned());
        let pool = Pool::builder().max_size(2).build(pool_manager).unwrap();
        migrate::run(&pool).unwrap();

        let conn = pool.get().unwrap();
        conn.execute_batch(
            "INSERT INTO drivers (name) VALUES ('Alice'), ('Bob');
             INSERT INTO devices (identifier, model, driver_id) VALUES ('DEV001', 'X1', 1);",
        )
        .unwrap();
        pool
    }

    #[tokio::test]
    async fn answers_from_a_fenced_completion() {
        let dir = tempfile::TempDir::new().unwrap();
        let pool = fleet_pool(&dir);
        let llm = manager("```sql\nSELECT name FROM drivers WHERE id = 1\n```");

        let outcome = answer_question(&llm, &pool, "who is driver one?").await.unwrap();
        assert_eq!(outcome.sql, "SELECT name FROM drivers WHERE id = 1");
        assert_eq!(outcome.data, vec![json!({"name": "Alice"})]);
    }

    #[tokio::test]
    async fn joins_multi_line_statements_before_running() {
        let dir = tempfile::TempDir::new().unwrap();
        let pool = fleet_pool(&dir);
        let llm = manager("SELECT d.identifier\nFROM devices d\nWHERE d.driver_id = 1");

        let outcome = answer_question(&llm, &pool, "which device does Alice use?")
            .await
            .unwrap();
        assert_eq!(outcome.sql, "SELECT d.identifier FROM devices d WHERE d.driver_id = 1");
        assert_eq!(outcome.data[0]["identifier"], json!("DEV001"));
    }

    #[tokio::test]
    async fn prose_only_completion_is_no_sql_found() {
        let dir = tempfile::TempDir::new().unwrap();
        let pool = fleet_pool(&dir);
        let llm = manager("I am unable to answer that with this schema.");

        let err = answer_question(&llm, &pool, "what?").await.unwrap_err();
        assert!(matches!(err, QueryError::NoSqlFound));
        assert_eq!(err.kind(), "NoSqlFound");
    }

    #[tokio::test]
    async fn mutating_completion_never_reaches_the_database() {
        let dir = tempfile::TempDir::new().unwrap();
        let pool = fleet_pool(&dir);
        // No line starts with SELECT, so this dies in extraction.
        let llm = manager("UPDATE drivers SET name = 'Mallory'");

        let err = answer_question(&llm, &pool, "rename everyone").await.unwrap_err();
        assert!(matches!(err, QueryError::NoSqlFound));

        let conn = pool.get().unwrap();
        let name: String = conn
            .query_row("SELECT name FROM drivers WHERE id = 1", [], |row| row.get(0))
            .unwrap();
        assert_eq!(name, "Alice");
    }

    #[tokio::test]
    async fn stacked_mutation_is_caught_by_validation() {
        let dir = tempfile::TempDir::new().unwrap();
        let pool = fleet_pool(&dir);
        let llm = manager("SELECT * FROM drivers; DROP TABLE drivers;");

        let err = answer_question(&llm, &pool, "list drivers").await.unwrap_err();
        assert!(matches!(err, QueryError::ForbiddenKeyword("drop table")));
        assert_eq!(err.kind(), "ForbiddenKeyword");

        let conn = pool.get().unwrap();
        let count: i64 = conn
            .query_row("SELECT COUNT(*) FROM drivers", [], |row| row.get(0))
            .unwrap();
        assert_eq!(count, 2);
    }

    #[tokio::test]
    async fn backend_failure_is_service_unavailable() {
        let dir = tempfile::TempDir::new().unwrap();
        let pool = fleet_pool(&dir);
        let llm = LlmManager::from_backend(Box::new(FailingCompletion));

        let err = answer_question(&llm, &pool, "anything").await.unwrap_err();
        match &err {
            QueryError::ServiceUnavailable(msg) => assert!(msg.contains("connection refused")),
            other => panic!("expected ServiceUnavailable, got {:?}", other),
        }
        assert_eq!(err.kind(), "ServiceUnavailable");
    }

    #[tokio::test]
    async fn bad_column_reference_is_execution_failed() {
        let dir = tempfile::TempDir::new().unwrap();
        let pool = fleet_pool(&dir);
        let llm = manager("SELECT favourite_colour FROM drivers");

        let err = answer_question(&llm, &pool, "colours").await.unwrap_err();
        assert!(matches!(err, QueryError::ExecutionFailed(_)));
    }
}
