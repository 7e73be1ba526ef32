use axum::extract::State;
use axum::Json;
use serde::Deserialize;
use serde_json::{json, Value};
use std::sync::Arc;
use tracing::info;

use crate::query;
use crate::web::error::{ApiError, FieldError};
use crate::web::state::AppState;

#[derive(Debug, Deserialize)]
pub struct QueryRequest {
    pub query: String,
}

pub async fn process_query(
    State(state): State<Arc<AppState>>,
    Json(payload): Json<QueryRequest>,
) -> Result<Json<Value>, ApiError> {
    if payload.query.trim().is_empty() {
        return Err(ApiError::Validation(vec![FieldError::new(
            "query",
            "Query is required",
        )]));
    }

    info!("Received natural language query: {}", payload.query);

    let outcome =
        query::answer_question(&state.llm_manager, &state.db_pool, &payload.query).await?;

    Ok(Json(json!({"status": "success", "data": outcome})))
}
