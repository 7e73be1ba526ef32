use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::Json;
use rusqlite::OptionalExtension;
use serde::Deserialize;
use serde_json::{json, Value};
use std::sync::Arc;
use tracing::{error, info, warn};

use crate::models::Driver;
use crate::web::error::{ApiError, FieldError};
use crate::web::state::AppState;

/// Body for driver create and update. Both take the same single field.
#[derive(Debug, Deserialize)]
pub struct DriverPayload {
    pub name: String,
}

impl DriverPayload {
    fn validate(&self) -> Result<(), ApiError> {
        if self.name.trim().is_empty() {
            return Err(ApiError::Validation(vec![FieldError::new(
                "name",
                "Name is required",
            )]));
        }
        Ok(())
    }
}

pub async fn list_drivers(
    State(state): State<Arc<AppState>>,
) -> Result<Json<Value>, ApiError> {
    let conn = state.db_pool.get().map_err(|e| {
        error!("Failed to get a database connection: {}", e);
        ApiError::internal("Failed to retrieve drivers")
    })?;

    let mut stmt = conn
        .prepare("SELECT id, name, created_at FROM drivers ORDER BY id")
        .map_err(|e| {
            error!("Failed to prepare driver listing: {}", e);
            ApiError::internal("Failed to retrieve drivers")
        })?;

    let drivers: Vec<Driver> = stmt
        .query_map([], Driver::from_row)
        .and_then(|rows| rows.collect())
        .map_err(|e| {
            error!("Failed to read drivers: {}", e);
            ApiError::internal("Failed to retrieve drivers")
        })?;

    Ok(Json(json!({"status": "success", "data": drivers})))
}

pub async fn get_driver(
    State(state): State<Arc<AppState>>,
    Path(id): Path<i64>,
) -> Result<Json<Value>, ApiError> {
    let conn = state.db_pool.get().map_err(|e| {
        error!("Failed to get a database connection: {}", e);
        ApiError::internal("Failed to retrieve driver")
    })?;

    let driver = conn
        .query_row(
            "SELECT id, name, created_at FROM drivers WHERE id = ?1",
            [id],
            Driver::from_row,
        )
        .optional()
        .map_err(|e| {
            error!("Failed to read driver {}: {}", id, e);
            ApiError::internal("Failed to retrieve driver")
        })?;

    match driver {
        Some(driver) => Ok(Json(json!({"status": "success", "data": driver}))),
        None => {
            warn!("Driver {} not found", id);
            Err(ApiError::not_found("Driver not found"))
        }
    }
}

pub async fn create_driver(
    State(state): State<Arc<AppState>>,
    Json(payload): Json<DriverPayload>,
) -> Result<(StatusCode, Json<Value>), ApiError> {
    payload.validate()?;

    let conn = state.db_pool.get().map_err(|e| {
        error!("Failed to get a database connection: {}", e);
        ApiError::internal("Failed to create driver")
    })?;

    conn.execute("INSERT INTO drivers (name) VALUES (?1)", [&payload.name])
        .map_err(|e| {
            error!("Failed to insert driver: {}", e);
            ApiError::internal("Failed to create driver")
        })?;

    let id = conn.last_insert_rowid();
    info!("Created driver {} ({})", id, payload.name);

    Ok((
        StatusCode::CREATED,
        Json(json!({"status": "success", "data": {"id": id, "name": payload.name}})),
    ))
}

pub async fn update_driver(
    State(state): State<Arc<AppState>>,
    Path(id): Path<i64>,
    Json(payload): Json<DriverPayload>,
) -> Result<Json<Value>, ApiError> {
    payload.validate()?;

    let conn = state.db_pool.get().map_err(|e| {
        error!("Failed to get a database connection: {}", e);
        ApiError::internal("Failed to update driver")
    })?;

    let exists = driver_exists(&conn, id).map_err(|e| {
        error!("Failed to look up driver {}: {}", id, e);
        ApiError::internal("Failed to update driver")
    })?;
    if !exists {
        warn!("Driver {} not found for update", id);
        return Err(ApiError::not_found("Driver not found"));
    }

    conn.execute(
        "UPDATE drivers SET name = ?1 WHERE id = ?2",
        rusqlite::params![payload.name, id],
    )
    .map_err(|e| {
        error!("Failed to update driver {}: {}", id, e);
        ApiError::internal("Failed to update driver")
    })?;

    info!("Updated driver {}", id);
    Ok(Json(json!({"status": "success", "data": {"id": id, "name": payload.name}})))
}

pub async fn delete_driver(
    State(state): State<Arc<AppState>>,
    Path(id): Path<i64>,
) -> Result<Json<Value>, ApiError> {
    let conn = state.db_pool.get().map_err(|e| {
        error!("Failed to get a database connection: {}", e);
        ApiError::internal("Failed to delete driver")
    })?;

    let exists = driver_exists(&conn, id).map_err(|e| {
        error!("Failed to look up driver {}: {}", id, e);
        ApiError::internal("Failed to delete driver")
    })?;
    if !exists {
        warn!("Driver {} not found for delete", id);
        return Err(ApiError::not_found("Driver not found"));
    }

    // Devices referencing this driver fall back to NULL via the schema's
    // ON DELETE SET NULL.
    conn.execute("DELETE FROM drivers WHERE id = ?1", [id]).map_err(|e| {
        error!("Failed to delete driver {}: {}", id, e);
        ApiError::internal("Failed to delete driver")
    })?;

    info!("Deleted driver {}", id);
    Ok(Json(json!({"status": "success", "message": "Driver deleted successfully"})))
}

fn driver_exists(conn: &rusqlite::Connection, id: i64) -> rusqlite::Result<bool> {
    conn.query_row("SELECT 1 FROM drivers WHERE id = ?1", [id], |_row| Ok(()))
        .optional()
        .map(|found| found.is_some())
}
