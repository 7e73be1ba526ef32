use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::Json;
use rusqlite::types::Value as SqlValue;
use rusqlite::{params_from_iter, OptionalExtension};
use serde::{Deserialize, Deserializer};
use serde_json::{json, Value};
use std::sync::Arc;
use tracing::{error, info, warn};

use crate::models::Device;
use crate::web::error::{ApiError, FieldError};
use crate::web::state::AppState;

#[derive(Debug, Deserialize)]
pub struct CreateDevicePayload {
    pub identifier: String,
    pub model: Option<String>,
    pub vehicle_plate: Option<String>,
    pub driver_id: Option<i64>,
}

impl CreateDevicePayload {
    fn validate(&self) -> Result<(), ApiError> {
        if self.identifier.trim().is_empty() {
            return Err(ApiError::Validation(vec![FieldError::new(
                "identifier",
                "Identifier is required",
            )]));
        }
        Ok(())
    }
}

/// Body for partial device updates. Each field is doubly optional: the
/// outer `None` means the key was absent and the column is left alone, an
/// inner `None` means an explicit JSON null that clears the column.
#[derive(Debug, Deserialize, Default)]
pub struct UpdateDevicePayload {
    #[serde(default, deserialize_with = "present")]
    pub identifier: Option<Option<String>>,
    #[serde(default, deserialize_with = "present")]
    pub model: Option<Option<String>>,
    #[serde(default, deserialize_with = "present")]
    pub vehicle_plate: Option<Option<String>>,
    #[serde(default, deserialize_with = "present")]
    pub driver_id: Option<Option<i64>>,
}

/// Wraps any present value, including null, in `Some`. Absent keys never
/// reach this function and fall through to the field default.
fn present<'de, T, D>(deserializer: D) -> Result<Option<T>, D::Error>
where
    T: Deserialize<'de>,
    D: Deserializer<'de>,
{
    T::deserialize(deserializer).map(Some)
}

impl UpdateDevicePayload {
    fn validate(&self) -> Result<(), ApiError> {
        if let Some(identifier) = &self.identifier {
            // The identifier column is NOT NULL, so neither null nor a
            // blank string may go through.
            let blank = identifier.as_deref().map_or(true, |v| v.trim().is_empty());
            if blank {
                return Err(ApiError::Validation(vec![FieldError::new(
                    "identifier",
                    "Identifier is required",
                )]));
            }
        }
        Ok(())
    }
}

pub async fn list_devices(
    State(state): State<Arc<AppState>>,
) -> Result<Json<Value>, ApiError> {
    let conn = state.db_pool.get().map_err(|e| {
        error!("Failed to get a database connection: {}", e);
        ApiError::internal("Failed to retrieve devices")
    })?;

    let sql = format!("{} ORDER BY d.id", Device::SELECT);
    let mut stmt = conn.prepare(&sql).map_err(|e| {
        error!("Failed to prepare device listing: {}", e);
        ApiError::internal("Failed to retrieve devices")
    })?;

    let devices: Vec<Device> = stmt
        .query_map([], Device::from_row)
        .and_then(|rows| rows.collect())
        .map_err(|e| {
            error!("Failed to read devices: {}", e);
            ApiError::internal("Failed to retrieve devices")
        })?;

    Ok(Json(json!({"status": "success", "data": devices})))
}

pub async fn get_device(
    State(state): State<Arc<AppState>>,
    Path(id): Path<i64>,
) -> Result<Json<Value>, ApiError> {
    let conn = state.db_pool.get().map_err(|e| {
        error!("Failed to get a database connection: {}", e);
        ApiError::internal("Failed to retrieve device")
    })?;

    let device = fetch_device(&conn, id).map_err(|e| {
        error!("Failed to read device {}: {}", id, e);
        ApiError::internal("Failed to retrieve device")
    })?;

    match device {
        Some(device) => Ok(Json(json!({"status": "success", "data": device}))),
        None => {
            warn!("Device {} not found", id);
            Err(ApiError::not_found("Device not found"))
        }
    }
}

pub async fn create_device(
    State(state): State<Arc<AppState>>,
    Json(payload): Json<CreateDevicePayload>,
) -> Result<(StatusCode, Json<Value>), ApiError> {
    payload.validate()?;

    let conn = state.db_pool.get().map_err(|e| {
        error!("Failed to get a database connection: {}", e);
        ApiError::internal("Failed to create device")
    })?;

    conn.execute(
        "INSERT INTO devices (identifier, model, vehicle_plate, driver_id) \
         VALUES (?1, ?2, ?3, ?4)",
        rusqlite::params![
            payload.identifier,
            payload.model,
            payload.vehicle_plate,
            payload.driver_id
        ],
    )
    .map_err(|e| {
        error!("Failed to insert device: {}", e);
        ApiError::internal("Failed to create device")
    })?;

    let id = conn.last_insert_rowid();
    info!("Created device {} ({})", id, payload.identifier);

    Ok((
        StatusCode::CREATED,
        Json(json!({
            "status": "success",
            "data": {
                "id": id,
                "identifier": payload.identifier,
                "model": payload.model,
                "vehicle_plate": payload.vehicle_plate,
                "driver_id": payload.driver_id,
            },
        })),
    ))
}

pub async fn update_device(
    State(state): State<Arc<AppState>>,
    Path(id): Path<i64>,
    Json(payload): Json<UpdateDevicePayload>,
) -> Result<Json<Value>, ApiError> {
    payload.validate()?;

    let conn = state.db_pool.get().map_err(|e| {
        error!("Failed to get a database connection: {}", e);
        ApiError::internal("Failed to update device")
    })?;

    let exists = device_exists(&conn, id).map_err(|e| {
        error!("Failed to look up device {}: {}", id, e);
        ApiError::internal("Failed to update device")
    })?;
    if !exists {
        warn!("Device {} not found for update", id);
        return Err(ApiError::not_found("Device not found"));
    }

    // The SET clause is assembled from the fields the client actually sent.
    let mut assignments: Vec<&str> = Vec::new();
    let mut values: Vec<SqlValue> = Vec::new();

    if let Some(identifier) = payload.identifier {
        assignments.push("identifier = ?");
        values.push(SqlValue::from(identifier));
    }
    if let Some(model) = payload.model {
        assignments.push("model = ?");
        values.push(SqlValue::from(model));
    }
    if let Some(vehicle_plate) = payload.vehicle_plate {
        assignments.push("vehicle_plate = ?");
        values.push(SqlValue::from(vehicle_plate));
    }
    if let Some(driver_id) = payload.driver_id {
        assignments.push("driver_id = ?");
        values.push(SqlValue::from(driver_id));
    }

    if assignments.is_empty() {
        warn!("Update for device {} carried no fields", id);
        return Err(ApiError::BadRequest("No fields to update".to_string()));
    }

    values.push(SqlValue::from(id));
    let sql = format!("UPDATE devices SET {} WHERE id = ?", assignments.join(", "));

    conn.execute(&sql, params_from_iter(values)).map_err(|e| {
        error!("Failed to update device {}: {}", id, e);
        ApiError::internal("Failed to update device")
    })?;

    let device = fetch_device(&conn, id)
        .map_err(|e| {
            error!("Failed to re-read device {}: {}", id, e);
            ApiError::internal("Failed to update device")
        })?
        .ok_or_else(|| ApiError::internal("Failed to update device"))?;

    info!("Updated device {}", id);
    Ok(Json(json!({"status": "success", "data": device})))
}

pub async fn delete_device(
    State(state): State<Arc<AppState>>,
    Path(id): Path<i64>,
) -> Result<Json<Value>, ApiError> {
    let conn = state.db_pool.get().map_err(|e| {
        error!("Failed to get a database connection: {}", e);
        ApiError::internal("Failed to delete device")
    })?;

    let exists = device_exists(&conn, id).map_err(|e| {
        error!("Failed to look up device {}: {}", id, e);
        ApiError::internal("Failed to delete device")
    })?;
    if !exists {
        warn!("Device {} not found for delete", id);
        return Err(ApiError::not_found("Device not found"));
    }

    // Positions cascade away with the device.
    conn.execute("DELETE FROM devices WHERE id = ?1", [id]).map_err(|e| {
        error!("Failed to delete device {}: {}", id, e);
        ApiError::internal("Failed to delete device")
    })?;

    info!("Deleted device {}", id);
    Ok(Json(json!({"status": "success", "message": "Device deleted successfully"})))
}

fn fetch_device(conn: &rusqlite::Connection, id: i64) -> rusqlite::Result<Option<Device>> {
    let sql = format!("{} WHERE d.id = ?1", Device::SELECT);
    conn.query_row(&sql, [id], Device::from_row).optional()
}

fn device_exists(conn: &rusqlite::Connection, id: i64) -> rusqlite::Result<bool> {
    conn.query_row("SELECT 1 FROM devices WHERE id = ?1", [id], |_row| Ok(()))
        .optional()
        .map(|found| found.is_some())
}
