use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::Json;
use rusqlite::OptionalExtension;
use serde::Deserialize;
use serde_json::{json, Value};
use std::sync::Arc;
use tracing::{error, info, warn};

use crate::models::Position;
use crate::web::error::{ApiError, FieldError};
use crate::web::state::AppState;

const DEFAULT_LIMIT: i64 = 100;
const MAX_LIMIT: i64 = 1000;

#[derive(Debug, Deserialize)]
pub struct ListPositionsParams {
    pub device_id: Option<i64>,
    pub limit: Option<i64>,
}

#[derive(Debug, Deserialize)]
pub struct CreatePositionPayload {
    pub device_id: i64,
    pub latitude: f64,
    pub longitude: f64,
    pub speed: Option<f64>,
    pub direction: Option<i64>,
    pub collected_at: String,
}

impl CreatePositionPayload {
    /// Collects every field error instead of stopping at the first, so a
    /// client can fix a bad payload in one round trip.
    fn validate(&self) -> Result<(), ApiError> {
        let mut errors = Vec::new();

        if self.device_id <= 0 {
            errors.push(FieldError::new("device_id", "Device ID is required"));
        }
        if !(-90.0..=90.0).contains(&self.latitude) {
            errors.push(FieldError::new(
                "latitude",
                "Latitude must be between -90 and 90",
            ));
        }
        if !(-180.0..=180.0).contains(&self.longitude) {
            errors.push(FieldError::new(
                "longitude",
                "Longitude must be between -180 and 180",
            ));
        }
        if let Some(direction) = self.direction {
            if !(0..=359).contains(&direction) {
                errors.push(FieldError::new(
                    "direction",
                    "Direction must be between 0 and 359",
                ));
            }
        }
        if chrono::DateTime::parse_from_rfc3339(&self.collected_at).is_err() {
            errors.push(FieldError::new("collected_at", "Invalid datetime format"));
        }

        if errors.is_empty() {
            Ok(())
        } else {
            Err(ApiError::Validation(errors))
        }
    }
}

pub async fn list_positions(
    State(state): State<Arc<AppState>>,
    Query(params): Query<ListPositionsParams>,
) -> Result<Json<Value>, ApiError> {
    let limit = params.limit.unwrap_or(DEFAULT_LIMIT).clamp(1, MAX_LIMIT);

    let conn = state.db_pool.get().map_err(|e| {
        error!("Failed to get a database connection: {}", e);
        ApiError::internal("Failed to retrieve positions")
    })?;

    let result = match params.device_id {
        Some(device_id) => conn
            .prepare(
                "SELECT id, device_id, latitude, longitude, speed, direction, \
                 collected_at, created_at FROM positions WHERE device_id = ?1 \
                 ORDER BY collected_at DESC LIMIT ?2",
            )
            .and_then(|mut stmt| {
                stmt.query_map(rusqlite::params![device_id, limit], Position::from_row)
                    .and_then(|rows| rows.collect::<rusqlite::Result<Vec<Position>>>())
            }),
        None => conn
            .prepare(
                "SELECT id, device_id, latitude, longitude, speed, direction, \
                 collected_at, created_at FROM positions \
                 ORDER BY collected_at DESC LIMIT ?1",
            )
            .and_then(|mut stmt| {
                stmt.query_map([limit], Position::from_row)
                    .and_then(|rows| rows.collect::<rusqlite::Result<Vec<Position>>>())
            }),
    };

    let positions = result.map_err(|e| {
        error!("Failed to read positions: {}", e);
        ApiError::internal("Failed to retrieve positions")
    })?;

    Ok(Json(json!({"status": "success", "data": positions})))
}

pub async fn get_position(
    State(state): State<Arc<AppState>>,
    Path(id): Path<i64>,
) -> Result<Json<Value>, ApiError> {
    let conn = state.db_pool.get().map_err(|e| {
        error!("Failed to get a database connection: {}", e);
        ApiError::internal("Failed to retrieve position")
    })?;

    let position = conn
        .query_row(
            "SELECT id, device_id, latitude, longitude, speed, direction, \
             collected_at, created_at FROM positions WHERE id = ?1",
            [id],
            Position::from_row,
        )
        .optional()
        .map_err(|e| {
            error!("Failed to read position {}: {}", id, e);
            ApiError::internal("Failed to retrieve position")
        })?;

    match position {
        Some(position) => Ok(Json(json!({"status": "success", "data": position}))),
        None => {
            warn!("Position {} not found", id);
            Err(ApiError::not_found("Position not found"))
        }
    }
}

pub async fn create_position(
    State(state): State<Arc<AppState>>,
    Json(payload): Json<CreatePositionPayload>,
) -> Result<(StatusCode, Json<Value>), ApiError> {
    payload.validate()?;

    let conn = state.db_pool.get().map_err(|e| {
        error!("Failed to get a database connection: {}", e);
        ApiError::internal("Failed to create position")
    })?;

    conn.execute(
        "INSERT INTO positions (device_id, latitude, longitude, speed, direction, collected_at) \
         VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
        rusqlite::params![
            payload.device_id,
            payload.latitude,
            payload.longitude,
            payload.speed,
            payload.direction,
            payload.collected_at
        ],
    )
    .map_err(|e| {
        error!("Failed to insert position: {}", e);
        ApiError::internal("Failed to create position")
    })?;

    let id = conn.last_insert_rowid();
    info!("Recorded position {} for device {}", id, payload.device_id);

    Ok((
        StatusCode::CREATED,
        Json(json!({
            "status": "success",
            "data": {
                "id": id,
                "device_id": payload.device_id,
                "latitude": payload.latitude,
                "longitude": payload.longitude,
                "speed": payload.speed,
                "direction": payload.direction,
                "collected_at": payload.collected_at,
            },
        })),
    ))
}
