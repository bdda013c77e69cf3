use axum::{
    Json,
    extract::{
        Path, State,
        rejection::{JsonRejection, PathRejection},
    },
    http::StatusCode,
};
use serde_json::Value;
use sqlx::PgPool;

use super::{STATION_NOT_FOUND, payload, station_id};
use crate::api::{ApiError, ErrorResponse, FieldErrors, MessageResponse};
use crate::models::Reading;
use crate::store::readings;

/// Record a new reading for a station
#[utoipa::path(
    post,
    path = "/stations/{id}/readings",
    params(
        ("id" = i32, Path, description = "Station ID")
    ),
    request_body(
        content = Object,
        description = "Measurement time and optional sensor values",
        example = json!({"timestamp": "2024-05-01T12:00:00", "temperature": 21.5, "humidity": 40.0, "pressure": 1013.2})
    ),
    responses(
        (status = 201, description = "Reading recorded", body = Reading),
        (status = 400, description = "Invalid or missing fields", body = FieldErrors),
        (status = 404, description = "Station not found", body = MessageResponse),
        (status = 500, description = "Database error", body = ErrorResponse)
    ),
    tag = "readings"
)]
pub async fn append_reading(
    State(pool): State<PgPool>,
    id: Result<Path<i32>, PathRejection>,
    body: Result<Json<Value>, JsonRejection>,
) -> Result<(StatusCode, Json<Reading>), ApiError> {
    let id = station_id(id)?;
    let body = payload::json_body(body)?;
    let reading = payload::parse_new_reading(&body)?;

    let stored = readings::append(&pool, id, &reading)
        .await?
        .ok_or(ApiError::NotFound(STATION_NOT_FOUND))?;

    Ok((StatusCode::CREATED, Json(stored)))
}
