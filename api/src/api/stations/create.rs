use axum::{
    Json,
    extract::{State, rejection::JsonRejection},
    http::StatusCode,
};
use serde_json::Value;
use sqlx::PgPool;

use super::payload;
use crate::api::{ApiError, ErrorResponse, FieldErrors};
use crate::models::EnrichedStation;
use crate::store::stations;

/// Register a new weather station
#[utoipa::path(
    post,
    path = "/stations",
    request_body(
        content = Object,
        description = "Station name and WGS84 coordinates",
        example = json!({"name": "Madrid Retiro", "latitude": 40.4153, "longitude": -3.6845})
    ),
    responses(
        (status = 201, description = "Station created", body = EnrichedStation),
        (status = 400, description = "Invalid or missing fields", body = FieldErrors),
        (status = 500, description = "Database error", body = ErrorResponse)
    ),
    tag = "stations"
)]
pub async fn create_station(
    State(pool): State<PgPool>,
    body: Result<Json<Value>, JsonRejection>,
) -> Result<(StatusCode, Json<EnrichedStation>), ApiError> {
    let body = payload::json_body(body)?;
    let new_station = payload::parse_new_station(&body)?;

    let station = stations::create(&pool, &new_station).await?;

    Ok((StatusCode::CREATED, Json(station.enrich())))
}
