use axum::{
    Json,
    extract::{
        Path, State,
        rejection::{JsonRejection, PathRejection},
    },
};
use serde_json::Value;
use sqlx::PgPool;

use super::{STATION_NOT_FOUND, payload, station_id};
use crate::api::{ApiError, ErrorResponse, MessageResponse};
use crate::models::EnrichedStation;
use crate::store::stations;

/// Update a station's name and/or location
///
/// The location is only replaced when both latitude and longitude are sent.
#[utoipa::path(
    put,
    path = "/stations/{id}",
    params(
        ("id" = i32, Path, description = "Station ID")
    ),
    request_body(
        content = Object,
        description = "Any of name, or latitude together with longitude",
        example = json!({"name": "Madrid Retiro", "latitude": 40.4153, "longitude": -3.6845})
    ),
    responses(
        (status = 200, description = "Station updated", body = EnrichedStation),
        (status = 400, description = "Invalid fields or incomplete location", body = MessageResponse),
        (status = 404, description = "Station not found", body = MessageResponse),
        (status = 500, description = "Database error", body = ErrorResponse)
    ),
    tag = "stations"
)]
pub async fn update_station(
    State(pool): State<PgPool>,
    id: Result<Path<i32>, PathRejection>,
    body: Result<Json<Value>, JsonRejection>,
) -> Result<Json<EnrichedStation>, ApiError> {
    let id = station_id(id)?;
    let body = payload::json_body(body)?;
    let patch = payload::parse_station_patch(&body)?;

    let station = stations::update(&pool, id, &patch)
        .await?
        .ok_or(ApiError::NotFound(STATION_NOT_FOUND))?;

    Ok(Json(station.enrich()))
}
