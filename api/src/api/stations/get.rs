use axum::{
    Json,
    extract::{Path, State, rejection::PathRejection},
};
use sqlx::PgPool;

use super::{STATION_NOT_FOUND, station_id};
use crate::api::{ApiError, ErrorResponse, MessageResponse};
use crate::models::EnrichedStation;
use crate::store::{PersistenceError, readings, stations};

/// Get a station with its most recent reading
#[utoipa::path(
    get,
    path = "/stations/{id}",
    params(
        ("id" = i32, Path, description = "Station ID")
    ),
    responses(
        (status = 200, description = "Station details", body = EnrichedStation),
        (status = 404, description = "Station not found", body = MessageResponse),
        (status = 500, description = "Database error", body = ErrorResponse)
    ),
    tag = "stations"
)]
pub async fn get_station(
    State(pool): State<PgPool>,
    id: Result<Path<i32>, PathRejection>,
) -> Result<Json<EnrichedStation>, ApiError> {
    let id = station_id(id)?;

    let station = stations::get(&pool, id)
        .await?
        .ok_or(ApiError::NotFound(STATION_NOT_FOUND))?;
    let latest = readings::latest_for(&pool, station.id)
        .await
        .map_err(PersistenceError::from)?;

    Ok(Json(station.enrich().with_latest(latest)))
}
