use axum::{
    Json,
    extract::{Path, State, rejection::PathRejection},
};
use sqlx::PgPool;

use super::{STATION_NOT_FOUND, station_id};
use crate::api::{ApiError, ErrorResponse, MessageResponse};
use crate::store::stations;

pub const STATION_DELETED: &str = "Station deleted successfully";

/// Delete a station. Its readings are kept without a station.
#[utoipa::path(
    delete,
    path = "/stations/{id}",
    params(
        ("id" = i32, Path, description = "Station ID")
    ),
    responses(
        (status = 200, description = "Station deleted", body = MessageResponse),
        (status = 404, description = "Station not found", body = MessageResponse),
        (status = 500, description = "Database error", body = ErrorResponse)
    ),
    tag = "stations"
)]
pub async fn delete_station(
    State(pool): State<PgPool>,
    id: Result<Path<i32>, PathRejection>,
) -> Result<Json<MessageResponse>, ApiError> {
    let id = station_id(id)?;

    if stations::delete(&pool, id).await? {
        Ok(Json(MessageResponse::new(STATION_DELETED)))
    } else {
        Err(ApiError::NotFound(STATION_NOT_FOUND))
    }
}
