mod create;
mod delete;
mod get;
mod nearest;
mod payload;
mod readings;
mod update;

use axum::extract::{Path, rejection::PathRejection};
use sqlx::PgPool;
use utoipa_axum::{router::OpenApiRouter, routes};

use crate::api::ApiError;

pub const STATION_NOT_FOUND: &str = "Station not found";

pub fn router() -> OpenApiRouter<PgPool> {
    OpenApiRouter::new()
        .routes(routes!(create::create_station))
        .routes(routes!(nearest::get_nearest_station))
        .routes(routes!(
            get::get_station,
            update::update_station,
            delete::delete_station
        ))
        .routes(routes!(readings::append_reading))
}

/// Station ids that are not integers cannot exist
fn station_id(path: Result<Path<i32>, PathRejection>) -> Result<i32, ApiError> {
    path.map(|Path(id)| id)
        .map_err(|_| ApiError::NotFound(STATION_NOT_FOUND))
}
