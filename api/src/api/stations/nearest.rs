use axum::{
    Json,
    extract::{Query, State, rejection::QueryRejection},
};
use sqlx::PgPool;
use tracing::debug;
use utoipa::IntoParams;

use crate::api::{ApiError, ErrorResponse, MessageResponse};
use crate::geo::{self, GeoPoint};
use crate::models::EnrichedStation;
use crate::store::stations;

pub const MISSING_DATA: &str = "Missing data";
pub const INVALID_COORDINATES: &str = "Invalid latitude or longitude";
pub const NO_STATIONS: &str = "No stations found";

#[derive(Debug, IntoParams)]
pub struct NearestQuery {
    /// Latitude of the reference point in degrees
    pub latitude: Option<String>,
    /// Longitude of the reference point in degrees
    pub longitude: Option<String>,
}

impl NearestQuery {
    /// Build from raw query pairs. A repeated key keeps its first value.
    fn from_pairs(pairs: Vec<(String, String)>) -> Self {
        let mut query = NearestQuery {
            latitude: None,
            longitude: None,
        };
        for (key, value) in pairs {
            let slot = match key.as_str() {
                "latitude" => &mut query.latitude,
                "longitude" => &mut query.longitude,
                _ => continue,
            };
            slot.get_or_insert(value);
        }
        query
    }

    fn reference_point(&self) -> Result<GeoPoint, ApiError> {
        let (Some(latitude), Some(longitude)) = (
            self.latitude.as_deref().filter(|v| !v.is_empty()),
            self.longitude.as_deref().filter(|v| !v.is_empty()),
        ) else {
            return Err(ApiError::InvalidQuery(MISSING_DATA));
        };

        let parse = |raw: &str| raw.trim().parse::<f64>().ok().filter(|v| v.is_finite());
        match (parse(latitude), parse(longitude)) {
            (Some(latitude), Some(longitude))
                if geo::latitude_in_range(latitude) && geo::longitude_in_range(longitude) =>
            {
                Ok(GeoPoint::wgs84(latitude, longitude))
            }
            _ => Err(ApiError::InvalidQuery(INVALID_COORDINATES)),
        }
    }
}

/// Find the station closest to a point, with its most recent reading
#[utoipa::path(
    get,
    path = "/stations/nearest",
    params(NearestQuery),
    responses(
        (status = 200, description = "Nearest station", body = EnrichedStation),
        (status = 400, description = "Missing or invalid coordinates", body = ErrorResponse),
        (status = 404, description = "No stations registered", body = MessageResponse),
        (status = 500, description = "Database error", body = ErrorResponse)
    ),
    tag = "stations"
)]
pub async fn get_nearest_station(
    State(pool): State<PgPool>,
    query: Result<Query<Vec<(String, String)>>, QueryRejection>,
) -> Result<Json<EnrichedStation>, ApiError> {
    let Query(pairs) = query.map_err(|rejection| {
        debug!(error = %rejection, "Rejected nearest query string");
        ApiError::InvalidQuery(INVALID_COORDINATES)
    })?;
    let point = NearestQuery::from_pairs(pairs).reference_point()?;

    let nearest = stations::find_nearest(&pool, point)
        .await?
        .ok_or(ApiError::NotFound(NO_STATIONS))?;

    Ok(Json(nearest.station.enrich().with_latest(nearest.latest)))
}
