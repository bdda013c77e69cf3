use sqlx::{FromRow, PgPool, Postgres, Transaction};
use tracing::{debug, info};

use super::{PersistenceError, finish, readings};
use crate::geo::{EwktError, GeoPoint};
use crate::models::{NewStation, Reading, Station, StationPatch};

/// Internal struct for database row
#[derive(Debug, FromRow)]
struct StationRow {
    id: i32,
    name: String,
    /// `ST_AsEWKT(location)`
    location: String,
}

impl TryFrom<StationRow> for Station {
    type Error = EwktError;

    fn try_from(row: StationRow) -> Result<Self, Self::Error> {
        Ok(Station {
            id: row.id,
            name: row.name,
            location: row.location.parse()?,
        })
    }
}

/// The station closest to a reference point, with its most recent reading
#[derive(Debug, Clone, PartialEq)]
pub struct NearestStation {
    pub station: Station,
    pub latest: Option<Reading>,
}

/// Register a new station
pub async fn create(pool: &PgPool, new: &NewStation) -> Result<Station, PersistenceError> {
    let mut tx = pool.begin().await?;
    let result = insert(&mut tx, new).await;
    let station = finish(tx, result).await?;

    info!(station_id = station.id, name = %station.name, "Created station");
    Ok(station)
}

async fn insert(
    tx: &mut Transaction<'_, Postgres>,
    new: &NewStation,
) -> Result<Station, PersistenceError> {
    let row: StationRow = sqlx::query_as(
        r#"
        INSERT INTO weather_stations (name, location)
        VALUES ($1, ST_SetSRID(ST_MakePoint($2, $3), $4)::geography)
        RETURNING id, name, ST_AsEWKT(location) AS location
        "#,
    )
    .bind(&new.name)
    .bind(new.location.longitude)
    .bind(new.location.latitude)
    .bind(new.location.srid)
    .fetch_one(&mut **tx)
    .await?;

    Ok(Station::try_from(row)?)
}

/// Fetch a station by id
pub async fn get(pool: &PgPool, id: i32) -> Result<Option<Station>, PersistenceError> {
    let row: Option<StationRow> = sqlx::query_as(
        r#"
        SELECT id, name, ST_AsEWKT(location) AS location
        FROM weather_stations
        WHERE id = $1
        "#,
    )
    .bind(id)
    .fetch_optional(pool)
    .await?;

    Ok(row.map(Station::try_from).transpose()?)
}

/// Apply `patch` to the station with the given id. Returns `None` when no
/// such station exists.
pub async fn update(
    pool: &PgPool,
    id: i32,
    patch: &StationPatch,
) -> Result<Option<Station>, PersistenceError> {
    let mut tx = pool.begin().await?;
    let result = apply_patch(&mut tx, id, patch).await;
    let station = finish(tx, result).await?;

    match &station {
        Some(station) => info!(
            station_id = station.id,
            name_changed = patch.name.is_some(),
            location_changed = patch.location.is_some(),
            "Updated station"
        ),
        None => debug!(station_id = id, "Station to update does not exist"),
    }
    Ok(station)
}

async fn apply_patch(
    tx: &mut Transaction<'_, Postgres>,
    id: i32,
    patch: &StationPatch,
) -> Result<Option<Station>, PersistenceError> {
    let row: Option<StationRow> = sqlx::query_as(
        r#"
        UPDATE weather_stations
        SET name = COALESCE($2, name),
            location = CASE
                WHEN $3::float8 IS NULL OR $4::float8 IS NULL THEN location
                ELSE ST_SetSRID(ST_MakePoint($3::float8, $4::float8), $5::integer)::geography
            END
        WHERE id = $1
        RETURNING id, name, ST_AsEWKT(location) AS location
        "#,
    )
    .bind(id)
    .bind(patch.name.as_deref())
    .bind(patch.location.map(|p| p.longitude))
    .bind(patch.location.map(|p| p.latitude))
    .bind(patch.location.map(|p| p.srid))
    .fetch_optional(&mut **tx)
    .await?;

    Ok(row.map(Station::try_from).transpose()?)
}

/// Remove a station. Returns whether a row was deleted; its readings are kept
/// with a null `station_id`.
pub async fn delete(pool: &PgPool, id: i32) -> Result<bool, PersistenceError> {
    let mut tx = pool.begin().await?;
    let result = sqlx::query("DELETE FROM weather_stations WHERE id = $1")
        .bind(id)
        .execute(&mut *tx)
        .await
        .map(|done| done.rows_affected() > 0)
        .map_err(PersistenceError::from);
    let deleted = finish(tx, result).await?;

    if deleted {
        info!(station_id = id, "Deleted station");
    } else {
        debug!(station_id = id, "Station to delete does not exist");
    }
    Ok(deleted)
}

/// Find the station with the smallest geodesic distance to `point`.
/// Equidistant stations resolve to the lowest id.
pub async fn find_nearest(
    pool: &PgPool,
    point: GeoPoint,
) -> Result<Option<NearestStation>, PersistenceError> {
    let mut conn = pool.acquire().await?;

    let row: Option<StationRow> = sqlx::query_as(
        r#"
        SELECT id, name, ST_AsEWKT(location) AS location
        FROM weather_stations
        ORDER BY ST_Distance(location, ST_SetSRID(ST_MakePoint($1, $2), $3)::geography), id
        LIMIT 1
        "#,
    )
    .bind(point.longitude)
    .bind(point.latitude)
    .bind(point.srid)
    .fetch_optional(&mut *conn)
    .await?;

    let Some(row) = row else {
        debug!(
            latitude = point.latitude,
            longitude = point.longitude,
            "No stations registered"
        );
        return Ok(None);
    };

    let station = Station::try_from(row)?;
    let latest = readings::latest_for(&mut *conn, station.id).await?;

    debug!(
        station_id = station.id,
        has_reading = latest.is_some(),
        "Resolved nearest station"
    );
    Ok(Some(NearestStation { station, latest }))
}
