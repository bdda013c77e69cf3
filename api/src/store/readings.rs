use sqlx::PgPool;
use sqlx::postgres::PgExecutor;
use tracing::{debug, info};

use super::{PersistenceError, finish};
use crate::models::{NewReading, Reading};

/// Most recent reading recorded for a station
pub async fn latest_for<'e, E>(executor: E, station_id: i32) -> Result<Option<Reading>, sqlx::Error>
where
    E: PgExecutor<'e>,
{
    sqlx::query_as(
        r#"
        SELECT id, station_id, "timestamp", temperature, humidity, pressure
        FROM weather_data
        WHERE station_id = $1
        ORDER BY "timestamp" DESC, id DESC
        LIMIT 1
        "#,
    )
    .bind(station_id)
    .fetch_optional(executor)
    .await
}

/// Append a reading to a station. Returns `None` when the station does not exist.
pub async fn append(
    pool: &PgPool,
    station_id: i32,
    reading: &NewReading,
) -> Result<Option<Reading>, PersistenceError> {
    let mut tx = pool.begin().await?;
    let result = sqlx::query_as::<_, Reading>(
        r#"
        INSERT INTO weather_data (station_id, "timestamp", temperature, humidity, pressure)
        SELECT id, $2::timestamp, $3::float8, $4::float8, $5::float8
        FROM weather_stations
        WHERE id = $1
        RETURNING id, station_id, "timestamp", temperature, humidity, pressure
        "#,
    )
    .bind(station_id)
    .bind(reading.timestamp)
    .bind(reading.temperature)
    .bind(reading.humidity)
    .bind(reading.pressure)
    .fetch_optional(&mut *tx)
    .await
    .map_err(PersistenceError::from);
    let stored = finish(tx, result).await?;

    match &stored {
        Some(stored) => info!(
            station_id,
            reading_id = stored.id,
            timestamp = %stored.timestamp,
            "Appended reading"
        ),
        None => debug!(station_id, "Station for reading does not exist"),
    }
    Ok(stored)
}
