//! Registry, reading store and HTTP flows against a real PostGIS database.
//!
//! Prerequisites:
//! - PostgreSQL with the PostGIS extension available
//! - DATABASE_URL pointing at a role allowed to create databases
//!
//! Run with: cargo test --test stations_db -- --ignored

mod common;

use axum::http::StatusCode;
use chrono::{NaiveDate, NaiveDateTime};
use serde_json::json;
use sqlx::PgPool;

use common::{empty_request, json_request, send};
use weather_stations_api::api;
use weather_stations_api::geo::{GeoPoint, SRID_WGS84};
use weather_stations_api::models::{NewReading, NewStation, StationPatch};
use weather_stations_api::store::{readings, stations};

const TOLERANCE: f64 = 1e-9;

fn new_station(name: &str, latitude: f64, longitude: f64) -> NewStation {
    NewStation {
        name: name.to_string(),
        location: GeoPoint::wgs84(latitude, longitude),
    }
}

fn at(hour: u32) -> NaiveDateTime {
    NaiveDate::from_ymd_opt(2024, 5, 1)
        .unwrap()
        .and_hms_opt(hour, 0, 0)
        .unwrap()
}

fn reading(hour: u32, temperature: f64) -> NewReading {
    NewReading {
        timestamp: at(hour),
        temperature: Some(temperature),
        humidity: None,
        pressure: Some(1013.0),
    }
}

async fn station_count(pool: &PgPool) -> i64 {
    sqlx::query_scalar("SELECT COUNT(*) FROM weather_stations")
        .fetch_one(pool)
        .await
        .unwrap()
}

#[sqlx::test(migrations = "./migrations")]
#[ignore = "requires PostGIS at DATABASE_URL"]
async fn created_station_is_retrievable(pool: PgPool) {
    let created = stations::create(&pool, &new_station("Madrid", 40.4168, -3.7038))
        .await
        .unwrap();

    let fetched = stations::get(&pool, created.id).await.unwrap().unwrap();
    assert_eq!(fetched.name, "Madrid");
    assert_eq!(fetched.location.srid, SRID_WGS84);
    assert!((fetched.location.latitude - 40.4168).abs() < TOLERANCE);
    assert!((fetched.location.longitude - -3.7038).abs() < TOLERANCE);
}

#[sqlx::test(migrations = "./migrations")]
#[ignore = "requires PostGIS at DATABASE_URL"]
async fn nearest_picks_minimal_distance(pool: PgPool) {
    for (name, latitude, longitude) in [("origin", 0.0, 0.0), ("east", 0.0, 10.0), ("west", 0.0, -5.0)] {
        stations::create(&pool, &new_station(name, latitude, longitude))
            .await
            .unwrap();
    }

    let nearest = stations::find_nearest(&pool, GeoPoint::wgs84(0.0, -4.0))
        .await
        .unwrap()
        .unwrap();
    assert_eq!(nearest.station.name, "west");
    assert!(nearest.latest.is_none());
}

#[sqlx::test(migrations = "./migrations")]
#[ignore = "requires PostGIS at DATABASE_URL"]
async fn nearest_over_empty_registry_is_none(pool: PgPool) {
    let nearest = stations::find_nearest(&pool, GeoPoint::wgs84(0.0, 0.0))
        .await
        .unwrap();
    assert!(nearest.is_none());
}

#[sqlx::test(migrations = "./migrations")]
#[ignore = "requires PostGIS at DATABASE_URL"]
async fn equidistant_stations_resolve_to_lowest_id(pool: PgPool) {
    let first = stations::create(&pool, &new_station("first", 1.0, 1.0)).await.unwrap();
    stations::create(&pool, &new_station("second", 1.0, 1.0)).await.unwrap();

    let nearest = stations::find_nearest(&pool, GeoPoint::wgs84(0.0, 0.0))
        .await
        .unwrap()
        .unwrap();
    assert_eq!(nearest.station.id, first.id);
}

#[sqlx::test(migrations = "./migrations")]
#[ignore = "requires PostGIS at DATABASE_URL"]
async fn nearest_attaches_most_recent_reading(pool: PgPool) {
    let station = stations::create(&pool, &new_station("Lisbon", 38.7223, -9.1393))
        .await
        .unwrap();
    readings::append(&pool, station.id, &reading(9, 14.0)).await.unwrap();
    readings::append(&pool, station.id, &reading(15, 22.5)).await.unwrap();
    readings::append(&pool, station.id, &reading(12, 19.0)).await.unwrap();

    let nearest = stations::find_nearest(&pool, GeoPoint::wgs84(38.7, -9.1))
        .await
        .unwrap()
        .unwrap();
    let latest = nearest.latest.unwrap();
    assert_eq!(latest.timestamp, at(15));
    assert_eq!(latest.temperature, Some(22.5));
    assert_eq!(latest.station_id, Some(station.id));
}

#[sqlx::test(migrations = "./migrations")]
#[ignore = "requires PostGIS at DATABASE_URL"]
async fn name_only_update_keeps_location(pool: PgPool) {
    let station = stations::create(&pool, &new_station("Old", 10.0, 20.0)).await.unwrap();

    let patch = StationPatch {
        name: Some("New".to_string()),
        location: None,
    };
    let updated = stations::update(&pool, station.id, &patch).await.unwrap().unwrap();
    assert_eq!(updated.name, "New");
    assert_eq!(updated.location, station.location);
}

#[sqlx::test(migrations = "./migrations")]
#[ignore = "requires PostGIS at DATABASE_URL"]
async fn location_update_replaces_point(pool: PgPool) {
    let station = stations::create(&pool, &new_station("Moving", 10.0, 20.0)).await.unwrap();

    let patch = StationPatch {
        name: None,
        location: Some(GeoPoint::wgs84(-30.5, 150.25)),
    };
    let updated = stations::update(&pool, station.id, &patch).await.unwrap().unwrap();
    assert_eq!(updated.name, "Moving");
    assert!((updated.location.latitude - -30.5).abs() < TOLERANCE);
    assert!((updated.location.longitude - 150.25).abs() < TOLERANCE);
}

#[sqlx::test(migrations = "./migrations")]
#[ignore = "requires PostGIS at DATABASE_URL"]
async fn updating_missing_station_is_none(pool: PgPool) {
    let patch = StationPatch {
        name: Some("Ghost".to_string()),
        location: None,
    };
    assert!(stations::update(&pool, 4242, &patch).await.unwrap().is_none());
}

#[sqlx::test(migrations = "./migrations")]
#[ignore = "requires PostGIS at DATABASE_URL"]
async fn delete_succeeds_once_and_orphans_readings(pool: PgPool) {
    let station = stations::create(&pool, &new_station("Doomed", 5.0, 5.0)).await.unwrap();
    let stored = readings::append(&pool, station.id, &reading(8, 11.0))
        .await
        .unwrap()
        .unwrap();

    assert!(stations::delete(&pool, station.id).await.unwrap());
    assert!(!stations::delete(&pool, station.id).await.unwrap());

    let orphan: Option<i32> = sqlx::query_scalar("SELECT station_id FROM weather_data WHERE id = $1")
        .bind(stored.id)
        .fetch_one(&pool)
        .await
        .unwrap();
    assert_eq!(orphan, None);
}

#[sqlx::test(migrations = "./migrations")]
#[ignore = "requires PostGIS at DATABASE_URL"]
async fn appending_to_missing_station_is_none(pool: PgPool) {
    assert!(readings::append(&pool, 4242, &reading(8, 11.0)).await.unwrap().is_none());

    let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM weather_data")
        .fetch_one(&pool)
        .await
        .unwrap();
    assert_eq!(count, 0);
}

#[sqlx::test(migrations = "./migrations")]
#[ignore = "requires PostGIS at DATABASE_URL"]
async fn http_station_lifecycle(pool: PgPool) {
    let app = api::router(pool.clone());

    let (status, created) = send(
        app.clone(),
        json_request(
            "POST",
            "/stations",
            &json!({"name": "Retiro", "latitude": 40.4153, "longitude": -3.6845}),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(created["srid"], 4326);
    assert_eq!(created["location"], "SRID=4326;POINT(-3.6845 40.4153)");
    let id = created["id"].as_i64().unwrap();

    let (status, _) = send(
        app.clone(),
        json_request(
            "POST",
            &format!("/stations/{id}/readings"),
            &json!({"timestamp": "2024-05-01T12:00:00", "temperature": 21.5}),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);

    let (status, nearest) = send(
        app.clone(),
        empty_request("GET", "/stations/nearest?latitude=40.4&longitude=-3.7"),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(nearest["id"], id);
    assert_eq!(nearest["latest_data"]["temperature"], 21.5);
    assert_eq!(nearest["latest_data"]["timestamp"], "2024-05-01T12:00:00");

    let (status, updated) = send(
        app.clone(),
        json_request("PUT", &format!("/stations/{id}"), &json!({"name": "Retiro Park"})),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(updated["name"], "Retiro Park");
    assert_eq!(updated["latitude"], 40.4153);

    let (status, body) = send(app.clone(), empty_request("DELETE", &format!("/stations/{id}"))).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!({"message": "Station deleted successfully"}));

    let (status, body) = send(app.clone(), empty_request("DELETE", &format!("/stations/{id}"))).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body, json!({"message": "Station not found"}));

    let (status, body) = send(app, empty_request("GET", "/stations/nearest?latitude=0&longitude=0")).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body, json!({"message": "No stations found"}));
}

#[sqlx::test(migrations = "./migrations")]
#[ignore = "requires PostGIS at DATABASE_URL"]
async fn rejected_create_persists_nothing(pool: PgPool) {
    let (status, _) = send(
        api::router(pool.clone()),
        json_request(
            "POST",
            "/stations",
            &json!({"name": "Bad", "latitude": "x", "longitude": "y"}),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(station_count(&pool).await, 0);
}
