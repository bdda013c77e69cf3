use chrono::NaiveDateTime;
use serde::Serialize;
use sqlx::FromRow;
use utoipa::ToSchema;

use crate::geo::GeoPoint;

/// A registered weather station
#[derive(Debug, Clone, PartialEq)]
pub struct Station {
    pub id: i32,
    pub name: String,
    pub location: GeoPoint,
}

/// A sensor measurement recorded by a station
#[derive(Debug, Clone, PartialEq, Serialize, FromRow, ToSchema)]
pub struct Reading {
    pub id: i32,
    /// Null once the owning station has been deleted
    pub station_id: Option<i32>,
    #[schema(value_type = String, example = "2024-05-01T12:00:00")]
    pub timestamp: NaiveDateTime,
    pub temperature: Option<f64>,
    pub humidity: Option<f64>,
    pub pressure: Option<f64>,
}

/// Validated input for registering a station
#[derive(Debug, Clone, PartialEq)]
pub struct NewStation {
    pub name: String,
    pub location: GeoPoint,
}

/// Validated changes to an existing station. Absent fields are left untouched.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct StationPatch {
    pub name: Option<String>,
    pub location: Option<GeoPoint>,
}

/// Validated input for appending a reading
#[derive(Debug, Clone, PartialEq)]
pub struct NewReading {
    pub timestamp: NaiveDateTime,
    pub temperature: Option<f64>,
    pub humidity: Option<f64>,
    pub pressure: Option<f64>,
}

/// Station representation returned by the API
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct EnrichedStation {
    pub id: i32,
    pub name: String,
    pub latitude: f64,
    pub longitude: f64,
    pub srid: i32,
    /// Location as extended well-known text
    #[schema(example = "SRID=4326;POINT(-3.7038 40.4168)")]
    pub location: String,
    /// Most recent reading of the station, if any
    #[serde(skip_serializing_if = "Option::is_none")]
    pub latest_data: Option<Reading>,
}

impl Station {
    pub fn enrich(&self) -> EnrichedStation {
        EnrichedStation {
            id: self.id,
            name: self.name.clone(),
            latitude: self.location.latitude,
            longitude: self.location.longitude,
            srid: self.location.srid,
            location: self.location.to_ewkt(),
            latest_data: None,
        }
    }
}

impl EnrichedStation {
    pub fn with_latest(mut self, reading: Option<Reading>) -> Self {
        self.latest_data = reading;
        self
    }
}
