//! Request body validation.
//!
//! Bodies arrive as loose JSON and are turned into validated domain types or
//! a [`FieldErrors`] map naming every offending field. Numbers may be given
//! as JSON numbers or numeric strings.

use axum::{Json, extract::rejection::JsonRejection};
use chrono::{DateTime, NaiveDateTime};
use serde_json::{Map, Value};
use tracing::debug;

use crate::api::error::{ApiError, FieldErrors};
use crate::geo::{self, GeoPoint};
use crate::models::{NewReading, NewStation, StationPatch};

const MISSING: &str = "Missing data for required field.";
const NULL: &str = "Field may not be null.";
const UNKNOWN: &str = "Unknown field.";
const INVALID_INPUT: &str = "Invalid input type.";
const NOT_A_STRING: &str = "Not a valid string.";
const NOT_A_NUMBER: &str = "Not a valid number.";
const NOT_A_DATETIME: &str = "Not a valid datetime.";
const SPECIAL_NUMBER: &str = "Special numeric values (nan or infinity) are not permitted.";
const NAME_TOO_SHORT: &str = "Shorter than minimum length 1.";
const NAME_TOO_LONG: &str = "Longer than maximum length 100.";
const LATITUDE_RANGE: &str = "Latitude must be between -90 and 90.";
const LONGITUDE_RANGE: &str = "Longitude must be between -180 and 180.";

pub const PARTIAL_LOCATION: &str =
    "Both latitude and longitude are required to update the location.";
pub const NOTHING_TO_UPDATE: &str =
    "Provide a name or both latitude and longitude to update the station.";

const NAME_MAX_CHARS: usize = 100;

const STATION_FIELDS: &[&str] = &["id", "name", "latitude", "longitude"];
// The station comes from the path, so a body `station_id` is unknown.
const READING_FIELDS: &[&str] = &["id", "timestamp", "temperature", "humidity", "pressure"];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Presence {
    Required,
    /// Absent and `null` both mean "not supplied"
    Optional,
}

/// Unwrap an extracted JSON body, mapping extractor rejections to a body-level error
pub fn json_body(payload: Result<Json<Value>, JsonRejection>) -> Result<Value, FieldErrors> {
    match payload {
        Ok(Json(body)) => Ok(body),
        Err(rejection) => {
            debug!(error = %rejection, "Rejected request body");
            Err(FieldErrors::schema(INVALID_INPUT))
        }
    }
}

pub fn parse_new_station(body: &Value) -> Result<NewStation, FieldErrors> {
    let object = as_object(body)?;
    let mut errors = FieldErrors::default();

    reject_unknown(object, STATION_FIELDS, &mut errors);
    let name = name(object, Presence::Required, &mut errors);
    let latitude = latitude(object, Presence::Required, &mut errors);
    let longitude = longitude(object, Presence::Required, &mut errors);

    match (name, latitude, longitude) {
        (Some(name), Some(latitude), Some(longitude)) if errors.is_empty() => Ok(NewStation {
            name,
            location: GeoPoint::wgs84(latitude, longitude),
        }),
        _ => Err(errors),
    }
}

/// Validate an update body. Supplying exactly one coordinate, or nothing at
/// all, is rejected rather than partially applied.
pub fn parse_station_patch(body: &Value) -> Result<StationPatch, ApiError> {
    let object = as_object(body)?;
    let mut errors = FieldErrors::default();

    reject_unknown(object, STATION_FIELDS, &mut errors);
    let name = name(object, Presence::Optional, &mut errors);
    let latitude = latitude(object, Presence::Optional, &mut errors);
    let longitude = longitude(object, Presence::Optional, &mut errors);
    let patch = errors.into_result(StationPatch {
        name,
        location: None,
    })?;

    match (latitude, longitude) {
        (Some(latitude), Some(longitude)) => Ok(StationPatch {
            location: Some(GeoPoint::wgs84(latitude, longitude)),
            ..patch
        }),
        (None, None) if patch.name.is_some() => Ok(patch),
        (None, None) => Err(ApiError::Rejected(NOTHING_TO_UPDATE)),
        _ => Err(ApiError::Rejected(PARTIAL_LOCATION)),
    }
}

pub fn parse_new_reading(body: &Value) -> Result<NewReading, FieldErrors> {
    let object = as_object(body)?;
    let mut errors = FieldErrors::default();

    reject_unknown(object, READING_FIELDS, &mut errors);
    let timestamp = timestamp(object, &mut errors);
    let temperature = number(object, "temperature", Presence::Optional, &mut errors);
    let humidity = number(object, "humidity", Presence::Optional, &mut errors);
    let pressure = number(object, "pressure", Presence::Optional, &mut errors);

    match timestamp {
        Some(timestamp) if errors.is_empty() => Ok(NewReading {
            timestamp,
            temperature,
            humidity,
            pressure,
        }),
        _ => Err(errors),
    }
}

fn as_object(body: &Value) -> Result<&Map<String, Value>, FieldErrors> {
    body.as_object()
        .ok_or_else(|| FieldErrors::schema(INVALID_INPUT))
}

fn reject_unknown(object: &Map<String, Value>, allowed: &[&str], errors: &mut FieldErrors) {
    for field in object.keys() {
        if !allowed.contains(&field.as_str()) {
            errors.add(field, UNKNOWN);
        }
    }
}

fn lookup<'a>(
    object: &'a Map<String, Value>,
    field: &str,
    presence: Presence,
    errors: &mut FieldErrors,
) -> Option<&'a Value> {
    match (object.get(field), presence) {
        (None, Presence::Required) => {
            errors.add(field, MISSING);
            None
        }
        (Some(Value::Null), Presence::Required) => {
            errors.add(field, NULL);
            None
        }
        (None | Some(Value::Null), Presence::Optional) => None,
        (Some(value), _) => Some(value),
    }
}

fn name(object: &Map<String, Value>, presence: Presence, errors: &mut FieldErrors) -> Option<String> {
    let value = lookup(object, "name", presence, errors)?;
    let Some(raw) = value.as_str() else {
        errors.add("name", NOT_A_STRING);
        return None;
    };

    let name = raw.trim();
    if name.is_empty() {
        errors.add("name", NAME_TOO_SHORT);
        return None;
    }
    if name.chars().count() > NAME_MAX_CHARS {
        errors.add("name", NAME_TOO_LONG);
        return None;
    }
    Some(name.to_string())
}

fn number(
    object: &Map<String, Value>,
    field: &str,
    presence: Presence,
    errors: &mut FieldErrors,
) -> Option<f64> {
    let value = lookup(object, field, presence, errors)?;
    match to_number(value) {
        Ok(number) => Some(number),
        Err(message) => {
            errors.add(field, message);
            None
        }
    }
}

fn to_number(value: &Value) -> Result<f64, &'static str> {
    let number = match value {
        Value::Number(number) => number.as_f64().ok_or(NOT_A_NUMBER)?,
        Value::String(raw) => raw.trim().parse::<f64>().map_err(|_| NOT_A_NUMBER)?,
        _ => return Err(NOT_A_NUMBER),
    };

    if number.is_finite() {
        Ok(number)
    } else {
        Err(SPECIAL_NUMBER)
    }
}

fn latitude(object: &Map<String, Value>, presence: Presence, errors: &mut FieldErrors) -> Option<f64> {
    let latitude = number(object, "latitude", presence, errors)?;
    if !geo::latitude_in_range(latitude) {
        errors.add("latitude", LATITUDE_RANGE);
        return None;
    }
    Some(latitude)
}

fn longitude(object: &Map<String, Value>, presence: Presence, errors: &mut FieldErrors) -> Option<f64> {
    let longitude = number(object, "longitude", presence, errors)?;
    if !geo::longitude_in_range(longitude) {
        errors.add("longitude", LONGITUDE_RANGE);
        return None;
    }
    Some(longitude)
}

/// Accepts RFC 3339 (normalized to UTC) or a naive ISO-8601 date-time
fn timestamp(object: &Map<String, Value>, errors: &mut FieldErrors) -> Option<NaiveDateTime> {
    let value = lookup(object, "timestamp", Presence::Required, errors)?;
    let parsed = value.as_str().and_then(|raw| {
        let raw = raw.trim();
        DateTime::parse_from_rfc3339(raw)
            .map(|dt| dt.naive_utc())
            .or_else(|_| NaiveDateTime::parse_from_str(raw, "%Y-%m-%dT%H:%M:%S%.f"))
            .or_else(|_| NaiveDateTime::parse_from_str(raw, "%Y-%m-%d %H:%M:%S%.f"))
            .ok()
    });

    if parsed.is_none() {
        errors.add("timestamp", NOT_A_DATETIME);
    }
    parsed
}
