use std::fmt;
use std::str::FromStr;

/// WGS84 longitude/latitude in degrees
pub const SRID_WGS84: i32 = 4326;

/// PostGIS reports 0 when a geometry carries no spatial reference
pub const SRID_UNKNOWN: i32 = 0;

const LATITUDE_LIMIT: f64 = 90.0;
const LONGITUDE_LIMIT: f64 = 180.0;

/// A single point tagged with its spatial reference identifier
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GeoPoint {
    pub longitude: f64,
    pub latitude: f64,
    pub srid: i32,
}

impl GeoPoint {
    pub fn wgs84(latitude: f64, longitude: f64) -> Self {
        Self {
            longitude,
            latitude,
            srid: SRID_WGS84,
        }
    }

    /// Encodes as extended well-known text, e.g. `SRID=4326;POINT(2.35 48.85)`.
    /// Points without a known SRID are encoded as plain WKT.
    pub fn to_ewkt(&self) -> String {
        self.to_string()
    }
}

impl fmt::Display for GeoPoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.srid != SRID_UNKNOWN {
            write!(f, "SRID={};", self.srid)?;
        }
        write!(f, "POINT({} {})", self.longitude, self.latitude)
    }
}

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum EwktError {
    #[error("Invalid SRID prefix: {0}")]
    InvalidSrid(String),
    #[error("Unsupported geometry type: {0}")]
    UnsupportedGeometry(String),
    #[error("Empty point")]
    EmptyPoint,
    #[error("Expected 2 coordinates, found {0}")]
    CoordinateCount(usize),
    #[error("Invalid coordinate: {0}")]
    InvalidCoordinate(String),
}

impl FromStr for GeoPoint {
    type Err = EwktError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();

        let (srid, wkt) = match s.split_once(';') {
            Some((prefix, rest)) => {
                let value = prefix
                    .trim()
                    .strip_prefix("SRID=")
                    .or_else(|| prefix.trim().strip_prefix("srid="))
                    .ok_or_else(|| EwktError::InvalidSrid(prefix.to_string()))?;
                let srid = value
                    .trim()
                    .parse::<i32>()
                    .map_err(|_| EwktError::InvalidSrid(prefix.to_string()))?;
                (srid, rest.trim())
            }
            None => (SRID_UNKNOWN, s),
        };

        let upper = wkt.to_ascii_uppercase();
        let body = upper
            .strip_prefix("POINT")
            .ok_or_else(|| EwktError::UnsupportedGeometry(wkt.to_string()))?
            .trim();

        if body == "EMPTY" {
            return Err(EwktError::EmptyPoint);
        }

        let coords = body
            .strip_prefix('(')
            .and_then(|rest| rest.strip_suffix(')'))
            .ok_or_else(|| EwktError::UnsupportedGeometry(wkt.to_string()))?;

        let values: Vec<&str> = coords.split_whitespace().collect();
        if values.len() != 2 {
            return Err(EwktError::CoordinateCount(values.len()));
        }

        let longitude = parse_coordinate(values[0])?;
        let latitude = parse_coordinate(values[1])?;

        Ok(Self {
            longitude,
            latitude,
            srid,
        })
    }
}

fn parse_coordinate(raw: &str) -> Result<f64, EwktError> {
    raw.parse::<f64>()
        .ok()
        .filter(|v| v.is_finite())
        .ok_or_else(|| EwktError::InvalidCoordinate(raw.to_string()))
}

pub fn latitude_in_range(latitude: f64) -> bool {
    (-LATITUDE_LIMIT..=LATITUDE_LIMIT).contains(&latitude)
}

pub fn longitude_in_range(longitude: f64) -> bool {
    (-LONGITUDE_LIMIT..=LONGITUDE_LIMIT).contains(&longitude)
}
