//! Coordinates and haversine distance

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::{Result, ToolshareError};

/// Mean Earth radius used by the haversine formula
pub const EARTH_RADIUS_KM: f64 = 6371.0;

/// A validated point in decimal degrees
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Coordinate {
    pub latitude: f64,
    pub longitude: f64,
}

impl Coordinate {
    /// Create a coordinate, rejecting non-finite or out-of-range values
    pub fn new(latitude: f64, longitude: f64) -> Result<Self> {
        if !latitude.is_finite() || !(-90.0..=90.0).contains(&latitude) {
            return Err(ToolshareError::InvalidCoordinate(format!(
                "latitude {} is outside [-90, 90]",
                latitude
            )));
        }
        if !longitude.is_finite() || !(-180.0..=180.0).contains(&longitude) {
            return Err(ToolshareError::InvalidCoordinate(format!(
                "longitude {} is outside [-180, 180]",
                longitude
            )));
        }
        Ok(Self { latitude, longitude })
    }

    /// Parse textual latitude/longitude (form fields, CLI arguments)
    pub fn parse(latitude: &str, longitude: &str) -> Result<Self> {
        let lat = parse_degrees(latitude, "latitude")?;
        let lon = parse_degrees(longitude, "longitude")?;
        Self::new(lat, lon)
    }

    /// Like [`Coordinate::new`] but returns None instead of an error
    pub fn checked(latitude: f64, longitude: f64) -> Option<Self> {
        Self::new(latitude, longitude).ok()
    }

    /// Great-circle distance to another point
    pub fn distance_to(&self, other: &Coordinate) -> Distance {
        Distance::from_km(haversine_km(*self, *other))
    }
}

impl fmt::Display for Coordinate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}, {}", self.latitude, self.longitude)
    }
}

fn parse_degrees(text: &str, field: &str) -> Result<f64> {
    text.trim()
        .parse::<f64>()
        .map_err(|_| ToolshareError::InvalidCoordinate(format!("{} '{}' is not a number", field, text)))
}

/// Haversine great-circle distance between two points, in kilometres
pub fn haversine_km(a: Coordinate, b: Coordinate) -> f64 {
    let lat1 = a.latitude.to_radians();
    let lat2 = b.latitude.to_radians();
    let d_lat = (b.latitude - a.latitude).to_radians();
    let d_lon = (b.longitude - a.longitude).to_radians();

    let h = (d_lat / 2.0).sin().powi(2) + lat1.cos() * lat2.cos() * (d_lon / 2.0).sin().powi(2);
    let c = 2.0 * h.sqrt().atan2((1.0 - h).sqrt());

    EARTH_RADIUS_KM * c
}

/// A computed distance in kilometres
///
/// Displays with two decimal places, which is also the precision used when
/// comparing against a radius.
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd)]
pub struct Distance(f64);

impl Distance {
    pub fn from_km(km: f64) -> Self {
        Self(km)
    }

    /// Raw kilometres
    pub fn km(&self) -> f64 {
        self.0
    }

    /// Kilometres rounded to two decimals
    pub fn rounded_km(&self) -> f64 {
        (self.0 * 100.0).round() / 100.0
    }
}

impl fmt::Display for Distance {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:.2}", self.0)
    }
}
