//! Geographic helpers - great-circle distance and nearby-tool filtering
//!
//! This module provides:
//! - Coordinate validation and parsing
//! - Haversine distance in kilometres
//! - Radius filtering with distance annotation

pub mod distance;
pub mod nearby;

pub use distance::{Coordinate, Distance, EARTH_RADIUS_KM, haversine_km};
pub use nearby::{DEFAULT_RADIUS_KM, Radius, annotate_nearby};
