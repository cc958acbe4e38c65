//! Nearby-tool filtering
//!
//! Annotates each tool with its distance from an origin and optionally drops
//! tools outside a radius. Tools without a usable position are always
//! excluded, so a malformed record can never leak a NaN distance.

use std::fmt;

use log::debug;

use super::distance::Coordinate;
use crate::domain::Tool;
use crate::error::{Result, ToolshareError};

/// Radius applied when none is configured
pub const DEFAULT_RADIUS_KM: f64 = 10.0;

/// How far from the origin a tool may be
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Radius {
    /// Keep tools whose two-decimal distance is at most this many km
    Within(f64),
    /// Keep every positioned tool, annotated only
    Unbounded,
}

impl Radius {
    /// `Some(km)` -> `Within(km)`, `None` -> `Unbounded`
    pub fn from_km(km: Option<f64>) -> Self {
        km.map_or(Radius::Unbounded, Radius::Within)
    }

    /// Checked `Within`, for radii typed in by a user
    pub fn within(km: f64) -> Result<Self> {
        if !km.is_finite() || km < 0.0 {
            return Err(ToolshareError::InvalidInput(format!(
                "radius must be a non-negative number of km, got {}",
                km
            )));
        }
        Ok(Radius::Within(km))
    }

    fn admits(&self, rounded_km: f64) -> bool {
        match self {
            Radius::Within(limit) => rounded_km <= *limit,
            Radius::Unbounded => true,
        }
    }
}

impl Default for Radius {
    fn default() -> Self {
        Radius::Within(DEFAULT_RADIUS_KM)
    }
}

impl fmt::Display for Radius {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Radius::Within(km) => write!(f, "{} km", km),
            Radius::Unbounded => write!(f, "unbounded"),
        }
    }
}

/// Annotate `tools` with their distance from `origin` and keep those inside
/// `radius`, preserving input order.
pub fn annotate_nearby(origin: Coordinate, tools: impl IntoIterator<Item = Tool>, radius: Radius) -> Vec<Tool> {
    let mut skipped = 0usize;
    let nearby: Vec<Tool> = tools
        .into_iter()
        .filter_map(|mut tool| {
            let Some(position) = tool.position() else {
                skipped += 1;
                return None;
            };
            let distance = origin.distance_to(&position);
            if !radius.admits(distance.rounded_km()) {
                return None;
            }
            tool.distance = Some(distance);
            Some(tool)
        })
        .collect();

    if skipped > 0 {
        debug!("Skipped {} tools without a usable position", skipped);
    }
    debug!("{} tools within {} of {}", nearby.len(), radius, origin);
    nearby
}
