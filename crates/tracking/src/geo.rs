//! Position and destination value types.

use std::fmt::{Display, Formatter};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::ValidationError;

/// Opaque identifier of a tracked vehicle.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct VehicleId(String);

impl VehicleId {
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Display for VehicleId {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for VehicleId {
    fn from(id: &str) -> Self {
        Self(id.to_string())
    }
}

impl From<String> for VehicleId {
    fn from(id: String) -> Self {
        Self(id)
    }
}

/// A validated latitude/longitude pair in signed degrees.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GeoPoint {
    latitude: f64,
    longitude: f64,
}

impl GeoPoint {
    /// Create a point, rejecting coordinates outside the WGS84 ranges.
    ///
    /// Out-of-range values are never clamped. NaN and infinities fail the
    /// range check.
    ///
    /// # Errors
    ///
    /// Returns [`ValidationError::Latitude`] or [`ValidationError::Longitude`]
    /// for the first coordinate out of range.
    pub fn new(latitude: f64, longitude: f64) -> Result<Self, ValidationError> {
        if !(-90.0..=90.0).contains(&latitude) {
            return Err(ValidationError::Latitude(latitude));
        }
        if !(-180.0..=180.0).contains(&longitude) {
            return Err(ValidationError::Longitude(longitude));
        }
        Ok(Self { latitude, longitude })
    }

    #[must_use]
    pub const fn latitude(&self) -> f64 {
        self.latitude
    }

    #[must_use]
    pub const fn longitude(&self) -> f64 {
        self.longitude
    }
}

/// The most recent reported location of a vehicle.
///
/// `observed_at` is the time the source system recorded the reading, not the
/// time the client received it.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Position {
    vehicle_id: VehicleId,
    #[serde(flatten)]
    point: GeoPoint,
    observed_at: DateTime<Utc>,
}

impl Position {
    /// Create a position reading.
    ///
    /// # Errors
    ///
    /// Returns a [`ValidationError`] when the coordinates are out of range.
    pub fn new(
        vehicle_id: impl Into<VehicleId>, latitude: f64, longitude: f64,
        observed_at: DateTime<Utc>,
    ) -> Result<Self, ValidationError> {
        let point = GeoPoint::new(latitude, longitude)?;
        Ok(Self { vehicle_id: vehicle_id.into(), point, observed_at })
    }

    #[must_use]
    pub const fn vehicle_id(&self) -> &VehicleId {
        &self.vehicle_id
    }

    #[must_use]
    pub const fn latitude(&self) -> f64 {
        self.point.latitude
    }

    #[must_use]
    pub const fn longitude(&self) -> f64 {
        self.point.longitude
    }

    #[must_use]
    pub const fn observed_at(&self) -> DateTime<Utc> {
        self.observed_at
    }
}

/// Where the user wants to go.
///
/// Destinations are replaced wholesale, never edited in place.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", try_from = "RawDestination")]
pub struct Destination {
    #[serde(flatten)]
    point: GeoPoint,
    #[serde(skip_serializing_if = "Option::is_none")]
    label: Option<String>,
}

impl Destination {
    /// Create a destination.
    ///
    /// # Errors
    ///
    /// Returns a [`ValidationError`] when the coordinates are out of range.
    pub fn new(latitude: f64, longitude: f64) -> Result<Self, ValidationError> {
        Ok(Self { point: GeoPoint::new(latitude, longitude)?, label: None })
    }

    /// Attach a human readable label.
    #[must_use]
    pub fn with_label(mut self, label: impl Into<String>) -> Self {
        self.label = Some(label.into());
        self
    }

    #[must_use]
    pub const fn latitude(&self) -> f64 {
        self.point.latitude
    }

    #[must_use]
    pub const fn longitude(&self) -> f64 {
        self.point.longitude
    }

    #[must_use]
    pub fn label(&self) -> Option<&str> {
        self.label.as_deref()
    }
}

// Unvalidated wire form; deserialization goes through `Destination::new`.
#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawDestination {
    latitude: f64,
    longitude: f64,
    #[serde(default)]
    label: Option<String>,
}

impl TryFrom<RawDestination> for Destination {
    type Error = ValidationError;

    fn try_from(raw: RawDestination) -> Result<Self, Self::Error> {
        let destination = Self::new(raw.latitude, raw.longitude)?;
        Ok(match raw.label {
            Some(label) => destination.with_label(label),
            None => destination,
        })
    }
}
