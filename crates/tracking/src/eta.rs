use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::error::ValidationError;
use crate::geo::{Destination, VehicleId};

/// Distance and travel time from a vehicle to a destination.
///
/// Estimates are derived data: they live only as long as the session that
/// requested them and are superseded by the next estimate.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct EtaEstimate {
    vehicle_id: VehicleId,
    destination: Destination,
    distance_meters: f64,
    duration_seconds: f64,
    computed_at: DateTime<Utc>,
}

impl EtaEstimate {
    /// Create an estimate.
    ///
    /// # Errors
    ///
    /// Returns [`ValidationError::Distance`] or [`ValidationError::Duration`]
    /// when either value is negative or not finite.
    pub fn new(
        vehicle_id: impl Into<VehicleId>, destination: Destination, distance_meters: f64,
        duration_seconds: f64, computed_at: DateTime<Utc>,
    ) -> Result<Self, ValidationError> {
        if !distance_meters.is_finite() || distance_meters < 0.0 {
            return Err(ValidationError::Distance(distance_meters));
        }
        if !duration_seconds.is_finite() || duration_seconds < 0.0 {
            return Err(ValidationError::Duration(duration_seconds));
        }

        Ok(Self {
            vehicle_id: vehicle_id.into(),
            destination,
            distance_meters,
            duration_seconds,
            computed_at,
        })
    }

    #[must_use]
    pub const fn vehicle_id(&self) -> &VehicleId {
        &self.vehicle_id
    }

    #[must_use]
    pub const fn destination(&self) -> &Destination {
        &self.destination
    }

    #[must_use]
    pub const fn distance_meters(&self) -> f64 {
        self.distance_meters
    }

    #[must_use]
    pub const fn duration_seconds(&self) -> f64 {
        self.duration_seconds
    }

    #[must_use]
    pub const fn computed_at(&self) -> DateTime<Utc> {
        self.computed_at
    }
}
