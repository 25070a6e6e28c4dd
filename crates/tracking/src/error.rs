use chrono::{DateTime, Utc};
use serde::Serialize;
use thiserror::Error;

use crate::geo::VehicleId;

/// A value that breaks the position, destination or estimate invariants.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ValidationError {
    #[error("latitude {0} outside [-90, 90]")]
    Latitude(f64),

    #[error("longitude {0} outside [-180, 180]")]
    Longitude(f64),

    #[error("distance {0}m is negative or not finite")]
    Distance(f64),

    #[error("duration {0}s is negative or not finite")]
    Duration(f64),

    #[error("reading for vehicle {actual} returned while tracking {expected}")]
    VehicleMismatch { expected: VehicleId, actual: VehicleId },
}

/// Outcome taxonomy shared by the position and ETA sources.
#[derive(Error, Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "code", content = "description", rename_all = "snake_case")]
pub enum FetchError {
    /// The backend has no data for the request. Expected, not alarming.
    #[error("code: not_found")]
    NotFound,

    /// Infrastructure failure (timeout, 5xx, connectivity). Safe to retry.
    #[error("code: transient, description: {0}")]
    Transient(String),

    /// The backend answered with data that breaks the contract. Retried like
    /// a transient failure but reported separately.
    #[error("code: malformed, description: {0}")]
    Malformed(String),
}

impl FetchError {
    /// Returns the error code.
    #[must_use]
    pub const fn code(&self) -> &str {
        match self {
            Self::NotFound => "not_found",
            Self::Transient(_) => "transient",
            Self::Malformed(_) => "malformed",
        }
    }

    /// Whether the next poll may succeed where this one failed.
    #[must_use]
    pub const fn is_retryable(&self) -> bool {
        matches!(self, Self::Transient(_) | Self::Malformed(_))
    }
}

impl From<ValidationError> for FetchError {
    fn from(err: ValidationError) -> Self {
        Self::Malformed(err.to_string())
    }
}

/// Which request produced a [`SessionError`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Operation {
    Position,
    Eta,
}

/// The most recent failure absorbed by a tracking session.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionError {
    pub operation: Operation,
    pub error: FetchError,
    pub occurred_at: DateTime<Utc>,
}

impl SessionError {
    #[must_use]
    pub const fn new(operation: Operation, error: FetchError, occurred_at: DateTime<Utc>) -> Self {
        Self { operation, error, occurred_at }
    }
}
