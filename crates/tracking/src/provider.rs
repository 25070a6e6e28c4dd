//! # Provider
//!
//! Provider defines the external collaborators a [`Tracker`](crate::Tracker)
//! depends on. The host implements all of them on one type.

use std::fmt::{Display, Formatter};

use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::error::FetchError;
use crate::eta::EtaEstimate;
use crate::geo::{Destination, Position, VehicleId};

/// Provider entry point implemented by the host application.
pub trait Provider: PositionSource + EtaSource + Clock + Notifier {}

impl<T> Provider for T where T: PositionSource + EtaSource + Clock + Notifier {}

/// The `PositionSource` trait fetches the latest known position of a vehicle.
///
/// Calls must be idempotent and side effect free, and must complete within a
/// bounded time or fail with [`FetchError::Transient`].
pub trait PositionSource: Send + Sync {
    /// Most recent recorded position, or [`FetchError::NotFound`] when the
    /// backend has never seen the vehicle.
    fn fetch_latest(
        &self, vehicle_id: &VehicleId,
    ) -> impl Future<Output = Result<Position, FetchError>> + Send;
}

/// The `EtaSource` trait estimates travel from a vehicle to a destination.
pub trait EtaSource: Send + Sync {
    /// Estimate arrival, or [`FetchError::NotFound`] when there is no
    /// position to compute from.
    fn compute_eta(
        &self, vehicle_id: &VehicleId, destination: &Destination,
    ) -> impl Future<Output = Result<EtaEstimate, FetchError>> + Send;
}

/// The `Clock` trait supplies the current time used for staleness checks.
pub trait Clock: Send + Sync {
    fn now(&self) -> DateTime<Utc>;
}

/// The `Notifier` trait receives user facing notices.
///
/// Notices are edge triggered (tracking started, signal lost, signal
/// restored). Implementations must return promptly.
pub trait Notifier: Send + Sync {
    fn notify(&self, notice: Notice);
}

/// Wall clock time.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}

/// Discards every notice.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoopNotifier;

impl Notifier for NoopNotifier {
    fn notify(&self, _: Notice) {}
}

/// Severity of a [`Notice`]. Never blocking: there is no error level.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Level {
    Info,
    Warning,
}

/// A short message for the user.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Notice {
    pub level: Level,
    pub vehicle_id: VehicleId,
    pub message: String,
}

impl Notice {
    #[must_use]
    pub fn info(vehicle_id: &VehicleId, message: impl Into<String>) -> Self {
        Self { level: Level::Info, vehicle_id: vehicle_id.clone(), message: message.into() }
    }

    #[must_use]
    pub fn warning(vehicle_id: &VehicleId, message: impl Into<String>) -> Self {
        Self { level: Level::Warning, vehicle_id: vehicle_id.clone(), message: message.into() }
    }
}

impl Display for Notice {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.message)
    }
}
