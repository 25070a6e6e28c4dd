//! # Tracking
//!
//! Live vehicle tracking and arrival estimation.
//!
//! A [`Tracker`] watches one selected vehicle at a time. It polls the
//! vehicle's latest position on a fixed interval, classifies the position as
//! fresh or stale, and keeps an ETA to the chosen destination up to date.
//! Callers observe the tracker only through immutable [`TrackingSnapshot`]s and
//! drive it with three commands: [`Tracker::select`],
//! [`Tracker::set_destination`] and [`Tracker::stop`].

mod config;
mod error;
mod eta;
mod geo;
mod session;

pub mod provider;
pub mod staleness;

pub use self::config::TrackingConfig;
pub use self::error::{FetchError, Operation, SessionError, ValidationError};
pub use self::eta::EtaEstimate;
pub use self::geo::{Destination, Position, VehicleId};
pub use self::provider::{
    Clock, EtaSource, Level, NoopNotifier, Notice, Notifier, PositionSource, Provider, SystemClock,
};
pub use self::session::{Status, Tracker, TrackingSnapshot};
pub use self::staleness::Freshness;
