//! # Staleness
//!
//! Classifies a position as fresh or stale relative to a point in time.

use std::time::Duration;

use chrono::{DateTime, TimeDelta, Utc};
use serde::Serialize;

use crate::geo::Position;

/// Default staleness window: one 30s poll interval plus latency margin, so a
/// single missed poll does not flag the vehicle as stale.
pub const DEFAULT_FRESH_WINDOW: Duration = Duration::from_secs(45);

/// Whether a position is still current.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Freshness {
    Fresh,
    Stale,
}

impl Freshness {
    #[must_use]
    pub const fn is_fresh(self) -> bool {
        matches!(self, Self::Fresh)
    }
}

/// Classify `position` at `now`.
///
/// Fresh iff `now - observed_at <= fresh_window`. The boundary is inclusive.
/// Readings stamped in the future (source clock ahead of ours) are fresh.
#[must_use]
pub fn classify(position: &Position, now: DateTime<Utc>, fresh_window: Duration) -> Freshness {
    let window = TimeDelta::from_std(fresh_window).unwrap_or(TimeDelta::MAX);
    if age(position, now) <= window { Freshness::Fresh } else { Freshness::Stale }
}

/// Age of `position` at `now`; negative when stamped in the future.
#[must_use]
pub fn age(position: &Position, now: DateTime<Utc>) -> TimeDelta {
    now.signed_duration_since(position.observed_at())
}

/// Time left before `position` turns stale; zero once it has.
#[must_use]
pub fn remaining(position: &Position, now: DateTime<Utc>, fresh_window: Duration) -> Duration {
    let window = TimeDelta::from_std(fresh_window).unwrap_or(TimeDelta::MAX);
    window
        .checked_sub(&age(position, now))
        .map_or(Duration::MAX, |left| left.to_std().unwrap_or(Duration::ZERO))
}
