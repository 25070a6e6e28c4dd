#![allow(missing_docs)]

use chrono::{DateTime, Utc};
use tracking::{
    Clock, Destination, EtaEstimate, EtaSource, FetchError, NoopNotifier, Notice, Notifier,
    Position, PositionSource, SystemClock, VehicleId,
};

/// Backend that never answers, so every session stays exactly as the
/// commands left it.
#[derive(Default)]
pub struct MockProvider;

impl PositionSource for MockProvider {
    async fn fetch_latest(&self, _: &VehicleId) -> Result<Position, FetchError> {
        std::future::pending().await
    }
}

impl EtaSource for MockProvider {
    async fn compute_eta(&self, _: &VehicleId, _: &Destination) -> Result<EtaEstimate, FetchError> {
        std::future::pending().await
    }
}

impl Clock for MockProvider {
    fn now(&self) -> DateTime<Utc> {
        SystemClock.now()
    }
}

impl Notifier for MockProvider {
    fn notify(&self, notice: Notice) {
        NoopNotifier.notify(notice);
    }
}
