//! # Tracking Session
//!
//! A [`Tracker`] owns at most one poll loop. Every [`Tracker::select`] tears
//! the previous loop down and bumps the session epoch; every response handler
//! re-checks its epoch under the control lock before touching state, so a
//! response to a superseded request can never overwrite newer state.
//!
//! ```text
//!           select(v)               Position (fresh)
//!   Idle ─────────────▶ Polling ◀──────────────────▶ Stalled
//!     │                   │      NotFound / stale         │
//!     │ stop()            │ stop()                 stop() │
//!     └───────────────▶ Stopped ◀─────────────────────────┘
//! ```
//!
//! The loop issues its first fetch immediately, then one per poll interval.
//! Fetches never overlap: the next tick is not awaited until the current
//! fetch (and any ETA it triggers) has finished, and ticks missed meanwhile
//! are skipped. Between ticks the loop also wakes when the latest position
//! ages past the staleness window, so status never reads `Polling` for a
//! reading that has gone stale.

use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;

use chrono::{DateTime, Utc};
use serde::Serialize;
use tokio::sync::{Notify, watch};
use tokio::time::{self, Instant, MissedTickBehavior};
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info, warn};

use crate::config::TrackingConfig;
use crate::error::{FetchError, Operation, SessionError, ValidationError};
use crate::eta::EtaEstimate;
use crate::geo::{Destination, Position, VehicleId};
use crate::provider::{Notice, Provider};
use crate::staleness::{self, Freshness};

/// Lifecycle status of the tracked vehicle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Status {
    /// No vehicle selected yet.
    Idle,

    /// A vehicle is selected and its latest position is current.
    Polling,

    /// A vehicle is selected but there is no current position ("no signal").
    /// The loop keeps running.
    Stalled,

    /// Tracking was stopped and all session state discarded.
    Stopped,
}

/// Immutable view of a tracking session.
///
/// Snapshots are replaced wholesale on every change, so readers never see a
/// half-applied update.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TrackingSnapshot {
    pub epoch: u64,
    pub status: Status,
    pub vehicle_id: Option<VehicleId>,
    pub destination: Option<Destination>,
    pub latest_position: Option<Position>,
    pub freshness: Option<Freshness>,
    pub latest_eta: Option<EtaEstimate>,
    pub last_error: Option<SessionError>,
}

impl TrackingSnapshot {
    const fn empty(epoch: u64, status: Status) -> Self {
        Self {
            epoch,
            status,
            vehicle_id: None,
            destination: None,
            latest_position: None,
            freshness: None,
            latest_eta: None,
            last_error: None,
        }
    }
}

/// Watches one vehicle at a time.
///
/// Dropping the tracker cancels its poll loop.
pub struct Tracker<P: Provider + 'static> {
    shared: Arc<Shared<P>>,
}

impl<P: Provider + 'static> Tracker<P> {
    /// Create an idle tracker.
    #[must_use]
    pub fn new(provider: Arc<P>, config: TrackingConfig) -> Self {
        let (snapshot, _) = watch::channel(Arc::new(TrackingSnapshot::empty(0, Status::Idle)));
        let shared = Shared { provider, config, control: Mutex::new(Control::default()), snapshot };
        Self { shared: Arc::new(shared) }
    }

    /// Current session state.
    #[must_use]
    pub fn snapshot(&self) -> Arc<TrackingSnapshot> {
        self.shared.current()
    }

    /// Receive every snapshot as it is published.
    #[must_use]
    pub fn subscribe(&self) -> watch::Receiver<Arc<TrackingSnapshot>> {
        self.shared.snapshot.subscribe()
    }

    /// Start tracking `vehicle_id`, tearing down any running session first.
    ///
    /// Position, ETA and error are reset; the destination carries over. The
    /// first fetch is issued without delay.
    ///
    /// # Panics
    ///
    /// Panics when called outside a Tokio runtime.
    pub fn select(&self, vehicle_id: impl Into<VehicleId>) {
        let vehicle_id = vehicle_id.into();

        let mut control = self.shared.control();
        control.teardown();
        control.epoch += 1;

        let session = PollSession::new(control.epoch, vehicle_id.clone());
        control.poll = Some(session.handle());

        let next = TrackingSnapshot {
            vehicle_id: Some(vehicle_id.clone()),
            destination: control.destination.clone(),
            ..TrackingSnapshot::empty(control.epoch, Status::Polling)
        };
        self.shared.snapshot.send_replace(Arc::new(next));
        drop(control);

        info!(vehicle = %vehicle_id, epoch = session.epoch, "tracking started");
        self.shared.provider.notify(Notice::info(&vehicle_id, format!("Tracking {vehicle_id}")));

        tokio::spawn(run(Arc::clone(&self.shared), session));
    }

    /// Replace the destination, or clear it with `None`.
    ///
    /// Any change drops the current ETA, which was computed for the old
    /// destination. When a loop is running and the latest position is fresh,
    /// a new ETA is computed straight away. The poll loop is not restarted.
    pub fn set_destination(&self, destination: Option<Destination>) {
        let mut control = self.shared.control();
        if control.destination == destination {
            return;
        }
        control.destination.clone_from(&destination);
        control.destination_rev += 1;

        let current = self.shared.current();
        let next = TrackingSnapshot {
            destination: destination.clone(),
            latest_eta: None,
            ..(*current).clone()
        };
        self.shared.snapshot.send_replace(Arc::new(next));

        if destination.is_some()
            && let Some(poll) = &control.poll
        {
            poll.nudge.notify_one();
        }
        drop(control);

        debug!(
            vehicle = ?current.vehicle_id,
            destination = ?destination,
            "destination changed"
        );
    }

    /// Stop tracking and discard all session state. Calling it again is a
    /// no-op.
    pub fn stop(&self) {
        let mut control = self.shared.control();
        let current = self.shared.current();
        if current.status == Status::Stopped {
            return;
        }

        control.teardown();
        control.epoch += 1;
        control.destination = None;
        control.destination_rev += 1;

        let next = TrackingSnapshot::empty(control.epoch, Status::Stopped);
        self.shared.snapshot.send_replace(Arc::new(next));
        drop(control);

        info!(vehicle = ?current.vehicle_id, "tracking stopped");
    }
}

impl<P: Provider + 'static> Drop for Tracker<P> {
    fn drop(&mut self) {
        self.shared.control().teardown();
    }
}

struct Shared<P> {
    provider: Arc<P>,
    config: TrackingConfig,
    control: Mutex<Control>,
    snapshot: watch::Sender<Arc<TrackingSnapshot>>,
}

#[derive(Default)]
struct Control {
    epoch: u64,
    destination_rev: u64,
    destination: Option<Destination>,
    poll: Option<PollHandle>,
}

impl Control {
    fn teardown(&mut self) {
        if let Some(poll) = self.poll.take() {
            poll.cancel.cancel();
        }
    }
}

struct PollHandle {
    cancel: CancellationToken,
    nudge: Arc<Notify>,
}

// Everything one loop needs to know about the session it belongs to.
struct PollSession {
    epoch: u64,
    vehicle_id: VehicleId,
    cancel: CancellationToken,
    nudge: Arc<Notify>,
}

impl PollSession {
    fn new(epoch: u64, vehicle_id: VehicleId) -> Self {
        Self { epoch, vehicle_id, cancel: CancellationToken::new(), nudge: Arc::new(Notify::new()) }
    }

    fn handle(&self) -> PollHandle {
        PollHandle { cancel: self.cancel.clone(), nudge: Arc::clone(&self.nudge) }
    }
}

struct EtaRequest {
    destination: Destination,
    destination_rev: u64,
    observed_at: DateTime<Utc>,
}

impl EtaRequest {
    const fn key(&self) -> (u64, DateTime<Utc>) {
        (self.destination_rev, self.observed_at)
    }
}

// Loop-local bookkeeping carried between units of work.
#[derive(Default)]
struct Progress {
    // destination revision and position timestamp of the last ETA issued
    last_eta: Option<(u64, DateTime<Utc>)>,
    // when the latest fresh position turns stale
    expiry: Option<Instant>,
}

enum Work {
    Poll,
    Eta,
    Expire,
}

async fn run<P: Provider + 'static>(shared: Arc<Shared<P>>, session: PollSession) {
    debug!(vehicle = %session.vehicle_id, epoch = session.epoch, "poll loop started");

    // `interval` panics on a zero period
    let period = shared.config.poll_interval.max(Duration::from_millis(1));
    let mut interval = time::interval(period);
    interval.set_missed_tick_behavior(MissedTickBehavior::Skip);

    let mut progress = Progress::default();

    loop {
        let deadline = progress.expiry.unwrap_or_else(Instant::now);
        let work = tokio::select! {
            biased;
            () = session.cancel.cancelled() => break,
            _ = interval.tick() => Work::Poll,
            () = session.nudge.notified() => Work::Eta,
            () = time::sleep_until(deadline), if progress.expiry.is_some() => Work::Expire,
        };

        // dropping the in-flight request is how a fetch gets cancelled
        tokio::select! {
            biased;
            () = session.cancel.cancelled() => break,
            () = shared.perform(&session, work, &mut progress) => {}
        }
    }

    debug!(vehicle = %session.vehicle_id, epoch = session.epoch, "poll loop stopped");
}

impl<P: Provider> Shared<P> {
    fn control(&self) -> MutexGuard<'_, Control> {
        self.control.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn current(&self) -> Arc<TrackingSnapshot> {
        Arc::clone(&*self.snapshot.borrow())
    }

    async fn perform(&self, session: &PollSession, work: Work, progress: &mut Progress) {
        let request = match work {
            Work::Poll => {
                let result = self.provider.fetch_latest(&session.vehicle_id).await;
                self.apply_position(session, result)
            }
            // a poll that landed since the nudge may already have issued it
            Work::Eta => {
                self.eta_request(session).filter(|request| progress.last_eta != Some(request.key()))
            }
            Work::Expire => {
                self.expire(session);
                None
            }
        };

        if let Some(request) = request {
            progress.last_eta = Some(request.key());
            let result = self.provider.compute_eta(&session.vehicle_id, &request.destination).await;
            self.apply_eta(session, &request, result);
        }

        progress.expiry = self.expiry();
    }

    fn apply_position(
        &self, session: &PollSession, result: Result<Position, FetchError>,
    ) -> Option<EtaRequest> {
        let control = self.control();
        if control.epoch != session.epoch {
            debug!(
                vehicle = %session.vehicle_id,
                epoch = session.epoch,
                current_epoch = control.epoch,
                "discarding superseded position response"
            );
            return None;
        }

        let now = self.provider.now();
        let window = self.config.fresh_window;
        let current = self.current();
        let mut next = (*current).clone();
        let mut request = None;

        match result.and_then(|position| same_vehicle(&session.vehicle_id, position)) {
            Ok(position) => {
                let freshness = staleness::classify(&position, now, window);
                debug!(
                    monotonic_counter.positions_applied = 1,
                    gauge.position_age_secs = staleness::age(&position, now).num_seconds(),
                    vehicle = %session.vehicle_id,
                    ?freshness,
                    "position received"
                );

                if freshness.is_fresh()
                    && let Some(destination) = &control.destination
                {
                    request = Some(EtaRequest {
                        destination: destination.clone(),
                        destination_rev: control.destination_rev,
                        observed_at: position.observed_at(),
                    });
                }

                next.status = if freshness.is_fresh() { Status::Polling } else { Status::Stalled };
                next.freshness = Some(freshness);
                next.latest_position = Some(position);
                next.last_error = None;
            }
            Err(FetchError::NotFound) => {
                debug!(vehicle = %session.vehicle_id, "no position recorded");
                next.status = Status::Stalled;
                next.freshness = freshness_of(next.latest_position.as_ref(), now, window);
            }
            Err(err) => {
                log_failure(Operation::Position, &session.vehicle_id, &err);
                // only the staleness window downgrades status, never a failure
                next.freshness = freshness_of(next.latest_position.as_ref(), now, window);
                if next.freshness == Some(Freshness::Stale) {
                    next.status = Status::Stalled;
                }
                next.last_error = Some(SessionError::new(Operation::Position, err, now));
            }
        }

        let notice = transition(&current, &next);
        self.snapshot.send_replace(Arc::new(next));
        drop(control);

        if let Some(notice) = notice {
            self.provider.notify(notice);
        }
        request
    }

    fn eta_request(&self, session: &PollSession) -> Option<EtaRequest> {
        let control = self.control();
        if control.epoch != session.epoch {
            return None;
        }
        let destination = control.destination.clone()?;

        let current = self.current();
        let position = current.latest_position.as_ref()?;
        let freshness = staleness::classify(position, self.provider.now(), self.config.fresh_window);
        if !freshness.is_fresh() {
            debug!(vehicle = %session.vehicle_id, "position stale, waiting for a fresh one");
            return None;
        }

        Some(EtaRequest {
            destination,
            destination_rev: control.destination_rev,
            observed_at: position.observed_at(),
        })
    }

    fn expire(&self, session: &PollSession) {
        let control = self.control();
        if control.epoch != session.epoch {
            return;
        }

        let current = self.current();
        let now = self.provider.now();
        let freshness = freshness_of(current.latest_position.as_ref(), now, self.config.fresh_window);
        if freshness != Some(Freshness::Stale) || current.freshness == freshness {
            return;
        }
        debug!(vehicle = %session.vehicle_id, "position aged out");

        let next = TrackingSnapshot { status: Status::Stalled, freshness, ..(*current).clone() };
        let notice = transition(&current, &next);
        self.snapshot.send_replace(Arc::new(next));
        drop(control);

        if let Some(notice) = notice {
            self.provider.notify(notice);
        }
    }

    // Instant the latest position turns stale, while it is still fresh.
    fn expiry(&self) -> Option<Instant> {
        let current = self.current();
        let position = current.latest_position.as_ref()?;
        if current.freshness != Some(Freshness::Fresh) {
            return None;
        }
        let left = staleness::remaining(position, self.provider.now(), self.config.fresh_window);
        Instant::now().checked_add(left.saturating_add(Duration::from_millis(1)))
    }

    fn apply_eta(
        &self, session: &PollSession, request: &EtaRequest, result: Result<EtaEstimate, FetchError>,
    ) {
        let control = self.control();
        if control.epoch != session.epoch || control.destination_rev != request.destination_rev {
            debug!(
                vehicle = %session.vehicle_id,
                epoch = session.epoch,
                "discarding superseded eta response"
            );
            return;
        }

        let now = self.provider.now();
        let mut next = (*self.current()).clone();

        match result.and_then(|eta| same_eta_vehicle(&session.vehicle_id, eta)) {
            Ok(eta) => {
                debug!(
                    vehicle = %session.vehicle_id,
                    distance_meters = eta.distance_meters(),
                    duration_seconds = eta.duration_seconds(),
                    "eta received"
                );
                next.latest_eta = Some(eta);
                next.last_error = None;
            }
            Err(err) => {
                // keep showing the last good estimate
                log_failure(Operation::Eta, &session.vehicle_id, &err);
                next.last_error = Some(SessionError::new(Operation::Eta, err, now));
            }
        }

        self.snapshot.send_replace(Arc::new(next));
    }
}

fn same_vehicle(expected: &VehicleId, position: Position) -> Result<Position, FetchError> {
    if position.vehicle_id() == expected {
        return Ok(position);
    }
    Err(ValidationError::VehicleMismatch {
        expected: expected.clone(),
        actual: position.vehicle_id().clone(),
    }
    .into())
}

fn same_eta_vehicle(expected: &VehicleId, eta: EtaEstimate) -> Result<EtaEstimate, FetchError> {
    if eta.vehicle_id() == expected {
        return Ok(eta);
    }
    Err(ValidationError::VehicleMismatch {
        expected: expected.clone(),
        actual: eta.vehicle_id().clone(),
    }
    .into())
}

fn freshness_of(
    position: Option<&Position>, now: DateTime<Utc>, window: Duration,
) -> Option<Freshness> {
    position.map(|position| staleness::classify(position, now, window))
}

fn transition(current: &TrackingSnapshot, next: &TrackingSnapshot) -> Option<Notice> {
    if current.status == next.status {
        return None;
    }
    let vehicle_id = next.vehicle_id.as_ref()?;
    info!(vehicle = %vehicle_id, from = ?current.status, to = ?next.status, "status changed");

    match (current.status, next.status) {
        (_, Status::Stalled) => {
            Some(Notice::warning(vehicle_id, format!("No signal from {vehicle_id}")))
        }
        (Status::Stalled, Status::Polling) => {
            Some(Notice::info(vehicle_id, format!("Signal restored for {vehicle_id}")))
        }
        _ => None,
    }
}

fn log_failure(operation: Operation, vehicle_id: &VehicleId, err: &FetchError) {
    match err {
        FetchError::NotFound => {
            debug!(vehicle = %vehicle_id, ?operation, "nothing to report");
        }
        FetchError::Transient(_) => {
            warn!(
                monotonic_counter.tracking_transient_errors = 1,
                vehicle = %vehicle_id,
                code = err.code(),
                ?operation,
                error = %err,
                "fetch failed, retrying next tick"
            );
        }
        FetchError::Malformed(_) => {
            error!(
                monotonic_counter.tracking_contract_violations = 1,
                vehicle = %vehicle_id,
                code = err.code(),
                ?operation,
                error = %err,
                "backend returned malformed data"
            );
        }
    }
}
