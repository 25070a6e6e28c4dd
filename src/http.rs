use std::sync::Arc;

use axum::extract::{Path, State};
use axum::routing::{get, put};
use axum::{Json, Router};
use bytes::Bytes;
use realtime::{HttpError, bad_request};
use tracking::{Destination, Provider, Tracker, TrackingSnapshot};

type HttpResult<T> = Result<T, HttpError>;

/// Presentation routes over a shared tracker.
pub fn router<P: Provider + 'static>(tracker: Arc<Tracker<P>>) -> Router {
    Router::new()
        .route("/health", get(health))
        .route("/tracking", get(snapshot::<P>).delete(stop::<P>))
        .route("/tracking/vehicle/{vehicle_id}", put(select::<P>))
        .route("/tracking/destination", put(destination::<P>))
        .with_state(tracker)
}

async fn health() -> &'static str {
    "ok"
}

async fn snapshot<P: Provider + 'static>(
    State(tracker): State<Arc<Tracker<P>>>,
) -> Json<TrackingSnapshot> {
    Json(current(&tracker))
}

async fn select<P: Provider + 'static>(
    State(tracker): State<Arc<Tracker<P>>>, Path(vehicle_id): Path<String>,
) -> HttpResult<Json<TrackingSnapshot>> {
    let vehicle_id = vehicle_id.trim();
    if vehicle_id.is_empty() {
        return Err(bad_request!("vehicle id is empty").into());
    }

    tracker.select(vehicle_id);
    Ok(Json(current(&tracker)))
}

// Parsed by hand so invalid coordinates are a 400 rather than axum's 422.
async fn destination<P: Provider + 'static>(
    State(tracker): State<Arc<Tracker<P>>>, body: Bytes,
) -> HttpResult<Json<TrackingSnapshot>> {
    let destination = serde_json::from_slice::<Option<Destination>>(&body)
        .map_err(realtime::Error::from)?;

    tracker.set_destination(destination);
    Ok(Json(current(&tracker)))
}

async fn stop<P: Provider + 'static>(
    State(tracker): State<Arc<Tracker<P>>>,
) -> Json<TrackingSnapshot> {
    tracker.stop();
    Json(current(&tracker))
}

fn current<P: Provider + 'static>(tracker: &Tracker<P>) -> TrackingSnapshot {
    TrackingSnapshot::clone(&tracker.snapshot())
}
