use chrono::{DateTime, Utc};
use realtime::{Config, HttpRequest, Identity};
use serde::Deserialize;
use tracking::{FetchError, Position, VehicleId};

use crate::client;

/// Retrieves the most recent recorded position of a vehicle.
///
/// # Errors
///
/// Returns [`FetchError::NotFound`] when the backend has never seen the
/// vehicle, [`FetchError::Transient`] on transport or server failure and
/// [`FetchError::Malformed`] when the reading is undecodable or out of range.
pub async fn latest_position<P>(
    vehicle_id: &VehicleId, provider: &P,
) -> Result<Position, FetchError>
where
    P: Config + HttpRequest + Identity,
{
    let path = format!("/api/locations/{}/latest", urlencoding::encode(vehicle_id.as_str()));
    let Some(body) = client::get(provider, &path).await? else {
        return Err(FetchError::NotFound);
    };

    let record: LocationRecord = client::decode(&body)?;
    let position =
        Position::new(vehicle_id.clone(), record.latitude, record.longitude, record.timestamp)?;
    Ok(position)
}

#[derive(Debug, Deserialize)]
struct LocationRecord {
    latitude: f64,
    longitude: f64,
    timestamp: DateTime<Utc>,
}
