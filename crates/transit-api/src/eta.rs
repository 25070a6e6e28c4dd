use realtime::{Config, HttpRequest, Identity};
use serde::Deserialize;
use tracking::{Clock, Destination, EtaEstimate, FetchError, VehicleId};

use crate::client;

/// Estimates distance and travel time from a vehicle's latest position to
/// `destination`.
///
/// The estimate is stamped with the provider's clock.
///
/// # Errors
///
/// Returns [`FetchError::NotFound`] when the backend has no position to
/// compute from, [`FetchError::Transient`] on transport or server failure
/// and [`FetchError::Malformed`] for negative or undecodable values.
pub async fn eta<P>(
    vehicle_id: &VehicleId, destination: &Destination, provider: &P,
) -> Result<EtaEstimate, FetchError>
where
    P: Config + HttpRequest + Identity + Clock,
{
    let path = format!(
        "/api/locations/{}/eta?lat={}&lng={}",
        urlencoding::encode(vehicle_id.as_str()),
        destination.latitude(),
        destination.longitude()
    );
    let Some(body) = client::get(provider, &path).await? else {
        return Err(FetchError::NotFound);
    };

    let record: EtaRecord = client::decode(&body)?;
    let estimate = EtaEstimate::new(
        vehicle_id.clone(),
        destination.clone(),
        record.distance_meters,
        record.duration_seconds,
        provider.now(),
    )?;
    Ok(estimate)
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct EtaRecord {
    distance_meters: f64,
    duration_seconds: f64,
}
