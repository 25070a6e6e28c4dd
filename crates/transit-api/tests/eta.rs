mod provider;

use pretty_assertions::assert_eq;
use tracking::{Destination, EtaEstimate, FetchError, VehicleId};
use transit_api::eta;

use self::provider::MockProvider;

const ETA: &str = "/api/locations/B1/eta?lat=-36.852&lng=174.769";

fn library() -> Destination {
    Destination::new(-36.852, 174.769).unwrap().with_label("Library")
}

#[tokio::test]
async fn estimate() {
    let provider =
        MockProvider::new().respond(ETA, 200, r#"{"distanceMeters": 850.5, "durationSeconds": 180}"#);

    let estimate = eta(&VehicleId::from("B1"), &library(), &provider).await.unwrap();
    assert_eq!(
        estimate,
        EtaEstimate::new("B1", library(), 850.5, 180.0, MockProvider::t0()).unwrap()
    );
    assert_eq!(provider.requests()[0].path_and_query, ETA);
}

#[tokio::test]
async fn no_position_to_compute_from() {
    let provider = MockProvider::new().respond(ETA, 404, "");

    let result = eta(&VehicleId::from("B1"), &library(), &provider).await;
    assert_eq!(result, Err(FetchError::NotFound));
}

#[tokio::test]
async fn negative_duration_is_malformed() {
    let provider =
        MockProvider::new().respond(ETA, 200, r#"{"distanceMeters": 10, "durationSeconds": -3}"#);

    let err = eta(&VehicleId::from("B1"), &library(), &provider).await.unwrap_err();
    assert!(matches!(err, FetchError::Malformed(_)));
}

#[tokio::test]
async fn throttled_is_transient() {
    let provider = MockProvider::new().respond(ETA, 429, "slow down");

    let err = eta(&VehicleId::from("B1"), &library(), &provider).await.unwrap_err();
    assert!(err.is_retryable());
    assert_eq!(err.code(), "transient");
}
