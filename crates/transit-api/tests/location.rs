mod provider;

use chrono::TimeZone;
use chrono::Utc;
use pretty_assertions::assert_eq;
use tracking::{FetchError, Position, VehicleId};
use transit_api::latest_position;

use self::provider::{MockProvider, Recorded};

const LATEST: &str = "/api/locations/B1/latest";

#[tokio::test]
async fn latest() {
    let provider = MockProvider::new().respond(
        LATEST,
        200,
        r#"{"latitude": -36.85, "longitude": 174.76, "timestamp": "2026-03-01T08:30:00Z"}"#,
    );

    let position = latest_position(&VehicleId::from("B1"), &provider).await.unwrap();
    assert_eq!(position, Position::new("B1", -36.85, 174.76, MockProvider::t0()).unwrap());
    assert_eq!(
        provider.requests(),
        vec![Recorded {
            method: "GET".to_string(),
            path_and_query: LATEST.to_string(),
            authorization: None,
        }]
    );
}

#[tokio::test]
async fn offset_timestamp_is_normalised() {
    let provider = MockProvider::new().respond(
        LATEST,
        200,
        r#"{"latitude": 0.0, "longitude": 0.0, "timestamp": "2026-03-01T21:30:00+13:00", "vehicleId": "B1"}"#,
    );

    let position = latest_position(&VehicleId::from("B1"), &provider).await.unwrap();
    assert_eq!(position.observed_at(), Utc.with_ymd_and_hms(2026, 3, 1, 8, 30, 0).unwrap());
}

#[tokio::test]
async fn bearer_token() {
    let provider = MockProvider::new().with_token("s3cret").respond(LATEST, 404, "");

    let _ = latest_position(&VehicleId::from("B1"), &provider).await;
    assert_eq!(provider.requests()[0].authorization.as_deref(), Some("Bearer s3cret"));
}

#[tokio::test]
async fn vehicle_id_is_encoded() {
    let provider = MockProvider::new().respond("/api/locations/Shuttle%20A%2F2/latest", 404, "");

    let result = latest_position(&VehicleId::from("Shuttle A/2"), &provider).await;
    assert_eq!(result, Err(FetchError::NotFound));
}

#[tokio::test]
async fn not_found() {
    for (status, body) in [(404, ""), (204, ""), (200, "null")] {
        let provider = MockProvider::new().respond(LATEST, status, body);
        let result = latest_position(&VehicleId::from("B1"), &provider).await;
        assert_eq!(result, Err(FetchError::NotFound), "{status} {body:?}");
    }
}

#[tokio::test]
async fn server_error_is_transient() {
    let provider = MockProvider::new().respond(LATEST, 503, "maintenance");

    let err = latest_position(&VehicleId::from("B1"), &provider).await.unwrap_err();
    assert!(matches!(err, FetchError::Transient(_)));
}

#[tokio::test]
async fn connection_failure_is_transient() {
    let provider = MockProvider::new();

    let err = latest_position(&VehicleId::from("B1"), &provider).await.unwrap_err();
    let FetchError::Transient(description) = err else {
        panic!("expected transient, got {err:?}");
    };
    assert!(description.contains("connection refused"));
}

#[tokio::test]
async fn out_of_range_is_malformed() {
    let provider = MockProvider::new().respond(
        LATEST,
        200,
        r#"{"latitude": 91.0, "longitude": 0.0, "timestamp": "2026-03-01T08:30:00Z"}"#,
    );

    let err = latest_position(&VehicleId::from("B1"), &provider).await.unwrap_err();
    assert_eq!(err, FetchError::Malformed("latitude 91 outside [-90, 90]".to_string()));
}

#[tokio::test]
async fn missing_field_is_malformed() {
    let provider = MockProvider::new().respond(LATEST, 200, r#"{"latitude": 1.0}"#);

    let err = latest_position(&VehicleId::from("B1"), &provider).await.unwrap_err();
    assert_eq!(err.code(), "malformed");
}

#[tokio::test]
async fn unauthorised_is_malformed() {
    let provider = MockProvider::new().respond(LATEST, 401, "");

    let err = latest_position(&VehicleId::from("B1"), &provider).await.unwrap_err();
    assert!(matches!(err, FetchError::Malformed(_)));
}
