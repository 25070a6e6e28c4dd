//! Native provider: `reqwest` for HTTP, the environment for configuration.

use std::any::Any;
use std::error::Error;

use anyhow::{Context, Result, anyhow};
use bytes::Bytes;
use chrono::{DateTime, Utc};
use http::{Request, Response};
use http_body::Body;
use http_body_util::BodyExt;
use realtime::{Config, HttpRequest, Identity};
use tracing::{info, warn};
use tracking::{
    Clock, Destination, EtaEstimate, EtaSource, FetchError, Level, Notice, Notifier, Position,
    PositionSource, SystemClock, VehicleId,
};

use crate::config;

#[derive(Clone)]
pub struct Provider {
    client: reqwest::Client,
}

impl Provider {
    /// Create a provider with a pooled HTTP client.
    ///
    /// # Errors
    ///
    /// Returns an error when the TLS backend cannot be initialised.
    pub fn new() -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(config::transit_api_timeout())
            .build()
            .context("building http client")?;
        Ok(Self { client })
    }
}

impl HttpRequest for Provider {
    async fn fetch<T>(&self, request: Request<T>) -> Result<Response<Bytes>>
    where
        T: Body + Any + Send,
        T::Data: Into<Vec<u8>> + Send,
        T::Error: Into<Box<dyn Error + Send + Sync + 'static>>,
    {
        let (parts, body) = request.into_parts();
        let body = body
            .collect()
            .await
            .map_err(|err| {
                let err: Box<dyn Error + Send + Sync> = err.into();
                anyhow!("reading request body: {err}")
            })?
            .to_bytes();

        let url = parts.uri.to_string();
        let response = self
            .client
            .request(parts.method, &url)
            .headers(parts.headers)
            .body(body)
            .send()
            .await
            .with_context(|| format!("sending request to {url}"))?;

        let status = response.status();
        let headers = response.headers().clone();
        let body = response.bytes().await.context("reading response body")?;

        let mut builder = Response::builder().status(status);
        if let Some(map) = builder.headers_mut() {
            *map = headers;
        }
        builder.body(body).context("building response")
    }
}

impl Config for Provider {
    async fn get(&self, key: &str) -> Result<String> {
        match key {
            "TRANSIT_API_URL" => Ok(config::transit_api_url()),
            _ => Err(anyhow!("unknown config key {key}")),
        }
    }
}

impl Identity for Provider {
    async fn access_token(&self) -> Result<Option<String>> {
        Ok(config::transit_api_token())
    }
}

impl PositionSource for Provider {
    async fn fetch_latest(&self, vehicle_id: &VehicleId) -> Result<Position, FetchError> {
        transit_api::latest_position(vehicle_id, self).await
    }
}

impl EtaSource for Provider {
    async fn compute_eta(
        &self, vehicle_id: &VehicleId, destination: &Destination,
    ) -> Result<EtaEstimate, FetchError> {
        transit_api::eta(vehicle_id, destination, self).await
    }
}

impl Clock for Provider {
    fn now(&self) -> DateTime<Utc> {
        SystemClock.now()
    }
}

impl Notifier for Provider {
    fn notify(&self, notice: Notice) {
        match notice.level {
            Level::Info => info!(vehicle = %notice.vehicle_id, "{notice}"),
            Level::Warning => warn!(vehicle = %notice.vehicle_id, "{notice}"),
        }
    }
}

#[cfg(test)]
mod tests {
    use axum::Router;
    use axum::routing::get;
    use http_body_util::Empty;
    use tokio::net::TcpListener;

    use super::*;

    const LATEST: &str = r#"{"latitude":1.0,"longitude":2.0,"timestamp":"2026-03-01T08:30:00Z"}"#;

    async fn backend() -> String {
        let app = Router::new().route("/api/locations/B1/latest", get(|| async { LATEST }));
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move { axum::serve(listener, app).await.unwrap() });
        format!("http://{addr}")
    }

    fn request(url: String) -> Request<Empty<Bytes>> {
        Request::get(url).body(Empty::<Bytes>::new()).unwrap()
    }

    #[tokio::test]
    async fn passes_status_and_body_through() {
        let base_url = backend().await;
        let provider = Provider::new().unwrap();

        let response =
            provider.fetch(request(format!("{base_url}/api/locations/B1/latest"))).await.unwrap();
        assert_eq!(response.status(), 200);
        assert_eq!(response.body(), LATEST.as_bytes());

        let response = provider.fetch(request(format!("{base_url}/missing"))).await.unwrap();
        assert_eq!(response.status(), 404);
    }

    #[tokio::test]
    async fn config_keys() {
        let provider = Provider::new().unwrap();
        assert_eq!(provider.get("TRANSIT_API_URL").await.unwrap(), config::transit_api_url());

        let err = provider.get("PATH").await.unwrap_err();
        assert_eq!(err.to_string(), "unknown config key PATH");
    }

    #[tokio::test]
    async fn refused_connection_is_an_error() {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        drop(listener);

        let provider = Provider::new().unwrap();
        let err = provider.fetch(request(format!("http://{addr}/health"))).await.unwrap_err();
        assert!(err.to_string().starts_with("sending request to"));
    }
}
