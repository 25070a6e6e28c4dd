#![allow(missing_docs)]

use std::any::Any;
use std::collections::HashMap;
use std::error::Error;
use std::sync::Mutex;

use anyhow::{Context, Result, anyhow, bail};
use bytes::Bytes;
use chrono::{DateTime, TimeZone, Utc};
use http::header::AUTHORIZATION;
use http::{Request, Response};
use realtime::{Config, HttpRequest, Identity};
use tracking::Clock;

/// A request as the backend saw it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Recorded {
    pub method: String,
    pub path_and_query: String,
    pub authorization: Option<String>,
}

/// Canned backend keyed by path and query. Unknown paths fail like a refused
/// connection.
#[derive(Default)]
pub struct MockProvider {
    token: Option<String>,
    responses: HashMap<String, (u16, String)>,
    requests: Mutex<Vec<Recorded>>,
}

#[allow(unused)]
impl MockProvider {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn with_token(mut self, token: &str) -> Self {
        self.token = Some(token.to_string());
        self
    }

    #[must_use]
    pub fn respond(mut self, path_and_query: &str, status: u16, body: &str) -> Self {
        self.responses.insert(path_and_query.to_string(), (status, body.to_string()));
        self
    }

    #[must_use]
    pub fn requests(&self) -> Vec<Recorded> {
        self.requests.lock().unwrap().clone()
    }

    #[must_use]
    pub fn t0() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2026, 3, 1, 8, 30, 0).unwrap()
    }
}

impl HttpRequest for MockProvider {
    async fn fetch<T>(&self, request: Request<T>) -> Result<Response<Bytes>>
    where
        T: http_body::Body + Any + Send,
        T::Data: Into<Vec<u8>> + Send,
        T::Error: Into<Box<dyn Error + Send + Sync + 'static>>,
    {
        let uri = request.uri();
        if uri.host() != Some("transit.test") {
            bail!("unexpected host: {uri}");
        }
        let path_and_query = uri.path_and_query().map(ToString::to_string).unwrap_or_default();

        self.requests.lock().unwrap().push(Recorded {
            method: request.method().to_string(),
            path_and_query: path_and_query.clone(),
            authorization: request
                .headers()
                .get(AUTHORIZATION)
                .and_then(|value| value.to_str().ok())
                .map(ToString::to_string),
        });

        let Some((status, body)) = self.responses.get(&path_and_query) else {
            return Err(anyhow!("connection refused")).context("sending request");
        };
        Response::builder()
            .status(*status)
            .body(Bytes::from(body.clone()))
            .context("failed to build response")
    }
}

impl Config for MockProvider {
    async fn get(&self, key: &str) -> Result<String> {
        match key {
            "TRANSIT_API_URL" => Ok("http://transit.test/".to_string()),
            _ => bail!("unknown config key: {key}"),
        }
    }
}

impl Identity for MockProvider {
    async fn access_token(&self) -> Result<Option<String>> {
        Ok(self.token.clone())
    }
}

impl Clock for MockProvider {
    fn now(&self) -> DateTime<Utc> {
        Self::t0()
    }
}
