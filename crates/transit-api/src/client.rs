use anyhow::Context;
use bytes::Bytes;
use http::header::{ACCEPT, AUTHORIZATION};
use http::{Method, Response, StatusCode};
use http_body_util::Empty;
use realtime::{Config, HttpRequest, Identity};
use serde::de::DeserializeOwned;
use tracking::FetchError;

/// Issue a GET against the transit backend.
///
/// Returns `None` when the backend has nothing for the request.
pub async fn get<P>(provider: &P, path: &str) -> Result<Option<Bytes>, FetchError>
where
    P: Config + HttpRequest + Identity,
{
    let base_url = Config::get(provider, "TRANSIT_API_URL")
        .await
        .context("getting `TRANSIT_API_URL`")
        .map_err(transient)?;
    let token = Identity::access_token(provider)
        .await
        .context("getting access token")
        .map_err(transient)?;

    let url = format!("{}{path}", base_url.trim_end_matches('/'));
    let mut builder = http::Request::builder()
        .method(Method::GET)
        .uri(&url)
        .header(ACCEPT, "application/json");
    if let Some(token) = token {
        builder = builder.header(AUTHORIZATION, format!("Bearer {token}"));
    }
    let request = builder
        .body(Empty::<Bytes>::new())
        .map_err(|err| FetchError::Malformed(format!("building request for {url}: {err}")))?;

    tracing::debug!(url = %url, "transit api request");
    let response = HttpRequest::fetch(provider, request)
        .await
        .context("transit api request failed")
        .map_err(transient)?;

    body(response)
}

/// Map a backend response onto the fetch taxonomy.
///
/// 404, 204 and an empty or `null` body mean "nothing recorded". 408, 429 and
/// 5xx are worth retrying; any other non-success status breaks the contract.
pub fn body(response: Response<Bytes>) -> Result<Option<Bytes>, FetchError> {
    let status = response.status();
    match status {
        StatusCode::NOT_FOUND | StatusCode::NO_CONTENT => return Ok(None),
        StatusCode::REQUEST_TIMEOUT | StatusCode::TOO_MANY_REQUESTS => {
            return Err(FetchError::Transient(format!("backend returned {status}")));
        }
        _ if status.is_server_error() => {
            return Err(FetchError::Transient(format!("backend returned {status}")));
        }
        _ if !status.is_success() => {
            return Err(FetchError::Malformed(format!("unexpected status {status}")));
        }
        _ => {}
    }

    let body = response.into_body();
    let trimmed = body.trim_ascii();
    if trimmed.is_empty() || trimmed == b"null" {
        return Ok(None);
    }
    Ok(Some(body))
}

/// Decode a JSON payload, treating anything undecodable as a contract breach.
pub fn decode<T: DeserializeOwned>(body: &[u8]) -> Result<T, FetchError> {
    serde_json::from_slice(body)
        .map_err(|err| FetchError::Malformed(format!("decoding response: {err}")))
}

#[allow(clippy::needless_pass_by_value)]
fn transient(err: anyhow::Error) -> FetchError {
    FetchError::Transient(format!("{err:#}"))
}
