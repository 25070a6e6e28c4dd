//! Host settings read from the environment.

use std::env;
use std::time::Duration;

const DEFAULT_TIMEOUT_SECS: u64 = 10;

pub fn transit_api_url() -> String {
    env::var("TRANSIT_API_URL").unwrap_or_else(|_| {
        let default = "http://localhost:5000".to_string();
        tracing::trace!("TRANSIT_API_URL not set, using default: {default}");
        default
    })
}

pub fn transit_api_token() -> Option<String> {
    let value = env::var("TRANSIT_API_TOKEN").ok()?;
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return None;
    }
    tracing::trace!("TRANSIT_API_TOKEN loaded from environment");
    Some(trimmed.to_string())
}

/// Upper bound on a single backend request, connect included.
pub fn transit_api_timeout() -> Duration {
    let secs = env::var("TRANSIT_API_TIMEOUT_SECS")
        .ok()
        .and_then(|value| value.trim().parse::<u64>().ok())
        .filter(|secs| *secs > 0)
        .unwrap_or_else(|| {
            tracing::trace!("TRANSIT_API_TIMEOUT_SECS not set, using default: {DEFAULT_TIMEOUT_SECS}");
            DEFAULT_TIMEOUT_SECS
        });
    Duration::from_secs(secs)
}

pub fn listen_addr() -> String {
    env::var("LISTEN_ADDR").unwrap_or_else(|_| {
        let default = "127.0.0.1:8080".to_string();
        tracing::trace!("LISTEN_ADDR not set, using default: {default}");
        default
    })
}
