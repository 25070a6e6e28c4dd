//! # Provider
//!
//! Provider defines the host interfaces dependent crates are written against.

use std::any::Any;
use std::error::Error;

use anyhow::Result;
use bytes::Bytes;
use http::{Request, Response};
use http_body::Body;

/// The `HttpRequest` trait defines the behavior for fetching data from a source.
pub trait HttpRequest: Send + Sync {
    /// Make outbound HTTP request.
    ///
    /// Implementations return the response whatever its status; only
    /// transport failures (connect, timeout) are errors.
    fn fetch<T>(&self, request: Request<T>) -> impl Future<Output = Result<Response<Bytes>>> + Send
    where
        T: Body + Any + Send,
        T::Data: Into<Vec<u8>> + Send,
        T::Error: Into<Box<dyn Error + Send + Sync + 'static>>;
}

/// The `Config` trait is used by implementers to provide configuration from
/// the host to dependent crates.
pub trait Config: Send + Sync {
    /// Request configuration setting.
    fn get(&self, key: &str) -> impl Future<Output = Result<String>> + Send;
}

/// The `Identity` trait supplies credentials for outbound requests.
pub trait Identity: Send + Sync {
    /// Bearer token for the backend, if one is configured.
    fn access_token(&self) -> impl Future<Output = Result<Option<String>>> + Send;
}
