//! Transit service errors

use axum::response::{IntoResponse, Response};
use http::StatusCode;
use thiserror::Error;

/// Service level error type returned to HTTP callers.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum Error {
    /// The request payload is invalid or missing required fields.
    #[error("code: 400, description: {0}")]
    BadRequest(String),
}

impl Error {
    /// Returns the stable status code associated with the variant.
    #[must_use]
    pub const fn code(&self) -> StatusCode {
        match self {
            Self::BadRequest(_) => StatusCode::BAD_REQUEST,
        }
    }
}

impl From<serde_json::Error> for Error {
    fn from(err: serde_json::Error) -> Self {
        Self::BadRequest(format!("invalid json: {err}"))
    }
}

/// Error wrapper rendered as an HTTP response.
#[derive(Debug)]
pub struct HttpError {
    status: StatusCode,
    error: String,
}

impl HttpError {
    /// Status code the response will carry.
    #[must_use]
    pub const fn status(&self) -> StatusCode {
        self.status
    }
}

impl From<Error> for HttpError {
    fn from(e: Error) -> Self {
        Self { status: e.code(), error: e.to_string() }
    }
}

impl IntoResponse for HttpError {
    fn into_response(self) -> Response {
        (self.status, self.error).into_response()
    }
}

#[macro_export]
macro_rules! bad_request {
    ($fmt:expr, $($arg:tt)*) => {
        $crate::Error::BadRequest(format!($fmt, $($arg)*))
    };
     ($err:expr $(,)?) => {
        $crate::Error::BadRequest(format!($err))
    };
}
