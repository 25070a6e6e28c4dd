//! # Campus Transit
//!
//! Native host for the tracking engine. [`Provider`] backs the engine's
//! sources with the campus transit REST API and [`router`] exposes the
//! tracker to clients over HTTP.

pub mod config;
mod http;
mod provider;

pub use self::http::router;
pub use self::provider::Provider;
