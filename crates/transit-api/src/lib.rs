//! # Transit API
//!
//! REST bindings for the campus transit backend: the latest recorded position
//! of a vehicle and an arrival estimate from that position to a destination.
//!
//! Both calls are generic over the host so they can run anywhere that can
//! supply configuration, credentials and an HTTP client. Every outcome is
//! mapped onto [`tracking::FetchError`] and every payload is validated before
//! it leaves this crate.

mod client;
mod eta;
mod location;

pub use self::eta::eta;
pub use self::location::latest_position;
