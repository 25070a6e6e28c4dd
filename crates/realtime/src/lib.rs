//! # Realtime Core
//!
//! Core modules shared by the campus transit crates.

mod error;
mod provider;

pub use crate::error::*;
pub use crate::provider::*;
