//! Infrastructure layer providing external service integrations.
//!
//! REST access to the marketplace API, the preference file and the
//! configuration loader.

pub mod config;
pub mod http;
pub mod persistence;

pub use config::*;
pub use http::*;
pub use persistence::*;
