//! HTTP API layer for pulse.
//!
//! - **Endpoints**: hashtag routes under `/hashtags`
//! - **Extractors**: JSON and query extraction with validation
//! - **Response**: the `{ "data": ... }` envelope
//!
//! Built on Axum 0.8; the server crate adds the Tower middleware stack.

pub mod endpoints;
pub mod extractors;
pub mod middleware;
pub mod response;

pub use endpoints::router;
