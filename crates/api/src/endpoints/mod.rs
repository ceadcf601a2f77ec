//! API endpoints.

mod hashtags;

use axum::Router;

use crate::middleware::AppState;

/// Create the API router.
pub fn router() -> Router<AppState> {
    Router::new().nest("/hashtags", hashtags::router())
}
