//! Shared application state and request middleware.

#![allow(missing_docs)]

use std::time::Duration;

use axum::{BoxError, Router, error_handling::HandleErrorLayer};
use pulse_common::AppError;
use pulse_core::HashtagService;
use tower::{ServiceBuilder, timeout::error::Elapsed};
use tracing::warn;

/// Application state.
#[derive(Clone)]
pub struct AppState {
    pub hashtag_service: HashtagService,
}

/// Bound every request of `router` by `timeout`.
///
/// A request that runs out of time is answered with `AppError::Unavailable`
/// in the usual error envelope.
pub fn with_request_timeout<S>(router: Router<S>, timeout: Duration) -> Router<S>
where
    S: Clone + Send + Sync + 'static,
{
    router.layer(
        ServiceBuilder::new()
            .layer(HandleErrorLayer::new(handle_middleware_error))
            .timeout(timeout),
    )
}

/// Map errors raised by tower middleware onto [`AppError`].
pub async fn handle_middleware_error(err: BoxError) -> AppError {
    if err.is::<Elapsed>() {
        warn!("Request timed out");
        AppError::Unavailable("Request timed out".to_string())
    } else {
        AppError::Internal(format!("Unhandled middleware error: {err}"))
    }
}
