//! Post lookup.
//!
//! Posts belong to the post module. Hashtag services only need to know
//! whether a post exists, so they depend on this trait rather than on the
//! post storage.

use async_trait::async_trait;
use pulse_common::AppResult;
use pulse_db::repositories::PostRepository;
use std::sync::Arc;

/// Existence check for posts.
#[async_trait]
pub trait PostLookup: Send + Sync {
    /// Whether a post with this ID exists.
    async fn post_exists(&self, post_id: &str) -> AppResult<bool>;
}

/// Shared post lookup handle.
pub type PostLookupService = Arc<dyn PostLookup>;

#[async_trait]
impl PostLookup for PostRepository {
    async fn post_exists(&self, post_id: &str) -> AppResult<bool> {
        self.exists(post_id).await
    }
}
