//! Post repository.

use std::sync::Arc;

use crate::db_err;
use crate::entities::{Post, post};
use pulse_common::AppResult;
use sea_orm::{DatabaseConnection, EntityTrait, PaginatorTrait};

/// Read access to posts.
#[derive(Clone)]
pub struct PostRepository {
    db: Arc<DatabaseConnection>,
}

impl PostRepository {
    /// Create a new post repository.
    #[must_use]
    pub const fn new(db: Arc<DatabaseConnection>) -> Self {
        Self { db }
    }

    /// Find post by ID.
    pub async fn find_by_id(&self, id: &str) -> AppResult<Option<post::Model>> {
        Post::find_by_id(id.to_string())
            .one(self.db.as_ref())
            .await
            .map_err(db_err)
    }

    /// Check whether a post exists.
    pub async fn exists(&self, id: &str) -> AppResult<bool> {
        let count = Post::find_by_id(id.to_string())
            .count(self.db.as_ref())
            .await
            .map_err(db_err)?;
        Ok(count > 0)
    }
}
