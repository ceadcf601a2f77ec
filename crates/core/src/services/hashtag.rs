//! Hashtag service.

use pulse_common::{AppError, AppResult, config::HashtagConfig};
use pulse_db::{entities::hashtag, repositories::HashtagRepository};
use tracing::info;

use crate::extract::{MAX_TAG_LENGTH, extract_tags, scan_tags};
use crate::services::post::PostLookupService;
use crate::trending::{self, TrendingTag};

/// Input for linking the hashtags of a post body.
#[derive(Debug, Clone)]
pub struct CreateFromPostInput {
    /// Post body to scan.
    pub body: String,
    /// Post the tags are linked to.
    pub post_id: String,
}

/// Hashtag service for business logic.
#[derive(Clone)]
pub struct HashtagService {
    hashtag_repo: HashtagRepository,
    posts: PostLookupService,
    config: HashtagConfig,
}

impl HashtagService {
    /// Create a new hashtag service.
    #[must_use]
    pub const fn new(
        hashtag_repo: HashtagRepository,
        posts: PostLookupService,
        config: HashtagConfig,
    ) -> Self {
        Self {
            hashtag_repo,
            posts,
            config,
        }
    }

    /// Extract the hashtags of a post body and link them to the post.
    ///
    /// Either every tag is linked or none is.
    pub async fn create_from_post(
        &self,
        input: CreateFromPostInput,
    ) -> AppResult<Vec<hashtag::Model>> {
        self.ensure_post_exists(&input.post_id).await?;

        let tags = extract_tags(&input.body)?;
        if let Some(tag) = tags.iter().find(|t| t.chars().count() > MAX_TAG_LENGTH) {
            return Err(AppError::InvalidInput(format!(
                "Hashtag is longer than {MAX_TAG_LENGTH} characters: {tag}"
            )));
        }

        let names: Vec<String> = tags.into_iter().collect();
        let linked = self.hashtag_repo.link_all(&names, &input.post_id).await?;

        info!(post_id = %input.post_id, count = linked.len(), "Linked hashtags to post");
        Ok(linked)
    }

    /// Get the hashtags of a post.
    pub async fn get_by_post(&self, post_id: &str) -> AppResult<Vec<hashtag::Model>> {
        self.ensure_post_exists(post_id).await?;
        self.hashtag_repo.find_by_post(post_id).await
    }

    /// Get a hashtag by name.
    pub async fn get(&self, name: &str) -> AppResult<hashtag::Model> {
        self.hashtag_repo
            .find_by_name(name)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Hashtag not found: {name}")))
    }

    /// Get the IDs of posts using a hashtag.
    pub async fn get_posts_for_tag(&self, name: &str) -> AppResult<Vec<String>> {
        self.hashtag_repo.find_post_ids(name).await
    }

    /// Get trending hashtags.
    pub async fn get_trending(&self, limit: Option<i64>) -> AppResult<Vec<TrendingTag>> {
        let ranked = self.ranked_trending(limit).await?;
        Ok(ranked.iter().map(TrendingTag::from).collect())
    }

    /// Get the posts of the trending hashtags, most trending tag first.
    pub async fn get_trending_posts(&self, limit: Option<i64>) -> AppResult<Vec<String>> {
        let ranked = self.ranked_trending(limit).await?;
        let ids: Vec<String> = ranked.iter().map(|t| t.id.clone()).collect();
        let links = self.hashtag_repo.find_links(&ids).await?;
        Ok(trending::merge_post_ids(&ranked, links))
    }

    async fn ranked_trending(&self, limit: Option<i64>) -> AppResult<Vec<hashtag::Model>> {
        let limit = trending::resolve_limit(limit, &self.config);
        let tags = self.hashtag_repo.find_trending(limit).await?;
        Ok(trending::rank(tags))
    }

    /// Search hashtags by prefix.
    pub async fn search(&self, query: &str, limit: Option<i64>) -> AppResult<Vec<hashtag::Model>> {
        let query = query.trim().trim_start_matches('#');
        if query.is_empty() {
            return Err(AppError::InvalidInput("Search query is empty".to_string()));
        }

        let limit = trending::resolve_limit(limit, &self.config);
        self.hashtag_repo.search(query, limit).await
    }

    /// Delete a hashtag.
    ///
    /// Callers authorize the deletion. Posts that used the tag are untouched.
    pub async fn delete(&self, id: &str) -> AppResult<()> {
        self.hashtag_repo.delete(id).await
    }

    /// Drop a deleted post's hashtag links.
    pub async fn on_post_deleted(&self, post_id: &str) -> AppResult<u64> {
        self.hashtag_repo.unlink_post(post_id).await
    }

    /// Re-link a post after its body was edited.
    ///
    /// A body without hashtags is valid here and just clears the links.
    pub async fn on_post_updated(
        &self,
        post_id: &str,
        body: &str,
    ) -> AppResult<Vec<hashtag::Model>> {
        self.ensure_post_exists(post_id).await?;

        let names: Vec<String> = scan_tags(body)
            .into_iter()
            .filter(|t| t.chars().count() <= MAX_TAG_LENGTH)
            .collect();
        self.hashtag_repo.relink_post(&names, post_id).await
    }

    async fn ensure_post_exists(&self, post_id: &str) -> AppResult<()> {
        if self.posts.post_exists(post_id).await? {
            Ok(())
        } else {
            Err(AppError::PostNotFound(post_id.to_string()))
        }
    }
}
