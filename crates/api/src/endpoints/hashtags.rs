//! Hashtag endpoints.

use axum::{
    Router,
    extract::{Path, State},
    routing::{get, post},
};
use pulse_common::AppResult;
use pulse_core::{CreateFromPostInput, TrendingTag};
use pulse_db::entities::hashtag;
use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::{
    extractors::{QueryParams, ValidatedJson},
    middleware::AppState,
    response::ApiResponse,
};

/// Hashtag response.
#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct HashtagResponse {
    pub id: String,
    pub tag: String,
    pub usage_count: i32,
    pub last_used_at: Option<String>,
    pub created_at: String,
}

impl From<hashtag::Model> for HashtagResponse {
    fn from(tag: hashtag::Model) -> Self {
        Self {
            id: tag.id,
            tag: tag.name,
            usage_count: tag.posts_count,
            last_used_at: tag.last_used_at.map(|at| at.to_rfc3339()),
            created_at: tag.created_at.to_rfc3339(),
        }
    }
}

fn to_responses(tags: Vec<hashtag::Model>) -> Vec<HashtagResponse> {
    tags.into_iter().map(HashtagResponse::from).collect()
}

/// Create-from-post request.
#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct CreateFromPostRequest {
    pub body: String,

    #[validate(length(min = 1, max = 32))]
    pub post_id: String,
}

/// Extract the hashtags of a post body and link them to the post.
async fn create_from_post(
    State(state): State<AppState>,
    ValidatedJson(req): ValidatedJson<CreateFromPostRequest>,
) -> AppResult<ApiResponse<Vec<HashtagResponse>>> {
    let input = CreateFromPostInput {
        body: req.body,
        post_id: req.post_id,
    };

    let tags = state.hashtag_service.create_from_post(input).await?;
    Ok(ApiResponse::created(to_responses(tags)))
}

/// Limit query.
#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct LimitQuery {
    pub limit: Option<i64>,
}

/// Get trending hashtags.
async fn trending(
    State(state): State<AppState>,
    QueryParams(query): QueryParams<LimitQuery>,
) -> AppResult<ApiResponse<Vec<TrendingTag>>> {
    let tags = state.hashtag_service.get_trending(query.limit).await?;
    Ok(ApiResponse::ok(tags))
}

/// Get the posts of the trending hashtags.
async fn trending_posts(
    State(state): State<AppState>,
    QueryParams(query): QueryParams<LimitQuery>,
) -> AppResult<ApiResponse<Vec<String>>> {
    let post_ids = state.hashtag_service.get_trending_posts(query.limit).await?;
    Ok(ApiResponse::ok(post_ids))
}

/// Search hashtags query.
#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct SearchQuery {
    pub query: String,
    pub limit: Option<i64>,
}

/// Search hashtags by prefix.
async fn search(
    State(state): State<AppState>,
    QueryParams(query): QueryParams<SearchQuery>,
) -> AppResult<ApiResponse<Vec<HashtagResponse>>> {
    let tags = state
        .hashtag_service
        .search(&query.query, query.limit)
        .await?;
    Ok(ApiResponse::ok(to_responses(tags)))
}

/// Get hashtag details.
async fn show(
    State(state): State<AppState>,
    Path(tag): Path<String>,
) -> AppResult<ApiResponse<HashtagResponse>> {
    let tag = state.hashtag_service.get(&tag).await?;
    Ok(ApiResponse::ok(tag.into()))
}

/// Get the hashtags of a post.
async fn by_post(
    State(state): State<AppState>,
    Path(post_id): Path<String>,
) -> AppResult<ApiResponse<Vec<HashtagResponse>>> {
    let tags = state.hashtag_service.get_by_post(&post_id).await?;
    Ok(ApiResponse::ok(to_responses(tags)))
}

/// Get the posts using a hashtag.
async fn posts_for_tag(
    State(state): State<AppState>,
    Path(tag): Path<String>,
) -> AppResult<ApiResponse<Vec<String>>> {
    let post_ids = state.hashtag_service.get_posts_for_tag(&tag).await?;
    Ok(ApiResponse::ok(post_ids))
}

/// Delete response.
#[derive(Serialize)]
pub struct DeleteResponse {
    pub id: String,
}

/// Delete a hashtag.
async fn delete(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> AppResult<ApiResponse<DeleteResponse>> {
    state.hashtag_service.delete(&id).await?;
    Ok(ApiResponse::ok(DeleteResponse { id }))
}

// `{id}` is a post ID for GET, a hashtag ID for DELETE and a tag name
// before `/posts`.
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", post(create_from_post))
        .route("/from-post", post(create_from_post))
        .route("/trending", get(trending))
        .route("/trending/posts", get(trending_posts))
        .route("/search", get(search))
        .route("/show/{tag}", get(show))
        .route("/{id}", get(by_post).delete(delete))
        .route("/{id}/posts", get(posts_for_tag))
}
