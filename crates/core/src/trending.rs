//! Trending hashtag ranking.

use std::collections::{HashMap, HashSet};

use pulse_common::config::HashtagConfig;
use pulse_db::entities::{hashtag, hashtag_post};
use serde::Serialize;

/// A ranked hashtag and how many posts use it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TrendingTag {
    /// Normalized tag name.
    pub tag: String,
    /// Posts currently linked to the tag.
    pub usage_count: u64,
}

impl From<&hashtag::Model> for TrendingTag {
    fn from(model: &hashtag::Model) -> Self {
        Self {
            tag: model.name.clone(),
            usage_count: u64::try_from(model.posts_count).unwrap_or(0),
        }
    }
}

/// Resolve a caller-supplied limit.
///
/// A missing or non-positive limit falls back to the configured default;
/// anything above the configured maximum is capped.
#[must_use]
pub fn resolve_limit(requested: Option<i64>, config: &HashtagConfig) -> u64 {
    match requested.and_then(|limit| u64::try_from(limit).ok()) {
        Some(limit) if limit > 0 => limit.min(config.trending_max_limit),
        _ => config.trending_default_limit,
    }
}

/// Order hashtags by usage, most used first.
///
/// Ties go to the tag linked most recently, then to the newer record.
#[must_use]
pub fn rank(mut tags: Vec<hashtag::Model>) -> Vec<hashtag::Model> {
    tags.sort_by(|a, b| {
        b.posts_count
            .cmp(&a.posts_count)
            .then_with(|| b.last_used_at.cmp(&a.last_used_at))
            .then_with(|| b.id.cmp(&a.id))
    });
    tags
}

/// Merge the posts of ranked tags into one list.
///
/// Posts of the higher-ranked tag come first; within a tag, links keep the
/// order they were given in. A post shared by several tags appears once.
#[must_use]
pub fn merge_post_ids(ranked: &[hashtag::Model], links: Vec<hashtag_post::Model>) -> Vec<String> {
    let mut by_tag: HashMap<String, Vec<String>> = HashMap::new();
    for link in links {
        by_tag.entry(link.hashtag_id).or_default().push(link.post_id);
    }

    let mut seen = HashSet::new();
    let mut post_ids = Vec::new();
    for tag in ranked {
        let Some(posts) = by_tag.remove(&tag.id) else {
            continue;
        };
        for post_id in posts {
            if seen.insert(post_id.clone()) {
                post_ids.push(post_id);
            }
        }
    }
    post_ids
}
