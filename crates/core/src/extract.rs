//! Hashtag extraction from post bodies.

use std::collections::BTreeSet;
use std::sync::LazyLock;

use pulse_common::{AppError, AppResult};
use regex::Regex;

/// Longest tag the `hashtag.name` column stores, in characters.
pub const MAX_TAG_LENGTH: usize = 256;

static HASHTAG_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"#(\w+)").expect("hashtag pattern is valid"));

/// Collect the normalized hashtags of a body.
///
/// A tag is `#` followed by one or more word characters. Tags are returned
/// lowercase without the `#`, each at most once. A body without tags yields
/// an empty set.
#[must_use]
pub fn scan_tags(body: &str) -> BTreeSet<String> {
    HASHTAG_RE
        .captures_iter(body)
        .filter_map(|caps| caps.get(1))
        .map(|m| m.as_str().to_lowercase())
        .collect()
}

/// Extract hashtags for explicit hashtag creation.
///
/// Unlike [`scan_tags`], a body that is empty or has no tags is rejected.
pub fn extract_tags(body: &str) -> AppResult<BTreeSet<String>> {
    if body.trim().is_empty() {
        return Err(AppError::InvalidInput("Post body is empty".to_string()));
    }

    let tags = scan_tags(body);
    if tags.is_empty() {
        return Err(AppError::InvalidInput(
            "No hashtags found in the post body".to_string(),
        ));
    }

    Ok(tags)
}
