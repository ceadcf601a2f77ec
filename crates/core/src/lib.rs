//! Core business logic for pulse.
//!
//! - [`extract`]: hashtag extraction from post bodies
//! - [`trending`]: trending ranking and limit handling
//! - [`services`]: the hashtag service and its collaborators

pub mod extract;
pub mod services;
pub mod trending;

pub use extract::{extract_tags, scan_tags};
pub use services::*;
pub use trending::TrendingTag;
