//! Business logic services.

#![allow(missing_docs)]

pub mod hashtag;
pub mod post;

pub use hashtag::{CreateFromPostInput, HashtagService};
pub use post::{PostLookup, PostLookupService};
