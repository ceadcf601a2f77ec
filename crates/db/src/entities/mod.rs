//! Database entities.

#![allow(missing_docs)]

pub mod hashtag;
pub mod hashtag_post;
pub mod post;

pub use hashtag::Entity as Hashtag;
pub use hashtag_post::Entity as HashtagPost;
pub use post::Entity as Post;
