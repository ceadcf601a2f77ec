//! Repository layer.

mod hashtag;
mod post;

pub use hashtag::HashtagRepository;
pub use post::PostRepository;
