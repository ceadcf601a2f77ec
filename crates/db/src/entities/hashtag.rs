//! Hashtag entity.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Hashtag for indexing and trending.
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "hashtag")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: String,

    /// The hashtag name (lowercase, without #)
    #[sea_orm(unique)]
    pub name: String,

    /// Number of posts linked to this hashtag
    #[sea_orm(default_value = 0)]
    pub posts_count: i32,

    /// When a post was last linked to this hashtag
    #[sea_orm(nullable)]
    pub last_used_at: Option<DateTimeWithTimeZone>,

    pub created_at: DateTimeWithTimeZone,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(has_many = "super::hashtag_post::Entity")]
    HashtagPost,
}

impl Related<super::hashtag_post::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::HashtagPost.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
