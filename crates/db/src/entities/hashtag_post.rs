//! Hashtag-post association entity.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// A post linked to a hashtag. A post is linked to a given tag at most once.
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "hashtag_post")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub hashtag_id: String,

    /// Linked post. Posts are owned elsewhere; this is a reference only.
    #[sea_orm(primary_key, auto_increment = false)]
    pub post_id: String,

    /// When the link was made.
    pub created_at: DateTimeWithTimeZone,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::hashtag::Entity",
        from = "Column::HashtagId",
        to = "super::hashtag::Column::Id",
        on_delete = "Cascade"
    )]
    Hashtag,
}

impl Related<super::hashtag::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Hashtag.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
