//! Create hashtag and hashtag_post tables migration.

use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(Hashtag::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(Hashtag::Id)
                            .string_len(32)
                            .not_null()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(Hashtag::Name).string_len(256).not_null())
                    .col(
                        ColumnDef::new(Hashtag::PostsCount)
                            .integer()
                            .not_null()
                            .default(0),
                    )
                    .col(ColumnDef::new(Hashtag::LastUsedAt).timestamp_with_time_zone())
                    .col(
                        ColumnDef::new(Hashtag::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null()
                            .default(Expr::current_timestamp()),
                    )
                    .to_owned(),
            )
            .await?;

        // Unique index: name - at most one record per normalized tag
        manager
            .create_index(
                Index::create()
                    .name("idx_hashtag_name")
                    .table(Hashtag::Table)
                    .col(Hashtag::Name)
                    .unique()
                    .to_owned(),
            )
            .await?;

        // Index: (posts_count, last_used_at) for trending
        manager
            .create_index(
                Index::create()
                    .name("idx_hashtag_trending")
                    .table(Hashtag::Table)
                    .col(Hashtag::PostsCount)
                    .col(Hashtag::LastUsedAt)
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(HashtagPost::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(HashtagPost::HashtagId)
                            .string_len(32)
                            .not_null(),
                    )
                    .col(ColumnDef::new(HashtagPost::PostId).string_len(32).not_null())
                    .col(
                        ColumnDef::new(HashtagPost::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null()
                            .default(Expr::current_timestamp()),
                    )
                    .primary_key(
                        Index::create()
                            .col(HashtagPost::HashtagId)
                            .col(HashtagPost::PostId),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_hashtag_post_hashtag")
                            .from(HashtagPost::Table, HashtagPost::HashtagId)
                            .to(Hashtag::Table, Hashtag::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        // Index: post_id (for finding the tags of a post)
        manager
            .create_index(
                Index::create()
                    .name("idx_hashtag_post_post_id")
                    .table(HashtagPost::Table)
                    .col(HashtagPost::PostId)
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(HashtagPost::Table).to_owned())
            .await?;

        manager
            .drop_table(Table::drop().table(Hashtag::Table).to_owned())
            .await
    }
}

#[derive(Iden)]
enum Hashtag {
    Table,
    Id,
    Name,
    PostsCount,
    LastUsedAt,
    CreatedAt,
}

#[derive(Iden)]
enum HashtagPost {
    Table,
    HashtagId,
    PostId,
    CreatedAt,
}
