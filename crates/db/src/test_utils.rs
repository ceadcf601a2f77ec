//! Test utilities for database operations.
//!
//! Provides an in-memory `SQLite` database with migrations applied.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectOptions, Database, DatabaseConnection, DbErr,
    EntityTrait, PaginatorTrait, QueryFilter, Set, prelude::DateTimeWithTimeZone,
    sea_query::Expr,
};
use sea_orm_migration::MigratorTrait;
use tracing::info;

use crate::entities::{Hashtag, HashtagPost, Post, hashtag, hashtag_post, post};
use crate::migrations::Migrator;

/// A migrated, throwaway database.
pub struct TestDatabase {
    /// Database connection.
    pub conn: Arc<DatabaseConnection>,
}

impl TestDatabase {
    /// Create a fresh in-memory database and run all migrations.
    ///
    /// The pool holds a single connection so every query sees the same
    /// in-memory database.
    pub async fn in_memory() -> Result<Self, DbErr> {
        let mut opt = ConnectOptions::new("sqlite::memory:");
        opt.max_connections(1)
            .min_connections(1)
            .sqlx_logging(false);

        let conn = Database::connect(opt).await?;
        Migrator::up(&conn, None).await?;

        info!("Created in-memory test database");

        Ok(Self {
            conn: Arc::new(conn),
        })
    }

    /// Insert a post with the given ID and body.
    pub async fn insert_post(&self, id: &str, body: &str) -> Result<post::Model, DbErr> {
        post::ActiveModel {
            id: Set(id.to_string()),
            author_id: Set("author".to_string()),
            body: Set(body.to_string()),
            created_at: Set(Utc::now().into()),
        }
        .insert(self.conn.as_ref())
        .await
    }

    /// Check whether a post row is still present.
    pub async fn post_exists(&self, id: &str) -> Result<bool, DbErr> {
        let count = Post::find_by_id(id.to_string())
            .count(self.conn.as_ref())
            .await?;
        Ok(count > 0)
    }

    /// Overwrite a hashtag's last-use time, for deterministic recency ordering.
    pub async fn set_last_used_at(&self, name: &str, at: DateTime<Utc>) -> Result<(), DbErr> {
        let at: DateTimeWithTimeZone = at.into();
        Hashtag::update_many()
            .col_expr(hashtag::Column::LastUsedAt, Expr::value(at))
            .filter(hashtag::Column::Name.eq(name))
            .exec(self.conn.as_ref())
            .await?;
        Ok(())
    }

    /// Overwrite when `post_id` was linked to the hashtag `name`.
    pub async fn set_link_created_at(
        &self,
        name: &str,
        post_id: &str,
        at: DateTime<Utc>,
    ) -> Result<(), DbErr> {
        let tag = Hashtag::find()
            .filter(hashtag::Column::Name.eq(name))
            .one(self.conn.as_ref())
            .await?
            .ok_or_else(|| DbErr::RecordNotFound(format!("hashtag {name}")))?;

        let at: DateTimeWithTimeZone = at.into();
        HashtagPost::update_many()
            .col_expr(hashtag_post::Column::CreatedAt, Expr::value(at))
            .filter(hashtag_post::Column::HashtagId.eq(tag.id))
            .filter(hashtag_post::Column::PostId.eq(post_id))
            .exec(self.conn.as_ref())
            .await?;
        Ok(())
    }
}
