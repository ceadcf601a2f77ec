//! Hashtag repository.

use std::collections::HashSet;
use std::sync::Arc;

use crate::db_err;
use crate::entities::{Hashtag, HashtagPost, hashtag, hashtag_post};
use chrono::Utc;
use pulse_common::{AppError, AppResult, IdGenerator};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, DatabaseTransaction, DbErr, EntityTrait,
    QueryFilter, QueryOrder, QuerySelect, Set, SqlErr, TransactionTrait,
    prelude::DateTimeWithTimeZone,
    sea_query::{Expr, LikeExpr},
};
use tracing::{debug, info};

const DEFAULT_LINK_ATTEMPTS: u32 = 3;

/// Hashtag repository for database operations.
#[derive(Clone)]
pub struct HashtagRepository {
    db: Arc<DatabaseConnection>,
    id_gen: IdGenerator,
    link_attempts: u32,
}

impl HashtagRepository {
    /// Create a new hashtag repository.
    #[must_use]
    pub const fn new(db: Arc<DatabaseConnection>) -> Self {
        Self {
            db,
            id_gen: IdGenerator::new(),
            link_attempts: DEFAULT_LINK_ATTEMPTS,
        }
    }

    /// Set how many times a link is attempted when creation races.
    #[must_use]
    pub fn with_link_attempts(mut self, attempts: u32) -> Self {
        self.link_attempts = attempts.max(1);
        self
    }

    /// Find a hashtag by ID.
    pub async fn find_by_id(&self, id: &str) -> AppResult<Option<hashtag::Model>> {
        Hashtag::find_by_id(id.to_string())
            .one(self.db.as_ref())
            .await
            .map_err(db_err)
    }

    /// Find a hashtag by name.
    pub async fn find_by_name(&self, name: &str) -> AppResult<Option<hashtag::Model>> {
        Hashtag::find()
            .filter(hashtag::Column::Name.eq(normalize(name)))
            .one(self.db.as_ref())
            .await
            .map_err(db_err)
    }

    /// Get or create the hashtag `name` and link `post_id` to it.
    ///
    /// Linking an already linked post leaves the record unchanged.
    pub async fn upsert_and_link(&self, name: &str, post_id: &str) -> AppResult<hashtag::Model> {
        let txn = self.db.begin().await.map_err(db_err)?;
        let tag = self.upsert_and_link_in(&txn, name, post_id).await?;
        txn.commit().await.map_err(db_err)?;
        Ok(tag)
    }

    /// Link `post_id` to every tag in `names` inside one transaction.
    ///
    /// The first failure rolls back every link made so far.
    pub async fn link_all(
        &self,
        names: &[String],
        post_id: &str,
    ) -> AppResult<Vec<hashtag::Model>> {
        let txn = self.db.begin().await.map_err(db_err)?;

        let mut tags = Vec::with_capacity(names.len());
        for name in names {
            tags.push(self.upsert_and_link_in(&txn, name, post_id).await?);
        }

        txn.commit().await.map_err(db_err)?;
        Ok(tags)
    }

    async fn upsert_and_link_in(
        &self,
        txn: &DatabaseTransaction,
        name: &str,
        post_id: &str,
    ) -> AppResult<hashtag::Model> {
        let name = normalize(name);

        for attempt in 1..=self.link_attempts {
            let savepoint = txn.begin().await.map_err(db_err)?;
            match self.try_upsert_and_link(&savepoint, &name, post_id).await {
                Ok(tag) => {
                    savepoint.commit().await.map_err(db_err)?;
                    return Ok(tag);
                }
                Err(e) if is_unique_violation(&e) => {
                    savepoint.rollback().await.map_err(db_err)?;
                    debug!(tag = %name, post_id, attempt, "Hashtag upsert raced, retrying");
                }
                Err(e) => return Err(db_err(e)),
            }
        }

        Err(AppError::Conflict(format!(
            "Hashtag {name} could not be linked after {} attempts",
            self.link_attempts
        )))
    }

    async fn try_upsert_and_link(
        &self,
        conn: &DatabaseTransaction,
        name: &str,
        post_id: &str,
    ) -> Result<hashtag::Model, DbErr> {
        let now: DateTimeWithTimeZone = Utc::now().into();

        let tag = match Hashtag::find()
            .filter(hashtag::Column::Name.eq(name))
            .one(conn)
            .await?
        {
            Some(tag) => tag,
            None => {
                let model = hashtag::ActiveModel {
                    id: Set(self.id_gen.generate()),
                    name: Set(name.to_string()),
                    posts_count: Set(0),
                    last_used_at: Set(None),
                    created_at: Set(now),
                };
                let tag = model.insert(conn).await?;
                info!(hashtag_id = %tag.id, tag = %tag.name, "Created hashtag");
                tag
            }
        };

        let already_linked = HashtagPost::find_by_id((tag.id.clone(), post_id.to_string()))
            .one(conn)
            .await?
            .is_some();
        if already_linked {
            return Ok(tag);
        }

        let link = hashtag_post::ActiveModel {
            hashtag_id: Set(tag.id.clone()),
            post_id: Set(post_id.to_string()),
            created_at: Set(now),
        };
        HashtagPost::insert(link).exec_without_returning(conn).await?;

        Hashtag::update_many()
            .col_expr(
                hashtag::Column::PostsCount,
                Expr::col(hashtag::Column::PostsCount).add(1),
            )
            .col_expr(hashtag::Column::LastUsedAt, Expr::value(now))
            .filter(hashtag::Column::Id.eq(&tag.id))
            .exec(conn)
            .await?;

        Hashtag::find_by_id(tag.id.clone())
            .one(conn)
            .await?
            .ok_or_else(|| DbErr::RecordNotFound(format!("hashtag {}", tag.id)))
    }

    /// Get all hashtags linked to a post.
    pub async fn find_by_post(&self, post_id: &str) -> AppResult<Vec<hashtag::Model>> {
        let hashtag_ids: Vec<String> = HashtagPost::find()
            .select_only()
            .column(hashtag_post::Column::HashtagId)
            .filter(hashtag_post::Column::PostId.eq(post_id))
            .into_tuple()
            .all(self.db.as_ref())
            .await
            .map_err(db_err)?;

        if hashtag_ids.is_empty() {
            return Ok(vec![]);
        }

        Hashtag::find()
            .filter(hashtag::Column::Id.is_in(hashtag_ids))
            .order_by_asc(hashtag::Column::Name)
            .all(self.db.as_ref())
            .await
            .map_err(db_err)
    }

    /// Get the IDs of posts linked to a hashtag, most recently linked first.
    pub async fn find_post_ids(&self, name: &str) -> AppResult<Vec<String>> {
        let tag = self
            .find_by_name(name)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Hashtag not found: {name}")))?;

        HashtagPost::find()
            .select_only()
            .column(hashtag_post::Column::PostId)
            .filter(hashtag_post::Column::HashtagId.eq(&tag.id))
            .order_by_desc(hashtag_post::Column::CreatedAt)
            .order_by_desc(hashtag_post::Column::PostId)
            .into_tuple()
            .all(self.db.as_ref())
            .await
            .map_err(db_err)
    }

    /// Get the post links of several hashtags, most recently linked first.
    pub async fn find_links(&self, hashtag_ids: &[String]) -> AppResult<Vec<hashtag_post::Model>> {
        if hashtag_ids.is_empty() {
            return Ok(vec![]);
        }

        HashtagPost::find()
            .filter(hashtag_post::Column::HashtagId.is_in(hashtag_ids.to_vec()))
            .order_by_desc(hashtag_post::Column::CreatedAt)
            .order_by_desc(hashtag_post::Column::PostId)
            .all(self.db.as_ref())
            .await
            .map_err(db_err)
    }

    /// Get trending hashtags: most linked first, ties broken by the most
    /// recent link.
    pub async fn find_trending(&self, limit: u64) -> AppResult<Vec<hashtag::Model>> {
        Hashtag::find()
            .filter(hashtag::Column::PostsCount.gt(0))
            .order_by_desc(hashtag::Column::PostsCount)
            .order_by_desc(hashtag::Column::LastUsedAt)
            .order_by_desc(hashtag::Column::Id)
            .limit(limit)
            .all(self.db.as_ref())
            .await
            .map_err(db_err)
    }

    /// Search hashtags by prefix.
    pub async fn search(&self, query: &str, limit: u64) -> AppResult<Vec<hashtag::Model>> {
        let pattern = format!("{}%", escape_like(&normalize(query)));

        Hashtag::find()
            .filter(
                Expr::col((Hashtag, hashtag::Column::Name))
                    .like(LikeExpr::new(pattern).escape('\\')),
            )
            .order_by_desc(hashtag::Column::PostsCount)
            .order_by_asc(hashtag::Column::Name)
            .limit(limit)
            .all(self.db.as_ref())
            .await
            .map_err(db_err)
    }

    /// Delete a hashtag and its post links. Posts themselves are untouched.
    pub async fn delete(&self, id: &str) -> AppResult<()> {
        let txn = self.db.begin().await.map_err(db_err)?;

        HashtagPost::delete_many()
            .filter(hashtag_post::Column::HashtagId.eq(id))
            .exec(&txn)
            .await
            .map_err(db_err)?;

        let result = Hashtag::delete_by_id(id.to_string())
            .exec(&txn)
            .await
            .map_err(db_err)?;

        if result.rows_affected == 0 {
            return Err(AppError::NotFound(format!("Hashtag not found: {id}")));
        }

        txn.commit().await.map_err(db_err)?;
        info!(hashtag_id = id, "Deleted hashtag");
        Ok(())
    }

    /// Remove every link of a post and decrement the affected counts.
    ///
    /// Returns the number of hashtags the post was unlinked from.
    pub async fn unlink_post(&self, post_id: &str) -> AppResult<u64> {
        let txn = self.db.begin().await.map_err(db_err)?;
        let removed = Self::unlink_post_in(&txn, post_id).await?;
        txn.commit().await.map_err(db_err)?;
        Ok(removed)
    }

    /// Replace the links of a post with `names` inside one transaction.
    ///
    /// Links to tags still in `names` keep their original link time; only
    /// tags no longer used by the post are unlinked.
    pub async fn relink_post(
        &self,
        names: &[String],
        post_id: &str,
    ) -> AppResult<Vec<hashtag::Model>> {
        let txn = self.db.begin().await.map_err(db_err)?;

        let wanted: HashSet<String> = names.iter().map(|n| normalize(n)).collect();
        let stale: Vec<String> = Self::linked_tags_in(&txn, post_id)
            .await?
            .into_iter()
            .filter(|tag| !wanted.contains(&tag.name))
            .map(|tag| tag.id)
            .collect();
        Self::unlink_in(&txn, post_id, stale).await?;

        let mut tags = Vec::with_capacity(names.len());
        for name in names {
            tags.push(self.upsert_and_link_in(&txn, name, post_id).await?);
        }

        txn.commit().await.map_err(db_err)?;
        Ok(tags)
    }

    async fn unlink_post_in(txn: &DatabaseTransaction, post_id: &str) -> AppResult<u64> {
        let hashtag_ids = Self::linked_tags_in(txn, post_id)
            .await?
            .into_iter()
            .map(|tag| tag.id)
            .collect();
        Self::unlink_in(txn, post_id, hashtag_ids).await
    }

    async fn linked_tags_in(
        txn: &DatabaseTransaction,
        post_id: &str,
    ) -> AppResult<Vec<hashtag::Model>> {
        let hashtag_ids: Vec<String> = HashtagPost::find()
            .select_only()
            .column(hashtag_post::Column::HashtagId)
            .filter(hashtag_post::Column::PostId.eq(post_id))
            .into_tuple()
            .all(txn)
            .await
            .map_err(db_err)?;

        if hashtag_ids.is_empty() {
            return Ok(vec![]);
        }

        Hashtag::find()
            .filter(hashtag::Column::Id.is_in(hashtag_ids))
            .all(txn)
            .await
            .map_err(db_err)
    }

    /// Unlink `post_id` from `hashtag_ids`, then decrement each count and
    /// reset `last_used_at` to the newest surviving link.
    async fn unlink_in(
        txn: &DatabaseTransaction,
        post_id: &str,
        hashtag_ids: Vec<String>,
    ) -> AppResult<u64> {
        if hashtag_ids.is_empty() {
            return Ok(0);
        }

        let removed = HashtagPost::delete_many()
            .filter(hashtag_post::Column::PostId.eq(post_id))
            .filter(hashtag_post::Column::HashtagId.is_in(hashtag_ids.clone()))
            .exec(txn)
            .await
            .map_err(db_err)?
            .rows_affected;

        Hashtag::update_many()
            .col_expr(
                hashtag::Column::PostsCount,
                Expr::col(hashtag::Column::PostsCount).sub(1),
            )
            .filter(hashtag::Column::Id.is_in(hashtag_ids.clone()))
            .filter(hashtag::Column::PostsCount.gt(0))
            .exec(txn)
            .await
            .map_err(db_err)?;

        for hashtag_id in hashtag_ids {
            let newest = HashtagPost::find()
                .filter(hashtag_post::Column::HashtagId.eq(&hashtag_id))
                .order_by_desc(hashtag_post::Column::CreatedAt)
                .one(txn)
                .await
                .map_err(db_err)?;

            Hashtag::update_many()
                .col_expr(
                    hashtag::Column::LastUsedAt,
                    Expr::value(newest.map(|link| link.created_at)),
                )
                .filter(hashtag::Column::Id.eq(&hashtag_id))
                .exec(txn)
                .await
                .map_err(db_err)?;
        }

        Ok(removed)
    }
}

/// Tags are stored lowercase without the leading `#`.
fn normalize(name: &str) -> String {
    name.trim_start_matches('#').to_lowercase()
}

/// Escape LIKE wildcards so the query matches literally.
fn escape_like(query: &str) -> String {
    let mut escaped = String::with_capacity(query.len());
    for c in query.chars() {
        if matches!(c, '\\' | '%' | '_') {
            escaped.push('\\');
        }
        escaped.push(c);
    }
    escaped
}

fn is_unique_violation(err: &DbErr) -> bool {
    matches!(err.sql_err(), Some(SqlErr::UniqueConstraintViolation(_)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_utils::TestDatabase;
    use chrono::{DateTime, Duration};
    use sea_orm::{DatabaseBackend, MockDatabase, MockExecResult};

    fn create_test_hashtag(id: &str, name: &str, posts_count: i32) -> hashtag::Model {
        hashtag::Model {
            id: id.to_string(),
            name: name.to_string(),
            posts_count,
            last_used_at: Some(Utc::now().into()),
            created_at: Utc::now().into(),
        }
    }

    async fn repo_with_posts(post_ids: &[&str]) -> (TestDatabase, HashtagRepository) {
        let db = TestDatabase::in_memory().await.unwrap();
        for id in post_ids {
            db.insert_post(id, "body").await.unwrap();
        }
        let repo = HashtagRepository::new(db.conn.clone());
        (db, repo)
    }

    /// Link and pin both the link time and the tag's last use to `at`.
    async fn link_at(
        db: &TestDatabase,
        repo: &HashtagRepository,
        name: &str,
        post_id: &str,
        at: DateTime<Utc>,
    ) {
        repo.upsert_and_link(name, post_id).await.unwrap();
        db.set_link_created_at(name, post_id, at).await.unwrap();
        db.set_last_used_at(name, at).await.unwrap();
    }

    /// Real unique violations, as raised by `SQLite`.
    async fn unique_violations(count: usize) -> Vec<DbErr> {
        let db = TestDatabase::in_memory().await.unwrap();
        let row = || hashtag::ActiveModel {
            id: Set("dup".to_string()),
            name: Set("dup".to_string()),
            posts_count: Set(0),
            last_used_at: Set(None),
            created_at: Set(Utc::now().into()),
        };

        Hashtag::insert(row())
            .exec_without_returning(db.conn.as_ref())
            .await
            .unwrap();

        let mut errors = Vec::with_capacity(count);
        for _ in 0..count {
            let err = Hashtag::insert(row())
                .exec_without_returning(db.conn.as_ref())
                .await
                .unwrap_err();
            assert!(is_unique_violation(&err));
            errors.push(err);
        }
        errors
    }

    #[tokio::test]
    async fn test_find_by_name_mock() {
        let tag = create_test_hashtag("h1", "rust", 10);

        let db = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([[tag.clone()]])
                .into_connection(),
        );

        let repo = HashtagRepository::new(db);
        let result = repo.find_by_name("#Rust").await.unwrap();

        assert_eq!(result.unwrap().name, "rust");
    }

    #[tokio::test]
    async fn test_upsert_creates_and_links() {
        let (_db, repo) = repo_with_posts(&["p1"]).await;

        let tag = repo.upsert_and_link("JS", "p1").await.unwrap();

        assert_eq!(tag.name, "js");
        assert_eq!(tag.posts_count, 1);
        assert!(tag.last_used_at.is_some());
        assert_eq!(repo.find_post_ids("js").await.unwrap(), vec!["p1"]);
    }

    #[tokio::test]
    async fn test_upsert_is_idempotent() {
        let (_db, repo) = repo_with_posts(&["p1"]).await;

        let first = repo.upsert_and_link("js", "p1").await.unwrap();
        let second = repo.upsert_and_link("js", "p1").await.unwrap();

        assert_eq!(first.id, second.id);
        assert_eq!(second.posts_count, 1);
        assert_eq!(repo.find_post_ids("js").await.unwrap(), vec!["p1"]);
        assert_eq!(repo.search("js", 10).await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_upsert_reuses_record_for_new_post() {
        let (_db, repo) = repo_with_posts(&["p1", "p2"]).await;

        let first = repo.upsert_and_link("rust", "p1").await.unwrap();
        let second = repo.upsert_and_link("#Rust", "p2").await.unwrap();

        assert_eq!(first.id, second.id);
        assert_eq!(second.posts_count, 2);

        let mut posts = repo.find_post_ids("rust").await.unwrap();
        posts.sort();
        assert_eq!(posts, vec!["p1", "p2"]);
    }

    #[tokio::test]
    async fn test_link_all_and_find_by_post() {
        let (_db, repo) = repo_with_posts(&["p1", "p2"]).await;

        let tags = repo
            .link_all(&["rust".to_string(), "axum".to_string()], "p1")
            .await
            .unwrap();
        assert_eq!(tags.len(), 2);

        let names: Vec<String> = repo
            .find_by_post("p1")
            .await
            .unwrap()
            .into_iter()
            .map(|t| t.name)
            .collect();
        assert_eq!(names, vec!["axum", "rust"]);

        assert!(repo.find_by_post("p2").await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_find_post_ids_unknown_tag() {
        let (_db, repo) = repo_with_posts(&[]).await;

        let err = repo.find_post_ids("nothing").await.unwrap_err();
        assert!(matches!(err, AppError::NotFound(_)));
    }

    #[tokio::test]
    async fn test_delete() {
        let (db, repo) = repo_with_posts(&["p1"]).await;
        let tag = repo.upsert_and_link("css", "p1").await.unwrap();

        repo.delete(&tag.id).await.unwrap();

        assert!(repo.find_by_name("css").await.unwrap().is_none());
        assert!(repo.find_by_post("p1").await.unwrap().is_empty());
        assert!(db.post_exists("p1").await.unwrap());
    }

    #[tokio::test]
    async fn test_delete_unknown_id() {
        let (_db, repo) = repo_with_posts(&[]).await;

        let err = repo.delete("missing").await.unwrap_err();
        assert!(matches!(err, AppError::NotFound(_)));
    }

    #[tokio::test]
    async fn test_find_trending_orders_by_count_then_recency() {
        let posts = ["p1", "p2", "p3", "p4", "p5"];
        let (db, repo) = repo_with_posts(&posts).await;

        for post in posts {
            repo.upsert_and_link("js", post).await.unwrap();
            repo.upsert_and_link("html", post).await.unwrap();
        }
        for post in &posts[..3] {
            repo.upsert_and_link("css", post).await.unwrap();
        }

        // js and html tie on count; js was used more recently
        let base = Utc::now();
        db.set_last_used_at("html", base - Duration::minutes(5))
            .await
            .unwrap();
        db.set_last_used_at("js", base).await.unwrap();
        db.set_last_used_at("css", base + Duration::minutes(5))
            .await
            .unwrap();

        let top: Vec<(String, i32)> = repo
            .find_trending(2)
            .await
            .unwrap()
            .into_iter()
            .map(|t| (t.name, t.posts_count))
            .collect();
        assert_eq!(
            top,
            vec![("js".to_string(), 5), ("html".to_string(), 5)]
        );

        let all = repo.find_trending(10).await.unwrap();
        assert_eq!(all.len(), 3);
        assert_eq!(all[2].name, "css");
    }

    #[tokio::test]
    async fn test_unlink_post_decrements_counts() {
        let (_db, repo) = repo_with_posts(&["p1", "p2"]).await;
        repo.link_all(&["rust".to_string(), "go".to_string()], "p1")
            .await
            .unwrap();
        repo.upsert_and_link("rust", "p2").await.unwrap();

        assert_eq!(repo.unlink_post("p1").await.unwrap(), 2);

        let rust = repo.find_by_name("rust").await.unwrap().unwrap();
        let go = repo.find_by_name("go").await.unwrap().unwrap();
        assert_eq!(rust.posts_count, 1);
        assert_eq!(go.posts_count, 0);
        assert_eq!(repo.find_post_ids("rust").await.unwrap(), vec!["p2"]);

        // Unused tags drop out of trending
        let trending = repo.find_trending(10).await.unwrap();
        assert_eq!(trending.len(), 1);
        assert_eq!(repo.unlink_post("p1").await.unwrap(), 0);
    }

    #[tokio::test]
    async fn test_relink_post_replaces_links() {
        let (_db, repo) = repo_with_posts(&["p1"]).await;
        repo.link_all(&["old".to_string(), "kept".to_string()], "p1")
            .await
            .unwrap();

        let tags = repo
            .relink_post(&["kept".to_string(), "new".to_string()], "p1")
            .await
            .unwrap();

        let names: Vec<&str> = tags.iter().map(|t| t.name.as_str()).collect();
        assert_eq!(names, vec!["kept", "new"]);
        assert_eq!(repo.find_by_name("old").await.unwrap().unwrap().posts_count, 0);
        assert_eq!(repo.find_by_name("kept").await.unwrap().unwrap().posts_count, 1);
    }

    #[tokio::test]
    async fn test_upsert_gives_up_with_conflict() {
        let mut mock = MockDatabase::new(DatabaseBackend::Postgres);
        for err in unique_violations(3).await {
            mock = mock
                .append_query_results([Vec::<hashtag::Model>::new()])
                .append_query_errors([err]);
        }

        let repo = HashtagRepository::new(Arc::new(mock.into_connection()));
        let err = repo.upsert_and_link("rust", "p1").await.unwrap_err();

        assert!(matches!(err, AppError::Conflict(_)));
    }

    #[tokio::test]
    async fn test_upsert_retries_after_losing_race() {
        let racer = create_test_hashtag("h1", "rust", 0);
        let linked = hashtag::Model {
            posts_count: 1,
            ..racer.clone()
        };
        let lost_race = unique_violations(1).await;

        // First attempt loses the insert race; the second finds the winner's row.
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([Vec::<hashtag::Model>::new()])
            .append_query_errors(lost_race)
            .append_query_results([[racer]])
            .append_query_results([Vec::<hashtag_post::Model>::new()])
            .append_query_results([[linked]])
            .append_exec_results([
                MockExecResult {
                    last_insert_id: 0,
                    rows_affected: 1,
                },
                MockExecResult {
                    last_insert_id: 0,
                    rows_affected: 1,
                },
            ])
            .into_connection();

        let repo = HashtagRepository::new(Arc::new(db));
        let tag = repo.upsert_and_link("rust", "p1").await.unwrap();

        assert_eq!(tag.id, "h1");
        assert_eq!(tag.posts_count, 1);
    }

    #[tokio::test]
    async fn test_unlink_post_resets_recency_to_surviving_links() {
        let (db, repo) = repo_with_posts(&["p1", "p2", "p3"]).await;
        let base = Utc::now();
        link_at(&db, &repo, "a", "p1", base - Duration::minutes(10)).await;
        link_at(&db, &repo, "b", "p3", base - Duration::minutes(5)).await;
        link_at(&db, &repo, "a", "p2", base).await;

        repo.unlink_post("p2").await.unwrap();

        // a's only remaining link is older than b's
        let names: Vec<String> = repo
            .find_trending(10)
            .await
            .unwrap()
            .into_iter()
            .map(|t| t.name)
            .collect();
        assert_eq!(names, vec!["b", "a"]);

        repo.unlink_post("p1").await.unwrap();
        let a = repo.find_by_name("a").await.unwrap().unwrap();
        assert_eq!(a.posts_count, 0);
        assert!(a.last_used_at.is_none());
    }

    #[tokio::test]
    async fn test_relink_post_keeps_unchanged_link_times() {
        let (db, repo) = repo_with_posts(&["p1"]).await;
        let earlier = Utc::now() - Duration::hours(1);
        link_at(&db, &repo, "kept", "p1", earlier).await;
        link_at(&db, &repo, "old", "p1", earlier).await;

        repo.relink_post(&["kept".to_string(), "new".to_string()], "p1")
            .await
            .unwrap();

        let cutoff = Utc::now() - Duration::minutes(30);
        let kept = repo.find_by_name("kept").await.unwrap().unwrap();
        assert_eq!(kept.posts_count, 1);
        assert!(kept.last_used_at.unwrap().with_timezone(&Utc) < cutoff);

        let links = repo.find_links(&[kept.id]).await.unwrap();
        assert_eq!(links.len(), 1);
        assert!(links[0].created_at.with_timezone(&Utc) < cutoff);

        let old = repo.find_by_name("old").await.unwrap().unwrap();
        assert_eq!(old.posts_count, 0);
        assert!(old.last_used_at.is_none());

        let new = repo.find_by_name("new").await.unwrap().unwrap();
        assert!(new.last_used_at.unwrap().with_timezone(&Utc) > cutoff);
    }

    #[tokio::test]
    async fn test_search_matches_wildcards_literally() {
        let (_db, repo) = repo_with_posts(&["p1"]).await;
        repo.link_all(
            &["my_tag".to_string(), "myxtag".to_string(), "other".to_string()],
            "p1",
        )
        .await
        .unwrap();

        let names: Vec<String> = repo
            .search("my_", 10)
            .await
            .unwrap()
            .into_iter()
            .map(|t| t.name)
            .collect();
        assert_eq!(names, vec!["my_tag"]);

        assert_eq!(repo.search("my", 10).await.unwrap().len(), 2);
        assert!(repo.search("%", 10).await.unwrap().is_empty());
    }

    #[test]
    fn test_escape_like() {
        assert_eq!(escape_like("my_tag"), "my\\_tag");
        assert_eq!(escape_like("100%"), "100\\%");
        assert_eq!(escape_like("a\\b"), "a\\\\b");
        assert_eq!(escape_like("plain"), "plain");
    }
}
