//! Content catalog and watchlist repository.

use sqlx::PgPool;
use uuid::Uuid;

use crate::entities::{ContentEntity, MemberContentEntity};
use crate::metrics::QueryTimer;

/// Fields of a new catalog entry.
#[derive(Debug, Clone, Copy)]
pub struct NewContent<'a> {
    pub title: &'a str,
    pub description: Option<&'a str>,
    pub category: &'a str,
    pub thumbnail_path: Option<&'a str>,
    pub video_1080_path: Option<&'a str>,
    pub video_4k_path: Option<&'a str>,
}

/// Partial update of a catalog entry; `None` keeps the stored value.
#[derive(Debug, Clone, Copy, Default)]
pub struct ContentChanges<'a> {
    pub title: Option<&'a str>,
    pub description: Option<&'a str>,
    pub category: Option<&'a str>,
    pub thumbnail_path: Option<&'a str>,
    pub video_1080_path: Option<&'a str>,
    pub video_4k_path: Option<&'a str>,
}

/// Repository for the content catalog and member watchlists.
#[derive(Clone)]
pub struct ContentRepository {
    pool: PgPool,
}

impl ContentRepository {
    /// Creates a new ContentRepository with the given connection pool.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Catalog newest first, optionally filtered by category, flagged with
    /// the member's watchlist entries.
    pub async fn list_for_member(
        &self,
        user_id: Uuid,
        category: Option<&str>,
    ) -> Result<Vec<MemberContentEntity>, sqlx::Error> {
        let timer = QueryTimer::new("list_content_for_member");
        let result = sqlx::query_as::<_, MemberContentEntity>(
            r#"
            SELECT c.id, c.title, c.description, c.category, c.thumbnail_path,
                   c.video_1080_path, c.video_4k_path, c.created_at, c.updated_at,
                   (w.user_id IS NOT NULL) AS is_favorite
            FROM content c
            LEFT JOIN watchlist w ON w.content_id = c.id AND w.user_id = $1
            WHERE ($2::TEXT IS NULL OR c.category = $2)
            ORDER BY c.created_at DESC
            "#,
        )
        .bind(user_id)
        .bind(category)
        .fetch_all(&self.pool)
        .await;
        timer.record();
        result
    }

    /// A single entry with the member's watchlist flag.
    pub async fn find_for_member(
        &self,
        user_id: Uuid,
        content_id: Uuid,
    ) -> Result<Option<MemberContentEntity>, sqlx::Error> {
        let timer = QueryTimer::new("find_content_for_member");
        let result = sqlx::query_as::<_, MemberContentEntity>(
            r#"
            SELECT c.id, c.title, c.description, c.category, c.thumbnail_path,
                   c.video_1080_path, c.video_4k_path, c.created_at, c.updated_at,
                   (w.user_id IS NOT NULL) AS is_favorite
            FROM content c
            LEFT JOIN watchlist w ON w.content_id = c.id AND w.user_id = $1
            WHERE c.id = $2
            "#,
        )
        .bind(user_id)
        .bind(content_id)
        .fetch_optional(&self.pool)
        .await;
        timer.record();
        result
    }

    /// Distinct categories, sorted.
    pub async fn categories(&self) -> Result<Vec<String>, sqlx::Error> {
        let timer = QueryTimer::new("list_content_categories");
        let result =
            sqlx::query_scalar::<_, String>(r#"SELECT DISTINCT category FROM content ORDER BY category"#)
                .fetch_all(&self.pool)
                .await;
        timer.record();
        result
    }

    /// Whole catalog newest first, for the admin board.
    pub async fn list_all(&self) -> Result<Vec<ContentEntity>, sqlx::Error> {
        let timer = QueryTimer::new("list_all_content");
        let result = sqlx::query_as::<_, ContentEntity>(
            r#"
            SELECT id, title, description, category, thumbnail_path,
                   video_1080_path, video_4k_path, created_at, updated_at
            FROM content
            ORDER BY created_at DESC
            "#,
        )
        .fetch_all(&self.pool)
        .await;
        timer.record();
        result
    }

    pub async fn create(&self, content: NewContent<'_>) -> Result<ContentEntity, sqlx::Error> {
        let timer = QueryTimer::new("create_content");
        let result = sqlx::query_as::<_, ContentEntity>(
            r#"
            INSERT INTO content (title, description, category, thumbnail_path,
                                 video_1080_path, video_4k_path)
            VALUES ($1, $2, $3, $4, $5, $6)
            RETURNING id, title, description, category, thumbnail_path,
                      video_1080_path, video_4k_path, created_at, updated_at
            "#,
        )
        .bind(content.title)
        .bind(content.description)
        .bind(content.category)
        .bind(content.thumbnail_path)
        .bind(content.video_1080_path)
        .bind(content.video_4k_path)
        .fetch_one(&self.pool)
        .await;
        timer.record();
        result
    }

    /// Applies `changes`; returns `None` for an unknown id.
    pub async fn update(
        &self,
        content_id: Uuid,
        changes: ContentChanges<'_>,
    ) -> Result<Option<ContentEntity>, sqlx::Error> {
        let timer = QueryTimer::new("update_content");
        let result = sqlx::query_as::<_, ContentEntity>(
            r#"
            UPDATE content
            SET title = COALESCE($2, title),
                description = COALESCE($3, description),
                category = COALESCE($4, category),
                thumbnail_path = COALESCE($5, thumbnail_path),
                video_1080_path = COALESCE($6, video_1080_path),
                video_4k_path = COALESCE($7, video_4k_path),
                updated_at = NOW()
            WHERE id = $1
            RETURNING id, title, description, category, thumbnail_path,
                      video_1080_path, video_4k_path, created_at, updated_at
            "#,
        )
        .bind(content_id)
        .bind(changes.title)
        .bind(changes.description)
        .bind(changes.category)
        .bind(changes.thumbnail_path)
        .bind(changes.video_1080_path)
        .bind(changes.video_4k_path)
        .fetch_optional(&self.pool)
        .await;
        timer.record();
        result
    }

    /// Deletes an entry and, through the foreign key, its watchlist rows.
    pub async fn delete(&self, content_id: Uuid) -> Result<u64, sqlx::Error> {
        let timer = QueryTimer::new("delete_content");
        let result = sqlx::query(r#"DELETE FROM content WHERE id = $1"#)
            .bind(content_id)
            .execute(&self.pool)
            .await;
        timer.record();
        Ok(result?.rows_affected())
    }

    /// Newest entries of one category.
    pub async fn latest_in_category(
        &self,
        category: &str,
        limit: i64,
    ) -> Result<Vec<ContentEntity>, sqlx::Error> {
        let timer = QueryTimer::new("latest_content_in_category");
        let result = sqlx::query_as::<_, ContentEntity>(
            r#"
            SELECT id, title, description, category, thumbnail_path,
                   video_1080_path, video_4k_path, created_at, updated_at
            FROM content
            WHERE category = $1
            ORDER BY created_at DESC
            LIMIT $2
            "#,
        )
        .bind(category)
        .bind(limit)
        .fetch_all(&self.pool)
        .await;
        timer.record();
        result
    }

    /// Adds an entry to a member's watchlist. Adding it twice is a no-op.
    ///
    /// Returns `false` when the content does not exist.
    pub async fn add_to_watchlist(
        &self,
        user_id: Uuid,
        content_id: Uuid,
    ) -> Result<bool, sqlx::Error> {
        let timer = QueryTimer::new("add_to_watchlist");
        let result = sqlx::query_scalar::<_, bool>(
            r#"
            WITH target AS (
                SELECT id FROM content WHERE id = $2
            ), inserted AS (
                INSERT INTO watchlist (user_id, content_id)
                SELECT $1, id FROM target
                ON CONFLICT (user_id, content_id) DO NOTHING
                RETURNING content_id
            )
            SELECT EXISTS (SELECT 1 FROM target)
            "#,
        )
        .bind(user_id)
        .bind(content_id)
        .fetch_one(&self.pool)
        .await;
        timer.record();
        result
    }

    /// A member's watchlist, most recently added first.
    pub async fn watchlist(&self, user_id: Uuid) -> Result<Vec<ContentEntity>, sqlx::Error> {
        let timer = QueryTimer::new("list_watchlist");
        let result = sqlx::query_as::<_, ContentEntity>(
            r#"
            SELECT c.id, c.title, c.description, c.category, c.thumbnail_path,
                   c.video_1080_path, c.video_4k_path, c.created_at, c.updated_at
            FROM watchlist w
            JOIN content c ON c.id = w.content_id
            WHERE w.user_id = $1
            ORDER BY w.created_at DESC
            "#,
        )
        .bind(user_id)
        .fetch_all(&self.pool)
        .await;
        timer.record();
        result
    }

    pub async fn remove_from_watchlist(
        &self,
        user_id: Uuid,
        content_id: Uuid,
    ) -> Result<u64, sqlx::Error> {
        let timer = QueryTimer::new("remove_from_watchlist");
        let result = sqlx::query(r#"DELETE FROM watchlist WHERE user_id = $1 AND content_id = $2"#)
            .bind(user_id)
            .bind(content_id)
            .execute(&self.pool)
            .await;
        timer.record();
        Ok(result?.rows_affected())
    }
}
