use async_trait::async_trait;
use sqlx::PgPool;

use super::repo_types::{NewPost, Post, PostChanges, PostView, PostWithOwnerRow};
use crate::error::AppResult;

/// Post store. Listing order is ascending id so pages are stable.
#[async_trait]
pub trait PostRepo: Send + Sync {
    async fn create(&self, post: NewPost) -> AppResult<Post>;
    async fn count(&self) -> AppResult<i64>;
    async fn list_page(&self, limit: i64, offset: i64) -> AppResult<Vec<PostView>>;
    async fn list_by_owner(&self, user_id: i64) -> AppResult<Vec<PostView>>;
    async fn find(&self, id: i64) -> AppResult<Option<Post>>;
    async fn find_view(&self, id: i64) -> AppResult<Option<PostView>>;
    async fn update(&self, id: i64, changes: PostChanges) -> AppResult<()>;
    /// Returns `false` when no post had that id.
    async fn delete(&self, id: i64) -> AppResult<bool>;
}

const VIEW_SELECT: &str = r#"
    SELECT b.id, b.user_id, b.title, b.description, b.image,
           u.first_name, u.last_name, u.email, u.phone
      FROM blogs b
      JOIN users u ON u.id = b.user_id
"#;

#[derive(Clone)]
pub struct PgPostRepo {
    db: PgPool,
}

impl PgPostRepo {
    pub fn new(db: PgPool) -> Self {
        Self { db }
    }
}

#[async_trait]
impl PostRepo for PgPostRepo {
    async fn create(&self, post: NewPost) -> AppResult<Post> {
        let row = sqlx::query_as::<_, Post>(
            r#"
            INSERT INTO blogs (user_id, title, description, image)
            VALUES ($1, $2, $3, $4)
            RETURNING id, user_id, title, description, image, created_at
            "#,
        )
        .bind(post.user_id)
        .bind(&post.title)
        .bind(&post.description)
        .bind(&post.image)
        .fetch_one(&self.db)
        .await?;
        Ok(row)
    }

    async fn count(&self) -> AppResult<i64> {
        let (total,): (i64,) = sqlx::query_as("SELECT COUNT(*) FROM blogs")
            .fetch_one(&self.db)
            .await?;
        Ok(total)
    }

    async fn list_page(&self, limit: i64, offset: i64) -> AppResult<Vec<PostView>> {
        let rows = sqlx::query_as::<_, PostWithOwnerRow>(&format!(
            "{VIEW_SELECT} ORDER BY b.id ASC LIMIT $1 OFFSET $2"
        ))
        .bind(limit)
        .bind(offset)
        .fetch_all(&self.db)
        .await?;
        Ok(rows.into_iter().map(PostView::from).collect())
    }

    async fn list_by_owner(&self, user_id: i64) -> AppResult<Vec<PostView>> {
        let rows = sqlx::query_as::<_, PostWithOwnerRow>(&format!(
            "{VIEW_SELECT} WHERE b.user_id = $1 ORDER BY b.id ASC"
        ))
        .bind(user_id)
        .fetch_all(&self.db)
        .await?;
        Ok(rows.into_iter().map(PostView::from).collect())
    }

    async fn find(&self, id: i64) -> AppResult<Option<Post>> {
        let row = sqlx::query_as::<_, Post>(
            r#"
            SELECT id, user_id, title, description, image, created_at
              FROM blogs
             WHERE id = $1
            "#,
        )
        .bind(id)
        .fetch_optional(&self.db)
        .await?;
        Ok(row)
    }

    async fn find_view(&self, id: i64) -> AppResult<Option<PostView>> {
        let row = sqlx::query_as::<_, PostWithOwnerRow>(&format!("{VIEW_SELECT} WHERE b.id = $1"))
            .bind(id)
            .fetch_optional(&self.db)
            .await?;
        Ok(row.map(PostView::from))
    }

    async fn update(&self, id: i64, changes: PostChanges) -> AppResult<()> {
        sqlx::query(
            r#"
            UPDATE blogs
               SET title = $2,
                   description = $3,
                   image = COALESCE($4, image)
             WHERE id = $1
            "#,
        )
        .bind(id)
        .bind(&changes.title)
        .bind(&changes.description)
        .bind(&changes.image)
        .execute(&self.db)
        .await?;
        Ok(())
    }

    async fn delete(&self, id: i64) -> AppResult<bool> {
        let result = sqlx::query("DELETE FROM blogs WHERE id = $1")
            .bind(id)
            .execute(&self.db)
            .await?;
        Ok(result.rows_affected() > 0)
    }
}
