use tracing::{error, info, warn};

use super::{
    dto::{PageMeta, PostPage},
    repo::PostRepo,
    repo_types::{NewPost, Post, PostChanges, PostView},
};
use crate::error::{AppError, AppResult};

pub const PAGE_SIZE: i64 = 5;

/// Clamps the requested page to >= 1 and derives offset and last page.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Pagination {
    pub page: i64,
    pub limit: i64,
}

impl Pagination {
    pub fn new(page: Option<i64>) -> Self {
        Self {
            page: page.unwrap_or(1).max(1),
            limit: PAGE_SIZE,
        }
    }

    pub fn offset(&self) -> i64 {
        (self.page - 1).saturating_mul(self.limit)
    }

    pub fn last_page(&self, total: i64) -> i64 {
        (total + self.limit - 1) / self.limit
    }
}

/// Empty strings mean "no image".
fn non_empty(image: Option<String>) -> Option<String> {
    image.filter(|s| !s.trim().is_empty())
}

pub async fn create_post(
    posts: &dyn PostRepo,
    owner_id: i64,
    title: String,
    description: String,
    image: Option<String>,
) -> AppResult<Post> {
    if owner_id <= 0 {
        warn!(owner_id, "create_post with sentinel user id");
        return Err(AppError::Auth("Invalid user ID from token".into()));
    }
    let post = posts
        .create(NewPost {
            user_id: owner_id,
            title,
            description,
            image: non_empty(image),
        })
        .await
        .map_err(|e| {
            error!(error = %e, owner_id, "create post failed");
            AppError::Validation("Invalid payload".into())
        })?;
    info!(post_id = post.id, owner_id, "post created");
    Ok(post)
}

pub async fn list_page(posts: &dyn PostRepo, page: Option<i64>) -> AppResult<PostPage> {
    let p = Pagination::new(page);
    let data = posts.list_page(p.limit, p.offset()).await?;
    let total = posts.count().await?;
    Ok(PostPage {
        data,
        meta: PageMeta {
            total,
            page: p.page,
            last_page: p.last_page(total),
        },
    })
}

pub async fn detail(posts: &dyn PostRepo, id: i64) -> AppResult<PostView> {
    posts
        .find_view(id)
        .await?
        .ok_or_else(|| AppError::NotFound("Post not found".into()))
}

/// Loads the post and checks the caller owns it.
async fn owned_post(posts: &dyn PostRepo, user_id: i64, id: i64, action: &str) -> AppResult<Post> {
    let post = posts
        .find(id)
        .await?
        .ok_or_else(|| AppError::NotFound("Post not found".into()))?;
    if post.user_id != user_id {
        warn!(post_id = id, owner_id = post.user_id, user_id, action, "not the owner");
        return Err(AppError::Forbidden(format!(
            "You are not authorized to {action} this post"
        )));
    }
    Ok(post)
}

pub async fn update_post(
    posts: &dyn PostRepo,
    user_id: i64,
    id: i64,
    title: String,
    description: String,
    image: Option<String>,
) -> AppResult<PostView> {
    owned_post(posts, user_id, id, "update").await?;

    let changes = PostChanges {
        title,
        description,
        image: non_empty(image),
    };
    posts.update(id, changes).await.map_err(|e| {
        error!(error = %e, post_id = id, "update post failed");
        AppError::Internal(anyhow::anyhow!("Failed to update post"))
    })?;

    info!(post_id = id, user_id, "post updated");
    detail(posts, id).await
}

pub async fn delete_post(posts: &dyn PostRepo, user_id: i64, id: i64) -> AppResult<()> {
    owned_post(posts, user_id, id, "delete").await?;
    if !posts.delete(id).await? {
        return Err(AppError::NotFound("Post not found".into()));
    }
    info!(post_id = id, user_id, "post deleted");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::repo::UserRepo;
    use crate::auth::repo_types::NewUser;
    use crate::memory::MemoryStore;

    async fn user(store: &MemoryStore, email: &str) -> i64 {
        UserRepo::create(
            store,
            NewUser {
                first_name: "F".into(),
                last_name: "L".into(),
                email: email.into(),
                password_hash: "hash".into(),
                phone: "1".into(),
            },
        )
        .await
        .unwrap()
        .id
    }

    #[test]
    fn pagination_math() {
        let p = Pagination::new(Some(2));
        assert_eq!(p.offset(), 5);
        assert_eq!(p.last_page(12), 3);
        assert_eq!(p.last_page(10), 2);
        assert_eq!(p.last_page(0), 0);
        assert_eq!(Pagination::new(None).page, 1);
        assert_eq!(Pagination::new(Some(-3)).offset(), 0);
    }

    #[tokio::test]
    async fn second_page_of_twelve() {
        let store = MemoryStore::new();
        let owner = user(&store, "o@example.com").await;
        for i in 0..12 {
            create_post(&store, owner, format!("t{i}"), "d".into(), None)
                .await
                .unwrap();
        }
        let page = list_page(&store, Some(2)).await.unwrap();
        assert_eq!(page.data.len(), 5);
        assert_eq!(page.data[0].title, "t5");
        assert_eq!(page.meta.total, 12);
        assert_eq!(page.meta.page, 2);
        assert_eq!(page.meta.last_page, 3);

        let last = list_page(&store, Some(3)).await.unwrap();
        assert_eq!(last.data.len(), 2);
    }

    #[tokio::test]
    async fn sentinel_owner_is_rejected() {
        let store = MemoryStore::new();
        let err = create_post(&store, 0, "t".into(), "d".into(), None)
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::Auth(_)));
    }

    #[tokio::test]
    async fn create_for_missing_owner_is_invalid_payload() {
        let store = MemoryStore::new();
        let err = create_post(&store, 99, "t".into(), "d".into(), None)
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::Validation(ref m) if m == "Invalid payload"));
    }

    #[tokio::test]
    async fn only_owner_updates() {
        let store = MemoryStore::new();
        let a = user(&store, "a@example.com").await;
        let b = user(&store, "b@example.com").await;
        let post = create_post(&store, a, "t".into(), "d".into(), Some("img.png".into()))
            .await
            .unwrap();

        let err = update_post(&store, b, post.id, "x".into(), "y".into(), None)
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::Forbidden(_)));

        let view = update_post(&store, a, post.id, "new".into(), "body".into(), Some(String::new()))
            .await
            .unwrap();
        assert_eq!(view.title, "new");
        assert_eq!(view.desc, "body");
        assert_eq!(view.image.as_deref(), Some("img.png"));
        assert_eq!(view.user.email, "a@example.com");

        let view = update_post(&store, a, post.id, "new".into(), "body".into(), Some("b.gif".into()))
            .await
            .unwrap();
        assert_eq!(view.image.as_deref(), Some("b.gif"));
    }

    #[tokio::test]
    async fn update_missing_post_is_not_found() {
        let store = MemoryStore::new();
        let a = user(&store, "a@example.com").await;
        let err = update_post(&store, a, 42, "x".into(), "y".into(), None)
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::NotFound(_)));
    }

    #[tokio::test]
    async fn delete_is_owner_only_and_reports_missing() {
        let store = MemoryStore::new();
        let a = user(&store, "a@example.com").await;
        let b = user(&store, "b@example.com").await;
        let post = create_post(&store, a, "t".into(), "d".into(), None).await.unwrap();

        assert!(matches!(
            delete_post(&store, b, post.id).await.unwrap_err(),
            AppError::Forbidden(_)
        ));
        delete_post(&store, a, post.id).await.unwrap();
        assert!(matches!(
            delete_post(&store, a, post.id).await.unwrap_err(),
            AppError::NotFound(_)
        ));
        assert!(matches!(detail(&store, post.id).await.unwrap_err(), AppError::NotFound(_)));
    }
}
