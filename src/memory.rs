//! In-process implementation of the user and post stores.
//!
//! Used by tests and by `STORE=memory` local runs. Both tables live behind
//! one lock, so the email check and the insert happen atomically and post
//! views can join their owner.

use std::collections::BTreeMap;
use std::sync::{Mutex, MutexGuard};

use async_trait::async_trait;
use time::OffsetDateTime;
use tracing::{debug, warn};

use crate::auth::repo::UserRepo;
use crate::auth::repo_types::{NewUser, PublicUser, User};
use crate::error::{AppError, AppResult};
use crate::posts::repo::PostRepo;
use crate::posts::repo_types::{NewPost, Post, PostChanges, PostView};

#[derive(Default)]
struct Tables {
    users: BTreeMap<i64, User>,
    posts: BTreeMap<i64, Post>,
    next_user_id: i64,
    next_post_id: i64,
}

impl Tables {
    fn view(&self, post: &Post) -> AppResult<PostView> {
        let owner = self.users.get(&post.user_id).ok_or_else(|| {
            AppError::Internal(anyhow::anyhow!(
                "post {} references missing user {}",
                post.id,
                post.user_id
            ))
        })?;
        Ok(PostView {
            id: post.id,
            user_id: post.user_id,
            title: post.title.clone(),
            desc: post.description.clone(),
            image: post.image.clone(),
            user: PublicUser::from(owner.clone()),
        })
    }
}

#[derive(Default)]
pub struct MemoryStore {
    tables: Mutex<Tables>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn tables(&self) -> AppResult<MutexGuard<'_, Tables>> {
        self.tables
            .lock()
            .map_err(|_| AppError::Internal(anyhow::anyhow!("memory store lock poisoned")))
    }
}

#[async_trait]
impl UserRepo for MemoryStore {
    async fn find_by_email(&self, email: &str) -> AppResult<Option<User>> {
        let tables = self.tables()?;
        Ok(tables.users.values().find(|u| u.email == email).cloned())
    }

    async fn create(&self, user: NewUser) -> AppResult<User> {
        let mut tables = self.tables()?;
        if tables.users.values().any(|u| u.email == user.email) {
            warn!(email = %user.email, "duplicate email in memory store");
            return Err(AppError::Conflict("Email already exists".into()));
        }
        tables.next_user_id += 1;
        let user = User {
            id: tables.next_user_id,
            first_name: user.first_name,
            last_name: user.last_name,
            email: user.email,
            password_hash: user.password_hash,
            phone: user.phone,
            created_at: OffsetDateTime::now_utc(),
        };
        tables.users.insert(user.id, user.clone());
        debug!(user_id = user.id, "user stored in memory");
        Ok(user)
    }
}

#[async_trait]
impl PostRepo for MemoryStore {
    async fn create(&self, post: NewPost) -> AppResult<Post> {
        let mut tables = self.tables()?;
        if !tables.users.contains_key(&post.user_id) {
            return Err(AppError::Internal(anyhow::anyhow!(
                "user {} does not exist",
                post.user_id
            )));
        }
        tables.next_post_id += 1;
        let post = Post {
            id: tables.next_post_id,
            user_id: post.user_id,
            title: post.title,
            description: post.description,
            image: post.image,
            created_at: OffsetDateTime::now_utc(),
        };
        tables.posts.insert(post.id, post.clone());
        debug!(post_id = post.id, "post stored in memory");
        Ok(post)
    }

    async fn count(&self) -> AppResult<i64> {
        Ok(self.tables()?.posts.len() as i64)
    }

    async fn list_page(&self, limit: i64, offset: i64) -> AppResult<Vec<PostView>> {
        let tables = self.tables()?;
        let skip = usize::try_from(offset).unwrap_or(0);
        let take = usize::try_from(limit).unwrap_or(0);
        tables
            .posts
            .values()
            .skip(skip)
            .take(take)
            .map(|p| tables.view(p))
            .collect()
    }

    async fn list_by_owner(&self, user_id: i64) -> AppResult<Vec<PostView>> {
        let tables = self.tables()?;
        tables
            .posts
            .values()
            .filter(|p| p.user_id == user_id)
            .map(|p| tables.view(p))
            .collect()
    }

    async fn find(&self, id: i64) -> AppResult<Option<Post>> {
        Ok(self.tables()?.posts.get(&id).cloned())
    }

    async fn find_view(&self, id: i64) -> AppResult<Option<PostView>> {
        let tables = self.tables()?;
        tables.posts.get(&id).map(|p| tables.view(p)).transpose()
    }

    async fn update(&self, id: i64, changes: PostChanges) -> AppResult<()> {
        let mut tables = self.tables()?;
        if let Some(post) = tables.posts.get_mut(&id) {
            post.title = changes.title;
            post.description = changes.description;
            if let Some(image) = changes.image {
                post.image = Some(image);
            }
        }
        Ok(())
    }

    async fn delete(&self, id: i64) -> AppResult<bool> {
        Ok(self.tables()?.posts.remove(&id).is_some())
    }
}
