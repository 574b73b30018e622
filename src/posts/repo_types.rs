use serde::Serialize;
use sqlx::FromRow;
use time::OffsetDateTime;

use crate::auth::repo_types::PublicUser;

/// Row of the `blogs` table.
#[derive(Debug, Clone, Serialize, FromRow)]
pub struct Post {
    pub id: i64,
    pub user_id: i64,
    pub title: String,
    pub description: String,
    pub image: Option<String>,
    #[serde(with = "time::serde::rfc3339")]
    pub created_at: OffsetDateTime,
}

/// `blogs` joined with the owning user's public columns.
#[derive(Debug, Clone, FromRow)]
pub struct PostWithOwnerRow {
    pub id: i64,
    pub user_id: i64,
    pub title: String,
    pub description: String,
    pub image: Option<String>,
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub phone: String,
}

/// Post as returned to clients, owner joined under `User`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PostView {
    pub id: i64,
    pub user_id: i64,
    pub title: String,
    pub desc: String,
    pub image: Option<String>,
    #[serde(rename = "User")]
    pub user: PublicUser,
}

impl From<PostWithOwnerRow> for PostView {
    fn from(r: PostWithOwnerRow) -> Self {
        Self {
            id: r.id,
            user_id: r.user_id,
            title: r.title,
            desc: r.description,
            image: r.image,
            user: PublicUser {
                id: r.user_id,
                first_name: r.first_name,
                last_name: r.last_name,
                email: r.email,
                phone: r.phone,
            },
        }
    }
}

#[derive(Debug, Clone)]
pub struct NewPost {
    pub user_id: i64,
    pub title: String,
    pub description: String,
    pub image: Option<String>,
}

/// Title and description are always written; `image: None` keeps the
/// stored image.
#[derive(Debug, Clone)]
pub struct PostChanges {
    pub title: String,
    pub description: String,
    pub image: Option<String>,
}
