use serde::{Deserialize, Serialize};

use super::repo_types::PostView;

/// Body of `POST /api/post`. Any owner field sent by the client is ignored.
#[derive(Debug, Deserialize)]
pub struct CreatePostRequest {
    pub title: String,
    pub desc: String,
    #[serde(default)]
    pub image: Option<String>,
}

/// Body of `PUT /api/posts/update/:id`.
#[derive(Debug, Deserialize)]
pub struct UpdatePostRequest {
    pub title: String,
    pub desc: String,
    #[serde(default)]
    pub image: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct ListQuery {
    #[serde(default)]
    pub page: Option<i64>,
}

#[derive(Debug, Serialize)]
pub struct PageMeta {
    pub total: i64,
    pub page: i64,
    pub last_page: i64,
}

#[derive(Debug, Serialize)]
pub struct PostPage {
    pub data: Vec<PostView>,
    pub meta: PageMeta,
}

#[derive(Debug, Serialize)]
pub struct PostList {
    pub data: Vec<PostView>,
}

#[derive(Debug, Serialize)]
pub struct PostDetail {
    pub data: PostView,
}

#[derive(Debug, Serialize)]
pub struct UpdatedPost {
    pub message: String,
    pub data: PostView,
}
