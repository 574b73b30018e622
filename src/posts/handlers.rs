use axum::{
    extract::State,
    routing::{delete, get, post, put},
    Json, Router,
};
use tracing::instrument;

use super::{
    dto::{
        CreatePostRequest, ListQuery, PostDetail, PostList, PostPage, UpdatePostRequest,
        UpdatedPost,
    },
    services,
};
use crate::{
    auth::AuthUser,
    error::{AppResult, MessageBody},
    extract::{AppJson, AppPath, AppQuery},
    state::AppState,
};

pub fn post_routes() -> Router<AppState> {
    Router::new()
        .route("/post", post(create_post))
        .route("/posts", get(list_posts))
        .route("/posts/unique", get(my_posts))
        .route("/posts/:id", get(get_post))
        .route("/posts/update/:id", put(update_post))
        .route("/posts/delete/:id", delete(delete_post))
}

/// The gate has already checked the cookie; `AuthUser` re-verifies it to
/// obtain the owner id.
#[instrument(skip(state, payload))]
pub async fn create_post(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    AppJson(payload): AppJson<CreatePostRequest>,
) -> AppResult<Json<MessageBody>> {
    services::create_post(
        state.posts.as_ref(),
        user_id,
        payload.title,
        payload.desc,
        payload.image,
    )
    .await?;
    Ok(Json(MessageBody {
        message: "Post created successfully".into(),
    }))
}

#[instrument(skip(state))]
pub async fn list_posts(
    State(state): State<AppState>,
    AppQuery(q): AppQuery<ListQuery>,
) -> AppResult<Json<PostPage>> {
    Ok(Json(services::list_page(state.posts.as_ref(), q.page).await?))
}

/// Posts owned by the caller; an unusable session yields an empty list.
#[instrument(skip(state))]
pub async fn my_posts(
    State(state): State<AppState>,
    user: Option<AuthUser>,
) -> AppResult<Json<PostList>> {
    let data = match user {
        Some(AuthUser(user_id)) => state.posts.list_by_owner(user_id).await?,
        None => Vec::new(),
    };
    Ok(Json(PostList { data }))
}

#[instrument(skip(state))]
pub async fn get_post(
    State(state): State<AppState>,
    AppPath(id): AppPath<i64>,
) -> AppResult<Json<PostDetail>> {
    let data = services::detail(state.posts.as_ref(), id).await?;
    Ok(Json(PostDetail { data }))
}

#[instrument(skip(state, payload))]
pub async fn update_post(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    AppPath(id): AppPath<i64>,
    AppJson(payload): AppJson<UpdatePostRequest>,
) -> AppResult<Json<UpdatedPost>> {
    let data = services::update_post(
        state.posts.as_ref(),
        user_id,
        id,
        payload.title,
        payload.desc,
        payload.image,
    )
    .await?;
    Ok(Json(UpdatedPost {
        message: "Post updated successfully".into(),
        data,
    }))
}

#[instrument(skip(state))]
pub async fn delete_post(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    AppPath(id): AppPath<i64>,
) -> AppResult<Json<MessageBody>> {
    services::delete_post(state.posts.as_ref(), user_id, id).await?;
    Ok(Json(MessageBody {
        message: "Post deleted successfully".into(),
    }))
}
