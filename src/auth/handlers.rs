use axum::{
    extract::{FromRef, State},
    routing::post,
    Json, Router,
};
use axum_extra::extract::cookie::CookieJar;
use tracing::{info, instrument};

use crate::{
    auth::{
        dto::{AuthResponse, LoginRequest, RegisterRequest},
        jwt::{cleared_session_cookie, SessionKeys},
        services::{authenticate, register_user},
    },
    error::{AppResult, MessageBody},
    extract::AppJson,
    state::AppState,
};

pub fn auth_routes() -> Router<AppState> {
    Router::new()
        .route("/register", post(register))
        .route("/login", post(login))
        .route("/logout", post(logout))
}

#[instrument(skip(state, payload))]
pub async fn register(
    State(state): State<AppState>,
    AppJson(payload): AppJson<RegisterRequest>,
) -> AppResult<Json<AuthResponse>> {
    let user = register_user(state.users.as_ref(), payload).await?;
    Ok(Json(AuthResponse {
        user: user.into(),
        message: "User registered successfully".into(),
    }))
}

#[instrument(skip(state, jar, payload))]
pub async fn login(
    State(state): State<AppState>,
    jar: CookieJar,
    AppJson(payload): AppJson<LoginRequest>,
) -> AppResult<(CookieJar, Json<AuthResponse>)> {
    let user = authenticate(state.users.as_ref(), &payload.email, &payload.password).await?;

    let keys = SessionKeys::from_ref(&state);
    let token = keys.issue(user.id)?;

    info!(user_id = user.id, email = %user.email, "user logged in");
    Ok((
        jar.add(keys.session_cookie(token)),
        Json(AuthResponse {
            user: user.into(),
            message: "Login successful".into(),
        }),
    ))
}

/// Stateless: tokens stay valid until expiry, only the cookie is dropped.
#[instrument(skip(jar))]
pub async fn logout(jar: CookieJar) -> (CookieJar, Json<MessageBody>) {
    (
        jar.add(cleared_session_cookie()),
        Json(MessageBody {
            message: "Logout successful".into(),
        }),
    )
}
