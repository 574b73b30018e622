use axum::{
    extract::{FromRef, Request, State},
    middleware::Next,
    response::Response,
};
use axum_extra::extract::cookie::CookieJar;
use tracing::debug;

use super::jwt::{session_token, SessionKeys};
use crate::{error::AppError, state::AppState};

/// Outer gate for every protected route: rejects with 401 before the handler
/// runs unless the `jwt` cookie holds a valid, unexpired session token.
///
/// Usage: `.route_layer(middleware::from_fn_with_state(state.clone(), require_session))`
pub async fn require_session(
    State(state): State<AppState>,
    jar: CookieJar,
    req: Request,
    next: Next,
) -> Result<Response, AppError> {
    let keys = SessionKeys::from_ref(&state);
    let user_id = keys.verify(session_token(&jar)?)?;
    debug!(user_id, uri = %req.uri(), "session accepted");
    Ok(next.run(req).await)
}
