use axum::{
    async_trait,
    extract::{FromRef, FromRequestParts},
    http::request::Parts,
};
use axum_extra::extract::cookie::{Cookie, CookieJar, SameSite};
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use time::{Duration, OffsetDateTime};
use tracing::{debug, warn};

use crate::{error::AppError, state::AppState};

/// Name of the cookie carrying the session token.
pub const SESSION_COOKIE: &str = "jwt";

/// Session token payload. `iss` carries the user id; `sub` repeats it for
/// browser clients that decode the token.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    pub iss: String,
    pub sub: String,
    pub iat: i64,
    pub exp: i64,
}

/// HMAC-SHA256 signing and verification keys plus session lifetime.
#[derive(Clone)]
pub struct SessionKeys {
    encoding: EncodingKey,
    decoding: DecodingKey,
    ttl: Duration,
}

impl FromRef<AppState> for SessionKeys {
    fn from_ref(state: &AppState) -> Self {
        let jwt = &state.config.jwt;
        Self::new(&jwt.secret, Duration::hours(jwt.ttl_hours))
    }
}

impl SessionKeys {
    pub fn new(secret: &str, ttl: Duration) -> Self {
        Self {
            encoding: EncodingKey::from_secret(secret.as_bytes()),
            decoding: DecodingKey::from_secret(secret.as_bytes()),
            ttl,
        }
    }

    pub fn issue(&self, user_id: i64) -> anyhow::Result<String> {
        self.issue_at(user_id, OffsetDateTime::now_utc())
    }

    pub fn issue_at(&self, user_id: i64, now: OffsetDateTime) -> anyhow::Result<String> {
        let exp = now + self.ttl;
        let claims = Claims {
            iss: user_id.to_string(),
            sub: user_id.to_string(),
            iat: now.unix_timestamp(),
            exp: exp.unix_timestamp(),
        };
        let token = encode(&Header::new(Algorithm::HS256), &claims, &self.encoding)?;
        debug!(user_id, "session token signed");
        Ok(token)
    }

    /// Checks signature and expiry only, then reads the user id from `iss`.
    pub fn verify(&self, token: &str) -> Result<i64, AppError> {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.leeway = 0;
        let data = decode::<Claims>(token, &self.decoding, &validation).map_err(|e| {
            warn!(error = %e, "session token rejected");
            AppError::unauthenticated()
        })?;
        let user_id = data
            .claims
            .iss
            .parse::<i64>()
            .ok()
            .filter(|id| *id > 0)
            .ok_or_else(|| {
                warn!(iss = %data.claims.iss, "session token carries no usable user id");
                AppError::unauthenticated()
            })?;
        debug!(user_id, "session token verified");
        Ok(user_id)
    }

    /// Cookie holding a freshly issued token; expires with the token.
    pub fn session_cookie(&self, token: String) -> Cookie<'static> {
        Cookie::build((SESSION_COOKIE, token))
            .http_only(true)
            .same_site(SameSite::Lax)
            .path("/")
            .max_age(self.ttl)
            .expires(OffsetDateTime::now_utc() + self.ttl)
            .build()
    }
}

/// Empty session cookie dated in the past, so the browser drops it.
pub fn cleared_session_cookie() -> Cookie<'static> {
    Cookie::build((SESSION_COOKIE, ""))
        .http_only(true)
        .same_site(SameSite::Lax)
        .path("/")
        .max_age(Duration::ZERO)
        .expires(OffsetDateTime::now_utc() - Duration::hours(1))
        .build()
}

/// Reads the raw session token from the request cookies.
pub fn session_token(jar: &CookieJar) -> Result<&str, AppError> {
    match jar.get(SESSION_COOKIE).map(|c| c.value()) {
        Some(token) if !token.is_empty() => Ok(token),
        _ => {
            warn!("missing session cookie");
            Err(AppError::unauthenticated())
        }
    }
}

/// Verified user id of the caller, read from the `jwt` cookie.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AuthUser(pub i64);

#[async_trait]
impl<S> FromRequestParts<S> for AuthUser
where
    S: Send + Sync,
    SessionKeys: FromRef<S>,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let keys = SessionKeys::from_ref(state);
        let jar = CookieJar::from_headers(&parts.headers);
        let token = session_token(&jar)?;
        Ok(AuthUser(keys.verify(token)?))
    }
}
