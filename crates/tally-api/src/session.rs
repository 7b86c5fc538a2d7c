//! Cookie sessions
//!
//! The cookie carries a random token; session contents stay on the server
//! in memory and are lost on restart. A failed sign-in creates no session,
//! only a short-lived cookie naming the attempted user.

use axum::extract::{FromRef, FromRequestParts};
use axum::http::request::Parts;
use axum::response::{IntoResponse, Redirect, Response};
use axum_extra::extract::cookie::{Cookie, CookieJar, SameSite};
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;

use crate::AppState;

pub const COOKIE_NAME: &str = "tally_session";
/// Remembers the name of a failed sign-in for the login page
pub const WRONG_PASSWORD_COOKIE: &str = "tally_wrong_password";

const WRONG_PASSWORD_TTL: time::Duration = time::Duration::minutes(5);

/// Server-side contents of a signed-in session
#[derive(Debug, Clone, PartialEq)]
pub struct Session {
    pub name: String,
}

/// In-memory session table; only signed-in users have an entry
#[derive(Debug, Default, Clone)]
pub struct SessionStore {
    sessions: Arc<RwLock<HashMap<String, Session>>>,
}

impl SessionStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn get(&self, token: &str) -> Option<Session> {
        self.sessions.read().await.get(token).cloned()
    }

    /// Store a session under a freshly generated token
    pub async fn create(&self, session: Session) -> String {
        let token = tally_utils::generate_token();
        self.sessions.write().await.insert(token.clone(), session);
        token
    }

    pub async fn remove(&self, token: &str) {
        self.sessions.write().await.remove(token);
    }

    pub async fn len(&self) -> usize {
        self.sessions.read().await.len()
    }
}

fn base_cookie(name: &'static str, value: String, secure: bool) -> Cookie<'static> {
    Cookie::build((name, value))
        .path("/")
        .http_only(true)
        .same_site(SameSite::Lax)
        .secure(secure)
        .build()
}

/// Build the session cookie
pub fn session_cookie(token: String, secure: bool) -> Cookie<'static> {
    base_cookie(COOKIE_NAME, token, secure)
}

/// Build a cookie that removes `name` from the browser
pub fn removal_cookie(name: &'static str, secure: bool) -> Cookie<'static> {
    let mut cookie = base_cookie(name, String::new(), secure);
    cookie.set_max_age(time::Duration::ZERO);
    cookie
}

/// Short-lived cookie naming the user whose password was wrong
pub fn wrong_password_cookie(name: &str, secure: bool) -> Cookie<'static> {
    let mut cookie = base_cookie(WRONG_PASSWORD_COOKIE, urlencoding::encode(name).into_owned(), secure);
    cookie.set_max_age(WRONG_PASSWORD_TTL);
    cookie
}

/// Name remembered by [`wrong_password_cookie`]
pub fn wrong_password_name(jar: &CookieJar) -> Option<String> {
    let cookie = jar.get(WRONG_PASSWORD_COOKIE)?;
    urlencoding::decode(cookie.value())
        .ok()
        .map(|name| name.into_owned())
        .filter(|name| !name.is_empty())
}

// =============================================================================
// EXTRACTORS
// =============================================================================

/// The request's session token and signed-in user, if any
pub struct CurrentSession {
    pub token: Option<String>,
    pub name: Option<String>,
}

#[axum::async_trait]
impl<S> FromRequestParts<S> for CurrentSession
where
    AppState: FromRef<S>,
    S: Send + Sync,
{
    type Rejection = std::convert::Infallible;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let jar = CookieJar::from_headers(&parts.headers);
        let Some(token) = jar.get(COOKIE_NAME).map(|c| c.value().to_string()) else {
            return Ok(Self { token: None, name: None });
        };

        let app_state = AppState::from_ref(state);
        match app_state.sessions.get(&token).await {
            Some(session) => Ok(Self { token: Some(token), name: Some(session.name) }),
            None => Ok(Self { token: None, name: None }),
        }
    }
}

/// A signed-in user; page requests without one are sent to the login page
pub struct AuthUser {
    pub name: String,
}

#[axum::async_trait]
impl<S> FromRequestParts<S> for AuthUser
where
    AppState: FromRef<S>,
    S: Send + Sync,
{
    type Rejection = Response;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let current = match CurrentSession::from_request_parts(parts, state).await {
            Ok(current) => current,
            Err(never) => match never {},
        };
        match current.name {
            Some(name) => Ok(Self { name }),
            None => Err(Redirect::to("/login").into_response()),
        }
    }
}

/// The signed-in administrator; other users are sent to `/`
pub struct AdminUser {
    pub name: String,
}

#[axum::async_trait]
impl<S> FromRequestParts<S> for AdminUser
where
    AppState: FromRef<S>,
    S: Send + Sync,
{
    type Rejection = Response;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let user = AuthUser::from_request_parts(parts, state).await?;
        let app_state = AppState::from_ref(state);
        if app_state.config.is_admin(&user.name) {
            Ok(Self { name: user.name })
        } else {
            Err(Redirect::to("/").into_response())
        }
    }
}
