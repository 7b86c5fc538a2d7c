//! Sign in and sign out
//!
//! Endpoints:
//! - index_page: Send visitors to the page matching their session
//! - sign_in: Check the login form
//! - page_login: Login form with the list of users
//! - log_out: Drop the session

use axum::extract::{Form, State};
use axum::response::{Html, Redirect};
use axum_extra::extract::cookie::CookieJar;
use std::collections::HashMap;
use tally_core::Appearance;

use super::transactions::render::render_user_options;
use crate::session::{
    removal_cookie, session_cookie, wrong_password_cookie, wrong_password_name, COOKIE_NAME,
    WRONG_PASSWORD_COOKIE,
};
use crate::{AppState, CurrentSession, Session};

/// Landing page for a signed-in user
fn landing(state: &AppState, name: &str) -> Redirect {
    if state.config.is_admin(name) {
        Redirect::to("/master")
    } else {
        Redirect::to("/home")
    }
}

pub async fn index_page(State(state): State<AppState>, current: CurrentSession) -> Redirect {
    match current.name {
        Some(name) => landing(&state, &name),
        None => Redirect::to("/login"),
    }
}

/// Check the submitted name and password.
///
/// Success always issues a fresh session token. A failure only sets a
/// short-lived cookie so the login page can preselect the name.
pub async fn sign_in(
    State(state): State<AppState>,
    current: CurrentSession,
    jar: CookieJar,
    Form(form): Form<HashMap<String, String>>,
) -> (CookieJar, Redirect) {
    if let Some(name) = &current.name {
        return (jar, landing(&state, name));
    }

    let secure = state.config.server.cookie_secure;
    let name = form.get("name").cloned().unwrap_or_default();
    let password = form.get("password").map(String::as_str).unwrap_or_default();
    let accepted = state
        .tally
        .read()
        .await
        .verify_login(&name, password)
        .unwrap_or(false);

    if !accepted {
        log::warn!("Failed sign in for {:?}", name);
        let jar = jar.add(wrong_password_cookie(&name, secure));
        return (jar, Redirect::to("/login"));
    }

    if let Some(stale) = &current.token {
        state.sessions.remove(stale).await;
    }
    log::info!("{} signed in", name);
    let redirect = landing(&state, &name);
    let token = state.sessions.create(Session { name }).await;
    let jar = jar
        .add(session_cookie(token, secure))
        .add(removal_cookie(WRONG_PASSWORD_COOKIE, secure));
    (jar, redirect)
}

fn render_login(names: &[&str], wrong_password: Option<&str>) -> String {
    let message = if wrong_password.is_some() {
        "<p class='error tooltip'>Incorrect password</p>"
    } else {
        "<p class='tooltip'>Leave blank if you haven't set a password</p>"
    };
    format!(
        r#"<form method='post' action='/'>
            <h1>Sign in</h1>
            <div class='grid_container'>
                <label for='name'>Name:</label>
                <select id='name' name='name' required>{}</select>
                <label for='password' class='mobile_gap'>Password:</label>
                <input type='password' id='password' name='password'>
            </div>
            {}
            <input type='submit' value='Sign in'>
        </form>"#,
        render_user_options(names, wrong_password),
        message
    )
}

pub async fn page_login(State(state): State<AppState>, jar: CookieJar) -> Html<String> {
    let tally = state.tally.read().await;
    let names = tally.user_names();
    let wrong_password = wrong_password_name(&jar).filter(|name| tally.has_user(name));
    let content = format!(
        "<div id='main'>{}</div>",
        render_login(&names, wrong_password.as_deref())
    );
    Html(crate::base_html(&state.config, "Login", Appearance::default(), &content))
}

pub async fn log_out(
    State(state): State<AppState>,
    current: CurrentSession,
    jar: CookieJar,
) -> (CookieJar, Redirect) {
    if let Some(token) = &current.token {
        state.sessions.remove(token).await;
    }
    if let Some(name) = &current.name {
        log::info!("{} signed out", name);
    }
    let secure = state.config.server.cookie_secure;
    let jar = jar
        .add(removal_cookie(COOKIE_NAME, secure))
        .add(removal_cookie(WRONG_PASSWORD_COOKIE, secure));
    (jar, Redirect::to("/login"))
}
