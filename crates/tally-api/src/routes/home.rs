//! Balance overview

use axum::extract::State;
use axum::http::HeaderMap;
use axum::response::Html;
use tally_core::Balance;
use tally_utils::escape_html;

use crate::{ApiError, AppState, AuthUser};

fn render_home(name: &str, balance: &Balance) -> String {
    let first = name.split_whitespace().next().unwrap_or(name);
    format!(
        "<h1>Welcome, {}!</h1><p>Your current balance is:</p><h2>{}</h2>",
        escape_html(first),
        balance.summary()
    )
}

pub async fn page_home(
    State(state): State<AppState>,
    headers: HeaderMap,
    user: AuthUser,
) -> Result<Html<String>, ApiError> {
    let tally = state.tally.read().await;
    let inner_content = render_home(&user.name, &tally.balance(&user.name)?);
    Ok(Html(crate::page_response(
        &headers,
        &state.config,
        "Home",
        Some("Home"),
        tally.appearance(&user.name),
        &inner_content,
    )))
}
