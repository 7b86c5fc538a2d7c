//! Transaction filter endpoints - HTMX partial responses
//!
//! Both answer with the inner HTML of the list container: header, "no match"
//! message and every row, with non-matching rows hidden and matches highlighted.

use axum::extract::{Path, Query, State};
use axum::response::Html;
use std::collections::HashMap;

use super::render::render_txn_list;
use crate::{AdminUser, ApiError, AppState, AuthUser};

fn query_param(params: &HashMap<String, String>) -> &str {
    params.get("q").map(|s| s.as_str()).unwrap_or("")
}

/// HTMX: filter the signed-in user's history
pub async fn htmx_history_filter(
    State(state): State<AppState>,
    user: AuthUser,
    Query(params): Query<HashMap<String, String>>,
) -> Result<Html<String>, ApiError> {
    let tally = state.tally.read().await;
    let view = tally.list_view(&user.name, query_param(&params))?;
    log::debug!(
        "History filter {:?} for {}: {} of {} rows",
        view.query,
        user.name,
        view.visible_rows().count(),
        view.rows.len()
    );
    Ok(Html(render_txn_list(&view, None)))
}

/// HTMX: filter a user's transactions on the admin edit page
pub async fn htmx_edit_filter(
    State(state): State<AppState>,
    _admin: AdminUser,
    Path(user): Path<String>,
    Query(params): Query<HashMap<String, String>>,
) -> Result<Html<String>, ApiError> {
    let tally = state.tally.read().await;
    let view = tally.list_view(&user, query_param(&params))?;
    Ok(Html(render_txn_list(&view, Some(&user))))
}
