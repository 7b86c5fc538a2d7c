//! Transaction pages - Full page endpoints
//!
//! Endpoints:
//! - page_history: The signed-in user's transaction history
//! - page_edit_user: Admin list of one user's transactions
//! - post_edit_user: Admin edit or delete of one transaction
//! - page_edit_transaction: Admin edit form for one transaction

use axum::extract::{Form, Path, State};
use axum::http::HeaderMap;
use axum::response::Html;
use std::collections::HashMap;
use tally_core::{NewTransaction, TransactionListView};
use tally_utils::escape_html;

use super::render::{render_filter_controls, render_txn_fields, render_txn_list};
use crate::{AdminUser, ApiError, AppState, AuthUser};

/// History page - read-only list with the description filter
pub async fn page_history(
    State(state): State<AppState>,
    headers: HeaderMap,
    user: AuthUser,
) -> Result<Html<String>, ApiError> {
    let tally = state.tally.read().await;
    let rows = tally.transaction_rows(&user.name)?;

    let history = if rows.is_empty() {
        "<p>You have no transaction history.</p>".to_string()
    } else {
        let view = TransactionListView::new(rows);
        render_filter_controls("/history/filter", &render_txn_list(&view, None))
    };

    let inner_content = format!("<h2>Transaction history</h2>{}", history);
    Ok(Html(crate::page_response(
        &headers,
        &state.config,
        "History",
        Some("History"),
        tally.appearance(&user.name),
        &inner_content,
    )))
}

fn render_edit_user(tally: &tally_core::Tally, user: &str) -> Result<String, ApiError> {
    let rows = tally.transaction_rows(user)?;
    let edit_form = if rows.is_empty() {
        "<p>No records found</p>".to_string()
    } else {
        let view = TransactionListView::new(rows);
        let filter_url = format!("/edit/{}/filter", urlencoding::encode(user));
        format!(
            "<form method='get'><p>Select a transaction below to edit.</p>{}</form>",
            render_filter_controls(&filter_url, &render_txn_list(&view, Some(user)))
        )
    };
    Ok(format!(
        "<h2>{}'s transaction history</h2>{}",
        escape_html(user),
        edit_form
    ))
}

/// Admin: one user's transactions as edit buttons
pub async fn page_edit_user(
    State(state): State<AppState>,
    headers: HeaderMap,
    admin: AdminUser,
    Path(user): Path<String>,
) -> Result<Html<String>, ApiError> {
    let tally = state.tally.read().await;
    let inner_content = render_edit_user(&tally, &user)?;
    Ok(Html(crate::page_response(
        &headers,
        &state.config,
        "Edit",
        None,
        tally.appearance(&admin.name),
        &inner_content,
    )))
}

fn parse_index(form: &HashMap<String, String>) -> Result<usize, ApiError> {
    form.get("txn_index")
        .and_then(|s| s.parse().ok())
        .ok_or_else(|| ApiError::bad_request("Missing or invalid txn_index"))
}

/// Read the transaction fields of a submitted form
pub(crate) fn parse_transaction(form: &HashMap<String, String>) -> Result<NewTransaction, ApiError> {
    let field = |name: &str| {
        form.get(name)
            .map(String::as_str)
            .ok_or_else(|| ApiError::bad_request(format!("Missing field: {}", name)))
    };
    Ok(NewTransaction {
        kind: field("type")?.parse().map_err(ApiError::bad_request)?,
        date: field("date")?
            .parse()
            .map_err(|_| ApiError::bad_request("Invalid date"))?,
        amount: field("amount")?
            .trim()
            .parse()
            .map_err(|_| ApiError::bad_request("Invalid amount"))?,
        desc: form.get("desc").cloned().unwrap_or_default(),
    })
}

/// Admin: apply an edit or delete, then show the updated list
pub async fn post_edit_user(
    State(state): State<AppState>,
    headers: HeaderMap,
    admin: AdminUser,
    Path(user): Path<String>,
    Form(form): Form<HashMap<String, String>>,
) -> Result<Html<String>, ApiError> {
    let mut tally = state.tally.write().await;
    let index = parse_index(&form)?;

    if form.contains_key("txn_edit_submit") {
        let input = parse_transaction(&form)?;
        tally.edit_transaction(&user, index, input).await?;
    } else if form.contains_key("txn_delete") {
        tally.delete_transaction(&user, index).await?;
    }

    let inner_content = render_edit_user(&tally, &user)?;
    Ok(Html(crate::page_response(
        &headers,
        &state.config,
        "Edit",
        None,
        tally.appearance(&admin.name),
        &inner_content,
    )))
}

/// Admin: edit form for `/edit/{user}/transaction_{i}`
pub async fn page_edit_transaction(
    State(state): State<AppState>,
    headers: HeaderMap,
    admin: AdminUser,
    Path((user, transaction)): Path<(String, String)>,
) -> Result<Html<String>, ApiError> {
    let index: usize = transaction
        .strip_prefix("transaction_")
        .and_then(|i| i.parse().ok())
        .ok_or_else(|| ApiError::NotFound {
            resource: transaction.clone(),
        })?;

    let tally = state.tally.read().await;
    let record = tally.transaction(&user, index)?;

    let inner_content = format!(
        r#"<form method='post' action='/edit/{}'>
            <h2>Editing a transaction for {}</h2>
            <div id='transaction' class='grid_container'>{}</div>
            <input type='hidden' name='txn_index' value='{}'>
            <input type='submit' id='txn_edit_submit' name='txn_edit_submit' value='Submit'>
            <input type='submit' id='txn_delete' name='txn_delete' value='Delete transaction'
                onclick='return confirm("Are you sure? Deleting cannot be undone.");'>
        </form>"#,
        urlencoding::encode(&user),
        escape_html(&user),
        render_txn_fields(Some(record)),
        index
    );

    Ok(Html(crate::page_response(
        &headers,
        &state.config,
        "Edit transaction",
        None,
        tally.appearance(&admin.name),
        &inner_content,
    )))
}
