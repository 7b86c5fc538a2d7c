//! Master page rendering - Full page endpoints

use axum::extract::{Form, State};
use axum::http::HeaderMap;
use axum::response::{Html, IntoResponse, Redirect, Response};
use std::collections::HashMap;
use tally_core::CoreError;
use tally_utils::escape_html;

use crate::routes::transactions::page::parse_transaction;
use crate::routes::transactions::render::{render_txn_fields, render_user_options};
use crate::{AdminUser, ApiError, AppState};

fn render_master(names: &[&str], notice: &str) -> String {
    format!(
        r#"<form method='post' action='/master'>
            <h2>Add a transaction</h2>
            <div id='transaction' class='grid_container'>
                <label for='user'>User:</label>
                <select id='user' name='user' required>{users}</select>
                {fields}
            </div>
            <input type='submit' id='transaction_submit' name='transaction_submit' value='Add'>
        </form>
        <form method='post' action='/master'>
            <h2>Edit a transaction</h2>
            <div id='edit' class='grid_container'>
                <label for='edit_user'>Select a user:</label>
                <select id='edit_user' name='edit_user' required>{users}</select>
            </div>
            <input type='submit' id='edit_user_submit' name='edit_user_submit' value='Select'>
        </form>
        <form method='post' action='/master'>
            <h2>Add a new user</h2>
            <div id='new_user' class='grid_container'>
                <label for='first_name'>First name:</label>
                <input type='text' id='first_name' name='first_name' required>
                <label for='last_name' class='mobile_gap'>Last name:</label>
                <input type='text' id='last_name' name='last_name' required>
                <label for='password' class='mobile_gap'>Set a password:</label>
                <input type='text' id='password' name='password'>
            </div>
            <p class='tooltip'>This field may be left blank</p>
            <input type='submit' id='new_user_submit' name='new_user_submit' value='Add'>
            {notice}
        </form>
        <form method='post' action='/master/upload' enctype='multipart/form-data'>
            <h2>Replace server data</h2>
            <input type='file' name='data_file' accept='.json' required>
            <input type='submit' name='data_file_submit' value='Upload'
                onclick='return confirm("This will replace all server data. Continue?");'>
        </form>"#,
        users = render_user_options(names, None),
        fields = render_txn_fields(None),
        notice = notice,
    )
}

async fn respond(
    state: &AppState,
    headers: &HeaderMap,
    admin: &str,
    notice: &str,
) -> Result<Response, ApiError> {
    let tally = state.tally.read().await;
    let inner_content = render_master(&tally.user_names(), notice);
    Ok(Html(crate::page_response(
        headers,
        &state.config,
        "Master",
        None,
        tally.appearance(admin),
        &inner_content,
    ))
    .into_response())
}

pub async fn page_master(
    State(state): State<AppState>,
    headers: HeaderMap,
    admin: AdminUser,
) -> Result<Response, ApiError> {
    respond(&state, &headers, &admin.name, "").await
}

/// Handle the add-transaction, edit-user and new-user forms
pub async fn post_master(
    State(state): State<AppState>,
    headers: HeaderMap,
    admin: AdminUser,
    Form(form): Form<HashMap<String, String>>,
) -> Result<Response, ApiError> {
    let field = |name: &str| form.get(name).map(String::as_str).unwrap_or_default();
    let mut notice = String::new();

    if form.contains_key("transaction_submit") {
        let input = parse_transaction(&form)?;
        state.tally.write().await.add_transaction(field("user"), input).await?;
    } else if form.contains_key("edit_user_submit") {
        let user = field("edit_user");
        return Ok(Redirect::to(&format!("/edit/{}", urlencoding::encode(user))).into_response());
    } else if form.contains_key("new_user_submit") {
        let added = state
            .tally
            .write()
            .await
            .add_user(field("first_name"), field("last_name"), field("password"))
            .await;
        match added {
            Ok(_) => {}
            Err(CoreError::DuplicateUser { name }) => {
                notice = format!(
                    "<p class='error tooltip' id='user_alr_exists'>The user <em>{}</em> already exists</p>",
                    escape_html(&name)
                );
            }
            Err(e) => return Err(e.into()),
        }
    }

    respond(&state, &headers, &admin.name, &notice).await
}
