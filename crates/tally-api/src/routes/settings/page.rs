//! Settings page rendering - Full page endpoints

use axum::extract::{Form, State};
use axum::http::HeaderMap;
use axum::response::Html;
use std::collections::HashMap;
use tally_core::view::ids;
use tally_core::{PasswordChange, PasswordChangeRequest};
use tally_utils::escape_html;

use crate::{ApiError, AppState, AuthUser};

/// Outcome messages shown under the password forms
#[derive(Debug, Default)]
struct Notices {
    change: Option<(&'static str, &'static str, &'static str)>,
    remove: Option<(&'static str, &'static str, &'static str)>,
    old_password_fill: String,
}

fn tooltip(notice: Option<(&str, &str, &str)>) -> String {
    match notice {
        Some((class, id, text)) => format!("<p class='{} tooltip' id='{}'>{}</p>", class, id, text),
        None => String::new(),
    }
}

fn label(field: &str) -> String {
    tally_utils::capitalize(&field.replace('_', " "))
}

fn render_change_form(has_password: bool, old_password_fill: &str) -> String {
    let mut html = if has_password {
        format!(
            "<label for='old_password'>{}:</label><input type='password' id='old_password' name='old_password' required value='{}'>",
            label("old_password"),
            escape_html(old_password_fill)
        )
    } else {
        format!("<p class='label'>{}:</p><div id='old_password_div'></div>", label("old_password"))
    };
    for field in ["new_password", "confirm_new_password"] {
        html.push_str(&format!(
            "<label for='{0}' class='mobile_gap'>{1}:</label><input type='password' id='{0}' name='{0}' required>",
            field,
            label(field)
        ));
    }
    html
}

fn render_remove_form(has_password: bool) -> &'static str {
    if has_password {
        r#"<h2>Remove your password</h2>
        <div class='grid_container'>
            <label for='remove_pw'>Password:</label>
            <input type='password' id='remove_pw' name='remove_pw' required>
        </div>
        <input type='submit' name='remove_pw_submit' value='Remove'>"#
    } else {
        ""
    }
}

fn render_settings(has_password: bool, dark_mode: bool, notices: &Notices) -> String {
    format!(
        r#"<form method='post' action='/settings'>
            <h2>Change your password</h2>
            <div class='grid_container'>{}{}</div>
            <input type='submit' name='password_reset' value='Submit'>
        </form>
        <form method='post' action='/settings'>{}{}</form>
        <h2>Toggle dark mode</h2>
        <label class='toggle'>
            <input type='checkbox' name='{toggle}' id='{toggle}'{}>
            <span class='slider'></span>
        </label>"#,
        render_change_form(has_password, &notices.old_password_fill),
        tooltip(notices.change),
        render_remove_form(has_password),
        tooltip(notices.remove),
        if dark_mode { " checked" } else { "" },
        toggle = ids::DARK_MODE_TOGGLE,
    )
}

async fn respond(
    state: &AppState,
    headers: &HeaderMap,
    name: &str,
    notices: &Notices,
) -> Result<Html<String>, ApiError> {
    let tally = state.tally.read().await;
    let appearance = tally.appearance(name);
    let inner_content = render_settings(tally.has_password(name)?, appearance.is_dark(), notices);
    Ok(Html(crate::page_response(
        headers,
        &state.config,
        "Settings",
        Some("Settings"),
        appearance,
        &inner_content,
    )))
}

pub async fn page_settings(
    State(state): State<AppState>,
    headers: HeaderMap,
    user: AuthUser,
) -> Result<Html<String>, ApiError> {
    respond(&state, &headers, &user.name, &Notices::default()).await
}

/// Handle the change-password and remove-password forms
pub async fn post_settings(
    State(state): State<AppState>,
    headers: HeaderMap,
    user: AuthUser,
    Form(form): Form<HashMap<String, String>>,
) -> Result<Html<String>, ApiError> {
    let field = |name: &str| form.get(name).cloned().unwrap_or_default();
    let mut notices = Notices::default();

    if form.contains_key("password_reset") {
        let request = PasswordChangeRequest {
            old_password: field("old_password"),
            new_password: field("new_password"),
            confirm_new_password: field("confirm_new_password"),
        };
        let outcome = state.tally.write().await.change_password(&user.name, &request).await?;
        notices.change = Some(match outcome {
            PasswordChange::Changed => ("success", "pw_change_success", "Your password has been changed"),
            PasswordChange::IncorrectPassword => ("error", "incorrect_pw", "Incorrect password"),
            PasswordChange::Mismatch => {
                notices.old_password_fill = request.old_password;
                ("error", "pw_mismatch", "New passwords do not match")
            }
        });
    } else if form.contains_key("remove_pw_submit") {
        let removed = state
            .tally
            .write()
            .await
            .remove_password(&user.name, &field("remove_pw"))
            .await?;
        notices.remove = Some(if removed {
            ("success", "pw_remove_success", "Your password has been removed")
        } else {
            ("error", "incorrect_remove_pw", "Incorrect password")
        });
    }

    respond(&state, &headers, &user.name, &notices).await
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_toggle_reflects_preference() {
        let html = render_settings(false, true, &Notices::default());
        assert!(html.contains("<input type='checkbox' name='dark_mode_toggle' id='dark_mode_toggle' checked>"));
        let html = render_settings(false, false, &Notices::default());
        assert!(html.contains("id='dark_mode_toggle'>"));
    }

    #[test]
    fn test_forms_depend_on_existing_password() {
        let without = render_settings(false, false, &Notices::default());
        assert!(without.contains("<div id='old_password_div'></div>"));
        assert!(!without.contains("remove_pw_submit"));

        let with = render_settings(true, false, &Notices::default());
        assert!(with.contains("<label for='old_password'>Old password:</label>"));
        assert!(with.contains("name='remove_pw_submit'"));
    }

    #[test]
    fn test_mismatch_keeps_old_password() {
        let notices = Notices {
            change: Some(("error", "pw_mismatch", "New passwords do not match")),
            remove: None,
            old_password_fill: "o'ld".to_string(),
        };
        let html = render_settings(true, false, &notices);
        assert!(html.contains("value='o&#39;ld'"));
        assert!(html.contains("<p class='error tooltip' id='pw_mismatch'>New passwords do not match</p>"));
    }
}
