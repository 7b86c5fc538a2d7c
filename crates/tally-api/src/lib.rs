//! HTTP server with HTMX support
//!
//! Routes are organized into modules:
//! - routes::auth: Sign in, sign out, landing redirect
//! - routes::home: Balance overview
//! - routes::transactions: History list, description filter, admin editing
//! - routes::settings: Password management and the dark-mode toggle
//! - routes::master: Admin forms and data file upload

pub mod error;
pub mod routes;
pub mod session;

use axum::{
    http::{header, HeaderValue},
    routing::{get, post},
    Router,
};
use std::sync::Arc;
use tally_config::Config;
use tally_core::view::{ids, DARK_CLASS, HIDDEN_CLASS, TOGGLE_DARK_MODE_PATH};
use tally_core::{Appearance, Tally};
use tally_utils::escape_html;
use tokio::net::TcpListener;
use tokio::sync::RwLock;
use tower_http::set_header::SetResponseHeaderLayer;

pub use error::ApiError;
pub use session::{AdminUser, AuthUser, CurrentSession, Session, SessionStore};

/// Application state
#[derive(Clone)]
pub struct AppState {
    pub tally: Arc<RwLock<Tally>>,
    pub config: Config,
    pub sessions: SessionStore,
}

impl AppState {
    pub fn new(config: Config, tally: Tally) -> Self {
        Self {
            tally: Arc::new(RwLock::new(tally)),
            config,
            sessions: SessionStore::new(),
        }
    }
}

/// Create the application router
pub fn create_router(state: AppState) -> Router {
    use routes::auth::{index_page, log_out, page_login, sign_in};
    use routes::home::page_home;
    use routes::master::{api_upload_data, page_master, post_master};
    use routes::settings::{api_toggle_dark_mode, page_settings, post_settings};
    use routes::transactions::{
        htmx_edit_filter, htmx_history_filter, page_edit_transaction, page_edit_user, page_history,
        post_edit_user,
    };

    Router::new()
        // API endpoints
        .route("/api/health", get(health_check))
        .route(TOGGLE_DARK_MODE_PATH, post(api_toggle_dark_mode))
        .route("/master/upload", post(api_upload_data))
        // Pages
        .route("/", get(index_page).post(sign_in))
        .route("/login", get(page_login))
        .route("/log_out", get(log_out))
        .route("/home", get(page_home))
        .route("/history", get(page_history))
        .route("/settings", get(page_settings).post(post_settings))
        .route("/master", get(page_master).post(post_master))
        .route("/edit/:user", get(page_edit_user).post(post_edit_user))
        .route("/edit/:user/:transaction", get(page_edit_transaction))
        // HTMX partials
        .route("/history/filter", get(htmx_history_filter))
        .route("/edit/:user/filter", get(htmx_edit_filter))
        .layer(SetResponseHeaderLayer::overriding(
            header::CACHE_CONTROL,
            HeaderValue::from_static("no-store"),
        ))
        .with_state(state)
}

/// Health check endpoint
async fn health_check() -> &'static str {
    "OK"
}

// ==================== Template Functions ====================

const STYLE: &str = r#"
        body { font-family: system-ui, sans-serif; margin: 0; background: #f9fafb; color: #111827; }
        body.dark { background: #111827; color: #f3f4f6; }
        nav { display: flex; align-items: center; gap: 1rem; padding: 0.75rem 1.5rem; background: #4f46e5; }
        nav a { color: #fff; text-decoration: none; }
        nav ul { display: flex; gap: 1rem; list-style: none; margin: 0 0 0 auto; padding: 0; }
        #active_page a { font-weight: 700; text-decoration: underline; }
        #main { max-width: 56rem; margin: 0 auto; padding: 1.5rem; }
        .grid_container { display: grid; grid-template-columns: repeat(4, 1fr); gap: 0.5rem; padding: 0.5rem 0; width: 100%; text-align: left; }
        .grid_container.header { font-weight: 700; border-bottom: 1px solid #d1d5db; }
        .debt .amount { color: #b91c1c; }
        .repayment .amount { color: #15803d; }
        .desc { white-space: pre-line; }
        .hidden { display: none; }
        .highlight { background: #fde68a; color: #111827; }
        .error { color: #b91c1c; }
        .success { color: #15803d; }
        .tooltip { font-size: 0.875rem; }
        .total_owing_desc { display: none; }
        .toggle input { accent-color: #4f46e5; }
"#;

/// Inline page script: notifies the server of dark-mode changes and wires the clear button
fn page_script() -> String {
    format!(
        r#"document.addEventListener('DOMContentLoaded', () => {{
            const toggle = document.getElementById('{toggle}');
            if (toggle) {{
                toggle.addEventListener('change', () => {{
                    fetch('{endpoint}', {{
                        method: 'POST',
                        headers: {{ 'Content-Type': 'application/json' }}
                    }});
                    document.body.classList.toggle('{dark}');
                }});
            }}
            const input = document.getElementById('{input}');
            const clearButton = document.getElementById('{clear}');
            if (input && clearButton) {{
                clearButton.addEventListener('click', () => {{
                    input.value = '';
                    htmx.trigger(input, 'input');
                    input.focus();
                }});
            }}
        }});"#,
        toggle = ids::DARK_MODE_TOGGLE,
        endpoint = TOGGLE_DARK_MODE_PATH,
        dark = DARK_CLASS,
        input = ids::SEARCH_INPUT,
        clear = ids::CLEAR_BUTTON,
    )
}

/// Base HTML template
pub fn base_html(config: &Config, title: &str, appearance: Appearance, content: &str) -> String {
    format!(
        r#"<!DOCTYPE html>
<html lang="en">
<head>
    <meta charset="UTF-8">
    <meta name="viewport" content="width=device-width, initial-scale=1.0">
    <meta name="description" content="A lightweight debt tracker for friends.">
    <meta name="author" content="{}">
    <title>{} | {}</title>
    <script src="https://unpkg.com/htmx.org@1.9.10"></script>
    <style>{}</style>
    <script>{}</script>
</head>
<body class="{}">
    {}
</body>
</html>"#,
        escape_html(&config.site.author),
        escape_html(&config.site.name),
        escape_html(title),
        STYLE,
        page_script(),
        appearance.body_class(),
        content
    )
}

/// Navigation bar; `current` marks the active page
pub fn nav_bar(config: &Config, current: Option<&str>) -> String {
    let links = [
        ("/home", "Home", "🏠"),
        ("/history", "History", "📋"),
        ("/settings", "Settings", "⚙️"),
        ("/log_out", "Log out", "🚪"),
    ];

    let mut nav = format!(
        "<nav><a href='/home' id='tally_logo'><strong>{}</strong></a><ul>",
        escape_html(&config.site.name)
    );
    for (path, label, icon) in &links {
        let id = if current == Some(*label) {
            " id='active_page'"
        } else if *label == "Log out" {
            " id='log_out_btn'"
        } else {
            ""
        };
        nav.push_str(&format!("<li{}><a href='{}'>{} {}</a></li>", id, path, icon, label));
    }
    nav.push_str("</ul></nav>");
    nav
}

/// Check if request is from HTMX (partial page update)
fn is_htmx_request(headers: &axum::http::HeaderMap) -> bool {
    headers.get("hx-request").is_some()
}

/// Wrap content for full page or HTMX partial
pub fn page_response(
    headers: &axum::http::HeaderMap,
    config: &Config,
    title: &str,
    nav: Option<&str>,
    appearance: Appearance,
    inner_content: &str,
) -> String {
    let main = format!("<div id='main'>{}</div>", inner_content);
    if is_htmx_request(headers) {
        main
    } else {
        base_html(config, title, appearance, &format!("{}{}", nav_bar(config, nav), main))
    }
}

/// Class attribute fragment for an element that may be hidden
pub(crate) fn hidden_if(hidden: bool) -> &'static str {
    if hidden {
        HIDDEN_CLASS
    } else {
        ""
    }
}

/// Bind and serve until the process is stopped
pub async fn start_server(state: AppState) -> anyhow::Result<()> {
    let addr = state.config.bind_address();
    let router = create_router(state);

    let listener = TcpListener::bind(&addr).await?;
    log::info!("Starting Tally server on http://{}", addr);

    axum::serve(listener, router)
        .with_graceful_shutdown(async {
            let _ = tokio::signal::ctrl_c().await;
        })
        .await?;
    log::info!("Server stopped gracefully");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_nav_bar_marks_active_page() {
        let config = Config::default();
        let nav = nav_bar(&config, Some("History"));
        assert!(nav.contains("<li id='active_page'><a href='/history'>"));
        assert!(nav.contains("<li id='log_out_btn'><a href='/log_out'>"));
    }

    #[test]
    fn test_base_html_body_class() {
        let config = Config::default();
        let html = base_html(&config, "Home", Appearance::new(true), "x");
        assert!(html.contains(r#"<body class="dark">"#));
        assert!(html.contains("<title>Tally | Home</title>"));
        assert!(html.contains("fetch('/toggle_dark_mode'"));
    }

    #[test]
    fn test_htmx_partial_skips_layout() {
        let config = Config::default();
        let mut headers = axum::http::HeaderMap::new();
        headers.insert("hx-request", HeaderValue::from_static("true"));
        let html = page_response(&headers, &config, "Home", None, Appearance::default(), "body");
        assert_eq!(html, "<div id='main'>body</div>");
    }

    // ==================== Router ====================

    use axum::body::{to_bytes, Body};
    use axum::http::{Request, StatusCode};
    use axum::response::Response;
    use tally_core::NewTransaction;
    use tally_store::{seed_data, MemoryStore, TransactionType, UserRecord};
    use tower::ServiceExt;

    /// bcrypt hash of "hunter2" at cost 4
    const HUNTER2_HASH: &str = "$2b$04$abcdefghijklmnopqrstuuV3duMsC0HpUex6N9qapiuOHHWkwRXVm";

    async fn test_state() -> AppState {
        let config = Config::default();
        let store = Arc::new(MemoryStore::new(seed_data(&config.site.admin)));
        let mut tally = Tally::open(config.clone(), store).await.unwrap();
        tally.add_user("jane", "doe", "").await.unwrap();
        for (date, desc) in [("2024-05-01", "Rent payment"), ("2024-06-01", "Groceries")] {
            tally
                .add_transaction(
                    "Jane Doe",
                    NewTransaction {
                        kind: TransactionType::Debt,
                        date: date.parse().unwrap(),
                        amount: "10".parse().unwrap(),
                        desc: desc.to_string(),
                    },
                )
                .await
                .unwrap();
        }
        AppState::new(config, tally)
    }

    async fn send(state: &AppState, request: Request<Body>) -> Response {
        create_router(state.clone()).oneshot(request).await.unwrap()
    }

    async fn body_text(response: Response) -> String {
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        String::from_utf8(bytes.to_vec()).unwrap()
    }

    fn location(response: &Response) -> &str {
        response.headers()[header::LOCATION].to_str().unwrap()
    }

    /// Sign in through the login form and return the session cookie
    async fn sign_in_as(state: &AppState, name: &str) -> String {
        let body = format!("name={}&password=", urlencoding::encode(name));
        let response = send(
            state,
            Request::post("/")
                .header(header::CONTENT_TYPE, "application/x-www-form-urlencoded")
                .body(Body::from(body))
                .unwrap(),
        )
        .await;
        assert_eq!(response.status(), StatusCode::SEE_OTHER);
        set_cookie(&response, session::COOKIE_NAME).unwrap()
    }

    /// `name=value` of the Set-Cookie header for `name`
    fn set_cookie(response: &Response, name: &str) -> Option<String> {
        response
            .headers()
            .get_all(header::SET_COOKIE)
            .iter()
            .filter_map(|v| v.to_str().ok())
            .filter_map(|v| v.split(';').next())
            .find(|pair| pair.starts_with(&format!("{}=", name)))
            .map(str::to_string)
    }

    fn form_post(body: &str, cookie: Option<&str>) -> Request<Body> {
        let mut builder =
            Request::post("/").header(header::CONTENT_TYPE, "application/x-www-form-urlencoded");
        if let Some(cookie) = cookie {
            builder = builder.header(header::COOKIE, cookie);
        }
        builder.body(Body::from(body.to_string())).unwrap()
    }

    fn upload(cookie: &str, field: &str, file_name: &str, content: &str) -> Request<Body> {
        let boundary = "tallyboundary";
        let body = format!(
            "--{b}\r\nContent-Disposition: form-data; name=\"{field}\"; filename=\"{file_name}\"\r\nContent-Type: application/json\r\n\r\n{content}\r\n--{b}--\r\n",
            b = boundary,
            field = field,
            file_name = file_name,
            content = content,
        );
        Request::post("/master/upload")
            .header(header::COOKIE, cookie)
            .header(
                header::CONTENT_TYPE,
                format!("multipart/form-data; boundary={}", boundary),
            )
            .body(Body::from(body))
            .unwrap()
    }

    #[tokio::test]
    async fn test_health_check() {
        let state = test_state().await;
        let response = send(&state, Request::get("/api/health").body(Body::empty()).unwrap()).await;
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(response.headers()[header::CACHE_CONTROL], "no-store");
        assert_eq!(body_text(response).await, "OK");
    }

    #[tokio::test]
    async fn test_signed_out_visitors_go_to_login() {
        let state = test_state().await;
        let response = send(&state, Request::get("/").body(Body::empty()).unwrap()).await;
        assert_eq!(location(&response), "/login");
        let response = send(&state, Request::get("/history").body(Body::empty()).unwrap()).await;
        assert_eq!(location(&response), "/login");
    }

    #[tokio::test]
    async fn test_toggle_requires_session() {
        let state = test_state().await;
        let response = send(
            &state,
            Request::post("/toggle_dark_mode")
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::empty())
                .unwrap(),
        )
        .await;
        assert_eq!(response.status(), StatusCode::FORBIDDEN);
        assert_eq!(body_text(response).await, "Not logged in");
    }

    #[tokio::test]
    async fn test_toggle_flips_body_class() {
        let state = test_state().await;
        let cookie = sign_in_as(&state, "Jane Doe").await;

        let response = send(
            &state,
            Request::post("/toggle_dark_mode")
                .header(header::COOKIE, &cookie)
                .body(Body::empty())
                .unwrap(),
        )
        .await;
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(body_text(response).await, "Success");
        assert!(state.tally.read().await.appearance("Jane Doe").is_dark());

        let response = send(
            &state,
            Request::get("/settings").header(header::COOKIE, &cookie).body(Body::empty()).unwrap(),
        )
        .await;
        let html = body_text(response).await;
        assert!(html.contains(r#"<body class="dark">"#));
        assert!(html.contains("id='dark_mode_toggle' checked>"));
    }

    #[tokio::test]
    async fn test_history_filter_partial() {
        let state = test_state().await;
        let cookie = sign_in_as(&state, "Jane Doe").await;

        let response = send(
            &state,
            Request::get("/history/filter?q=RENT")
                .header(header::COOKIE, &cookie)
                .body(Body::empty())
                .unwrap(),
        )
        .await;
        assert_eq!(response.status(), StatusCode::OK);
        let html = body_text(response).await;
        assert!(html.contains("<span class='highlight'>Rent</span> payment"));
        assert_eq!(html.matches("style='display: none'").count(), 1);
        assert!(html.contains("<p id='no_match_msg' class='hidden'>"));

        let response = send(
            &state,
            Request::get("/history/filter?q=nothing")
                .header(header::COOKIE, &cookie)
                .body(Body::empty())
                .unwrap(),
        )
        .await;
        let html = body_text(response).await;
        assert!(html.contains("<div class='grid_container header hidden' id='txn_header'>"));
        assert!(html.contains("<p id='no_match_msg' class=''>"));
    }

    #[tokio::test]
    async fn test_admin_pages_need_admin() {
        let state = test_state().await;
        let cookie = sign_in_as(&state, "Jane Doe").await;
        let response = send(
            &state,
            Request::get("/master").header(header::COOKIE, &cookie).body(Body::empty()).unwrap(),
        )
        .await;
        assert_eq!(location(&response), "/");

        let admin = sign_in_as(&state, "Ethan Ryoo").await;
        let response = send(
            &state,
            Request::get("/edit/Jane%20Doe").header(header::COOKIE, &admin).body(Body::empty()).unwrap(),
        )
        .await;
        assert_eq!(response.status(), StatusCode::OK);
        assert!(body_text(response).await.contains("formaction='/edit/Jane%20Doe/transaction_1'"));
    }

    #[tokio::test]
    async fn test_log_out_drops_session() {
        let state = test_state().await;
        let cookie = sign_in_as(&state, "Jane Doe").await;
        let response = send(
            &state,
            Request::get("/log_out").header(header::COOKIE, &cookie).body(Body::empty()).unwrap(),
        )
        .await;
        assert_eq!(location(&response), "/login");
        assert_eq!(state.sessions.len().await, 0);
    }

    #[test]
    fn test_page_script_wires_clear_button() {
        let script = page_script();
        assert!(script.contains("document.getElementById('clear_button')"));
        assert!(script.contains("input.value = '';"));
        assert!(script.contains("htmx.trigger(input, 'input');"));
        assert!(script.contains("input.focus();"));
        assert!(script.contains("document.body.classList.toggle('dark');"));
    }

    #[tokio::test]
    async fn test_failed_sign_in_creates_no_session() {
        let state = test_state().await;
        for _ in 0..50 {
            let response = send(&state, form_post("name=Nobody&password=x", None)).await;
            assert_eq!(location(&response), "/login");
            assert!(set_cookie(&response, session::COOKIE_NAME).is_none());
        }
        assert_eq!(state.sessions.len().await, 0);
    }

    #[tokio::test]
    async fn test_wrong_password_preselects_name() {
        let config = Config::default();
        let mut data = seed_data(&config.site.admin);
        data.insert(
            "John Roe".to_string(),
            UserRecord {
                password: Some(HUNTER2_HASH.to_string()),
                ..UserRecord::default()
            },
        );
        let tally = Tally::open(config.clone(), Arc::new(MemoryStore::new(data))).await.unwrap();
        let state = AppState::new(config, tally);

        let response = send(&state, form_post("name=John%20Roe&password=nope", None)).await;
        let remembered = set_cookie(&response, session::WRONG_PASSWORD_COOKIE).unwrap();
        assert_eq!(remembered, "tally_wrong_password=John%20Roe");

        let response = send(
            &state,
            Request::get("/login").header(header::COOKIE, &remembered).body(Body::empty()).unwrap(),
        )
        .await;
        let html = body_text(response).await;
        assert!(html.contains("<p class='error tooltip'>Incorrect password</p>"));
        assert!(html.contains("<option value='John Roe' selected>John Roe</option>"));
    }

    #[tokio::test]
    async fn test_sign_in_issues_fresh_token() {
        let state = test_state().await;
        let planted = "tally_session=planted-token";
        let response = send(&state, form_post("name=Jane%20Doe&password=", Some(planted))).await;
        assert_eq!(location(&response), "/home");
        let issued = set_cookie(&response, session::COOKIE_NAME).unwrap();
        assert_ne!(issued, planted);
        assert!(state.sessions.get("planted-token").await.is_none());
        assert_eq!(state.sessions.len().await, 1);
    }

    #[tokio::test]
    async fn test_upload_rejects_wrong_extension() {
        let state = test_state().await;
        let admin = sign_in_as(&state, "Ethan Ryoo").await;
        let response = send(&state, upload(&admin, "data_file", "data.txt", "{}")).await;
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        assert_eq!(body_text(response).await, "Invalid file type");
        assert!(state.tally.read().await.has_user("Jane Doe"));
    }

    #[tokio::test]
    async fn test_upload_rejects_bad_json() {
        let state = test_state().await;
        let admin = sign_in_as(&state, "Ethan Ryoo").await;
        let response = send(&state, upload(&admin, "data_file", "data.json", "{not json")).await;
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        assert!(body_text(response).await.starts_with("Upload failed: "));
        assert!(state.tally.read().await.has_user("Jane Doe"));
    }

    #[tokio::test]
    async fn test_upload_requires_data_file_field() {
        let state = test_state().await;
        let admin = sign_in_as(&state, "Ethan Ryoo").await;
        let response = send(&state, upload(&admin, "other", "data.json", "{}")).await;
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        assert_eq!(body_text(response).await, "No data file was uploaded");
    }

    #[tokio::test]
    async fn test_upload_replaces_data() {
        let state = test_state().await;
        let admin = sign_in_as(&state, "Ethan Ryoo").await;
        let data = r#"{"Ethan Ryoo": {"password": null, "dark_mode": true, "transactions": []},
                       "Sam Poe": {"password": null, "dark_mode": false, "transactions": []}}"#;
        let response = send(&state, upload(&admin, "data_file", "backup.json", data)).await;
        assert_eq!(location(&response), "/master");

        let tally = state.tally.read().await;
        assert!(tally.has_user("Sam Poe"));
        assert!(!tally.has_user("Jane Doe"));
        assert!(tally.appearance("Ethan Ryoo").is_dark());
    }
}
