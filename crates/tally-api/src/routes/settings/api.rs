//! Settings API endpoints

use axum::extract::State;
use axum::http::StatusCode;

use crate::{ApiError, AppState, CurrentSession};

/// Flip the signed-in user's dark-mode preference.
///
/// The page fires this without waiting for the answer and toggles its own
/// body class, so the reply is plain status text.
pub async fn api_toggle_dark_mode(
    State(state): State<AppState>,
    current: CurrentSession,
) -> Result<(StatusCode, &'static str), ApiError> {
    let Some(name) = current.name else {
        return Err(ApiError::Unauthorized);
    };
    let dark = state.tally.write().await.toggle_dark_mode(&name).await?;
    log::info!("{} switched dark mode {}", name, if dark { "on" } else { "off" });
    Ok((StatusCode::OK, "Success"))
}
