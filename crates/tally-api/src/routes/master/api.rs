//! Master API endpoints

use axum::extract::{Multipart, State};
use axum::response::Redirect;

use crate::{AdminUser, ApiError, AppState};

/// Replace the whole data set with an uploaded JSON file
pub async fn api_upload_data(
    State(state): State<AppState>,
    admin: AdminUser,
    mut multipart: Multipart,
) -> Result<Redirect, ApiError> {
    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| ApiError::bad_request(format!("Upload failed: {}", e)))?
    {
        if field.name() != Some("data_file") {
            continue;
        }
        let file_name = field.file_name().unwrap_or_default().to_string();
        let bytes = field
            .bytes()
            .await
            .map_err(|e| ApiError::bad_request(format!("Upload failed: {}", e)))?;

        state.tally.write().await.replace_data(&file_name, &bytes).await?;
        log::info!("{} uploaded {} ({} bytes)", admin.name, file_name, bytes.len());
        return Ok(Redirect::to("/master"));
    }
    Err(ApiError::bad_request("No data file was uploaded"))
}
