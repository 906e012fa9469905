//! Image upload boundary.
//!
//! One image attachment per request; the stored path is handed back for
//! inclusion in a later create/update. Sending `oldPath` asks for deletion
//! of a previously stored, now-orphaned image.

use axum::{
    extract::{Multipart, State},
    http::StatusCode,
    Json,
};
use serde_json::{json, Value};
use tracing::info;

use crate::config::AppState;
use crate::error::{ApiError, Result};
use crate::identity::Identity;

/// PUT /post-image
pub async fn upload_image(
    State(state): State<AppState>,
    identity: Identity,
    mut multipart: Multipart,
) -> Result<(StatusCode, Json<Value>)> {
    identity.require()?;

    let mut filename = None;
    let mut content_type = None;
    let mut data = None;
    let mut old_path = None;

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| ApiError::Internal(format!("failed to read multipart field: {}", e)))?
    {
        match field.name().unwrap_or("") {
            "image" => {
                filename = field.file_name().map(|s| s.to_string());
                content_type = field.content_type().map(|s| s.to_string());
                data = Some(
                    field
                        .bytes()
                        .await
                        .map_err(|e| ApiError::Internal(format!("failed to read image: {}", e)))?,
                );
            }
            "oldPath" => {
                old_path = field.text().await.ok().filter(|p| !p.is_empty());
            }
            _ => {}
        }
    }

    let Some(data) = data else {
        return Ok((
            StatusCode::OK,
            Json(json!({ "message": "No file provided" })),
        ));
    };
    let filename = filename.unwrap_or_default();
    let content_type = content_type.unwrap_or_default();

    if let Some(old) = old_path {
        state.images.remove(&old).await;
    }

    let file_path = state
        .images
        .save_upload(&filename, &content_type, &data)
        .await?;

    info!("stored image {} ({} bytes)", file_path, data.len());

    Ok((
        StatusCode::CREATED,
        Json(json!({
            "message": "File stored",
            "filePath": file_path,
        })),
    ))
}
