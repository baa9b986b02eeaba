//! HTTP handler returning staged upload bytes.

use axum::{extract::State, http::header, response::IntoResponse};
use bytes::Bytes;

use crate::AppState;
use crate::api::models::tasks::TaskRequest;
use crate::errors::{Error, Result};
use crate::storage::wait_for_blob;

/// MIME type for an uploaded image, derived from its extension.
///
/// Known raster formats map to their registered types; anything else falls
/// back to `image/{ext}` with the extension as the client sent it.
pub(crate) fn content_type_for(extension: &str) -> String {
    match extension.to_ascii_lowercase().as_str() {
        "jpg" | "jpeg" => "image/jpeg".to_string(),
        "png" => "image/png".to_string(),
        "gif" => "image/gif".to_string(),
        _ => format!("image/{extension}"),
    }
}

#[utoipa::path(
    post,
    path = "/v1/image",
    tag = "images",
    summary = "Fetch uploaded image",
    description = "Download the uploaded image identified by taskId/fileExtension and return its raw bytes.",
    request_body = TaskRequest,
    responses(
        (status = 200, description = "Raw image bytes with a content type derived from the extension"),
        (status = 400, description = "Missing or invalid request fields", body = crate::api::models::tasks::ErrorBody),
        (status = 404, description = "Uploaded image not found", body = crate::api::models::tasks::ErrorBody),
        (status = 500, description = "Storage failure", body = crate::api::models::tasks::ErrorBody)
    )
)]
#[tracing::instrument(skip_all)]
pub async fn fetch_image(State(state): State<AppState>, body: Bytes) -> Result<impl IntoResponse> {
    let request: TaskRequest = serde_json::from_slice(&body)
        .map_err(|_| Error::bad_request("No JSON data found in request body."))?;
    let task = request.validate()?;

    let key = state.config.input.key(&task.task_id, &task.file_extension);
    tracing::info!(task_id = %task.task_id, key = %key, "fetching uploaded image");

    let poll = &state.config.upload_poll;
    wait_for_blob(state.input.as_ref(), &key, poll.attempts, poll.interval).await?;

    let image = state.input.download(&key).await?;
    tracing::info!(key = %key, size = image.len(), "image downloaded");

    let content_type = content_type_for(&task.file_extension);
    Ok(([(header::CONTENT_TYPE, content_type)], image))
}
