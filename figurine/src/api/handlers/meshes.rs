//! HTTP handler generating the placeholder GLB model.

use axum::{Json, extract::State};
use bytes::Bytes;

use crate::AppState;
use crate::api::models::tasks::{ModelResponse, TaskRequest};
use crate::errors::{Error, Result};
use crate::glb::export_glb;
use crate::mesh::humanoid_figure;
use crate::storage::wait_for_blob;

/// Content type for binary glTF uploads.
const GLB_CONTENT_TYPE: &str = "model/gltf-binary";

/// Name embedded in the exported glTF mesh and node. Constant so the
/// artifact bytes stay identical across tasks.
const FIGURE_NAME: &str = "figure";

#[utoipa::path(
    post,
    path = "/v1/model",
    tag = "models",
    summary = "Generate placeholder model",
    description = "Stage the uploaded image, synthesize the fixed humanoid GLB, upload it to the \
                   output bucket as {taskId}.glb and return its public URL. The image content does \
                   not influence the generated geometry.",
    request_body = TaskRequest,
    responses(
        (status = 200, description = "Model generated and uploaded", body = ModelResponse),
        (status = 400, description = "Missing or invalid request fields", body = crate::api::models::tasks::ErrorBody),
        (status = 404, description = "Uploaded image not found", body = crate::api::models::tasks::ErrorBody),
        (status = 500, description = "Storage or export failure", body = crate::api::models::tasks::ErrorBody)
    )
)]
#[tracing::instrument(skip_all)]
pub async fn make_model(State(state): State<AppState>, body: Bytes) -> Result<Json<ModelResponse>> {
    let request: TaskRequest = serde_json::from_slice(&body)
        .map_err(|_| Error::bad_request("No JSON data found in request body."))?;
    let task = request.validate()?;

    let key = state.config.input.key(&task.task_id, &task.file_extension);
    tracing::info!(task_id = %task.task_id, key = %key, "staging uploaded image for model generation");

    let poll = &state.config.upload_poll;
    wait_for_blob(state.input.as_ref(), &key, poll.attempts, poll.interval).await?;

    // The download verifies the upload is readable; the bytes themselves are
    // not consulted. Generation is a fixed placeholder until a real
    // reconstruction pipeline replaces it.
    let image = state.input.download(&key).await?;
    tracing::info!(key = %key, size = image.len(), "image staged, synthesizing placeholder figure");

    let figure = humanoid_figure();
    let glb = export_glb(&figure, FIGURE_NAME).map_err(anyhow::Error::from)?;

    let model_key = format!("{}.glb", task.task_id);
    state
        .output
        .upload(&model_key, glb.into(), GLB_CONTENT_TYPE)
        .await?;

    let model_url = state.config.output.public_url(&model_key);
    tracing::info!(task_id = %task.task_id, model_url = %model_url, "model uploaded");

    Ok(Json(ModelResponse {
        model_url,
        task_id: task.task_id,
        message: "3D model generated successfully.".to_string(),
    }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_utils::create_test_app;
    use axum::http::StatusCode;
    use serde_json::{Value, json};

    #[test_log::test(tokio::test)]
    async fn generates_and_uploads_model() {
        let (server, ctx) = create_test_app().await;
        ctx.stage_upload("task-9", "jpg", b"jpeg bytes").await;

        let response = server
            .post("/v1/model")
            .json(&json!({"taskId": "task-9", "fileExtension": "jpg"}))
            .await;

        response.assert_status(StatusCode::OK);
        let body: ModelResponse = response.json();
        assert_eq!(body.task_id, "task-9");
        assert!(body.model_url.ends_with("/task-9.glb"), "got {}", body.model_url);
        assert!(body.message.contains("successfully"));

        // The artifact must be a parseable GLB in the output bucket.
        let artifact = ctx.output.download("task-9.glb").await.expect("artifact uploaded");
        assert!(gltf::Gltf::from_slice(&artifact).is_ok());
    }

    #[test_log::test(tokio::test)]
    async fn model_is_independent_of_image_content() {
        let (server, ctx) = create_test_app().await;
        ctx.stage_upload("task-a", "png", b"first image").await;
        ctx.stage_upload("task-b", "png", b"a completely different image").await;

        for task in ["task-a", "task-b"] {
            server
                .post("/v1/model")
                .json(&json!({"taskId": task, "fileExtension": "png"}))
                .await
                .assert_status(StatusCode::OK);
        }

        let a = ctx.output.download("task-a.glb").await.unwrap();
        let b = ctx.output.download("task-b.glb").await.unwrap();
        assert_eq!(a, b, "generated geometry must ignore image content");
    }

    #[test_log::test(tokio::test)]
    async fn missing_upload_yields_404() {
        let (server, _ctx) = create_test_app().await;

        let response = server
            .post("/v1/model")
            .json(&json!({"taskId": "ghost", "fileExtension": "png"}))
            .await;

        response.assert_status(StatusCode::NOT_FOUND);
        let body: Value = response.json();
        assert!(body["error"].as_str().unwrap().contains("not found"));
    }

    #[test_log::test(tokio::test)]
    async fn missing_fields_yield_400() {
        let (server, _ctx) = create_test_app().await;

        let response = server.post("/v1/model").json(&json!({})).await;
        response.assert_status(StatusCode::BAD_REQUEST);

        let response = server.post("/v1/model").await;
        response.assert_status(StatusCode::BAD_REQUEST);
    }

    #[test_log::test(tokio::test)]
    async fn preflight_returns_204() {
        let (server, _ctx) = create_test_app().await;

        let response = server.method(axum::http::Method::OPTIONS, "/v1/model").await;
        response.assert_status(StatusCode::NO_CONTENT);
        assert_eq!(response.headers().get("access-control-allow-origin").unwrap(), "*");
    }
}
