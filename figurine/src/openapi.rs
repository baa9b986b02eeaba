//! OpenAPI document assembly.

use utoipa::OpenApi;

use crate::api::models::tasks::{ErrorBody, ModelResponse, TaskRequest};

#[derive(OpenApi)]
#[openapi(
    info(
        title = "figurine",
        description = "Stages uploaded images and emits a fixed humanoid GLB placeholder model."
    ),
    paths(
        crate::api::handlers::images::fetch_image,
        crate::api::handlers::meshes::make_model,
    ),
    components(schemas(TaskRequest, ModelResponse, ErrorBody)),
    tags(
        (name = "images", description = "Staged upload retrieval"),
        (name = "models", description = "Placeholder model generation")
    )
)]
pub struct ApiDoc;
