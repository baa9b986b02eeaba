use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::errors::{Error, Result};

/// Request payload identifying an uploaded image.
///
/// Both fields are optional at the serde level so each missing field can be
/// reported with its own message; [`TaskRequest::validate`] enforces
/// presence and identifier hygiene.
#[derive(Debug, Clone, Default, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase", default)]
pub struct TaskRequest {
    /// Client-supplied correlation identifier. Names both the uploaded
    /// image (`uploads/{taskId}.{fileExtension}`) and the generated model
    /// (`{taskId}.glb`).
    pub task_id: Option<String>,
    /// File extension of the uploaded image, without the dot (e.g. "png")
    pub file_extension: Option<String>,
}

/// A validated task reference.
#[derive(Debug, Clone)]
pub struct TaskRef {
    pub task_id: String,
    pub file_extension: String,
}

/// Identifiers end up inside storage keys (and, for the filesystem backend,
/// filesystem paths), so they are restricted to a charset that cannot
/// traverse or smuggle separators.
fn is_clean_identifier(value: &str) -> bool {
    !value.is_empty()
        && !value.starts_with('.')
        && !value.contains("..")
        && value
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || matches!(c, '-' | '_' | '.'))
}

impl TaskRequest {
    /// Check field presence and identifier shape, in the order clients see
    /// the errors: `taskId` first, then `fileExtension`.
    pub fn validate(self) -> Result<TaskRef> {
        let task_id = self
            .task_id
            .filter(|s| !s.is_empty())
            .ok_or_else(|| Error::bad_request("Missing 'taskId' in request body."))?;
        let file_extension = self
            .file_extension
            .filter(|s| !s.is_empty())
            .ok_or_else(|| Error::bad_request("Missing 'fileExtension' in request body."))?;

        if !is_clean_identifier(&task_id) {
            return Err(Error::bad_request("Invalid 'taskId' in request body."));
        }
        if !is_clean_identifier(&file_extension) {
            return Err(Error::bad_request("Invalid 'fileExtension' in request body."));
        }

        Ok(TaskRef { task_id, file_extension })
    }
}

/// Response for a successful model generation.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct ModelResponse {
    /// Public URL of the uploaded GLB artifact
    pub model_url: String,
    /// Echo of the request's task identifier
    pub task_id: String,
    /// Human-readable status message
    pub message: String,
}

/// JSON error body returned for all failures.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct ErrorBody {
    /// Human-readable error description
    pub error: String,
}
