use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde_json::json;
use thiserror::Error as ThisError;

use crate::storage::StorageError;

#[derive(ThisError, Debug)]
pub enum Error {
    /// Invalid request data: absent/invalid JSON body, missing field, or a
    /// malformed identifier
    #[error("{message}")]
    BadRequest { message: String },

    /// Requested blob does not exist
    #[error("File not found in storage: {bucket}/{key}. Please check filename or upload status.")]
    NotFound { bucket: String, key: String },

    /// Storage backend failure
    #[error(transparent)]
    Storage(StorageError),

    /// Unexpected error with full context chain
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl Error {
    pub fn bad_request(message: impl Into<String>) -> Self {
        Error::BadRequest { message: message.into() }
    }

    pub fn status_code(&self) -> StatusCode {
        match self {
            Error::BadRequest { .. } => StatusCode::BAD_REQUEST,
            Error::NotFound { .. } => StatusCode::NOT_FOUND,
            Error::Storage(_) | Error::Other(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Returns a user-safe error message, without leaking backend details
    pub fn user_message(&self) -> String {
        match self {
            Error::BadRequest { message } => message.clone(),
            Error::NotFound { .. } => self.to_string(),
            Error::Storage(_) => "Storage operation failed".to_string(),
            Error::Other(_) => "Internal server error".to_string(),
        }
    }
}

/// Storage errors keep their not-found/backend split all the way out to the
/// HTTP status: a missing blob is the caller's 404, everything else is ours.
impl From<StorageError> for Error {
    fn from(err: StorageError) -> Self {
        match err {
            StorageError::NotFound { bucket, key } => Error::NotFound { bucket, key },
            other => Error::Storage(other),
        }
    }
}

impl IntoResponse for Error {
    fn into_response(self) -> Response {
        // Log full error details for debugging, at a level matched to severity
        match &self {
            Error::Storage(_) | Error::Other(_) => {
                tracing::error!("Internal service error: {:#}", self);
            }
            Error::BadRequest { .. } | Error::NotFound { .. } => {
                tracing::debug!("Client error: {}", self);
            }
        }

        let status = self.status_code();
        let body = json!({ "error": self.user_message() });
        (status, Json(body)).into_response()
    }
}

/// Type alias for service operation results
pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn storage_not_found_maps_to_404() {
        let err: Error = StorageError::NotFound {
            bucket: "uploads".into(),
            key: "uploads/abc.png".into(),
        }
        .into();
        assert_eq!(err.status_code(), StatusCode::NOT_FOUND);
    }

    #[test]
    fn backend_errors_map_to_500_and_hide_details() {
        let err: Error = StorageError::Backend(anyhow::anyhow!("connection refused to 10.0.0.3")).into();
        assert_eq!(err.status_code(), StatusCode::INTERNAL_SERVER_ERROR);
        assert!(!err.user_message().contains("10.0.0.3"));
    }

    #[test]
    fn bad_request_keeps_its_message() {
        let err = Error::bad_request("Missing 'taskId' in request body.");
        assert_eq!(err.status_code(), StatusCode::BAD_REQUEST);
        assert_eq!(err.user_message(), "Missing 'taskId' in request body.");
    }
}
