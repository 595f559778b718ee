//! Error types for the exam activity cache
//!
//! Provides unified error handling using thiserror.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;

use crate::models::ExamId;

// == Activity Error Enum ==
/// Unified error type for the exam activity cache.
#[derive(Error, Debug)]
pub enum ActivityError {
    /// A mutation was attempted on the empty cache sentinel
    #[error("Unsupported operation on empty exam activity cache: {0}")]
    UnsupportedOperation(&'static str),

    /// Inbound action failed validation
    #[error("Invalid action: {0}")]
    InvalidAction(String),

    /// Exam metadata could not be found
    #[error("Exam not found: {0}")]
    ExamNotFound(ExamId),

    /// A task with the same name is already scheduled somewhere in the cluster
    #[error("Task already scheduled: {0}")]
    DuplicateTask(String),

    /// Persistence collaborator failure
    #[error("Persistence error: {0}")]
    Persistence(String),

    /// Messaging collaborator failure
    #[error("Messaging error: {0}")]
    Messaging(String),

    /// Internal server error
    #[error("Internal error: {0}")]
    Internal(String),
}

// == IntoResponse Implementation ==
impl IntoResponse for ActivityError {
    fn into_response(self) -> Response {
        let status = match &self {
            ActivityError::InvalidAction(_) => StatusCode::BAD_REQUEST,
            ActivityError::ExamNotFound(_) => StatusCode::NOT_FOUND,
            ActivityError::DuplicateTask(_) => StatusCode::CONFLICT,
            ActivityError::Persistence(_) => StatusCode::SERVICE_UNAVAILABLE,
            ActivityError::UnsupportedOperation(_)
            | ActivityError::Messaging(_)
            | ActivityError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        };

        let body = Json(json!({
            "error": self.to_string()
        }));

        (status, body).into_response()
    }
}

// == Result Type Alias ==
/// Convenience Result type for the exam activity cache.
pub type Result<T> = std::result::Result<T, ActivityError>;
