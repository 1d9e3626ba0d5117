//! Mapping from service errors to HTTP responses.

use crate::reminder::services::NotificationServiceError;
use crate::stats::services::StatisticsError;
use crate::task::services::TaskServiceError;
use axum::{
    Json,
    extract::rejection::JsonRejection,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde_json::json;
use thiserror::Error;
use tracing::error;

/// Result type for HTTP handlers.
pub type ApiResult<T> = Result<T, ApiError>;

/// Error returned by HTTP handlers.
///
/// Storage failures are logged and reported with a generic message.
#[derive(Debug, Error)]
pub enum ApiError {
    /// Missing or unknown credentials, or a resource owned by someone else.
    #[error("{0}")]
    Unauthorized(String),

    /// The resource does not exist.
    #[error("{0}")]
    NotFound(String),

    /// The request failed validation.
    #[error("{0}")]
    BadRequest(String),

    /// A required server feature is not configured.
    #[error("{0}")]
    ServiceUnavailable(String),

    /// An unexpected server-side failure.
    #[error("server error")]
    Internal,
}

impl ApiError {
    const fn status(&self) -> StatusCode {
        match self {
            Self::Unauthorized(_) => StatusCode::UNAUTHORIZED,
            Self::NotFound(_) => StatusCode::NOT_FOUND,
            Self::BadRequest(_) => StatusCode::BAD_REQUEST,
            Self::ServiceUnavailable(_) => StatusCode::SERVICE_UNAVAILABLE,
            Self::Internal => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    pub(super) fn task_not_found() -> Self {
        Self::NotFound("task not found".to_owned())
    }

    fn internal(err: &dyn std::error::Error) -> Self {
        error!(error = %err, "request failed");
        Self::Internal
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let body = Json(json!({ "message": self.to_string() }));
        (self.status(), body).into_response()
    }
}

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        Self::BadRequest(format!("invalid request body: {}", rejection.body_text()))
    }
}

impl From<TaskServiceError> for ApiError {
    fn from(err: TaskServiceError) -> Self {
        match err {
            TaskServiceError::NotFound(_) => Self::task_not_found(),
            TaskServiceError::NotAuthorized(_) => Self::Unauthorized("not authorized".to_owned()),
            TaskServiceError::Domain(domain) => Self::BadRequest(domain.to_string()),
            TaskServiceError::AlreadyCompleted { .. } => {
                Self::BadRequest("task already completed today".to_owned())
            }
            TaskServiceError::Repository(inner) => Self::internal(&inner),
            TaskServiceError::History(inner) => Self::internal(&inner),
        }
    }
}

impl From<NotificationServiceError> for ApiError {
    fn from(err: NotificationServiceError) -> Self {
        match err {
            NotificationServiceError::ConfigurationMissing => {
                Self::ServiceUnavailable("push notifications are not configured".to_owned())
            }
            NotificationServiceError::NoSubscriptions(_) => {
                Self::BadRequest("no push subscriptions found".to_owned())
            }
            NotificationServiceError::Domain(domain) => Self::BadRequest(domain.to_string()),
            NotificationServiceError::Users(inner) => Self::internal(&inner),
        }
    }
}

impl From<StatisticsError> for ApiError {
    fn from(err: StatisticsError) -> Self {
        Self::internal(&err)
    }
}
