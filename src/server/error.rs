use axum::{
    extract::rejection::{JsonRejection, PathRejection},
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;

/// Failures a handler can report. Store errors are logged but never sent to the client.
#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    #[error("bad request")]
    BadRequest,

    #[error("resource not found")]
    NotFound,

    #[error("method not allowed")]
    MethodNotAllowed,

    #[error("unprocessable")]
    Unprocessable(#[source] sqlx::Error),

    #[error("internal server error")]
    Internal(#[from] sqlx::Error),
}

impl ApiError {
    pub fn status(&self) -> StatusCode {
        match self {
            ApiError::BadRequest => StatusCode::BAD_REQUEST,
            ApiError::NotFound => StatusCode::NOT_FOUND,
            ApiError::MethodNotAllowed => StatusCode::METHOD_NOT_ALLOWED,
            ApiError::Unprocessable(_) => StatusCode::UNPROCESSABLE_ENTITY,
            ApiError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

pub fn error_body(status: StatusCode, message: &str) -> Response {
    let body = Json(json!({
        "success": false,
        "error": status.as_u16(),
        "message": message,
    }));
    (status, body).into_response()
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        match &self {
            ApiError::Unprocessable(err) => tracing::error!(error = %err, "Store write failed"),
            ApiError::Internal(err) => tracing::error!(error = %err, "Store read failed"),
            _ => {}
        }
        error_body(self.status(), &self.to_string())
    }
}

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        tracing::debug!("Rejected request body: {rejection}");
        ApiError::BadRequest
    }
}

// non-numeric ids simply don't match the route
impl From<PathRejection> for ApiError {
    fn from(rejection: PathRejection) -> Self {
        tracing::debug!("Rejected path: {rejection}");
        ApiError::NotFound
    }
}
