//! API error responses.
//!
//! Every failure leaves the server as `{code, title, message}` JSON.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use rolegate_core::{AuthError, ErrorBody, Rejection};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ApiError {
    /// Access-control rejection (401 or 403).
    Rejected(Rejection),
    /// Server-side defect. The detail is logged, never sent.
    Internal(String),
}

impl ApiError {
    pub fn internal(detail: impl Into<String>) -> Self {
        ApiError::Internal(detail.into())
    }

    pub fn status_code(&self) -> StatusCode {
        match self {
            ApiError::Rejected(rejection) => StatusCode::from_u16(rejection.status_code())
                .unwrap_or(StatusCode::INTERNAL_SERVER_ERROR),
            ApiError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    pub fn body(&self) -> ErrorBody {
        match self {
            ApiError::Rejected(rejection) => rejection.body(),
            ApiError::Internal(_) => ErrorBody::new(
                500,
                "Internal Server Error",
                "The server encountered an unexpected condition.",
            ),
        }
    }
}

impl From<Rejection> for ApiError {
    fn from(rejection: Rejection) -> Self {
        ApiError::Rejected(rejection)
    }
}

impl From<AuthError> for ApiError {
    fn from(err: AuthError) -> Self {
        match err.rejection() {
            Some(rejection) => ApiError::Rejected(rejection),
            None => ApiError::Internal(err.to_string()),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        (self.status_code(), Json(self.body())).into_response()
    }
}
