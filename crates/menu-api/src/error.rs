//! HTTP error mapping
//!
//! Every failure leaves the API as an `ApiResponse` error envelope with a
//! stable machine-readable code.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Json, Response},
};
use menu_core::DomainError;
use tracing::error;
use validator::ValidationErrors;

use crate::response::ApiResponse;

#[derive(Debug)]
pub struct HttpError {
    pub status: StatusCode,
    pub code: &'static str,
    pub message: String,
}

impl HttpError {
    pub fn new(status: StatusCode, code: &'static str, message: impl Into<String>) -> Self {
        Self {
            status,
            code,
            message: message.into(),
        }
    }

    pub fn bad_request(message: impl Into<String>) -> Self {
        Self::new(StatusCode::BAD_REQUEST, "VALIDATION_ERROR", message)
    }
}

impl IntoResponse for HttpError {
    fn into_response(self) -> Response {
        let body = ApiResponse::<()>::error(self.code, &self.message);
        (self.status, Json(body)).into_response()
    }
}

impl From<DomainError> for HttpError {
    fn from(err: DomainError) -> Self {
        let (status, code) = match &err {
            DomainError::MenuNotFound(_) => (StatusCode::NOT_FOUND, "MENU_NOT_FOUND"),
            DomainError::ItemNotFound(_) => (StatusCode::NOT_FOUND, "ITEM_NOT_FOUND"),
            DomainError::ParentNotFound(_) => (StatusCode::NOT_FOUND, "PARENT_NOT_FOUND"),
            DomainError::SlugAlreadyExists(_) => (StatusCode::CONFLICT, "SLUG_CONFLICT"),
            DomainError::InvalidOperation(_) => (StatusCode::BAD_REQUEST, "INVALID_OPERATION"),
            DomainError::ValidationError(_) => (StatusCode::BAD_REQUEST, "VALIDATION_ERROR"),
            DomainError::TransactionAborted(_) => {
                (StatusCode::SERVICE_UNAVAILABLE, "TRANSACTION_ABORTED")
            }
            DomainError::InvalidTree(_) => (StatusCode::INTERNAL_SERVER_ERROR, "INVALID_TREE"),
            DomainError::DatabaseError(_) => (StatusCode::INTERNAL_SERVER_ERROR, "DATABASE_ERROR"),
            DomainError::InternalError(_) => (StatusCode::INTERNAL_SERVER_ERROR, "INTERNAL_ERROR"),
        };

        // Storage details stay in the logs
        let message = if status.is_server_error() && status != StatusCode::SERVICE_UNAVAILABLE {
            error!("Request failed: {}", err);
            "Internal server error".to_string()
        } else {
            err.to_string()
        };

        Self::new(status, code, message)
    }
}

impl From<ValidationErrors> for HttpError {
    fn from(errors: ValidationErrors) -> Self {
        Self::bad_request(errors.to_string())
    }
}
