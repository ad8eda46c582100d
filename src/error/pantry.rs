use axum::extract::multipart::{MultipartError, MultipartRejection};
use axum::extract::rejection::FormRejection;
use axum::{Json, http::StatusCode, response::IntoResponse};
use serde::Serialize;
use thiserror::Error as ThisError;
use tracing::error;

#[derive(Debug, ThisError)]
pub enum PantryError {
    #[error("Only PNG data URLs are supported")]
    UnsupportedFormat,

    #[error("Invalid base64 payload: {0}")]
    InvalidEncoding(#[from] base64::DecodeError),

    #[error("Image payload is empty")]
    EmptyImage,

    #[error("Invalid form: {0}")]
    InvalidForm(String),

    #[error("limit must be a positive integer")]
    InvalidLimit,

    #[error("Invalid artwork id: {0}")]
    InvalidId(String),

    #[error("Artwork {0} not found")]
    NotFound(i64),

    #[error("File for artwork {id} is missing")]
    FileMissing { id: i64 },

    #[error("Route not found")]
    RouteNotFound,

    #[error("Method not allowed")]
    MethodNotAllowed,

    #[error("Request body exceeds the upload limit")]
    PayloadTooLarge,

    #[error("Storage write error: {0}")]
    StorageWrite(#[source] std::io::Error),

    #[error("Storage read error: {0}")]
    StorageRead(#[source] std::io::Error),

    #[error("Ractor error: {0}")]
    RactorError(String),

    #[error("Database error: {0}")]
    DatabaseError(#[from] sqlx::Error),
}

impl PantryError {
    /// True for both "no such row" and "row without file".
    pub fn is_not_found(&self) -> bool {
        matches!(self, PantryError::NotFound(_) | PantryError::FileMissing { .. })
    }
}

/// Body-limit overflows surface as 413; everything else is a malformed form.
fn form_error(status: StatusCode, body_text: String) -> PantryError {
    if status == StatusCode::PAYLOAD_TOO_LARGE {
        PantryError::PayloadTooLarge
    } else {
        PantryError::InvalidForm(body_text)
    }
}

impl From<FormRejection> for PantryError {
    fn from(rejection: FormRejection) -> Self {
        form_error(rejection.status(), rejection.body_text())
    }
}

impl From<MultipartRejection> for PantryError {
    fn from(rejection: MultipartRejection) -> Self {
        form_error(rejection.status(), rejection.body_text())
    }
}

impl From<MultipartError> for PantryError {
    fn from(err: MultipartError) -> Self {
        form_error(err.status(), err.body_text())
    }
}

impl IntoResponse for PantryError {
    fn into_response(self) -> axum::response::Response {
        let (status, code) = match &self {
            PantryError::UnsupportedFormat => (StatusCode::BAD_REQUEST, "UNSUPPORTED_FORMAT"),
            PantryError::InvalidEncoding(_) => (StatusCode::BAD_REQUEST, "INVALID_ENCODING"),
            PantryError::EmptyImage => (StatusCode::BAD_REQUEST, "EMPTY_IMAGE"),
            PantryError::InvalidForm(_) => (StatusCode::BAD_REQUEST, "INVALID_FORM"),
            PantryError::InvalidLimit => (StatusCode::BAD_REQUEST, "INVALID_LIMIT"),
            PantryError::InvalidId(_) => (StatusCode::BAD_REQUEST, "INVALID_ID"),
            PantryError::NotFound(_) | PantryError::RouteNotFound => {
                (StatusCode::NOT_FOUND, "NOT_FOUND")
            }
            PantryError::FileMissing { .. } => (StatusCode::NOT_FOUND, "FILE_MISSING"),
            PantryError::MethodNotAllowed => {
                (StatusCode::METHOD_NOT_ALLOWED, "METHOD_NOT_ALLOWED")
            }
            PantryError::PayloadTooLarge => (StatusCode::PAYLOAD_TOO_LARGE, "PAYLOAD_TOO_LARGE"),
            PantryError::StorageWrite(_) => {
                (StatusCode::INTERNAL_SERVER_ERROR, "STORAGE_WRITE_ERROR")
            }
            PantryError::StorageRead(_) => {
                (StatusCode::INTERNAL_SERVER_ERROR, "STORAGE_READ_ERROR")
            }
            PantryError::RactorError(_) | PantryError::DatabaseError(_) => {
                (StatusCode::INTERNAL_SERVER_ERROR, "INTERNAL_ERROR")
            }
        };

        // Internal causes stay in the log, never in the body.
        let message = if status.is_server_error() {
            error!(error = %self, code, "Request failed with internal error");
            "An internal server error occurred.".to_string()
        } else {
            self.to_string()
        };

        let body = ApiErrorObject {
            code: code.to_string(),
            message,
        };
        (status, Json(ApiErrorBody { inner: body })).into_response()
    }
}

/// Standardized API error response payload.
#[derive(Serialize)]
pub struct ApiErrorObject {
    pub code: String,
    pub message: String,
}

#[derive(Serialize)]
pub struct ApiErrorBody {
    #[serde(rename = "error")]
    pub inner: ApiErrorObject,
}
