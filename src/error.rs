//! Error types for the Librarium server

use std::collections::BTreeMap;

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use thiserror::Error;

/// Stable application error codes exposed to API clients
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u32)]
pub enum ErrorCode {
    Success = 0,
    Failure = 1,
    NotAuthorized = 2,
    DbFailure = 3,
    NoSuchUser = 4,
    NoSuchBook = 5,
    NoSuchGenre = 6,
    BadValue = 7,
    DuplicateEmail = 8,
    BookAlreadyBorrowed = 9,
    BookNotBorrowed = 10,
    UserHasActiveBorrows = 11,
    BookCurrentlyBorrowed = 12,
    InvalidToken = 13,
}

/// Main application error type
#[derive(Error, Debug)]
pub enum AppError {
    #[error("Authentication failed: {0}")]
    Authentication(String),

    #[error("Authorization failed: {0}")]
    Authorization(String),

    #[error("{message}")]
    NotFound { code: ErrorCode, message: String },

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Validation error")]
    Invalid(#[from] validator::ValidationErrors),

    #[error("Validation error")]
    Fields(BTreeMap<String, String>),

    #[error("{message}")]
    Domain { code: ErrorCode, message: String },

    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("Internal server error: {0}")]
    Internal(String),
}

impl AppError {
    /// A 400 keyed on a single request field, mirroring serializer-style errors
    pub fn field(name: &str, message: &str) -> Self {
        let mut fields = BTreeMap::new();
        fields.insert(name.to_string(), message.to_string());
        AppError::Fields(fields)
    }

    pub fn book_not_found(id: i32) -> Self {
        AppError::NotFound {
            code: ErrorCode::NoSuchBook,
            message: format!("Book with id {} not found", id),
        }
    }

    pub fn genre_not_found(id: i32) -> Self {
        AppError::NotFound {
            code: ErrorCode::NoSuchGenre,
            message: format!("Genre with id {} not found", id),
        }
    }

    pub fn user_not_found(id: i32) -> Self {
        AppError::NotFound {
            code: ErrorCode::NoSuchUser,
            message: format!("User with id {} not found", id),
        }
    }
}

/// Error response body
#[derive(Serialize, utoipa::ToSchema)]
pub struct ErrorResponse {
    pub code: u32,
    pub error: String,
    pub detail: String,
    /// Field-keyed validation messages, present on validation failures only
    #[serde(skip_serializing_if = "Option::is_none")]
    pub fields: Option<BTreeMap<String, String>>,
}

/// Flatten validator output into one message per field
fn field_messages(errors: &validator::ValidationErrors) -> BTreeMap<String, String> {
    errors
        .field_errors()
        .iter()
        .map(|(field, errs)| {
            let message = errs
                .iter()
                .find_map(|e| e.message.as_ref().map(|m| m.to_string()))
                .unwrap_or_else(|| "Invalid value".to_string());
            (field.to_string(), message)
        })
        .collect()
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, code, detail, fields) = match &self {
            AppError::Authentication(msg) => {
                (StatusCode::UNAUTHORIZED, ErrorCode::NotAuthorized, msg.clone(), None)
            }
            AppError::Authorization(msg) => {
                (StatusCode::FORBIDDEN, ErrorCode::NotAuthorized, msg.clone(), None)
            }
            AppError::NotFound { code, message } => {
                (StatusCode::NOT_FOUND, *code, message.clone(), None)
            }
            AppError::Validation(msg) => {
                (StatusCode::BAD_REQUEST, ErrorCode::BadValue, msg.clone(), None)
            }
            AppError::Invalid(errors) => (
                StatusCode::BAD_REQUEST,
                ErrorCode::BadValue,
                "Validation failed".to_string(),
                Some(field_messages(errors)),
            ),
            AppError::Fields(fields) => (
                StatusCode::BAD_REQUEST,
                ErrorCode::BadValue,
                "Validation failed".to_string(),
                Some(fields.clone()),
            ),
            AppError::Domain { code, message } => {
                (StatusCode::BAD_REQUEST, *code, message.clone(), None)
            }
            AppError::Database(e) => {
                tracing::error!("Database error: {:?}", e);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    ErrorCode::DbFailure,
                    "Database error".to_string(),
                    None,
                )
            }
            AppError::Internal(msg) => {
                tracing::error!("Internal error: {}", msg);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    ErrorCode::Failure,
                    "Internal server error".to_string(),
                    None,
                )
            }
        };

        let body = Json(ErrorResponse {
            code: code as u32,
            error: format!("{:?}", code),
            detail,
            fields,
        });

        (status, body).into_response()
    }
}

/// Result type alias for application operations
pub type AppResult<T> = Result<T, AppError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_mapping() {
        let cases = [
            (AppError::Authentication("no".into()), StatusCode::UNAUTHORIZED),
            (AppError::Authorization("no".into()), StatusCode::FORBIDDEN),
            (AppError::book_not_found(7), StatusCode::NOT_FOUND),
            (
                AppError::Domain {
                    code: ErrorCode::BookAlreadyBorrowed,
                    message: "The book has already been taken".into(),
                },
                StatusCode::BAD_REQUEST,
            ),
            (AppError::field("password", "This field is required."), StatusCode::BAD_REQUEST),
            (AppError::Internal("boom".into()), StatusCode::INTERNAL_SERVER_ERROR),
        ];
        for (err, status) in cases {
            assert_eq!(err.into_response().status(), status);
        }
    }

    #[test]
    fn test_field_error_body() {
        let err = AppError::field("genre", "Genre not found.");
        if let AppError::Fields(fields) = &err {
            assert_eq!(fields.get("genre").map(String::as_str), Some("Genre not found."));
        } else {
            panic!("expected Fields variant");
        }
    }
}
