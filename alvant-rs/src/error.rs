use axum::http::StatusCode;
use std::collections::BTreeMap;
use thiserror::Error;

/// Per-field validation messages, keyed by the request field name
pub type FieldErrors = BTreeMap<String, String>;

#[derive(Error, Debug)]
pub enum AppError {
    #[error("{0}")]
    Validation(String),

    #[error("Validation failed")]
    InvalidFields(FieldErrors),

    #[error("Unauthorized email address. Please use the registered admin email.")]
    InvalidIdentity,

    #[error("OTP not requested")]
    NotRequested,

    #[error("OTP expired or not requested")]
    Expired,

    #[error("Invalid OTP")]
    Mismatch,

    #[error("Unauthorized")]
    Unauthorized,

    #[error("Invalid or expired token")]
    InvalidToken,

    #[error("Failed to send OTP email: {0}")]
    Delivery(String),

    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("Token error: {0}")]
    Token(#[from] jsonwebtoken::errors::Error),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl AppError {
    /// HTTP status the request boundary reports for this error
    pub fn status_code(&self) -> StatusCode {
        match self {
            AppError::Validation(_)
            | AppError::InvalidFields(_)
            | AppError::NotRequested
            | AppError::Expired
            | AppError::Mismatch => StatusCode::BAD_REQUEST,
            AppError::InvalidIdentity | AppError::Unauthorized | AppError::InvalidToken => {
                StatusCode::UNAUTHORIZED
            }
            AppError::Delivery(_)
            | AppError::Database(_)
            | AppError::Token(_)
            | AppError::Config(_)
            | AppError::Json(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Whether the message is safe to show a client as-is.
    ///
    /// Infrastructure failures carry driver text that must stay server-side.
    pub fn is_client_facing(&self) -> bool {
        !self.status_code().is_server_error()
    }

    /// Message shown to the client regardless of runtime mode
    pub fn public_message(&self) -> String {
        match self {
            AppError::Delivery(_) => {
                "Failed to send OTP email. Please check email configuration.".to_string()
            }
            e if e.is_client_facing() => e.to_string(),
            _ => "Server error".to_string(),
        }
    }
}

pub type Result<T> = std::result::Result<T, AppError>;
