use actix_web::http::StatusCode;
use actix_web::{HttpResponse, ResponseError};
use serde_json::json;
use thiserror::Error;

pub type AppResult<T> = Result<T, AppError>;

#[derive(Error, Debug)]
pub enum AppError {
    #[error("Database error: {0}")]
    DatabaseError(#[from] sea_orm::DbErr),

    #[error("Validation error: {0}")]
    ValidationError(String),

    #[error("Auth error: {0}")]
    AuthError(String),

    #[error("Forbidden: {0}")]
    Forbidden(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Method not allowed")]
    MethodNotAllowed,

    #[error("Rate limited: {message}")]
    RateLimited { message: String, retry_after: u64 },

    #[error("External API error: {0}")]
    ExternalApiError(String),

    #[error("Config error: {0}")]
    ConfigError(String),

    #[error("Internal server error: {0}")]
    InternalError(String),

    #[error("JWT error: {0}")]
    JwtError(#[from] jsonwebtoken::errors::Error),

    #[error("HTTP request error: {0}")]
    ReqwestError(#[from] reqwest::Error),

    #[error("Stripe error: {0}")]
    StripeError(#[from] stripe::StripeError),

    #[error("JSON serialization/deserialization error: {0}")]
    SerdeJsonError(#[from] serde_json::Error),
}

impl AppError {
    pub fn error_code(&self) -> &'static str {
        match self {
            AppError::ValidationError(_) => "VALIDATION_ERROR",
            AppError::AuthError(_) | AppError::JwtError(_) => "AUTH_ERROR",
            AppError::Forbidden(_) => "FORBIDDEN",
            AppError::NotFound(_) => "NOT_FOUND",
            AppError::MethodNotAllowed => "METHOD_NOT_ALLOWED",
            AppError::RateLimited { .. } => "RATE_LIMITED",
            AppError::ExternalApiError(_) => "EXTERNAL_API_ERROR",
            AppError::ConfigError(_) => "CONFIG_ERROR",
            AppError::DatabaseError(_) => "DATABASE_ERROR",
            _ => "INTERNAL_ERROR",
        }
    }

    /// Message safe to hand back to the caller.
    pub fn public_message(&self) -> String {
        match self {
            AppError::ValidationError(msg)
            | AppError::AuthError(msg)
            | AppError::Forbidden(msg)
            | AppError::NotFound(msg)
            | AppError::ExternalApiError(msg) => msg.clone(),
            AppError::RateLimited { message, .. } => message.clone(),
            AppError::MethodNotAllowed => "Method not allowed".to_string(),
            AppError::JwtError(_) => "Invalid or expired session".to_string(),
            AppError::ConfigError(_) => "Service misconfigured".to_string(),
            AppError::DatabaseError(_) => "Database error".to_string(),
            _ => "Internal server error".to_string(),
        }
    }
}

impl ResponseError for AppError {
    fn status_code(&self) -> StatusCode {
        match self {
            AppError::ValidationError(_) => StatusCode::BAD_REQUEST,
            AppError::AuthError(_) | AppError::JwtError(_) => StatusCode::UNAUTHORIZED,
            AppError::Forbidden(_) => StatusCode::FORBIDDEN,
            AppError::NotFound(_) => StatusCode::NOT_FOUND,
            AppError::MethodNotAllowed => StatusCode::METHOD_NOT_ALLOWED,
            AppError::RateLimited { .. } => StatusCode::TOO_MANY_REQUESTS,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn error_response(&self) -> HttpResponse {
        let status_code = self.status_code();
        match self {
            AppError::ValidationError(msg) => log::warn!("Validation error: {msg}"),
            AppError::AuthError(msg) => log::warn!("Authentication error: {msg}"),
            AppError::JwtError(err) => log::warn!("Session token rejected: {err}"),
            AppError::Forbidden(msg) => log::warn!("Forbidden access: {msg}"),
            AppError::RateLimited { retry_after, .. } => {
                log::info!("Rate limited, retry after {retry_after}s")
            }
            AppError::NotFound(_) | AppError::MethodNotAllowed => {}
            AppError::ExternalApiError(msg) => log::error!("External API error: {msg}"),
            AppError::DatabaseError(err) => log::error!("Database error: {err}"),
            AppError::ConfigError(msg) => log::error!("Configuration error: {msg}"),
            _ => log::error!("Internal error: {self}"),
        }

        let mut builder = HttpResponse::build(status_code);
        let mut body = json!({
            "success": false,
            "error": self.public_message(),
            "code": self.error_code(),
        });

        if let AppError::RateLimited { retry_after, .. } = self {
            builder.insert_header(("Retry-After", retry_after.to_string()));
            body["retryAfter"] = json!(retry_after);
        }

        builder.json(body)
    }
}
