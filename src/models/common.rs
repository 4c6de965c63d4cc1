use crate::error::{AppError, AppResult};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fmt;
use utoipa::ToSchema;

/// Error envelope returned by every endpoint.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ErrorResponse {
    pub success: bool,
    #[schema(example = "Invalid South African mobile number")]
    pub error: String,
    #[schema(example = "VALIDATION_ERROR")]
    pub code: String,
    /// Seconds to wait, only present on 429.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub retry_after: Option<u64>,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct OkResponse {
    pub ok: bool,
}

impl OkResponse {
    pub fn ok() -> Self {
        Self { ok: true }
    }
}

/// Identifier of a remote row, the backend uses both numeric and uuid keys.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(untagged)]
pub enum RecordId {
    Number(i64),
    Text(String),
}

impl RecordId {
    pub fn to_param(&self) -> Value {
        match self {
            RecordId::Number(n) => Value::from(*n),
            RecordId::Text(s) => Value::from(s.trim()),
        }
    }

    fn is_blank(&self) -> bool {
        matches!(self, RecordId::Text(s) if s.trim().is_empty())
    }
}

impl fmt::Display for RecordId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RecordId::Number(n) => write!(f, "{n}"),
            RecordId::Text(s) => write!(f, "{}", s.trim()),
        }
    }
}

pub fn required_text(value: Option<String>, field: &str) -> AppResult<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
        .ok_or_else(|| AppError::ValidationError(format!("{field} is required")))
}

pub fn required_id(value: Option<RecordId>, field: &str) -> AppResult<RecordId> {
    value
        .filter(|v| !v.is_blank())
        .ok_or_else(|| AppError::ValidationError(format!("{field} is required")))
}

pub fn required_amount(value: Option<i64>, field: &str) -> AppResult<i64> {
    match value {
        None => Err(AppError::ValidationError(format!("{field} is required"))),
        Some(v) if v <= 0 => Err(AppError::ValidationError(format!(
            "{field} must be a positive amount in cents"
        ))),
        Some(v) => Ok(v),
    }
}
