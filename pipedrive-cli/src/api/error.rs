//! Typed API errors
//!
//! Every non-2xx response is turned into an [`ApiError`]; the status code picks
//! the [`ApiErrorKind`].

use serde_json::Value;
use std::fmt;

use super::version::ApiVersion;

/// Error category derived from the HTTP status code
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ApiErrorKind {
    BadRequest,
    Unauthorized,
    Forbidden,
    NotFound,
    MethodNotAllowed,
    Conflict,
    Gone,
    ServerError,
    Other,
}

impl ApiErrorKind {
    pub fn from_status(status: u16) -> Self {
        match status {
            400 => Self::BadRequest,
            401 => Self::Unauthorized,
            403 => Self::Forbidden,
            404 => Self::NotFound,
            405 => Self::MethodNotAllowed,
            409 => Self::Conflict,
            410 => Self::Gone,
            s if s >= 500 => Self::ServerError,
            _ => Self::Other,
        }
    }

    /// Human readable reason, used when the payload carries no error message
    pub fn label(&self) -> &'static str {
        match self {
            Self::BadRequest => "Bad request",
            Self::Unauthorized => "Unauthorized",
            Self::Forbidden => "Forbidden",
            Self::NotFound => "Not found",
            Self::MethodNotAllowed => "Method not allowed",
            Self::Conflict => "Conflict",
            Self::Gone => "Gone",
            Self::ServerError => "Server error",
            Self::Other => "Request failed",
        }
    }
}

/// Error response returned by the Pipedrive API
///
/// `error_info`, `data` and `additional_data` are only carried for v1 responses;
/// v2 error bodies do not define them.
#[derive(Debug, Clone, PartialEq)]
pub struct ApiError {
    pub kind: ApiErrorKind,
    pub status: u16,
    pub version: ApiVersion,
    pub success: Option<bool>,
    pub error: Option<String>,
    pub error_info: Option<String>,
    pub data: Option<Value>,
    pub additional_data: Option<Value>,
}

impl ApiError {
    /// Build an error from the status code and the decoded response body
    pub fn from_response(status: u16, version: ApiVersion, payload: &Value) -> Self {
        let text = |key: &str| -> Option<String> {
            match payload.get(key) {
                None | Some(Value::Null) => None,
                Some(Value::String(s)) => Some(s.clone()),
                Some(other) => Some(other.to_string()),
            }
        };
        let raw = |key: &str| payload.get(key).filter(|v| !v.is_null()).cloned();
        let v1 = version == ApiVersion::V1;

        Self {
            kind: ApiErrorKind::from_status(status),
            status,
            version,
            success: payload.get("success").and_then(Value::as_bool),
            error: text("error"),
            error_info: if v1 { text("error_info") } else { None },
            data: if v1 { raw("data") } else { None },
            additional_data: if v1 { raw("additional_data") } else { None },
        }
    }

    /// Whether the server refused a delete because the record is already gone
    pub fn is_already_deleted(&self) -> bool {
        self.error
            .as_deref()
            .is_some_and(|e| e.to_ascii_lowercase().contains("already deleted"))
    }

    pub fn is_not_found(&self) -> bool {
        matches!(self.kind, ApiErrorKind::NotFound | ApiErrorKind::Gone)
    }
}

impl fmt::Display for ApiError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let error = self.error.as_deref().unwrap_or(self.kind.label());
        write!(f, "{} {}", self.status, error)?;
        if let Some(info) = &self.error_info {
            write!(f, " (info: {})", info)?;
        }
        Ok(())
    }
}

impl std::error::Error for ApiError {}
