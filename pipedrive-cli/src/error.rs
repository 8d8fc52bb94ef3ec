//! Error types for the Pipedrive client

use thiserror::Error;

use crate::api::{ApiError, ApiVersion};
use crate::orm::{FieldError, Operation, RecordId};

/// Result type alias
pub type Result<T> = std::result::Result<T, Error>;

/// Errors raised by the client, the ORM layer and the resource models
#[derive(Error, Debug)]
pub enum Error {
    /// The API answered with a non-success status
    #[error(transparent)]
    Api(#[from] ApiError),

    /// A value was rejected by a field descriptor
    #[error(transparent)]
    Field(#[from] FieldError),

    #[error("{entity} does not support {operation}{}", version_suffix(.version))]
    Unsupported {
        entity: &'static str,
        operation: Operation,
        version: Option<ApiVersion>,
    },

    #[error("{entity} cannot {operation} without an id")]
    MissingId {
        entity: &'static str,
        operation: Operation,
    },

    #[error("{entity}/{id} was deleted")]
    Deleted { entity: &'static str, id: RecordId },

    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    #[error("Unexpected response: {0}")]
    UnexpectedResponse(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("HTTP request error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("JSON parse error: {0}")]
    Json(#[from] serde_json::Error),
}

impl Error {
    /// The API error behind this error, if any
    pub fn api(&self) -> Option<&ApiError> {
        match self {
            Error::Api(err) => Some(err),
            _ => None,
        }
    }
}

fn version_suffix(version: &Option<ApiVersion>) -> String {
    version.map(|v| format!("/{}", v)).unwrap_or_default()
}
