//! API versions and their URL prefixes

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use super::transport::Method;
use crate::error::Error;

/// Pipedrive API version
///
/// v1 lives under `/v1/`, paginates by offset and updates with `PUT`.
/// v2 lives under `/api/v2/`, paginates by cursor and updates with `PATCH`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ApiVersion {
    V1,
    V2,
}

impl ApiVersion {
    pub const ALL: [ApiVersion; 2] = [ApiVersion::V1, ApiVersion::V2];

    /// Path segment between the base URL and the resource uri
    pub fn path(&self) -> &'static str {
        match self {
            Self::V1 => "v1",
            Self::V2 => "api/v2",
        }
    }

    /// HTTP method used to update an existing record
    pub fn update_method(&self) -> Method {
        match self {
            Self::V1 => Method::Put,
            Self::V2 => Method::Patch,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::V1 => "v1",
            Self::V2 => "v2",
        }
    }
}

impl fmt::Display for ApiVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ApiVersion {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "v1" | "1" => Ok(Self::V1),
            "v2" | "2" | "api/v2" => Ok(Self::V2),
            other => Err(Error::InvalidArgument(format!(
                "unknown API version '{}', expected v1 or v2",
                other
            ))),
        }
    }
}
