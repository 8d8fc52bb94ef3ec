//! Pipedrive REST API client
//!
//! Thin HTTP layer shared by every resource model: versioned endpoint routing,
//! token authentication, response normalization, pagination and mapping of
//! error statuses to [`ApiError`].

pub mod client;
pub mod error;
pub mod pagination;
pub mod response;
pub mod transport;
pub mod version;

#[cfg(test)]
pub(crate) mod testing;

pub use client::{ApiRequest, DEFAULT_BASE_URL, PipedriveClient};
pub use error::{ApiError, ApiErrorKind};
pub use pagination::{DEFAULT_PAGE_LIMIT, NextPage};
pub use response::{ApiResponse, Params};
pub use transport::{FilePart, HttpRequest, HttpResponse, Method, ReqwestTransport, Transport};
pub use version::ApiVersion;
