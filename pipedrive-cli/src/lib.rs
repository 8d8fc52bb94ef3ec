//! Typed client for the Pipedrive CRM REST API
//!
//! The crate is organised in three layers:
//!
//! - [`api`]: the HTTP client. Builds versioned endpoint URLs, attaches the API
//!   token, follows cursor and offset pagination and maps error responses to
//!   typed errors.
//! - [`orm`]: field descriptors, typed nested records and the generic
//!   [`Model`] with change tracking and version-aware CRUD.
//! - [`models`]: one schema per CRM entity (deals, persons, organizations, ...)
//!   plus the entity-specific endpoints.
//!
//! ```rust,no_run
//! use pipedrive::{Deal, PipedriveClient};
//!
//! # async fn example() -> pipedrive::Result<()> {
//! let client = PipedriveClient::new("api-token")?;
//!
//! let mut deal = Deal::get(&client, 42).await?;
//! deal.set("title", "Renewal 2026")?;
//! let result = deal.save(&client, false).await?;
//! assert!(result.updated);
//! # Ok(())
//! # }
//! ```

pub mod api;
pub mod cli;
pub mod config;
pub mod error;
pub mod models;
pub mod orm;

pub use api::{ApiError, ApiErrorKind, ApiResponse, ApiVersion, Params, PipedriveClient};
pub use config::Config;
pub use error::{Error, Result};
pub use models::{
    Activities, Activity, Deal, DealFields, Deals, Organization, Organizations, Person,
    PersonFields, Persons, Pipeline, Pipelines,
};
pub use orm::{
    BatchDelete, Entity, EntitySchema, FieldDescriptor, FieldError, FieldKind, Model, Operation,
    RecordId, SaveResult, Value,
};
