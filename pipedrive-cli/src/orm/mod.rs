//! Field-descriptor ORM
//!
//! Entities are described by static [`EntitySchema`] tables of
//! [`FieldDescriptor`]s. [`Model<E>`] holds one record, validates assignments
//! through the descriptors and talks to the API through [`PipedriveClient`](crate::api::PipedriveClient).

pub mod fields;
pub mod model;
pub mod schema;
pub mod types;
pub mod validators;
pub mod value;

pub use fields::{ElementKind, FieldDescriptor, FieldError, FieldKind, Validator};
pub use model::{BatchDelete, Model, ModelState, SaveResult};
pub use schema::{Endpoints, Entity, EntitySchema, Operation};
pub use types::{Struct, StructKind};
pub use value::{RecordId, Value};
