//! Entity schemas and version routing

use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::fmt;

use super::fields::FieldDescriptor;
use crate::api::{ApiVersion, Method};
use crate::error::{Error, Result};

pub const BOTH: &[ApiVersion] = &[ApiVersion::V1, ApiVersion::V2];
pub const V1_ONLY: &[ApiVersion] = &[ApiVersion::V1];
pub const V2_ONLY: &[ApiVersion] = &[ApiVersion::V2];
pub const NONE: &[ApiVersion] = &[];

/// Model-level operation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Operation {
    Get,
    All,
    Save,
    Update,
    Delete,
    BatchDelete,
}

impl Operation {
    /// Get the HTTP method for this operation
    pub fn http_method(&self, version: ApiVersion) -> Method {
        match self {
            Self::Get | Self::All => Method::Get,
            Self::Save => Method::Post,
            Self::Update => version.update_method(),
            Self::Delete | Self::BatchDelete => Method::Delete,
        }
    }

    /// Get the operation type as a string
    pub fn operation_type(&self) -> &'static str {
        match self {
            Self::Get => "get",
            Self::All => "all",
            Self::Save => "save",
            Self::Update => "update",
            Self::Delete => "delete",
            Self::BatchDelete => "batch_delete",
        }
    }
}

impl fmt::Display for Operation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.operation_type())
    }
}

/// API versions each operation is available on, oldest first
#[derive(Debug, Clone, Copy)]
pub struct Endpoints {
    pub get: &'static [ApiVersion],
    pub all: &'static [ApiVersion],
    pub save: &'static [ApiVersion],
    pub update: &'static [ApiVersion],
    pub delete: &'static [ApiVersion],
    pub batch_delete: &'static [ApiVersion],
}

impl Endpoints {
    /// Same versions for every operation
    pub const fn uniform(versions: &'static [ApiVersion]) -> Self {
        Self {
            get: versions,
            all: versions,
            save: versions,
            update: versions,
            delete: versions,
            batch_delete: versions,
        }
    }

    /// List and get only
    pub const fn read_only(versions: &'static [ApiVersion]) -> Self {
        Self {
            save: NONE,
            update: NONE,
            delete: NONE,
            batch_delete: NONE,
            ..Self::uniform(versions)
        }
    }

    pub const fn without_batch_delete(self) -> Self {
        Self {
            batch_delete: NONE,
            ..self
        }
    }

    pub fn versions(&self, operation: Operation) -> &'static [ApiVersion] {
        match operation {
            Operation::Get => self.get,
            Operation::All => self.all,
            Operation::Save => self.save,
            Operation::Update => self.update,
            Operation::Delete => self.delete,
            Operation::BatchDelete => self.batch_delete,
        }
    }
}

/// Static description of one Pipedrive entity
#[derive(Debug)]
pub struct EntitySchema {
    /// Display name, e.g. "Deals"
    pub name: &'static str,
    /// Resource path, e.g. "deals"
    pub entity_name: &'static str,
    /// Record key holding the id, "id" unless the entity is keyed otherwise
    pub id_field: &'static str,
    pub fields: &'static [FieldDescriptor],
    pub endpoints: Endpoints,
}

impl EntitySchema {
    pub const fn new(
        name: &'static str,
        entity_name: &'static str,
        fields: &'static [FieldDescriptor],
        endpoints: Endpoints,
    ) -> Self {
        Self {
            name,
            entity_name,
            id_field: "id",
            fields,
            endpoints,
        }
    }

    pub const fn with_id_field(self, id_field: &'static str) -> Self {
        Self { id_field, ..self }
    }

    pub fn descriptor(&self, attribute: &str) -> Option<&'static FieldDescriptor> {
        let fields: &'static [FieldDescriptor] = self.fields;
        fields.iter().find(|d| d.attribute == attribute)
    }

    pub fn supports(&self, operation: Operation) -> bool {
        !self.endpoints.versions(operation).is_empty()
    }

    /// Version to use for `operation`: the pinned one if supported, otherwise
    /// the latest supported. Fails before any request is made.
    pub fn resolve_version(&self, operation: Operation, pinned: Option<ApiVersion>) -> Result<ApiVersion> {
        let supported = self.endpoints.versions(operation);
        let resolved = match pinned {
            Some(version) => supported.contains(&version).then_some(version),
            None => supported.iter().max().copied(),
        };
        resolved.ok_or(Error::Unsupported {
            entity: self.name,
            operation,
            version: pinned,
        })
    }

    /// Attribute and wire names must be unique and must not shadow `id`
    pub fn check(&self) -> std::result::Result<(), String> {
        let mut attributes = HashSet::new();
        let mut wire_names = HashSet::new();
        for field in self.fields {
            if field.attribute == "id" || (!field.custom && field.field_name == self.id_field) {
                return Err(format!("{}: '{}' is reserved for the id", self.name, field.field_name));
            }
            if !attributes.insert(field.attribute) {
                return Err(format!("{}: duplicate attribute '{}'", self.name, field.attribute));
            }
            if !wire_names.insert((field.custom, field.field_name)) {
                return Err(format!("{}: duplicate field name '{}'", self.name, field.field_name));
            }
            if field.custom && field.field_name == "custom_fields" {
                return Err(format!("{}: custom field cannot be named 'custom_fields'", self.name));
            }
        }
        Ok(())
    }
}

/// Binds a marker type to its schema
pub trait Entity: Send + Sync + 'static {
    fn schema() -> &'static EntitySchema;
}
