//! Generic model with change tracking and version-aware CRUD
//!
//! A [`Model<E>`] holds the internal values of one record of entity `E`, keyed
//! by attribute, plus the set of attributes changed since the last load or
//! save. Saving an existing record sends only the changed fields; saving a
//! clean record is a no-op that makes no request.

use serde::Serialize;
use serde_json::{Map, Value as JsonValue};
use std::collections::{BTreeMap, BTreeSet};
use std::fmt;
use std::marker::PhantomData;

use chrono::{DateTime, NaiveDate, Utc};

use super::fields::{FieldDescriptor, FieldError};
use super::schema::{Entity, EntitySchema, Operation};
use super::types::Struct;
use super::value::{RecordId, Value};
use crate::api::{ApiRequest, ApiResponse, ApiVersion, Params, PipedriveClient};
use crate::error::{Error, Result};

/// Lifecycle of a model instance
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ModelState {
    /// Never saved, no id yet
    Unsaved,
    Saved,
    /// Deleted on the server; further saves are refused
    Deleted,
}

/// Outcome of [`Model::save`]
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SaveResult {
    pub id: RecordId,
    pub created: bool,
    pub updated: bool,
    pub forced: bool,
    /// Attributes included in the request
    pub field_names: BTreeSet<String>,
}

impl SaveResult {
    pub fn saved(&self) -> bool {
        self.created || self.updated
    }
}

/// Records to remove in one request
pub enum BatchDelete<'a, E: Entity> {
    Ids(Vec<RecordId>),
    Models(&'a [Model<E>]),
}

impl<E: Entity> BatchDelete<'_, E> {
    pub fn ids<I, T>(ids: I) -> Self
    where
        I: IntoIterator<Item = T>,
        T: Into<RecordId>,
    {
        BatchDelete::Ids(ids.into_iter().map(Into::into).collect())
    }
}

/// One record of entity `E`
pub struct Model<E: Entity> {
    id: Option<RecordId>,
    values: BTreeMap<&'static str, Value>,
    changed: BTreeSet<&'static str>,
    deleted: bool,
    fetched: bool,
    entity: PhantomData<fn() -> E>,
}

impl<E: Entity> Model<E> {
    pub fn new() -> Self {
        Self {
            id: None,
            values: BTreeMap::new(),
            changed: BTreeSet::new(),
            deleted: false,
            fetched: false,
            entity: PhantomData,
        }
    }

    /// Reference to an existing record without loading it, e.g. to delete it
    pub fn with_id(id: impl Into<RecordId>) -> Self {
        Self {
            id: Some(id.into()),
            ..Self::new()
        }
    }

    /// New unsaved model with the given attributes set
    pub fn with_values<I, K, V>(values: I) -> Result<Self>
    where
        I: IntoIterator<Item = (K, V)>,
        K: AsRef<str>,
        V: Into<Value>,
    {
        let mut model = Self::new();
        for (attribute, value) in values {
            model.set(attribute.as_ref(), value)?;
        }
        Ok(model)
    }

    /// Hydrate a model from a wire record. Read-only fields are populated and
    /// nothing is marked changed.
    pub fn from_record(record: &JsonValue) -> Result<Self> {
        let schema = E::schema();
        let object = record.as_object().ok_or_else(|| {
            Error::UnexpectedResponse(format!("{} record is not an object: {}", schema.name, record))
        })?;

        let mut model = Self::new();
        model.id = object.get(schema.id_field).and_then(RecordId::from_json);
        for descriptor in schema.fields {
            if let Some(wire) = wire_value(object, descriptor) {
                model
                    .values
                    .insert(descriptor.attribute, descriptor.to_internal_value(wire)?);
            }
        }
        Ok(model)
    }

    pub fn schema() -> &'static EntitySchema {
        E::schema()
    }

    pub fn id(&self) -> Option<&RecordId> {
        self.id.as_ref()
    }

    pub fn state(&self) -> ModelState {
        match (&self.id, self.deleted) {
            (_, true) => ModelState::Deleted,
            (Some(_), false) => ModelState::Saved,
            (None, false) => ModelState::Unsaved,
        }
    }

    pub fn is_modified(&self) -> bool {
        !self.changed.is_empty()
    }

    pub fn is_deleted(&self) -> bool {
        self.deleted
    }

    /// Whether the values were loaded from the server
    pub fn is_fetched(&self) -> bool {
        self.fetched
    }

    pub fn changed_fields(&self) -> Vec<&'static str> {
        self.changed.iter().copied().collect()
    }

    fn descriptor(attribute: &str) -> std::result::Result<&'static FieldDescriptor, FieldError> {
        let schema = E::schema();
        schema
            .descriptor(attribute)
            .ok_or_else(|| FieldError::UnknownField {
                entity: schema.name,
                name: attribute.to_string(),
            })
    }

    /// Current value of an attribute, or its missing value when unset
    pub fn value(&self, attribute: &str) -> std::result::Result<Value, FieldError> {
        let descriptor = Self::descriptor(attribute)?;
        Ok(self
            .values
            .get(descriptor.attribute)
            .cloned()
            .unwrap_or_else(|| descriptor.missing_value()))
    }

    pub fn text(&self, attribute: &str) -> Option<&str> {
        self.values.get(attribute).and_then(Value::as_str)
    }

    pub fn integer(&self, attribute: &str) -> Option<i64> {
        self.values.get(attribute).and_then(Value::as_i64)
    }

    pub fn number(&self, attribute: &str) -> Option<f64> {
        self.values.get(attribute).and_then(Value::as_f64)
    }

    pub fn boolean(&self, attribute: &str) -> Option<bool> {
        self.values.get(attribute).and_then(Value::as_bool)
    }

    pub fn datetime(&self, attribute: &str) -> Option<DateTime<Utc>> {
        self.values.get(attribute).and_then(Value::as_datetime)
    }

    pub fn date(&self, attribute: &str) -> Option<NaiveDate> {
        self.values.get(attribute).and_then(Value::as_date)
    }

    pub fn structured(&self, attribute: &str) -> Option<&Struct> {
        self.values.get(attribute).and_then(Value::as_struct)
    }

    pub fn list(&self, attribute: &str) -> &[Value] {
        self.values
            .get(attribute)
            .and_then(Value::as_list)
            .unwrap_or(&[])
    }

    /// Assign an attribute. The value is validated by the field descriptor
    /// and the attribute is marked changed.
    pub fn set(&mut self, attribute: &str, value: impl Into<Value>) -> std::result::Result<(), FieldError> {
        let descriptor = Self::descriptor(attribute)?;
        let value = descriptor.clean(value.into())?;
        self.values.insert(descriptor.attribute, value);
        self.changed.insert(descriptor.attribute);
        Ok(())
    }

    /// Wire representation. Custom fields are nested under `custom_fields`;
    /// `only_writable` leaves out the id and read-only fields.
    pub fn to_record(&self, only_writable: bool) -> JsonValue {
        let mut record = Map::new();
        if let (false, Some(id)) = (only_writable, &self.id) {
            record.insert(E::schema().id_field.to_string(), id.to_json());
        }
        for descriptor in E::schema().fields {
            if only_writable && descriptor.readonly {
                continue;
            }
            if let Some(value) = self.values.get(descriptor.attribute) {
                insert_wire_value(&mut record, descriptor, descriptor.to_record_value(value));
            }
        }
        JsonValue::Object(record)
    }

    /// Writable values, optionally restricted to `only`
    fn payload(&self, only: Option<&BTreeSet<&'static str>>) -> (Map<String, JsonValue>, BTreeSet<String>) {
        let mut payload = Map::new();
        let mut field_names = BTreeSet::new();
        for descriptor in E::schema().fields {
            if descriptor.readonly || only.is_some_and(|only| !only.contains(descriptor.attribute)) {
                continue;
            }
            if let Some(value) = self.values.get(descriptor.attribute) {
                insert_wire_value(&mut payload, descriptor, descriptor.to_record_value(value));
                field_names.insert(descriptor.attribute.to_string());
            }
        }
        (payload, field_names)
    }

    /// Forget pending changes after they were sent by an entity-specific route
    pub(crate) fn mark_clean(&mut self) {
        self.changed.clear();
    }

    pub fn require_id(&self, operation: Operation) -> Result<&RecordId> {
        self.id.as_ref().ok_or(Error::MissingId {
            entity: E::schema().name,
            operation,
        })
    }

    /// `{entity}/{id}` followed by `suffix` when not empty
    pub fn member_uri(&self, suffix: &str) -> Result<String> {
        let id = self.require_id(Operation::Get)?;
        let base = format!("{}/{}", E::schema().entity_name, id.path_segment());
        Ok(match suffix.trim_matches('/') {
            "" => base,
            suffix => format!("{}/{}", base, suffix),
        })
    }

    /// Fetch one record by id
    pub async fn get(client: &PipedriveClient, id: impl Into<RecordId>) -> Result<Self> {
        let schema = E::schema();
        let id = id.into();
        let version = schema.resolve_version(Operation::Get, client.pinned_version())?;
        let uri = format!("{}/{}", schema.entity_name, id.path_segment());

        let response = client.get(version, &uri, &Params::new()).await?;
        let record = response
            .data
            .filter(JsonValue::is_object)
            .ok_or_else(|| Error::UnexpectedResponse(format!("{} returned no record", uri)))?;

        let mut model = Self::from_record(&record)?;
        if model.id.is_none() {
            model.id = Some(id);
        }
        model.fetched = true;
        Ok(model)
    }

    /// Every record of the entity, following pagination
    pub async fn all(client: &PipedriveClient, params: &Params) -> Result<Vec<Self>> {
        Self::all_at(client, E::schema().entity_name, params).await
    }

    /// Every record listed under `uri` (e.g. `deals/archived`)
    pub async fn all_at(client: &PipedriveClient, uri: &str, params: &Params) -> Result<Vec<Self>> {
        let version = E::schema().resolve_version(Operation::All, client.pinned_version())?;
        Self::all_with_version(client, version, uri, params).await
    }

    /// Like [`all_at`](Self::all_at) for routes that exist on a single version
    pub async fn all_with_version(
        client: &PipedriveClient,
        version: ApiVersion,
        uri: &str,
        params: &Params,
    ) -> Result<Vec<Self>> {
        let response = client.all(version, uri, params.clone()).await?;
        Self::from_response(&response)
    }

    /// Hydrate every item in a response's `data`
    pub fn from_response(response: &ApiResponse) -> Result<Vec<Self>> {
        response
            .data_items()
            .iter()
            .map(|record| {
                Self::from_record(record).map(|mut model| {
                    model.fetched = true;
                    model
                })
            })
            .collect()
    }

    /// Create or update the record
    ///
    /// - unsaved: POST every writable value, then adopt the id and any other
    ///   values the server returned that were not sent
    /// - saved and clean: nothing is sent unless `force`
    /// - saved: PATCH (v2) or PUT (v1) the changed fields, or every writable
    ///   field when `force`
    pub async fn save(&mut self, client: &PipedriveClient, force: bool) -> Result<SaveResult> {
        let schema = E::schema();
        if self.deleted {
            return Err(Error::Deleted {
                entity: schema.name,
                id: self.require_id(Operation::Save)?.clone(),
            });
        }
        let Some(id) = self.id.clone() else {
            return self.create(client, force).await;
        };

        if !force && self.changed.is_empty() {
            log::debug!("{}/{} has no changes, nothing to save", schema.entity_name, id);
            return Ok(SaveResult {
                id,
                created: false,
                updated: false,
                forced: false,
                field_names: BTreeSet::new(),
            });
        }

        let version = schema.resolve_version(Operation::Update, client.pinned_version())?;
        let (payload, field_names) = self.payload((!force).then_some(&self.changed));
        let uri = format!("{}/{}", schema.entity_name, id.path_segment());

        let request = ApiRequest::new(Operation::Update.http_method(version), version, uri.as_str())
            .json(JsonValue::Object(payload));
        let response = client.send(request).await?;
        if let Some(record) = response.data.as_ref().and_then(JsonValue::as_object) {
            self.adopt(record, |descriptor| descriptor.readonly)?;
        }
        self.changed.clear();

        Ok(SaveResult {
            id,
            created: false,
            updated: true,
            forced: force,
            field_names,
        })
    }

    async fn create(&mut self, client: &PipedriveClient, force: bool) -> Result<SaveResult> {
        let schema = E::schema();
        let version = schema.resolve_version(Operation::Save, client.pinned_version())?;
        let (payload, field_names) = self.payload(None);

        let request = ApiRequest::new(Operation::Save.http_method(version), version, schema.entity_name)
            .json(JsonValue::Object(payload));
        let response = client.send(request).await?;
        let record = response
            .data
            .as_ref()
            .and_then(JsonValue::as_object)
            .ok_or_else(|| Error::UnexpectedResponse(format!("{} create returned no record", schema.name)))?;
        let id = record
            .get(schema.id_field)
            .and_then(RecordId::from_json)
            .ok_or_else(|| Error::UnexpectedResponse(format!("{} create returned no id", schema.name)))?;

        let sent = field_names.clone();
        self.adopt(record, |descriptor| !sent.contains(descriptor.attribute))?;
        self.id = Some(id.clone());
        self.changed.clear();
        log::info!("Created {}/{}", schema.entity_name, id);

        Ok(SaveResult {
            id,
            created: true,
            updated: false,
            forced: force,
            field_names,
        })
    }

    /// Take over non-null values returned by the server for the selected fields
    fn adopt(
        &mut self,
        record: &Map<String, JsonValue>,
        select: impl Fn(&FieldDescriptor) -> bool,
    ) -> Result<()> {
        for descriptor in E::schema().fields {
            if !select(descriptor) {
                continue;
            }
            if let Some(wire) = wire_value(record, descriptor).filter(|w| !w.is_null()) {
                self.values
                    .insert(descriptor.attribute, descriptor.to_internal_value(wire)?);
            }
        }
        Ok(())
    }

    /// Reload every value from the server, discarding local changes
    pub async fn fetch(&mut self, client: &PipedriveClient) -> Result<()> {
        let id = self.require_id(Operation::Get)?.clone();
        let fresh = Self::get(client, id).await?;
        self.values = fresh.values;
        self.changed.clear();
        self.fetched = true;
        Ok(())
    }

    /// Whether the record can still be fetched
    pub async fn exists(&self, client: &PipedriveClient) -> Result<bool> {
        let Some(id) = self.id.clone() else {
            return Ok(false);
        };
        match Self::get(client, id).await {
            Ok(_) => Ok(true),
            Err(Error::Api(err)) if err.is_not_found() => Ok(false),
            Err(err) => Err(err),
        }
    }

    /// Delete the record. A record the server reports as already deleted
    /// counts as deleted.
    pub async fn delete(&mut self, client: &PipedriveClient) -> Result<bool> {
        let schema = E::schema();
        let id = self.require_id(Operation::Delete)?.clone();
        let version = schema.resolve_version(Operation::Delete, client.pinned_version())?;
        let uri = format!("{}/{}", schema.entity_name, id.path_segment());

        match client.delete(version, &uri, &Params::new()).await {
            Ok(_) => {
                self.deleted = true;
                Ok(true)
            }
            Err(Error::Api(err)) if err.is_already_deleted() => {
                log::warn!("{}/{} is already deleted", schema.entity_name, id);
                self.deleted = true;
                Ok(true)
            }
            Err(err) => Err(err),
        }
    }

    /// Delete several records in one request, returning the ids sent
    pub async fn batch_delete(client: &PipedriveClient, target: BatchDelete<'_, E>) -> Result<Vec<RecordId>> {
        let schema = E::schema();
        let ids = match target {
            BatchDelete::Ids(ids) => ids,
            BatchDelete::Models(models) => models
                .iter()
                .map(|m| m.require_id(Operation::BatchDelete).cloned())
                .collect::<Result<Vec<_>>>()?,
        };
        let version = schema.resolve_version(Operation::BatchDelete, client.pinned_version())?;
        client.batch_delete(version, schema.entity_name, &ids).await?;
        Ok(ids)
    }
}

fn wire_value<'a>(record: &'a Map<String, JsonValue>, descriptor: &FieldDescriptor) -> Option<&'a JsonValue> {
    if descriptor.custom {
        record
            .get("custom_fields")
            .and_then(|custom| custom.get(descriptor.field_name))
    } else {
        record.get(descriptor.field_name)
    }
}

fn insert_wire_value(record: &mut Map<String, JsonValue>, descriptor: &FieldDescriptor, value: JsonValue) {
    if descriptor.custom {
        let custom = record
            .entry("custom_fields")
            .or_insert_with(|| JsonValue::Object(Map::new()));
        if !custom.is_object() {
            *custom = JsonValue::Object(Map::new());
        }
        if let JsonValue::Object(custom) = custom {
            custom.insert(descriptor.field_name.to_string(), value);
        }
        return;
    }

    // Individually declared custom fields win over the raw object
    if let (Some(JsonValue::Object(existing)), JsonValue::Object(incoming)) =
        (record.get_mut(descriptor.field_name), &value)
    {
        for (key, value) in incoming {
            existing.entry(key.clone()).or_insert_with(|| value.clone());
        }
        return;
    }
    record.insert(descriptor.field_name.to_string(), value);
}

impl<E: Entity> Default for Model<E> {
    fn default() -> Self {
        Self::new()
    }
}

impl<E: Entity> Clone for Model<E> {
    fn clone(&self) -> Self {
        Self {
            id: self.id.clone(),
            values: self.values.clone(),
            changed: self.changed.clone(),
            deleted: self.deleted,
            fetched: self.fetched,
            entity: PhantomData,
        }
    }
}

impl<E: Entity> PartialEq for Model<E> {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id && self.values == other.values
    }
}

impl<E: Entity> fmt::Debug for Model<E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct(E::schema().name)
            .field("id", &self.id)
            .field("values", &self.values)
            .field("changed", &self.changed)
            .field("deleted", &self.deleted)
            .finish()
    }
}
