//! Organizations

use serde_json::Value as JsonValue;

use super::item_search::search_at;
use super::merge_records;
use crate::api::{Params, PipedriveClient};
use crate::error::Result;
use crate::orm::fields::{ElementKind, FieldDescriptor as F};
use crate::orm::model::Model;
use crate::orm::schema::{BOTH, Endpoints, Entity, EntitySchema, V1_ONLY};
use crate::orm::types::{SearchResult, StructKind};
use crate::orm::validators;

pub struct Organizations;

pub type Organization = Model<Organizations>;

static ORGANIZATIONS: EntitySchema = EntitySchema::new(
    "Organizations",
    "organizations",
    &[
        F::text("name").with_validators(&[validators::non_empty_text]),
        F::datetime("add_time").readonly(),
        F::datetime("update_time").readonly(),
        F::integer("visible_to").with_validators(&[validators::visible_to]),
        F::integer("owner_id"),
        F::list("label_ids", ElementKind::IntegerOrText),
        F::boolean("is_deleted").readonly(),
        F::structured("address", StructKind::Address),
        F::json("custom_fields"),
    ],
    Endpoints {
        batch_delete: V1_ONLY,
        ..Endpoints::uniform(BOTH)
    },
);

impl Entity for Organizations {
    fn schema() -> &'static EntitySchema {
        &ORGANIZATIONS
    }
}

impl Organizations {
    /// Search organizations by name, address, notes and custom fields
    pub async fn search(client: &PipedriveClient, term: &str, params: &Params) -> Result<Vec<SearchResult>> {
        search_at(client, "organizations/search", term, params.clone()).await
    }
}

impl Model<Organizations> {
    /// Merge the organization `merge_with_id` into this one
    pub async fn merge(&self, client: &PipedriveClient, merge_with_id: i64) -> Result<JsonValue> {
        merge_records(client, &self.member_uri("merge")?, merge_with_id).await
    }
}
