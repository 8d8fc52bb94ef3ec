//! Leads
//!
//! Leads are keyed by UUID and mostly live on the v1 API; searching and
//! conversion to a deal are v2 routes.

use serde_json::{Value as JsonValue, json};

use super::item_search::search_at;
use crate::api::{ApiVersion, Params, PipedriveClient};
use crate::error::Result;
use crate::orm::fields::{ElementKind, FieldDescriptor as F};
use crate::orm::model::Model;
use crate::orm::schema::{Endpoints, Entity, EntitySchema, V1_ONLY};
use crate::orm::types::{SearchResult, StructKind};
use crate::orm::validators;

pub struct Leads;

pub type Lead = Model<Leads>;

static LEADS: EntitySchema = EntitySchema::new(
    "Leads",
    "leads",
    &[
        F::text("title").with_validators(&[validators::non_empty_text]),
        F::integer("owner_id"),
        F::integer("creator_id").readonly(),
        F::integer("person_id"),
        F::integer("organization_id"),
        F::list("label_ids", ElementKind::IntegerOrText),
        F::text("source_name").readonly(),
        F::text("origin"),
        F::text("origin_id"),
        F::text("channel"),
        F::text("channel_id"),
        F::boolean("is_archived"),
        F::boolean("was_seen"),
        F::structured("value", StructKind::Monetary),
        F::date("expected_close_date"),
        F::integer("next_activity_id").readonly(),
        F::datetime("archive_time").readonly(),
        F::datetime("add_time").readonly(),
        F::datetime("update_time").readonly(),
        F::integer("visible_to").with_validators(&[validators::visible_to]),
        F::text("cc_email").readonly(),
    ],
    Endpoints::uniform(V1_ONLY).without_batch_delete(),
);

impl Entity for Leads {
    fn schema() -> &'static EntitySchema {
        &LEADS
    }
}

impl Leads {
    pub async fn archived(client: &PipedriveClient, params: &Params) -> Result<Vec<Lead>> {
        Lead::all_with_version(client, ApiVersion::V1, "leads/archived", params).await
    }

    /// Search leads by title, notes and custom fields
    pub async fn search(client: &PipedriveClient, term: &str, params: &Params) -> Result<Vec<SearchResult>> {
        search_at(client, "leads/search", term, params.clone()).await
    }
}

impl Model<Leads> {
    /// Start an asynchronous conversion of this lead into a deal. The
    /// response carries the conversion id to poll with
    /// [`conversion_status`](Self::conversion_status).
    pub async fn convert_to_deal(&self, client: &PipedriveClient) -> Result<JsonValue> {
        let uri = self.member_uri("convert/deal")?;
        Ok(client.post(ApiVersion::V2, &uri, json!({})).await?.into_value())
    }

    pub async fn conversion_status(&self, client: &PipedriveClient, conversion_id: &str) -> Result<JsonValue> {
        let uri = self.member_uri(&format!(
            "convert/status/{}",
            urlencoding::encode(conversion_id)
        ))?;
        Ok(client
            .get(ApiVersion::V2, &uri, &Params::new())
            .await?
            .into_value())
    }
}
