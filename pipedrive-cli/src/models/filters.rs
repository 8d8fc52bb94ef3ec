//! Saved filters

use serde_json::Value as JsonValue;

use crate::api::{ApiVersion, Params, PipedriveClient};
use crate::error::Result;
use crate::orm::fields::FieldDescriptor as F;
use crate::orm::model::Model;
use crate::orm::schema::{Endpoints, Entity, EntitySchema, V1_ONLY};

pub struct Filters;

pub type Filter = Model<Filters>;

static FILTERS: EntitySchema = EntitySchema::new(
    "Filters",
    "filters",
    &[
        F::text("name"),
        F::boolean("active_flag"),
        F::text("type").named("filter_type"),
        F::boolean("temporary_flag"),
        F::integer("user_id").readonly(),
        F::datetime("add_time").readonly(),
        F::datetime("update_time").readonly(),
        F::integer("visible_to"),
        F::integer("custom_view_id"),
        F::json("conditions"),
    ],
    Endpoints::uniform(V1_ONLY),
);

impl Entity for Filters {
    fn schema() -> &'static EntitySchema {
        &FILTERS
    }
}

impl Filters {
    /// Conditions and helpers accepted when adding or updating filters
    pub async fn helpers(client: &PipedriveClient) -> Result<JsonValue> {
        let response = client.get(ApiVersion::V1, "filters/helpers", &Params::new()).await?;
        Ok(response.into_value())
    }
}
