//! Pipelines

use chrono::NaiveDate;
use serde_json::Value as JsonValue;

use crate::api::{ApiVersion, Params, PipedriveClient};
use crate::error::{Error, Result};
use crate::orm::fields::{FieldDescriptor as F, format_date};
use crate::orm::model::Model;
use crate::orm::schema::{BOTH, Endpoints, Entity, EntitySchema};
use crate::orm::validators;

pub struct Pipelines;

pub type Pipeline = Model<Pipelines>;

static PIPELINES: EntitySchema = EntitySchema::new(
    "Pipelines",
    "pipelines",
    &[
        F::text("name").with_validators(&[validators::non_empty_text]),
        F::integer("order_nr"),
        F::boolean("is_deleted").readonly(),
        F::boolean("is_deal_probability_enabled"),
        F::datetime("add_time").readonly(),
        F::datetime("update_time").readonly(),
        F::boolean("is_selected").readonly(),
    ],
    Endpoints::uniform(BOTH).without_batch_delete(),
);

impl Entity for Pipelines {
    fn schema() -> &'static EntitySchema {
        &PIPELINES
    }
}

impl Model<Pipelines> {
    /// Stage-to-stage conversion and pipeline-to-close rates for a period
    pub async fn conversion_statistics(
        &self,
        client: &PipedriveClient,
        start_date: NaiveDate,
        end_date: NaiveDate,
        user_id: Option<i64>,
    ) -> Result<JsonValue> {
        self.statistics(client, "conversion", start_date, end_date, user_id)
            .await
    }

    /// Deal movements into, out of and within the pipeline for a period
    pub async fn movement_statistics(
        &self,
        client: &PipedriveClient,
        start_date: NaiveDate,
        end_date: NaiveDate,
        user_id: Option<i64>,
    ) -> Result<JsonValue> {
        self.statistics(client, "movement", start_date, end_date, user_id)
            .await
    }

    async fn statistics(
        &self,
        client: &PipedriveClient,
        kind: &str,
        start_date: NaiveDate,
        end_date: NaiveDate,
        user_id: Option<i64>,
    ) -> Result<JsonValue> {
        if start_date > end_date {
            return Err(Error::InvalidArgument(format!(
                "start_date {} is after end_date {}",
                start_date, end_date
            )));
        }
        let uri = self.member_uri(&format!("{}_statistics", kind))?;
        let params = Params::new()
            .with("start_date", format_date(&start_date))
            .with("end_date", format_date(&end_date))
            .with_opt("user_id", user_id);
        let response = client.get(ApiVersion::V1, &uri, &params).await?;
        Ok(response.into_value())
    }
}
