//! Goals
//!
//! Goals have no single-record or list route; they are looked up with
//! [`Goals::find`].

use chrono::NaiveDate;
use serde_json::Value as JsonValue;

use crate::api::{ApiVersion, Params, PipedriveClient};
use crate::error::Result;
use crate::orm::fields::{ElementKind, FieldDescriptor as F, format_date};
use crate::orm::model::Model;
use crate::orm::schema::{Endpoints, Entity, EntitySchema, NONE, V1_ONLY};
use crate::orm::types::StructKind;
use crate::orm::validators;

pub struct Goals;

pub type Goal = Model<Goals>;

static GOALS: EntitySchema = EntitySchema::new(
    "Goals",
    "goals",
    &[
        F::integer("owner_id"),
        F::text("title"),
        F::text("interval").with_validators(&[validators::goal_interval]),
        F::boolean("is_active"),
        F::structured("type", StructKind::GoalType).named("goal_type"),
        F::structured("assignee", StructKind::GoalAssignee),
        F::structured("duration", StructKind::GoalDuration),
        F::structured("expected_outcome", StructKind::ExpectedOutcome),
        F::list("report_ids", ElementKind::IntegerOrText),
        F::structured("seasonality", StructKind::Seasonality),
        F::number("progress").readonly(),
    ],
    Endpoints {
        save: V1_ONLY,
        update: V1_ONLY,
        delete: V1_ONLY,
        ..Endpoints::uniform(NONE)
    },
);

impl Entity for Goals {
    fn schema() -> &'static EntitySchema {
        &GOALS
    }
}

impl Goals {
    /// Goals matching the filters in `params` (`type.name`, `assignee.id`,
    /// `period.start`, ...)
    pub async fn find(client: &PipedriveClient, params: &Params) -> Result<Vec<Goal>> {
        let response = client.get(ApiVersion::V1, "goals/find", params).await?;
        let goals = response
            .data
            .as_ref()
            .and_then(|data| data.get("goals"))
            .and_then(JsonValue::as_array)
            .cloned()
            .unwrap_or_default();
        goals.iter().map(Goal::from_record).collect()
    }
}

impl Model<Goals> {
    /// Progress of this goal over a period
    pub async fn results(
        &self,
        client: &PipedriveClient,
        period_start: NaiveDate,
        period_end: NaiveDate,
    ) -> Result<JsonValue> {
        let uri = self.member_uri("results")?;
        let params = Params::new()
            .with("period.start", format_date(&period_start))
            .with("period.end", format_date(&period_end));
        Ok(client.get(ApiVersion::V1, &uri, &params).await?.into_value())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::testing::MockTransport;
    use crate::orm::types::{GoalDuration, Struct};
    use serde_json::json;

    #[tokio::test]
    async fn test_find_reads_nested_goals() {
        let mock = MockTransport::new();
        mock.push_json(200, json!({
            "success": true,
            "data": {"goals": [{
                "id": "b7f1d2a0c3",
                "title": "Q1 revenue",
                "type": {"name": "deals_won", "params": {"pipeline_id": [1]}},
                "duration": {"start": "2025-01-01", "end": "2025-03-31"},
                "progress": 0.4
            }]}
        }));
        let client = mock.client();

        let goals = Goals::find(&client, &Params::new().with("type.name", "deals_won"))
            .await
            .unwrap();

        assert_eq!(goals.len(), 1);
        assert_eq!(goals[0].number("progress"), Some(0.4));
        assert_eq!(
            goals[0].structured("duration"),
            Some(&Struct::GoalDuration(GoalDuration {
                start: NaiveDate::from_ymd_opt(2025, 1, 1),
                end: NaiveDate::from_ymd_opt(2025, 3, 31),
            }))
        );
        assert_eq!(mock.last_request().url, "https://api.pipedrive.com/v1/goals/find");
    }

    #[tokio::test]
    async fn test_listing_is_unsupported() {
        let mock = MockTransport::new();
        let client = mock.client();

        assert!(Goal::all(&client, &Params::new()).await.is_err());
        assert_eq!(mock.request_count(), 0);
    }

    #[test]
    fn test_interval_values() {
        let mut goal = Goal::new();
        assert!(goal.set("interval", "daily").is_err());
        goal.set("interval", "quarterly").unwrap();
    }

    #[test]
    fn test_duration_dates_serialize_as_plain_dates() {
        let mut goal = Goal::new();
        goal.set(
            "duration",
            GoalDuration {
                start: NaiveDate::from_ymd_opt(2025, 1, 1),
                end: None,
            },
        )
        .unwrap();
        assert_eq!(goal.to_record(true)["duration"], json!({"start": "2025-01-01"}));
    }
}
