//! Revenue subscriptions of a deal: installment or recurring

use chrono::NaiveDate;
use serde_json::{Value as JsonValue, json};

use crate::api::{ApiVersion, Params, PipedriveClient};
use crate::error::{Error, Result};
use crate::orm::fields::{FieldDescriptor as F, format_date};
use crate::orm::model::Model;
use crate::orm::schema::{Endpoints, Entity, EntitySchema, NONE, V1_ONLY};

pub struct Subscriptions;

pub type Subscription = Model<Subscriptions>;

static SUBSCRIPTIONS: EntitySchema = EntitySchema::new(
    "Subscriptions",
    "subscriptions",
    &[
        F::integer("user_id").readonly(),
        F::integer("deal_id"),
        F::boolean("is_active"),
        F::float("cycle_amount"),
        F::integer("cycles_count"),
        F::boolean("infinite"),
        F::text("currency"),
        F::date("start_date"),
        F::date("end_date"),
        F::text("description"),
        F::datetime("add_time").readonly(),
        F::datetime("update_time").readonly(),
        F::float("lifetime_value").readonly(),
        F::text("cadence_type"),
        F::text("final_status").readonly(),
    ],
    Endpoints {
        all: NONE,
        batch_delete: NONE,
        ..Endpoints::uniform(V1_ONLY)
    },
);

impl Entity for Subscriptions {
    fn schema() -> &'static EntitySchema {
        &SUBSCRIPTIONS
    }
}

impl Subscriptions {
    /// The subscription of a deal, if it has one
    pub async fn of_deal(client: &PipedriveClient, deal_id: i64) -> Result<Option<Subscription>> {
        let uri = format!("{}/find/{}", SUBSCRIPTIONS.entity_name, deal_id);
        match client.get(ApiVersion::V1, &uri, &Params::new()).await?.data {
            Some(record) if record.is_object() => Subscription::from_record(&record).map(Some),
            _ => Ok(None),
        }
    }
}

impl Model<Subscriptions> {
    /// Payments of this subscription
    pub async fn payments(&self, client: &PipedriveClient) -> Result<Vec<JsonValue>> {
        let uri = self.member_uri("payments")?;
        Ok(client.get(ApiVersion::V1, &uri, &Params::new()).await?.data_items())
    }

    /// Cancel a recurring subscription, optionally from a given date
    pub async fn cancel_recurring(
        &self,
        client: &PipedriveClient,
        end_date: Option<NaiveDate>,
    ) -> Result<JsonValue> {
        if self.text("cadence_type").is_none() {
            return Err(Error::InvalidArgument(
                "only recurring subscriptions (with a cadence_type) can be canceled".to_string(),
            ));
        }
        let uri = self.member_uri("recurring/cancel")?;
        let body = match end_date {
            Some(date) => json!({ "end_date": format_date(&date) }),
            None => json!({}),
        };
        Ok(client.put(ApiVersion::V1, &uri, body).await?.into_value())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::Method;
    use crate::api::testing::MockTransport;

    #[tokio::test]
    async fn test_listing_is_not_offered() {
        let mock = MockTransport::new();
        let client = mock.client();

        let err = Subscription::all(&client, &Params::new()).await.unwrap_err();
        assert!(matches!(err, Error::Unsupported { .. }));
        assert_eq!(mock.request_count(), 0);
    }

    #[tokio::test]
    async fn test_get_and_update_on_v1() {
        let mock = MockTransport::new();
        mock.push_json(200, json!({
            "success": true,
            "data": {"id": 9, "deal_id": 42, "cycle_amount": 49.5, "cycles_count": 12, "start_date": "2025-01-01", "cadence_type": "monthly"}
        }));
        mock.push_json(200, json!({"success": true, "data": {"id": 9, "description": "Annual plan"}}));
        let client = mock.client();

        let mut subscription = Subscription::get(&client, 9).await.unwrap();
        assert_eq!(subscription.number("cycle_amount"), Some(49.5));
        assert_eq!(subscription.integer("cycles_count"), Some(12));
        assert_eq!(mock.last_request().url, "https://api.pipedrive.com/v1/subscriptions/9");

        subscription.set("description", "Annual plan").unwrap();
        subscription.save(&client, false).await.unwrap();
        let request = mock.last_request();
        assert_eq!(request.method, Method::Put);
        assert_eq!(request.json, Some(json!({"description": "Annual plan"})));
    }

    #[tokio::test]
    async fn test_find_by_deal() {
        let mock = MockTransport::new();
        mock.push_json(200, json!({"success": true, "data": {"id": 9, "deal_id": 42}}));
        mock.push_json(200, json!({"success": true, "data": null}));
        let client = mock.client();

        let found = Subscriptions::of_deal(&client, 42).await.unwrap();
        assert_eq!(found.and_then(|s| s.integer("deal_id")), Some(42));
        assert_eq!(mock.last_request().url, "https://api.pipedrive.com/v1/subscriptions/find/42");
        assert!(Subscriptions::of_deal(&client, 43).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_cancel_needs_a_recurring_subscription() {
        let mock = MockTransport::new();
        mock.push_json(200, json!({"success": true, "data": {"id": 9, "final_status": "canceled"}}));
        let client = mock.client();

        let installment = Subscription::from_record(&json!({"id": 8})).unwrap();
        assert!(installment.cancel_recurring(&client, None).await.is_err());
        assert_eq!(mock.request_count(), 0);

        let recurring = Subscription::from_record(&json!({"id": 9, "cadence_type": "monthly"})).unwrap();
        let end = NaiveDate::from_ymd_opt(2025, 12, 31);
        recurring.cancel_recurring(&client, end).await.unwrap();
        let request = mock.last_request();
        assert_eq!(request.url, "https://api.pipedrive.com/v1/subscriptions/9/recurring/cancel");
        assert_eq!(request.json, Some(json!({"end_date": "2025-12-31"})));
    }
}
