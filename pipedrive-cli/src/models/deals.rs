//! Deals

use chrono::NaiveDate;
use serde_json::{Value as JsonValue, json};

use super::files::File;
use super::item_search::search_at;
use super::merge_records;
use crate::api::{ApiVersion, Params, PipedriveClient};
use crate::error::{Error, Result};
use crate::orm::fields::{ElementKind, FieldDescriptor as F, format_date};
use crate::orm::model::Model;
use crate::orm::schema::{BOTH, Endpoints, Entity, EntitySchema};
use crate::orm::types::{ChangeLogEntry, SearchResult};
use crate::orm::validators;

pub struct Deals;

pub type Deal = Model<Deals>;

pub const TIMELINE_INTERVALS: &[&str] = &["day", "week", "month", "quarter"];

pub const DISCOUNT_TYPES: &[&str] = &["percentage", "amount"];

const MAX_DEAL_IDS: usize = 100;

static DEALS: EntitySchema = EntitySchema::new(
    "Deals",
    "deals",
    &[
        F::text("title"),
        F::integer("creator_user_id").readonly(),
        F::integer("user_id").readonly(),
        F::integer("org_id"),
        F::integer("person_id"),
        F::integer("stage_id"),
        F::integer("pipeline_id"),
        F::integer("owner_id"),
        F::number("value"),
        F::text("currency").with_validators(&[validators::currency_code]),
        F::datetime("add_time").readonly(),
        F::datetime("update_time").readonly(),
        F::text("status").with_validators(&[validators::deal_status]),
        F::integer("probability").with_validators(&[validators::percentage]),
        F::text("lost_reason"),
        F::integer("visible_to").with_validators(&[validators::visible_to]),
        F::datetime("close_time"),
        F::datetime("won_time"),
        F::datetime("lost_time"),
        F::datetime("stage_change_time"),
        F::date("local_won_date"),
        F::date("local_lost_date"),
        F::date("local_close_date"),
        F::date("expected_close_date"),
        F::list("label_ids", ElementKind::IntegerOrText),
        F::boolean("is_deleted").readonly(),
        F::text("origin"),
        F::text("origin_id"),
        F::text("channel"),
        F::integer("channel_id"),
        F::boolean("is_archived"),
        F::datetime("archive_time"),
        F::float("acv"),
        F::float("arr"),
        F::float("mrr"),
        F::json("custom_fields"),
    ],
    Endpoints::uniform(BOTH).without_batch_delete(),
);

impl Entity for Deals {
    fn schema() -> &'static EntitySchema {
        &DEALS
    }
}

impl Deals {
    /// Archived deals
    pub async fn archived(client: &PipedriveClient, params: &Params) -> Result<Vec<Deal>> {
        Deal::all_at(client, "deals/archived", params).await
    }

    /// Search deals by title, notes and custom fields
    pub async fn search(client: &PipedriveClient, term: &str, params: &Params) -> Result<Vec<SearchResult>> {
        search_at(client, "deals/search", term, params.clone()).await
    }

    /// Totals of all not archived deals, grouped by currency
    pub async fn summary(client: &PipedriveClient, params: &Params) -> Result<JsonValue> {
        let response = client.get(ApiVersion::V1, "deals/summary", params).await?;
        Ok(response.into_value())
    }

    /// Open and won deals grouped by `interval` over the date field `field_key`
    pub async fn timeline(
        client: &PipedriveClient,
        start_date: NaiveDate,
        interval: &str,
        amount: u32,
        field_key: &str,
        params: &Params,
    ) -> Result<JsonValue> {
        if !TIMELINE_INTERVALS.contains(&interval) {
            return Err(Error::InvalidArgument(format!(
                "interval must be one of {}, got '{}'",
                TIMELINE_INTERVALS.join(", "),
                interval
            )));
        }
        if amount == 0 {
            return Err(Error::InvalidArgument("amount must be a positive integer".to_string()));
        }
        if field_key.trim().is_empty() {
            return Err(Error::InvalidArgument("field_key must not be empty".to_string()));
        }

        let params = params
            .clone()
            .with("start_date", format_date(&start_date))
            .with("interval", interval)
            .with("amount", amount)
            .with("field_key", field_key);
        let response = client.get(ApiVersion::V1, "deals/timeline", &params).await?;
        Ok(response.into_value())
    }

    /// Products attached to the given deals (at most 100 ids)
    pub async fn deals_products(
        client: &PipedriveClient,
        deal_ids: &[i64],
        params: &Params,
    ) -> Result<Vec<JsonValue>> {
        let params = params.clone().with("deal_ids", join_ids(deal_ids)?);
        Ok(client.all(ApiVersion::V2, "deals/products", params).await?.data_items())
    }

    /// Installments of the given deals (at most 100 ids)
    pub async fn installments(
        client: &PipedriveClient,
        deal_ids: &[i64],
        params: &Params,
    ) -> Result<Vec<JsonValue>> {
        let params = params.clone().with("deal_ids", join_ids(deal_ids)?);
        Ok(client.all(ApiVersion::V2, "deals/installments", params).await?.data_items())
    }
}

fn join_ids(ids: &[i64]) -> Result<String> {
    match ids.len() {
        0 => Err(Error::InvalidArgument("at least one deal id is required".to_string())),
        n if n > MAX_DEAL_IDS => Err(Error::InvalidArgument(format!(
            "at most {} deal ids can be given, got {}",
            MAX_DEAL_IDS, n
        ))),
        _ => Ok(ids.iter().map(ToString::to_string).collect::<Vec<_>>().join(",")),
    }
}

fn positive_amount(amount: f64) -> Result<()> {
    if amount > 0.0 && amount.is_finite() {
        Ok(())
    } else {
        Err(Error::InvalidArgument(format!("amount must be a positive number, got {}", amount)))
    }
}

impl Model<Deals> {
    /// Merge `merge_with_id` into this deal
    pub async fn merge(&self, client: &PipedriveClient, merge_with_id: i64) -> Result<JsonValue> {
        merge_records(client, &self.member_uri("merge")?, merge_with_id).await
    }

    /// Server-side copy of this deal
    pub async fn duplicate(&self, client: &PipedriveClient) -> Result<Deal> {
        let uri = self.member_uri("duplicate")?;
        let response = client.post(ApiVersion::V1, &uri, json!({})).await?;
        let record = response
            .data
            .ok_or_else(|| Error::UnexpectedResponse(format!("{} returned no record", uri)))?;
        Deal::from_record(&record)
    }

    pub async fn participants(&self, client: &PipedriveClient, params: &Params) -> Result<Vec<JsonValue>> {
        let uri = self.member_uri("participants")?;
        Ok(client.all(ApiVersion::V1, &uri, params.clone()).await?.data_items())
    }

    pub async fn add_participant(&self, client: &PipedriveClient, person_id: i64) -> Result<JsonValue> {
        let uri = self.member_uri("participants")?;
        let response = client
            .post(ApiVersion::V1, &uri, json!({ "person_id": person_id }))
            .await?;
        Ok(response.into_value())
    }

    pub async fn followers(&self, client: &PipedriveClient, params: &Params) -> Result<Vec<JsonValue>> {
        let uri = self.member_uri("followers")?;
        Ok(client.all(ApiVersion::V2, &uri, params.clone()).await?.data_items())
    }

    pub async fn add_follower(&self, client: &PipedriveClient, user_id: i64) -> Result<JsonValue> {
        let uri = self.member_uri("followers")?;
        let response = client
            .post(ApiVersion::V2, &uri, json!({ "user_id": user_id }))
            .await?;
        Ok(response.into_value())
    }

    /// Products attached to this deal
    pub async fn products(&self, client: &PipedriveClient, params: &Params) -> Result<Vec<JsonValue>> {
        let uri = self.member_uri("products")?;
        Ok(client.all(ApiVersion::V2, &uri, params.clone()).await?.data_items())
    }

    /// Field value updates, most recent first
    pub async fn changelog(&self, client: &PipedriveClient, params: &Params) -> Result<Vec<ChangeLogEntry>> {
        let uri = self.member_uri("changelog")?;
        let response = client.all(ApiVersion::V1, &uri, params.clone()).await?;
        response
            .data_items()
            .into_iter()
            .map(|entry| serde_json::from_value(entry).map_err(Error::from))
            .collect()
    }

    /// Files attached to this deal
    pub async fn files(&self, client: &PipedriveClient, params: &Params) -> Result<Vec<File>> {
        let uri = self.member_uri("files")?;
        File::all_with_version(client, ApiVersion::V1, &uri, params).await
    }

    /// Activity, note, file and field update feed
    pub async fn flow(&self, client: &PipedriveClient, params: &Params) -> Result<Vec<JsonValue>> {
        let uri = self.member_uri("flow")?;
        Ok(client.all(ApiVersion::V1, &uri, params.clone()).await?.data_items())
    }

    pub async fn participants_changelog(&self, client: &PipedriveClient, params: &Params) -> Result<Vec<JsonValue>> {
        let uri = self.member_uri("participantsChangelog")?;
        Ok(client.all(ApiVersion::V1, &uri, params.clone()).await?.data_items())
    }

    pub async fn followers_changelog(&self, client: &PipedriveClient, params: &Params) -> Result<Vec<JsonValue>> {
        let uri = self.member_uri("followers/changelog")?;
        Ok(client.all(ApiVersion::V2, &uri, params.clone()).await?.data_items())
    }

    pub async fn mail_messages(&self, client: &PipedriveClient, params: &Params) -> Result<Vec<JsonValue>> {
        let uri = self.member_uri("mailMessages")?;
        Ok(client.all(ApiVersion::V1, &uri, params.clone()).await?.data_items())
    }

    /// Users allowed to access this deal
    pub async fn permitted_users(&self, client: &PipedriveClient) -> Result<Vec<JsonValue>> {
        let uri = self.member_uri("permittedUsers")?;
        Ok(client.get(ApiVersion::V1, &uri, &Params::new()).await?.data_items())
    }

    pub async fn delete_follower(&self, client: &PipedriveClient, follower_id: i64) -> Result<JsonValue> {
        let uri = self.member_uri(&format!("followers/{}", follower_id))?;
        Ok(client.delete(ApiVersion::V2, &uri, &Params::new()).await?.into_value())
    }

    pub async fn delete_participant(&self, client: &PipedriveClient, deal_participant_id: i64) -> Result<JsonValue> {
        let uri = self.member_uri(&format!("participants/{}", deal_participant_id))?;
        Ok(client.delete(ApiVersion::V1, &uri, &Params::new()).await?.into_value())
    }

    /// Attach a product. `extra` may carry `tax`, `discount`, `comments`,
    /// billing settings and the like.
    pub async fn add_product(
        &self,
        client: &PipedriveClient,
        product_id: i64,
        item_price: f64,
        quantity: f64,
        extra: JsonValue,
    ) -> Result<JsonValue> {
        let uri = self.member_uri("products")?;
        let mut body = object_or_empty(extra)?;
        body.insert("product_id".to_string(), json!(product_id));
        body.insert("item_price".to_string(), json!(item_price));
        body.insert("quantity".to_string(), json!(quantity));
        let response = client.post(ApiVersion::V2, &uri, JsonValue::Object(body)).await?;
        Ok(response.into_value())
    }

    /// Attach several products in one request, each shaped like `add_product`
    pub async fn add_products(&self, client: &PipedriveClient, products: Vec<JsonValue>) -> Result<JsonValue> {
        if products.is_empty() || !products.iter().all(JsonValue::is_object) {
            return Err(Error::InvalidArgument("products must be a non-empty list of objects".to_string()));
        }
        let uri = self.member_uri("products/bulk")?;
        let response = client.post(ApiVersion::V2, &uri, json!({ "data": products })).await?;
        Ok(response.into_value())
    }

    pub async fn update_attached_product(
        &self,
        client: &PipedriveClient,
        product_attachment_id: i64,
        changes: JsonValue,
    ) -> Result<JsonValue> {
        let uri = self.member_uri(&format!("products/{}", product_attachment_id))?;
        let body = object_or_empty(changes)?;
        let response = client.patch(ApiVersion::V2, &uri, JsonValue::Object(body)).await?;
        Ok(response.into_value())
    }

    pub async fn delete_attached_product(&self, client: &PipedriveClient, product_attachment_id: i64) -> Result<JsonValue> {
        let uri = self.member_uri(&format!("products/{}", product_attachment_id))?;
        Ok(client.delete(ApiVersion::V2, &uri, &Params::new()).await?.into_value())
    }

    /// Detach several products; the server removes up to 100 when `ids` is empty
    pub async fn delete_products(&self, client: &PipedriveClient, ids: &[i64]) -> Result<JsonValue> {
        let uri = self.member_uri("products")?;
        let params = if ids.is_empty() {
            Params::new()
        } else {
            Params::new().with("ids", join_ids(ids)?)
        };
        Ok(client.delete(ApiVersion::V2, &uri, &params).await?.into_value())
    }

    pub async fn discounts(&self, client: &PipedriveClient) -> Result<Vec<JsonValue>> {
        let uri = self.member_uri("discounts")?;
        Ok(client.get(ApiVersion::V2, &uri, &Params::new()).await?.data_items())
    }

    pub async fn add_discount(
        &self,
        client: &PipedriveClient,
        description: &str,
        amount: f64,
        discount_type: &str,
    ) -> Result<JsonValue> {
        positive_amount(amount)?;
        if !DISCOUNT_TYPES.contains(&discount_type) {
            return Err(Error::InvalidArgument(format!(
                "discount type must be one of {}, got '{}'",
                DISCOUNT_TYPES.join(", "),
                discount_type
            )));
        }
        let uri = self.member_uri("discounts")?;
        let body = json!({"description": description, "amount": amount, "type": discount_type});
        Ok(client.post(ApiVersion::V2, &uri, body).await?.into_value())
    }

    pub async fn update_discount(&self, client: &PipedriveClient, discount_id: &str, changes: JsonValue) -> Result<JsonValue> {
        let uri = self.member_uri(&format!("discounts/{}", discount_id))?;
        let body = object_or_empty(changes)?;
        Ok(client.patch(ApiVersion::V2, &uri, JsonValue::Object(body)).await?.into_value())
    }

    pub async fn delete_discount(&self, client: &PipedriveClient, discount_id: &str) -> Result<JsonValue> {
        let uri = self.member_uri(&format!("discounts/{}", discount_id))?;
        Ok(client.delete(ApiVersion::V2, &uri, &Params::new()).await?.into_value())
    }

    /// Installments need at least one one-time product on the deal
    pub async fn add_installment(
        &self,
        client: &PipedriveClient,
        description: &str,
        amount: f64,
        billing_date: NaiveDate,
    ) -> Result<JsonValue> {
        positive_amount(amount)?;
        let uri = self.member_uri("installments")?;
        let body = json!({
            "description": description,
            "amount": amount,
            "billing_date": format_date(&billing_date),
        });
        Ok(client.post(ApiVersion::V2, &uri, body).await?.into_value())
    }

    pub async fn update_installment(&self, client: &PipedriveClient, installment_id: i64, changes: JsonValue) -> Result<JsonValue> {
        let uri = self.member_uri(&format!("installments/{}", installment_id))?;
        let body = object_or_empty(changes)?;
        Ok(client.patch(ApiVersion::V2, &uri, JsonValue::Object(body)).await?.into_value())
    }

    pub async fn delete_installment(&self, client: &PipedriveClient, installment_id: i64) -> Result<JsonValue> {
        let uri = self.member_uri(&format!("installments/{}", installment_id))?;
        Ok(client.delete(ApiVersion::V2, &uri, &Params::new()).await?.into_value())
    }

    /// Start converting this deal into a lead. The result carries the
    /// `conversion_id` to poll with `conversion_status`.
    pub async fn convert_to_lead(&self, client: &PipedriveClient) -> Result<JsonValue> {
        let uri = self.member_uri("convert/lead")?;
        Ok(client.post(ApiVersion::V2, &uri, json!({})).await?.into_value())
    }

    pub async fn conversion_status(&self, client: &PipedriveClient, conversion_id: &str) -> Result<JsonValue> {
        let uri = self.member_uri(&format!("convert/status/{}", urlencoding::encode(conversion_id)))?;
        Ok(client.get(ApiVersion::V2, &uri, &Params::new()).await?.into_value())
    }
}

fn object_or_empty(value: JsonValue) -> Result<serde_json::Map<String, JsonValue>> {
    match value {
        JsonValue::Null => Ok(serde_json::Map::new()),
        JsonValue::Object(map) => Ok(map),
        other => Err(Error::InvalidArgument(format!("expected a JSON object, got {}", other))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::testing::MockTransport;
    use crate::orm::FieldError;

    fn saved_deal() -> Deal {
        Deal::from_record(&json!({"id": 42, "title": "Renewal", "status": "open"})).unwrap()
    }

    #[test]
    fn test_deal_validators_run_on_assignment() {
        let mut deal = Deal::new();
        assert!(matches!(deal.set("status", "pending"), Err(FieldError::InvalidValue { .. })));
        assert!(deal.set("probability", 150).is_err());
        assert!(deal.set("visible_to", 2).is_err());

        deal.set("currency", "eur").unwrap();
        assert_eq!(deal.text("currency"), Some("EUR"));
        deal.set("status", "won").unwrap();
        assert!(matches!(deal.set("add_time", "2024-01-01T00:00:00Z"), Err(FieldError::ReadOnly { .. })));
    }

    #[test]
    fn test_deal_record_hydration() {
        let deal = Deal::from_record(&json!({
            "id": 7,
            "title": "Fleet",
            "value": 1200.5,
            "label_ids": [1, 2],
            "expected_close_date": "2025-03-01",
            "add_time": "2025-01-01T10:00:00Z",
            "custom_fields": {"abc123": "gold"}
        }))
        .unwrap();

        assert_eq!(deal.number("value"), Some(1200.5));
        assert_eq!(deal.list("label_ids").len(), 2);
        assert_eq!(deal.date("expected_close_date"), NaiveDate::from_ymd_opt(2025, 3, 1));
        assert!(deal.datetime("add_time").is_some());
        assert!(!deal.is_modified());
    }

    #[tokio::test]
    async fn test_archived_uses_sub_collection() {
        let mock = MockTransport::new();
        mock.push_json(200, json!({"success": true, "data": [{"id": 1, "is_archived": true}]}));
        let client = mock.client();

        let deals = Deals::archived(&client, &Params::new()).await.unwrap();
        assert_eq!(deals.len(), 1);
        assert_eq!(deals[0].boolean("is_archived"), Some(true));
        assert_eq!(mock.last_request().url, "https://api.pipedrive.com/api/v2/deals/archived");
    }

    #[tokio::test]
    async fn test_timeline_validates_locally() {
        let mock = MockTransport::new();
        let client = mock.client();
        let start = NaiveDate::from_ymd_opt(2025, 1, 1).unwrap();

        assert!(Deals::timeline(&client, start, "year", 3, "add_time", &Params::new()).await.is_err());
        assert!(Deals::timeline(&client, start, "month", 0, "add_time", &Params::new()).await.is_err());
        assert!(Deals::timeline(&client, start, "month", 3, " ", &Params::new()).await.is_err());
        assert_eq!(mock.request_count(), 0);
    }

    #[tokio::test]
    async fn test_timeline_request() {
        let mock = MockTransport::new();
        mock.push_json(200, json!({"success": true, "data": [{"period_start": "2025-01-01"}]}));
        let client = mock.client();
        let start = NaiveDate::from_ymd_opt(2025, 1, 1).unwrap();

        let timeline = Deals::timeline(&client, start, "month", 3, "add_time", &Params::new())
            .await
            .unwrap();

        assert_eq!(timeline["data"][0]["period_start"], "2025-01-01");
        let request = mock.last_request();
        assert_eq!(request.url, "https://api.pipedrive.com/v1/deals/timeline");
        assert_eq!(request.query_param("start_date"), Some("2025-01-01"));
        assert_eq!(request.query_param("amount"), Some("3"));
    }

    #[tokio::test]
    async fn test_summary_uses_v1() {
        let mock = MockTransport::new();
        mock.push_json(200, json!({"success": true, "data": {"total_count": 4}}));
        let client = mock.client();

        let summary = Deals::summary(&client, &Params::new().with("status", "open")).await.unwrap();
        assert_eq!(summary["data"]["total_count"], 4);
        assert_eq!(mock.last_request().url, "https://api.pipedrive.com/v1/deals/summary");
    }

    #[tokio::test]
    async fn test_member_routes_need_an_id() {
        let mock = MockTransport::new();
        let client = mock.client();

        let err = Deal::new().merge(&client, 9).await.unwrap_err();
        assert!(matches!(err, Error::MissingId { .. }));
        assert_eq!(mock.request_count(), 0);
    }

    /// Deal as the v1 API returns it: related records expanded, naive timestamps
    fn v1_deal(id: i64) -> JsonValue {
        json!({
            "id": id,
            "creator_user_id": {"id": 8877, "name": "Creator", "email": "john@pipedrive.com", "has_pic": false, "active_flag": true, "value": 8877},
            "user_id": {"id": 8877, "name": "Creator", "email": "john@pipedrive.com", "has_pic": false, "active_flag": true, "value": 8877},
            "person_id": {"active_flag": true, "name": "Person", "email": [{"label": "work", "value": "person@pipedrive.com", "primary": true}], "value": 1101},
            "org_id": {"name": "Organization", "people_count": 2, "owner_id": 8877, "address": "Mustamäe tee 3a, 10615 Tallinn", "active_flag": true, "cc_email": "org@pipedrivemail.com", "value": 5},
            "stage_id": 2,
            "title": "Deal One",
            "value": 5000,
            "currency": "EUR",
            "add_time": "2019-05-29 04:21:51",
            "update_time": "2019-05-29 04:21:51",
            "stage_change_time": "2019-11-28 15:19:50",
            "active": true,
            "deleted": false,
            "status": "open",
            "probability": null,
            "next_activity_date": "2019-11-29",
            "next_activity_time": "11:30:00",
            "next_activity_id": 128,
            "lost_reason": null,
            "visible_to": "1",
            "close_time": null,
            "pipeline_id": 1,
            "won_time": "2019-11-27 11:40:36",
            "lost_time": "",
            "products_count": 0,
            "expected_close_date": "2019-06-29",
            "label": "11",
            "stage_order_nr": 2,
            "person_name": "Person",
            "org_name": "Organization",
            "weighted_value": 5000,
            "formatted_weighted_value": "US$5,000",
            "origin": "ManuallyCreated",
            "channel": null,
            "channel_id": null,
            "acv": null,
            "arr": null,
            "mrr": null,
            "custom_fields": []
        })
    }

    #[test]
    fn test_v1_deal_with_expanded_relations_hydrates() {
        let deal = Deal::from_record(&v1_deal(1)).unwrap();

        assert_eq!(deal.integer("creator_user_id"), Some(8877));
        assert_eq!(deal.integer("user_id"), Some(8877));
        assert_eq!(deal.integer("person_id"), Some(1101));
        assert_eq!(deal.integer("org_id"), Some(5));
        assert_eq!(deal.integer("visible_to"), Some(1));
        assert_eq!(deal.integer("probability"), None);
        assert_eq!(
            deal.datetime("add_time").map(|t| t.to_rfc3339()),
            Some("2019-05-29T04:21:51+00:00".to_string())
        );
        assert!(deal.datetime("lost_time").is_none());
        assert_eq!(deal.date("expected_close_date"), NaiveDate::from_ymd_opt(2019, 6, 29));
        assert!(!deal.is_modified());
    }

    #[tokio::test]
    async fn test_v1_pinned_get_reads_expanded_relations() {
        let mock = MockTransport::new();
        mock.push_json(200, json!({"success": true, "data": v1_deal(42)}));
        let client = mock.client().pinned(ApiVersion::V1);

        let deal = Deal::get(&client, 42).await.unwrap();
        assert_eq!(mock.last_request().url, "https://api.pipedrive.com/v1/deals/42");
        assert_eq!(deal.integer("org_id"), Some(5));
        assert_eq!(deal.text("title"), Some("Deal One"));
    }

    #[tokio::test]
    async fn test_merge_and_duplicate() {
        let mock = MockTransport::new();
        mock.push_json(200, json!({"success": true, "data": v1_deal(42)}));
        mock.push_json(201, json!({"success": true, "data": v1_deal(43)}));
        let client = mock.client();
        let deal = saved_deal();

        let merged = deal.merge(&client, 9).await.unwrap();
        let merge = mock.last_request();
        assert_eq!(merge.method, crate::api::Method::Put);
        assert_eq!(merge.url, "https://api.pipedrive.com/v1/deals/42/merge");
        assert_eq!(merge.json, Some(json!({"merge_with_id": 9})));
        assert_eq!(merged["data"]["person_id"]["value"], 1101);

        let copy = deal.duplicate(&client).await.unwrap();
        assert_eq!(mock.last_request().url, "https://api.pipedrive.com/v1/deals/42/duplicate");
        assert_eq!(copy.id(), Some(&crate::orm::RecordId::Int(43)));
        assert_eq!(copy.text("title"), Some("Deal One"));
        assert_eq!(copy.integer("user_id"), Some(8877));
    }

    #[tokio::test]
    async fn test_followers_and_participants_versions() {
        let mock = MockTransport::new();
        mock.push_json(200, json!({"success": true, "data": [{"user_id": 5}]}));
        mock.push_json(200, json!({"success": true, "data": {"user_id": 6}}));
        mock.push_json(200, json!({"success": true, "data": [{"person_id": 8}]}));
        let client = mock.client();
        let deal = saved_deal();

        assert_eq!(deal.followers(&client, &Params::new()).await.unwrap().len(), 1);
        deal.add_follower(&client, 6).await.unwrap();
        assert_eq!(mock.last_request().url, "https://api.pipedrive.com/api/v2/deals/42/followers");
        assert_eq!(deal.participants(&client, &Params::new()).await.unwrap().len(), 1);
        assert_eq!(mock.last_request().url, "https://api.pipedrive.com/v1/deals/42/participants");
    }

    #[tokio::test]
    async fn test_changelog_entries_are_typed() {
        let mock = MockTransport::new();
        mock.push_json(200, json!({
            "success": true,
            "data": [{"field_key": "title", "old_value": "a", "new_value": "b", "actor_user_id": 1}],
            "additional_data": {"next_cursor": null}
        }));
        let client = mock.client();

        let entries = saved_deal().changelog(&client, &Params::new()).await.unwrap();
        assert_eq!(entries[0].field_key.as_deref(), Some("title"));
        assert_eq!(entries[0].new_value, Some(json!("b")));
    }

    #[tokio::test]
    async fn test_feed_routes_use_their_versions() {
        let mock = MockTransport::new();
        for _ in 0..5 {
            mock.push_json(200, json!({"success": true, "data": [{"id": 1}]}));
        }
        let client = mock.client();
        let deal = saved_deal();

        deal.flow(&client, &Params::new()).await.unwrap();
        assert_eq!(mock.last_request().url, "https://api.pipedrive.com/v1/deals/42/flow");
        deal.participants_changelog(&client, &Params::new()).await.unwrap();
        assert_eq!(mock.last_request().url, "https://api.pipedrive.com/v1/deals/42/participantsChangelog");
        deal.followers_changelog(&client, &Params::new()).await.unwrap();
        assert_eq!(mock.last_request().url, "https://api.pipedrive.com/api/v2/deals/42/followers/changelog");
        deal.mail_messages(&client, &Params::new()).await.unwrap();
        assert_eq!(mock.last_request().url, "https://api.pipedrive.com/v1/deals/42/mailMessages");
        assert_eq!(deal.permitted_users(&client).await.unwrap().len(), 1);
        assert_eq!(mock.last_request().url, "https://api.pipedrive.com/v1/deals/42/permittedUsers");
    }

    #[tokio::test]
    async fn test_follower_and_participant_deletion() {
        let mock = MockTransport::new();
        mock.push_json(200, json!({"success": true, "data": {"user_id": 6}}));
        mock.push_json(200, json!({"success": true, "data": {"id": 3}}));
        let client = mock.client();
        let deal = saved_deal();

        deal.delete_follower(&client, 6).await.unwrap();
        let request = mock.last_request();
        assert_eq!(request.method, crate::api::Method::Delete);
        assert_eq!(request.url, "https://api.pipedrive.com/api/v2/deals/42/followers/6");

        deal.delete_participant(&client, 3).await.unwrap();
        assert_eq!(mock.last_request().url, "https://api.pipedrive.com/v1/deals/42/participants/3");
    }

    #[tokio::test]
    async fn test_attached_product_lifecycle() {
        let mock = MockTransport::new();
        for _ in 0..5 {
            mock.push_json(200, json!({"success": true, "data": {"id": 11}}));
        }
        let client = mock.client();
        let deal = saved_deal();

        deal.add_product(&client, 7, 25.0, 2.0, json!({"tax": 20})).await.unwrap();
        let add = mock.last_request();
        assert_eq!(add.url, "https://api.pipedrive.com/api/v2/deals/42/products");
        assert_eq!(
            add.json,
            Some(json!({"tax": 20, "product_id": 7, "item_price": 25.0, "quantity": 2.0}))
        );

        deal.add_products(&client, vec![json!({"product_id": 7, "item_price": 1.0, "quantity": 1.0})])
            .await
            .unwrap();
        let bulk = mock.last_request();
        assert_eq!(bulk.url, "https://api.pipedrive.com/api/v2/deals/42/products/bulk");
        assert_eq!(bulk.json.unwrap()["data"][0]["product_id"], 7);

        deal.update_attached_product(&client, 11, json!({"quantity": 3})).await.unwrap();
        let update = mock.last_request();
        assert_eq!(update.method, crate::api::Method::Patch);
        assert_eq!(update.url, "https://api.pipedrive.com/api/v2/deals/42/products/11");

        deal.delete_attached_product(&client, 11).await.unwrap();
        assert_eq!(mock.last_request().method, crate::api::Method::Delete);

        deal.delete_products(&client, &[11, 12]).await.unwrap();
        let bulk_delete = mock.last_request();
        assert_eq!(bulk_delete.url, "https://api.pipedrive.com/api/v2/deals/42/products");
        assert_eq!(bulk_delete.query_param("ids"), Some("11,12"));
    }

    #[tokio::test]
    async fn test_product_arguments_validate_locally() {
        let mock = MockTransport::new();
        let client = mock.client();
        let deal = saved_deal();

        assert!(deal.add_products(&client, Vec::new()).await.is_err());
        assert!(deal.add_products(&client, vec![json!(7)]).await.is_err());
        assert!(deal.add_product(&client, 7, 1.0, 1.0, json!([1])).await.is_err());
        assert!(Deals::deals_products(&client, &[], &Params::new()).await.is_err());
        let too_many: Vec<i64> = (0..101).collect();
        assert!(Deals::installments(&client, &too_many, &Params::new()).await.is_err());
        assert_eq!(mock.request_count(), 0);
    }

    #[tokio::test]
    async fn test_products_and_installments_of_several_deals() {
        let mock = MockTransport::new();
        mock.push_json(200, json!({"success": true, "data": [{"deal_id": 1}, {"deal_id": 2}]}));
        mock.push_json(200, json!({"success": true, "data": [{"deal_id": 2, "amount": 50}]}));
        let client = mock.client();

        let products = Deals::deals_products(&client, &[1, 2], &Params::new()).await.unwrap();
        assert_eq!(products.len(), 2);
        let request = mock.last_request();
        assert_eq!(request.url, "https://api.pipedrive.com/api/v2/deals/products");
        assert_eq!(request.query_param("deal_ids"), Some("1,2"));

        let installments = Deals::installments(&client, &[2], &Params::new()).await.unwrap();
        assert_eq!(installments[0]["amount"], 50);
        assert_eq!(mock.last_request().url, "https://api.pipedrive.com/api/v2/deals/installments");
    }

    #[tokio::test]
    async fn test_discounts_and_installments() {
        let mock = MockTransport::new();
        for _ in 0..5 {
            mock.push_json(200, json!({"success": true, "data": {"id": "d1"}}));
        }
        let client = mock.client();
        let deal = saved_deal();

        assert!(deal.add_discount(&client, "Loyalty", 0.0, "amount").await.is_err());
        assert!(deal.add_discount(&client, "Loyalty", 5.0, "gift").await.is_err());
        let billing_date = NaiveDate::from_ymd_opt(2025, 6, 1).unwrap();
        assert!(deal.add_installment(&client, "First", -1.0, billing_date).await.is_err());
        assert_eq!(mock.request_count(), 0);

        deal.add_discount(&client, "Loyalty", 5.0, "percentage").await.unwrap();
        let discount = mock.last_request();
        assert_eq!(discount.url, "https://api.pipedrive.com/api/v2/deals/42/discounts");
        assert_eq!(
            discount.json,
            Some(json!({"description": "Loyalty", "amount": 5.0, "type": "percentage"}))
        );

        deal.update_discount(&client, "d1", json!({"amount": 7.5})).await.unwrap();
        assert_eq!(mock.last_request().url, "https://api.pipedrive.com/api/v2/deals/42/discounts/d1");

        deal.add_installment(&client, "First", 100.0, billing_date).await.unwrap();
        let installment = mock.last_request();
        assert_eq!(installment.url, "https://api.pipedrive.com/api/v2/deals/42/installments");
        assert_eq!(installment.json.unwrap()["billing_date"], "2025-06-01");

        deal.update_installment(&client, 4, json!({"amount": 90})).await.unwrap();
        assert_eq!(mock.last_request().method, crate::api::Method::Patch);
        deal.delete_installment(&client, 4).await.unwrap();
        assert_eq!(mock.last_request().url, "https://api.pipedrive.com/api/v2/deals/42/installments/4");
    }

    #[tokio::test]
    async fn test_convert_to_lead() {
        let mock = MockTransport::new();
        mock.push_json(200, json!({"success": true, "data": {"conversion_id": "c-1"}}));
        mock.push_json(200, json!({"success": true, "data": {"status": "completed", "lead_id": "abc"}}));
        let client = mock.client();
        let deal = saved_deal();

        let started = deal.convert_to_lead(&client).await.unwrap();
        let request = mock.last_request();
        assert_eq!(request.url, "https://api.pipedrive.com/api/v2/deals/42/convert/lead");
        assert_eq!(request.json, Some(json!({})));

        let conversion_id = started["data"]["conversion_id"].as_str().unwrap();
        let status = deal.conversion_status(&client, conversion_id).await.unwrap();
        assert_eq!(status["data"]["lead_id"], "abc");
        assert_eq!(mock.last_request().url, "https://api.pipedrive.com/api/v2/deals/42/convert/status/c-1");
    }

    #[tokio::test]
    async fn test_batch_delete_is_not_offered() {
        let mock = MockTransport::new();
        let client = mock.client();

        let err = Deal::batch_delete(&client, crate::orm::BatchDelete::ids([1, 2]))
            .await
            .unwrap_err();
        assert!(matches!(err, Error::Unsupported { .. }));
        assert_eq!(mock.request_count(), 0);
    }
}
