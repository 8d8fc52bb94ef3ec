//! Persons

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

pub struct Persons;

pub type Person = Model<Persons>;

static PERSONS: EntitySchema = EntitySchema::new(
    "Persons",
    "persons",
    &[
        F::text("name").with_validators(&[validators::non_empty_text]),
        F::text("first_name"),
        F::text("last_name"),
        F::datetime("add_time").readonly(),
        F::datetime("update_time").readonly(),
        F::integer("visible_to").with_validators(&[validators::visible_to]),
        F::integer("owner_id").readonly(),
        F::list("label_ids", ElementKind::IntegerOrText),
        F::integer("org_id").readonly(),
        F::boolean("is_deleted").readonly(),
        F::integer("picture_id").readonly(),
        F::list("phones", ElementKind::Struct(StructKind::LabelValue)),
        F::list("emails", ElementKind::Struct(StructKind::LabelValue)),
        F::list("im", ElementKind::Struct(StructKind::LabelValue)),
        F::structured("postal_address", StructKind::Address),
        F::text("notes"),
        F::text("job_title"),
        F::date("birthday"),
        F::json("custom_fields"),
    ],
    Endpoints {
        batch_delete: V1_ONLY,
        ..Endpoints::uniform(BOTH)
    },
);

impl Entity for Persons {
    fn schema() -> &'static EntitySchema {
        &PERSONS
    }
}

impl Persons {
    /// Search persons by name, email, phone, notes and custom fields
    pub async fn search(client: &PipedriveClient, term: &str, params: &Params) -> Result<Vec<SearchResult>> {
        search_at(client, "persons/search", term, params.clone()).await
    }
}

impl Model<Persons> {
    /// Merge the person `merge_with_id` into this one
    pub async fn merge(&self, client: &PipedriveClient, merge_with_id: i64) -> Result<JsonValue> {
        merge_records(client, &self.member_uri("merge")?, merge_with_id).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::testing::MockTransport;
    use crate::orm::types::{LabelValue, Struct};
    use crate::orm::{BatchDelete, Value};
    use serde_json::json;

    #[test]
    fn test_contact_lists_are_typed() {
        let person = Person::from_record(&json!({
            "id": 3,
            "name": "Ann",
            "emails": [{"label": "work", "value": "ann@example.com", "primary": true}],
            "phones": [],
            "postal_address": {"locality": "Ghent", "country": "Belgium"}
        }))
        .unwrap();

        let emails = person.list("emails");
        assert_eq!(
            emails[0],
            Value::Struct(Struct::LabelValue(LabelValue {
                label: Some("work".into()),
                value: Some("ann@example.com".into()),
                primary: Some(true),
            }))
        );
        assert!(person.list("phones").is_empty());
        assert!(matches!(person.structured("postal_address"), Some(Struct::Address(a)) if a.locality.as_deref() == Some("Ghent")));
    }

    #[tokio::test]
    async fn test_v1_person_with_expanded_relations() {
        let mock = MockTransport::new();
        mock.push_json(200, json!({
            "success": true,
            "data": {
                "id": 3,
                "company_id": 12,
                "owner_id": {"id": 123, "name": "Jane Doe", "email": "jane@pipedrive.com", "has_pic": 1, "active_flag": true, "value": 123},
                "org_id": {"name": "Org Name", "people_count": 1, "owner_id": 123, "address": "Mustamäe tee 3a", "active_flag": true, "cc_email": "org@pipedrivemail.com", "value": 1234},
                "picture_id": {"item_type": "person", "item_id": 25, "active_flag": true, "add_time": "2020-09-08 08:17:52", "pictures": {"128": "https://example.com/128.jpg"}, "value": 4},
                "name": "Will Smith",
                "phone": [{"label": "work", "value": "12345", "primary": true}],
                "visible_to": "3",
                "add_time": "2017-10-18 13:23:07",
                "update_time": "2020-05-08 05:30:20",
                "label": 1
            }
        }));
        let client = mock.client().pinned(crate::api::ApiVersion::V1);

        let person = Person::get(&client, 3).await.unwrap();
        assert_eq!(mock.last_request().url, "https://api.pipedrive.com/v1/persons/3");
        assert_eq!(person.integer("owner_id"), Some(123));
        assert_eq!(person.integer("org_id"), Some(1234));
        assert_eq!(person.integer("picture_id"), Some(4));
        assert_eq!(person.integer("visible_to"), Some(3));
        assert!(person.datetime("add_time").is_some());
    }

    #[test]
    fn test_name_must_not_be_blank() {
        let mut person = Person::new();
        assert!(person.set("name", "   ").is_err());
        person.set("name", "  Ann ").unwrap();
        assert_eq!(person.text("name"), Some("Ann"));
    }

    #[tokio::test]
    async fn test_batch_delete_routes_to_v1() {
        let mock = MockTransport::new();
        mock.push_json(200, json!({"success": true, "data": {"id": [1, 2]}}));
        let client = mock.client();

        let ids = Person::batch_delete(&client, BatchDelete::ids([1, 2])).await.unwrap();
        assert_eq!(ids.len(), 2);
        let request = mock.last_request();
        assert_eq!(request.url, "https://api.pipedrive.com/v1/persons");
        assert_eq!(request.query_param("ids"), Some("1,2"));
    }

    #[tokio::test]
    async fn test_batch_delete_pinned_to_v2_fails_locally() {
        let mock = MockTransport::new();
        let client = mock.client().pinned(crate::api::ApiVersion::V2);

        assert!(Person::batch_delete(&client, BatchDelete::ids([1])).await.is_err());
        assert_eq!(mock.request_count(), 0);
    }

    #[tokio::test]
    async fn test_merge() {
        let mock = MockTransport::new();
        mock.push_json(200, json!({"success": true, "data": {"id": 3}}));
        let client = mock.client();
        let person = Person::from_record(&json!({"id": 3})).unwrap();

        person.merge(&client, 4).await.unwrap();
        let request = mock.last_request();
        assert_eq!(request.url, "https://api.pipedrive.com/v1/persons/3/merge");
        assert_eq!(request.json, Some(json!({"merge_with_id": 4})));
    }

    #[tokio::test]
    async fn test_search_endpoint() {
        let mock = MockTransport::new();
        mock.push_json(200, json!({"success": true, "data": {"items": [{"item": {"id": 3, "name": "Ann"}}]}}));
        let client = mock.client();

        let results = Persons::search(&client, "ann", &Params::new()).await.unwrap();
        assert_eq!(results.len(), 1);
        assert_eq!(mock.last_request().url, "https://api.pipedrive.com/api/v2/persons/search");
    }
}
