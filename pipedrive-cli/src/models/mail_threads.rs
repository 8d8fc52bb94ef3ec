//! Mailbox threads and their messages
//!
//! Threads are listed per folder and only their flags and deal link can be
//! changed, with a form-encoded `PUT`.

use std::collections::BTreeSet;

use serde_json::Value as JsonValue;

use crate::api::{ApiRequest, ApiVersion, Method, Params, PipedriveClient};
use crate::error::{Error, Result};
use crate::orm::fields::{ElementKind, FieldDescriptor as F};
use crate::orm::model::{Model, SaveResult};
use crate::orm::schema::{Endpoints, Entity, EntitySchema, NONE, Operation, V1_ONLY};
use crate::orm::types::StructKind;

pub struct MailThreads;

pub type MailThread = Model<MailThreads>;

pub const MAIL_FOLDERS: &[&str] = &["inbox", "drafts", "sent", "archive"];

static MAIL_THREADS: EntitySchema = EntitySchema::new(
    "MailThreads",
    "mailbox/mailThreads",
    &[
        F::structured("parties", StructKind::MailParties).readonly(),
        F::json("drafts_parties").readonly(),
        F::list("folders", ElementKind::Text).readonly(),
        F::text("account_id").readonly(),
        F::integer("user_id").readonly(),
        F::integer("version").readonly(),
        F::text("subject").readonly(),
        F::text("snippet").readonly(),
        F::text("snippet_draft").readonly(),
        F::text("snippet_sent").readonly(),
        F::integer("message_count").readonly(),
        F::boolean("has_attachments_flag").readonly(),
        F::boolean("has_inline_attachments_flag").readonly(),
        F::boolean("has_real_attachments_flag").readonly(),
        F::boolean("has_draft_flag").readonly(),
        F::boolean("has_sent_flag").readonly(),
        F::boolean("archived_flag"),
        F::boolean("deleted_flag").readonly(),
        F::boolean("shared_flag"),
        F::boolean("synced_flag").readonly(),
        F::boolean("read_flag"),
        F::boolean("external_deleted_flag").readonly(),
        F::boolean("smart_bcc_flag").readonly(),
        F::boolean("first_message_to_me_flag").readonly(),
        F::text("mail_tracking_status").readonly(),
        F::boolean("mail_link_tracking_enabled_flag").readonly(),
        F::datetime("last_message_timestamp").readonly(),
        F::datetime("first_message_timestamp").readonly(),
        F::datetime("last_message_sent_timestamp").readonly(),
        F::datetime("last_message_received_timestamp").readonly(),
        F::datetime("add_time").readonly(),
        F::datetime("update_time").readonly(),
        F::integer("deal_id"),
        F::text("deal_status").readonly(),
        F::boolean("all_messages_sent_flag").readonly(),
    ],
    Endpoints {
        get: V1_ONLY,
        delete: V1_ONLY,
        ..Endpoints::uniform(NONE)
    },
);

impl Entity for MailThreads {
    fn schema() -> &'static EntitySchema {
        &MAIL_THREADS
    }
}

impl MailThreads {
    /// Threads of one folder, most recent message first
    pub async fn in_folder(client: &PipedriveClient, folder: &str, params: &Params) -> Result<Vec<MailThread>> {
        if !MAIL_FOLDERS.contains(&folder) {
            return Err(Error::InvalidArgument(format!(
                "folder must be one of {}, got '{}'",
                MAIL_FOLDERS.join(", "),
                folder
            )));
        }
        let params = params.clone().with("folder", folder);
        MailThread::all_with_version(client, ApiVersion::V1, MAIL_THREADS.entity_name, &params).await
    }

    /// One mail message; `include_body=1` in `params` adds the body
    pub async fn mail_message(client: &PipedriveClient, message_id: i64, params: &Params) -> Result<JsonValue> {
        let uri = format!("mailbox/mailMessages/{}", message_id);
        Ok(client.get(ApiVersion::V1, &uri, params).await?.into_value())
    }
}

impl Model<MailThreads> {
    /// Send the deal link and the shared, read and archived flags. Flags go
    /// out as 0/1 and unset attributes are left out.
    pub async fn update_flags(&mut self, client: &PipedriveClient) -> Result<SaveResult> {
        let id = self.require_id(Operation::Update)?.clone();
        let uri = format!("{}/{}", MAIL_THREADS.entity_name, id.path_segment());

        let mut request = ApiRequest::new(Method::Put, ApiVersion::V1, uri);
        let mut field_names = BTreeSet::new();
        if let Some(deal_id) = self.integer("deal_id") {
            request = request.form_field("deal_id", deal_id);
            field_names.insert("deal_id".to_string());
        }
        for flag in ["shared_flag", "read_flag", "archived_flag"] {
            if let Some(value) = self.boolean(flag) {
                request = request.form_field(flag, u8::from(value));
                field_names.insert(flag.to_string());
            }
        }
        client.send(request).await?;
        self.mark_clean();

        Ok(SaveResult {
            id,
            created: false,
            updated: true,
            forced: false,
            field_names,
        })
    }

    /// Messages of this thread
    pub async fn mail_messages(&self, client: &PipedriveClient) -> Result<Vec<JsonValue>> {
        let uri = self.member_uri("mailMessages")?;
        Ok(client.get(ApiVersion::V1, &uri, &Params::new()).await?.data_items())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::testing::MockTransport;
    use crate::orm::types::Struct;
    use serde_json::json;

    #[tokio::test]
    async fn test_threads_are_listed_per_folder() {
        let mock = MockTransport::new();
        mock.push_json(200, json!({
            "success": true,
            "data": [{
                "id": 1,
                "subject": "Quote",
                "folders": ["inbox"],
                "read_flag": 0,
                "parties": {"to": [{"id": 5, "name": "Ann", "email_address": "ann@example.com"}]},
                "last_message_timestamp": "2025-01-15T08:30:00.000Z"
            }],
            "additional_data": {"pagination": {"start": 0, "limit": 50, "more_items_in_collection": false}}
        }));
        let client = mock.client();

        let threads = MailThreads::in_folder(&client, "inbox", &Params::new()).await.unwrap();
        assert_eq!(threads[0].boolean("read_flag"), Some(false));
        let Some(Struct::MailParties(parties)) = threads[0].structured("parties") else {
            panic!("parties not parsed");
        };
        assert_eq!(parties.to.as_ref().unwrap()[0].name.as_deref(), Some("Ann"));

        let request = mock.last_request();
        assert_eq!(request.url, "https://api.pipedrive.com/v1/mailbox/mailThreads");
        assert_eq!(request.query_param("folder"), Some("inbox"));

        assert!(MailThreads::in_folder(&client, "spam", &Params::new()).await.is_err());
        assert_eq!(mock.request_count(), 1);
    }

    #[tokio::test]
    async fn test_update_flags_is_form_encoded() {
        let mock = MockTransport::new();
        mock.push_json(200, json!({"success": true, "data": {"id": 1}}));
        let client = mock.client();

        let mut thread = MailThread::from_record(&json!({"id": 1, "read_flag": false})).unwrap();
        thread.set("read_flag", true).unwrap();
        thread.set("deal_id", 42).unwrap();
        let result = thread.update_flags(&client).await.unwrap();

        assert!(result.updated);
        assert!(!thread.is_modified());
        let request = mock.last_request();
        assert_eq!(request.method, Method::Put);
        assert_eq!(request.url, "https://api.pipedrive.com/v1/mailbox/mailThreads/1");
        assert_eq!(
            request.form,
            vec![("deal_id".to_string(), "42".to_string()), ("read_flag".to_string(), "1".to_string())]
        );
        assert_eq!(request.json, None);
    }

    #[tokio::test]
    async fn test_messages() {
        let mock = MockTransport::new();
        mock.push_json(200, json!({"success": true, "data": [{"id": 10}, {"id": 11}]}));
        mock.push_json(200, json!({"success": true, "data": {"id": 11, "body": "<p>hi</p>"}}));
        let client = mock.client();

        let messages = MailThread::with_id(1).mail_messages(&client).await.unwrap();
        assert_eq!(messages.len(), 2);
        assert_eq!(mock.last_request().url, "https://api.pipedrive.com/v1/mailbox/mailThreads/1/mailMessages");

        let message = MailThreads::mail_message(&client, 11, &Params::new().with("include_body", 1))
            .await
            .unwrap();
        assert_eq!(message["data"]["body"], "<p>hi</p>");
        assert_eq!(mock.last_request().url, "https://api.pipedrive.com/v1/mailbox/mailMessages/11");
    }
}
