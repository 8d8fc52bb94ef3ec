//! Call logs: phone calls recorded by an integrated telephony provider
//!
//! A call log is also an activity, linked to a deal or lead, a person and an
//! organization. It cannot be edited once created.

use crate::api::{ApiRequest, ApiVersion, FilePart, Method, PipedriveClient};
use crate::error::Result;
use crate::orm::fields::FieldDescriptor as F;
use crate::orm::model::Model;
use crate::orm::schema::{Endpoints, Entity, EntitySchema, NONE, V1_ONLY};
use crate::orm::validators;

pub struct CallLogs;

pub type CallLog = Model<CallLogs>;

static CALL_LOGS: EntitySchema = EntitySchema::new(
    "CallLogs",
    "callLogs",
    &[
        F::integer("activity_id").readonly(),
        F::integer("person_id"),
        F::integer("org_id"),
        F::integer("deal_id"),
        F::text("lead_id"),
        F::text("subject"),
        F::integer("duration"),
        F::text("outcome").with_validators(&[validators::call_outcome]),
        F::text("from_phone_number"),
        F::text("to_phone_number"),
        F::boolean("has_recording").readonly(),
        F::datetime("start_time"),
        F::datetime("end_time"),
        F::integer("user_id"),
        F::integer("company_id").readonly(),
        F::text("note"),
    ],
    Endpoints {
        get: V1_ONLY,
        all: V1_ONLY,
        save: V1_ONLY,
        delete: V1_ONLY,
        ..Endpoints::uniform(NONE)
    },
);

impl Entity for CallLogs {
    fn schema() -> &'static EntitySchema {
        &CALL_LOGS
    }
}

impl Model<CallLogs> {
    /// Attach an audio recording, playable by everyone who can see the log
    pub async fn attach_recording(&self, client: &PipedriveClient, file: FilePart) -> Result<()> {
        let uri = self.member_uri("recordings")?;
        let file_name = file.file_name.clone();
        client
            .send(ApiRequest::new(Method::Post, ApiVersion::V1, uri.as_str()).file(file))
            .await?;
        log::info!("Attached recording {} to {}", file_name, uri);
        Ok(())
    }
}
