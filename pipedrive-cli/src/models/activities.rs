//! Activities

use crate::orm::fields::{ElementKind, FieldDescriptor as F};
use crate::orm::model::Model;
use crate::orm::schema::{BOTH, Endpoints, Entity, EntitySchema, V1_ONLY};
use crate::orm::types::StructKind;
use crate::orm::validators;

pub struct Activities;

pub type Activity = Model<Activities>;

static ACTIVITIES: EntitySchema = EntitySchema::new(
    "Activities",
    "activities",
    &[
        F::text("subject"),
        F::text("type").named("activity_type"),
        F::integer("owner_id"),
        F::boolean("is_deleted").readonly(),
        F::datetime("add_time").readonly(),
        F::datetime("update_time").readonly(),
        F::integer("deal_id"),
        F::text("lead_id"),
        F::integer("person_id"),
        F::integer("org_id"),
        F::integer("project_id"),
        F::date("due_date"),
        F::time("due_time"),
        F::duration("duration"),
        F::boolean("done"),
        F::boolean("busy"),
        F::datetime("marked_as_done_time").readonly(),
        F::structured("location", StructKind::Address),
        F::list("participants", ElementKind::Struct(StructKind::Participant)),
        F::list("attendees", ElementKind::Struct(StructKind::Attendee)),
        F::text("conference_meeting_client").readonly(),
        F::text("conference_meeting_url").readonly(),
        F::text("conference_meeting_id").readonly(),
        F::text("public_description"),
        F::integer("priority").with_validators(&[validators::activity_priority]),
        F::text("note"),
    ],
    // Listing is v1 only
    Endpoints {
        all: V1_ONLY,
        batch_delete: V1_ONLY,
        ..Endpoints::uniform(BOTH)
    },
);

impl Entity for Activities {
    fn schema() -> &'static EntitySchema {
        &ACTIVITIES
    }
}
