//! Lead field definitions
//!
//! Monetary, date range and time range custom fields carry one extra data
//! key on a lead (`<key>_currency`, `<key>_until`) that is not listed here.

use crate::orm::fields::{ElementKind, FieldDescriptor as F};
use crate::orm::model::Model;
use crate::orm::schema::{Endpoints, Entity, EntitySchema, NONE, V1_ONLY};
use crate::orm::types::StructKind;

pub struct LeadFields;

pub type LeadField = Model<LeadFields>;

static LEAD_FIELDS: EntitySchema = EntitySchema::new(
    "LeadFields",
    "leadFields",
    &[
        F::text("key").readonly(),
        F::text("name"),
        F::integer("group_id"),
        F::integer("order_nr"),
        F::text("field_type"),
        F::datetime("add_time").readonly(),
        F::datetime("update_time").readonly(),
        F::integer("last_updated_by_user_id").readonly(),
        F::integer("created_by_user_id").readonly(),
        F::boolean("json_column_flag"),
        F::boolean("active_flag"),
        F::boolean("edit_flag"),
        F::boolean("index_visible_flag"),
        F::boolean("details_visible_flag"),
        F::boolean("add_visible_flag"),
        F::boolean("important_flag"),
        F::boolean("bulk_edit_allowed"),
        F::boolean("searchable_flag"),
        F::boolean("filtering_allowed"),
        F::boolean("sortable_flag"),
        F::boolean("mandatory_flag"),
        F::text("description"),
        F::list("options", ElementKind::Struct(StructKind::FieldOption)),
    ],
    Endpoints {
        all: V1_ONLY,
        ..Endpoints::uniform(NONE)
    },
);

impl Entity for LeadFields {
    fn schema() -> &'static EntitySchema {
        &LEAD_FIELDS
    }
}
