//! Activity field definitions (list only)

use crate::orm::fields::{ElementKind, FieldDescriptor as F};
use crate::orm::model::Model;
use crate::orm::schema::{Endpoints, Entity, EntitySchema, NONE, V1_ONLY};
use crate::orm::types::StructKind;

pub struct ActivityFields;

pub type ActivityField = Model<ActivityFields>;

static ACTIVITY_FIELDS: EntitySchema = EntitySchema::new(
    "ActivityFields",
    "activityFields",
    &[
        F::text("key").readonly(),
        F::text("name"),
        F::integer("group_id"),
        F::integer("order_nr"),
        F::text("field_type"),
        F::boolean("json_column_flag"),
        F::datetime("add_time").readonly(),
        F::datetime("update_time").readonly(),
        F::integer("last_updated_by_user_id").readonly(),
        F::integer("created_by_user_id").readonly(),
        F::boolean("active_flag"),
        F::boolean("edit_flag"),
        F::boolean("details_visible_flag"),
        F::boolean("add_visible_flag"),
        F::boolean("important_flag"),
        F::boolean("bulk_edit_allowed"),
        F::boolean("searchable_flag"),
        F::boolean("filtering_allowed"),
        F::boolean("sortable_flag"),
        F::boolean("mandatory_flag"),
        F::list("options", ElementKind::Struct(StructKind::FieldOption)),
        F::json("user_restrictions"),
        F::text("description"),
    ],
    Endpoints {
        all: V1_ONLY,
        ..Endpoints::uniform(NONE)
    },
);

impl Entity for ActivityFields {
    fn schema() -> &'static EntitySchema {
        &ACTIVITY_FIELDS
    }
}
