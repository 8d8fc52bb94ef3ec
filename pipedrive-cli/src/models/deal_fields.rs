//! Deal field definitions

use crate::orm::fields::{ElementKind, FieldDescriptor as F};
use crate::orm::model::Model;
use crate::orm::schema::{Endpoints, Entity, EntitySchema, V1_ONLY};
use crate::orm::types::StructKind;

pub struct DealFields;

pub type DealField = Model<DealFields>;

static DEAL_FIELDS: EntitySchema = EntitySchema::new(
    "DealFields",
    "dealFields",
    &[
        F::text("key").readonly(),
        F::text("name"),
        F::integer("order_nr"),
        F::text("field_type"),
        F::datetime("add_time").readonly(),
        F::datetime("update_time").readonly(),
        F::integer("last_updated_by_user_id").readonly(),
        F::integer("created_by_user_id").readonly(),
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
        F::list("options", ElementKind::Struct(StructKind::FieldOption)),
    ],
    Endpoints::uniform(V1_ONLY),
);

impl Entity for DealFields {
    fn schema() -> &'static EntitySchema {
        &DEAL_FIELDS
    }
}
