//! Person field definitions, keyed by `field_code`

use crate::orm::fields::{ElementKind, FieldDescriptor as F};
use crate::orm::model::Model;
use crate::orm::schema::{Endpoints, Entity, EntitySchema, V2_ONLY};
use crate::orm::types::StructKind;

pub struct PersonFields;

pub type PersonField = Model<PersonFields>;

static PERSON_FIELDS: EntitySchema = EntitySchema::new(
    "PersonFields",
    "personFields",
    &[
        F::text("field_name"),
        F::text("field_type"),
        F::list("options", ElementKind::Struct(StructKind::FieldOption)),
        F::list("subfields", ElementKind::Struct(StructKind::Subfield)).readonly(),
        F::boolean("is_custom_field").readonly(),
        F::boolean("is_optional_response_field"),
    ],
    Endpoints::uniform(V2_ONLY).without_batch_delete(),
)
.with_id_field("field_code");

impl Entity for PersonFields {
    fn schema() -> &'static EntitySchema {
        &PERSON_FIELDS
    }
}
