//! Activity types

use crate::orm::fields::FieldDescriptor as F;
use crate::orm::model::Model;
use crate::orm::schema::{Endpoints, Entity, EntitySchema, NONE, V1_ONLY};
use crate::orm::validators;

pub struct ActivityTypes;

pub type ActivityType = Model<ActivityTypes>;

static ACTIVITY_TYPES: EntitySchema = EntitySchema::new(
    "ActivityTypes",
    "activityTypes",
    &[
        F::integer("order_nr"),
        F::text("name").with_validators(&[validators::non_empty_text]),
        F::text("key_string").readonly(),
        F::text("icon_key"),
        F::boolean("active_flag").readonly(),
        F::text("color"),
        F::boolean("is_custom_flag").readonly(),
        F::datetime("add_time").readonly(),
        F::datetime("update_time").readonly(),
    ],
    Endpoints {
        get: NONE,
        ..Endpoints::uniform(V1_ONLY)
    },
);

impl Entity for ActivityTypes {
    fn schema() -> &'static EntitySchema {
        &ACTIVITY_TYPES
    }
}
