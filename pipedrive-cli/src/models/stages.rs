//! Pipeline stages

use crate::orm::fields::FieldDescriptor as F;
use crate::orm::model::Model;
use crate::orm::schema::{BOTH, Endpoints, Entity, EntitySchema, V1_ONLY};
use crate::orm::validators;

pub struct Stages;

pub type Stage = Model<Stages>;

static STAGES: EntitySchema = EntitySchema::new(
    "Stages",
    "stages",
    &[
        F::integer("order_nr"),
        F::text("name"),
        F::boolean("is_deleted").readonly(),
        F::number("deal_probability").with_validators(&[validators::percentage]),
        F::integer("pipeline_id"),
        F::boolean("is_deal_rot_enabled"),
        F::integer("days_to_rotten"),
        F::datetime("add_time").readonly(),
        F::datetime("update_time").readonly(),
    ],
    Endpoints {
        batch_delete: V1_ONLY,
        ..Endpoints::uniform(BOTH)
    },
);

impl Entity for Stages {
    fn schema() -> &'static EntitySchema {
        &STAGES
    }
}
