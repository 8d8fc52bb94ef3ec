//! Lead labels

use crate::orm::fields::FieldDescriptor as F;
use crate::orm::model::Model;
use crate::orm::schema::{Endpoints, Entity, EntitySchema, NONE, V1_ONLY};
use crate::orm::validators;

pub struct LeadLabels;

pub type LeadLabel = Model<LeadLabels>;

static LEAD_LABELS: EntitySchema = EntitySchema::new(
    "LeadLabels",
    "leadLabels",
    &[
        F::text("name").with_validators(&[validators::non_empty_text]),
        F::text("color").with_validators(&[validators::lead_label_color]),
        F::datetime("add_time").readonly(),
        F::datetime("update_time").readonly(),
    ],
    // No single-label route
    Endpoints {
        get: NONE,
        batch_delete: NONE,
        ..Endpoints::uniform(V1_ONLY)
    },
);

impl Entity for LeadLabels {
    fn schema() -> &'static EntitySchema {
        &LEAD_LABELS
    }
}
